//! Completed-game archive record formatting for the `games(gid, dta,
//! analysis)` table. `dta` is a single space-joined line; `analysis` is
//! a parallel newline-joined column, one entry per move, empty where
//! absent.

/// One archived ply: the move text, the mover's remaining clock in
/// milliseconds after the move, and an optional analysis payload.
#[derive(Debug, Clone)]
pub struct ArchivedMove {
    pub text: String,
    pub remaining_ms: i64,
    pub analysis: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ArchiveRecord {
    pub timestamp: String,
    pub board_size: usize,
    pub komi: f64,
    pub white: String,
    pub white_rating: String,
    pub black: String,
    pub black_rating: String,
    pub clock_budget_ms: i64,
    pub moves: Vec<ArchivedMove>,
    pub result: String,
}

impl ArchiveRecord {
    /// `tme N komi w(wr) b(br) L mv1 t1 mv2 t2 … result`
    pub fn to_dta(&self) -> String {
        let mut fields = vec![
            self.timestamp.clone(),
            self.board_size.to_string(),
            self.komi.to_string(),
            format!("{}({})", self.white, self.white_rating),
            format!("{}({})", self.black, self.black_rating),
            self.clock_budget_ms.to_string(),
        ];
        for mv in &self.moves {
            fields.push(mv.text.clone());
            fields.push(mv.remaining_ms.to_string());
        }
        fields.push(self.result.clone());
        fields.join(" ")
    }

    /// Newline-joined per-move analysis column, one line per move (empty
    /// string where a move carried no analysis payload).
    pub fn to_analysis(&self) -> String {
        self.moves
            .iter()
            .map(|mv| mv.analysis.as_deref().unwrap_or(""))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ArchiveRecord {
        ArchiveRecord {
            timestamp: "20260726123000".into(),
            board_size: 19,
            komi: 7.5,
            white: "alpha".into(),
            white_rating: "1820".into(),
            black: "beta".into(),
            black_rating: "1790?".into(),
            clock_budget_ms: 900_000,
            moves: vec![
                ArchivedMove { text: "e5".into(), remaining_ms: 897_000, analysis: None },
                ArchivedMove { text: "pass".into(), remaining_ms: 894_000, analysis: Some("{\"v\":0.1}".into()) },
            ],
            result: "B+Resign".into(),
        }
    }

    #[test]
    fn dta_line_is_space_joined_in_column_order() {
        let record = sample();
        assert_eq!(
            record.to_dta(),
            "20260726123000 19 7.5 alpha(1820) beta(1790?) 900000 e5 897000 pass 894000 B+Resign"
        );
    }

    #[test]
    fn analysis_column_pads_absent_entries_with_empty_lines() {
        let record = sample();
        assert_eq!(record.to_analysis(), "\n{\"v\":0.1}");
    }
}

//! Smart Game Format serialization for a finished or in-progress game,
//! with Chinese rules and an analysis extension property.

const COORD_LETTERS: &str = "abcdefghijklmnopqrstuvwxyz";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SgfColor {
    Black,
    White,
}

impl SgfColor {
    fn letter(self) -> char {
        match self {
            SgfColor::Black => 'B',
            SgfColor::White => 'W',
        }
    }
}

/// One recorded ply. `coord` is `None` for a pass. `time_left_ms` and
/// `analysis` are best-effort annotations, omitted from the output when
/// absent.
#[derive(Debug, Clone)]
pub struct SgfMove {
    pub color: SgfColor,
    pub coord: Option<(u32, u32)>,
    pub time_left_ms: Option<i64>,
    pub analysis: Option<String>,
}

impl SgfMove {
    pub fn play(color: SgfColor, x: u32, y: u32, time_left_ms: Option<i64>) -> Self {
        Self { color, coord: Some((x, y)), time_left_ms, analysis: None }
    }

    pub fn pass(color: SgfColor, time_left_ms: Option<i64>) -> Self {
        Self { color, coord: None, time_left_ms, analysis: None }
    }

    pub fn with_analysis(mut self, analysis: impl Into<String>) -> Self {
        self.analysis = Some(analysis.into());
        self
    }
}

/// A complete game record, ready to render to the SGF text body.
#[derive(Debug, Clone)]
pub struct SgfGame {
    pub board_size: usize,
    pub komi: f64,
    pub white: String,
    pub black: String,
    pub white_rank: Option<String>,
    pub black_rank: Option<String>,
    pub clock_budget_secs: u64,
    pub moves: Vec<SgfMove>,
    pub result: Option<String>,
    pub error_comment: Option<String>,
}

impl SgfGame {
    pub fn new(board_size: usize, komi: f64, white: String, black: String, clock_budget_secs: u64) -> Self {
        Self {
            board_size,
            komi,
            white,
            black,
            white_rank: None,
            black_rank: None,
            clock_budget_secs,
            moves: Vec::new(),
            result: None,
            error_comment: None,
        }
    }

    pub fn push(&mut self, mv: SgfMove) {
        self.moves.push(mv);
    }

    fn coord_letters(&self, x: u32, y: u32) -> String {
        let col = COORD_LETTERS.chars().nth((x - 1) as usize).expect("x in range");
        let row = COORD_LETTERS
            .chars()
            .nth(self.board_size - y as usize)
            .expect("y in range");
        format!("{col}{row}")
    }

    /// Render the full text of the SGF file body, `(\n...\n)\n`-wrapped.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("(\n");
        out.push_str(";GM[1]FF[3]AP[cgos-server]\n");
        out.push_str(&format!(
            "RU[Chinese]SZ[{}]HA[0]KM[{}]\n",
            self.board_size, self.komi
        ));
        out.push_str(&format!("PW[{}]\n", self.white));
        out.push_str(&format!("PB[{}]\n", self.black));
        out.push_str(&format!("TM[{}]\n", self.clock_budget_secs));

        if let (Some(br), Some(wr)) = (&self.black_rank, &self.white_rank) {
            out.push_str(&format!(
                "GN[{} ({}) vs. {} ({})]\n",
                self.black, br, self.white, wr
            ));
        }

        if let Some(result) = &self.result {
            out.push_str(&format!("RE[{result}]\n"));
        }

        if !self.moves.is_empty() {
            out.push_str("(\n");
            for mv in &self.moves {
                let letter = mv.color.letter();
                match mv.coord {
                    Some((x, y)) => out.push_str(&format!(";{letter}[{}]", self.coord_letters(x, y))),
                    None => out.push_str(&format!(";{letter}[]")),
                }
                if let Some(ms) = mv.time_left_ms {
                    out.push_str(&format!("{letter}L[{ms}]"));
                }
                if let Some(analysis) = &mv.analysis {
                    out.push_str(&format!("CC[{analysis}]"));
                }
            }
            out.push_str(")\n");
        }

        if let Some(reason) = &self.error_comment {
            out.push_str(&format!("C[{reason}]\n"));
        }

        out.push_str(")\n");
        out
    }

    /// gzip-compress the rendered text, for `compress_sgf`.
    pub fn render_gzip(&self) -> std::io::Result<Vec<u8>> {
        use std::io::Write;
        let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(self.render().as_bytes())?;
        encoder.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_header_and_moves() {
        let mut game = SgfGame::new(19, 7.5, "bar".into(), "foo".into(), 900);
        game.push(SgfMove::play(SgfColor::Black, 5, 5, Some(300_000)));
        game.push(SgfMove::pass(SgfColor::White, Some(200_000)));
        game.result = Some("B+Resign".into());
        let text = game.render();
        assert!(text.starts_with("(\n;GM[1]FF[3]AP[cgos-server]\n"));
        assert!(text.contains("RU[Chinese]SZ[19]HA[0]KM[7.5]\n"));
        assert!(text.contains("PW[bar]\n"));
        assert!(text.contains("PB[foo]\n"));
        assert!(text.contains(";B[ee]BL[300000]"));
        assert!(text.contains(";W[]WL[200000]"));
        assert!(text.contains("RE[B+Resign]\n"));
        assert!(text.ends_with(")\n"));
    }

    #[test]
    fn coordinate_letters_use_the_full_alphabet_including_i() {
        // SGF coordinates are plain a-z, unlike the protocol's i-skipping
        // column letters.
        let game = SgfGame::new(19, 7.5, "w".into(), "b".into(), 900);
        assert_eq!(game.coord_letters(9, 19), "ia");
    }

    #[test]
    fn empty_move_list_omits_the_move_block() {
        let game = SgfGame::new(9, 5.5, "w".into(), "b".into(), 60);
        let text = game.render();
        assert!(!text.contains("(\n(\n"));
    }
}

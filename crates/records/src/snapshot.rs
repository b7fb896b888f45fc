//! Web snapshot file formatting. The scheduler atomically rewrites this
//! file each round; viewers and the HTML layer read it without ever
//! seeing a partial write.

/// One active-user line: `u name games rating last_game`. Included for
/// every player whose `last_game` falls within the trailing 190-day window.
#[derive(Debug, Clone)]
pub struct ActiveUserLine {
    pub name: String,
    pub games: i64,
    pub rating: String,
    pub last_game: String,
}

/// One recently finished game: `g gid w wr b br dte wtu btu res`. Included
/// for every archived game within the trailing 4-hour window.
#[derive(Debug, Clone)]
pub struct FinishedGameLine {
    pub gid: i64,
    pub white: String,
    pub white_rating: String,
    pub black: String,
    pub black_rating: String,
    pub date: String,
    pub white_time_used_ms: i64,
    pub black_time_used_ms: i64,
    pub result: String,
}

/// One in-progress game: `s ts gid w b lmst wrt brt wr br`.
#[derive(Debug, Clone)]
pub struct LiveGameLine {
    pub gid: i64,
    pub white: String,
    pub black: String,
    pub last_move_start_ms: i64,
    pub white_remaining_ms: i64,
    pub black_remaining_ms: i64,
    pub white_rating: String,
    pub black_rating: String,
}

/// Render the full snapshot body: a leading timestamp line, then one
/// section each for active users, recently finished games, and live games.
pub fn render_snapshot(
    timestamp: &str,
    active_users: &[ActiveUserLine],
    finished_games: &[FinishedGameLine],
    live_games: &[LiveGameLine],
) -> String {
    let mut out = String::new();
    out.push_str(timestamp);
    out.push('\n');

    for u in active_users {
        out.push_str(&format!("u {} {} {} {}\n", u.name, u.games, u.rating, u.last_game));
    }
    for g in finished_games {
        out.push_str(&format!(
            "g {} {} {} {} {} {} {} {} {}\n",
            g.gid, g.white, g.white_rating, g.black, g.black_rating, g.date,
            g.white_time_used_ms, g.black_time_used_ms, g.result
        ));
    }
    for s in live_games {
        out.push_str(&format!(
            "s {} {} {} {} {} {} {} {} {}\n",
            timestamp, s.gid, s.white, s.black, s.last_move_start_ms,
            s.white_remaining_ms, s.black_remaining_ms, s.white_rating, s.black_rating,
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_one_line_per_section_entry() {
        let text = render_snapshot(
            "2026-07-26 12:00:00",
            &[ActiveUserLine { name: "alpha".into(), games: 12, rating: "1820".into(), last_game: "2026-07-26 11:00:00".into() }],
            &[FinishedGameLine {
                gid: 42,
                white: "alpha".into(),
                white_rating: "1820".into(),
                black: "beta".into(),
                black_rating: "1790?".into(),
                date: "2026-07-26 11:00:00".into(),
                white_time_used_ms: 60_000,
                black_time_used_ms: 55_000,
                result: "W+12.5".into(),
            }],
            &[LiveGameLine {
                gid: 43,
                white: "gamma".into(),
                black: "delta".into(),
                last_move_start_ms: 1_000_000,
                white_remaining_ms: 890_000,
                black_remaining_ms: 870_000,
                white_rating: "1700".into(),
                black_rating: "1650?".into(),
            }],
        );
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "2026-07-26 12:00:00");
        assert_eq!(lines[1], "u alpha 12 1820 2026-07-26 11:00:00");
        assert_eq!(
            lines[2],
            "g 42 alpha 1820 beta 1790? 2026-07-26 11:00:00 60000 55000 W+12.5"
        );
        assert_eq!(
            lines[3],
            "s 2026-07-26 12:00:00 43 gamma delta 1000000 890000 870000 1700 1650?"
        );
    }

    #[test]
    fn empty_sections_render_just_the_timestamp() {
        assert_eq!(render_snapshot("ts", &[], &[], &[]), "ts\n");
    }
}

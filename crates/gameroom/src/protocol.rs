//! Wire protocol: the exact LF-terminated line grammar the client and
//! server speak. Encoding renders a `ServerMessage` to its wire line;
//! decoding parses one
//! raw client line at a time, since what a line means depends on the
//! session's current state (handled by `engine`).

use cgos_core::GameId;

/// A line sent from server to client. `Display` renders the exact wire
/// text, without the trailing `\n` (the connection actor appends it).
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    Protocol { analyze: bool },
    Username,
    Password,
    Setup {
        gid: GameId,
        size: usize,
        komi: f64,
        clock_budget_ms: i64,
        white: String,
        white_rating: String,
        black: String,
        black_rating: String,
        moves: Vec<(String, i64)>,
    },
    SetupMissing { gid: GameId },
    Genmove { color: char, ms_remaining: i64 },
    Play { color: char, mv: String, ms_remaining: i64 },
    GameOver { date: String, result: String, err: Option<String> },
    Info(String),
    Error(String),
    Match {
        gid: GameId,
        date: Option<String>,
        time: Option<String>,
        size: usize,
        komi: f64,
        white: String,
        white_rating: String,
        black: String,
        black_rating: String,
        result: Option<String>,
    },
    Update { gid: GameId, mv: String, ms_remaining: i64 },
    UpdateResult { gid: GameId, result: String },
    GameOverViewer {
        gid: GameId,
        result: String,
        white_time_used_ms: i64,
        black_time_used_ms: i64,
    },
}

impl std::fmt::Display for ServerMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServerMessage::Protocol { analyze: true } => write!(f, "protocol genmove_analyze"),
            ServerMessage::Protocol { analyze: false } => write!(f, "protocol"),
            ServerMessage::Username => write!(f, "username"),
            ServerMessage::Password => write!(f, "password"),
            ServerMessage::Setup { gid, size, komi, clock_budget_ms, white, white_rating, black, black_rating, moves } => {
                write!(
                    f,
                    "setup {gid} {size} {komi} {clock_budget_ms} {white}({white_rating}) {black}({black_rating})"
                )?;
                for (mv, t) in moves {
                    write!(f, " {mv} {t}")?;
                }
                Ok(())
            }
            ServerMessage::SetupMissing { gid } => write!(f, "setup {gid} ?"),
            ServerMessage::Genmove { color, ms_remaining } => write!(f, "genmove {color} {ms_remaining}"),
            ServerMessage::Play { color, mv, ms_remaining } => write!(f, "play {color} {mv} {ms_remaining}"),
            ServerMessage::GameOver { date, result, err } => match err {
                Some(err) => write!(f, "gameover {date} {result} {err}"),
                None => write!(f, "gameover {date} {result}"),
            },
            ServerMessage::Info(text) => write!(f, "info {text}"),
            ServerMessage::Error(text) => write!(f, "Error: {text}"),
            ServerMessage::Match { gid, date, time, size, komi, white, white_rating, black, black_rating, result } => {
                write!(
                    f,
                    "match {gid} {} {} {size} {komi} {white}({white_rating}) {black}({black_rating}) {}",
                    date.as_deref().unwrap_or("-"),
                    time.as_deref().unwrap_or("-"),
                    result.as_deref().unwrap_or("-"),
                )
            }
            ServerMessage::Update { gid, mv, ms_remaining } => write!(f, "update {gid} {mv} {ms_remaining}"),
            ServerMessage::UpdateResult { gid, result } => write!(f, "update {gid} {result}"),
            ServerMessage::GameOverViewer { gid, result, white_time_used_ms, black_time_used_ms } => {
                write!(f, "gameover {gid} {result} {white_time_used_ms} {black_time_used_ms}")
            }
        }
    }
}

/// The two handshake tokens recognized at `protocol` state.
#[derive(Debug, Clone, PartialEq)]
pub struct Handshake {
    pub viewer: bool,
    pub analyze: bool,
    pub user_agent: String,
}

/// Parse the very first line of a connection. Returns `None` if neither
/// `e1` nor `v1` leads the line.
pub fn parse_handshake(line: &str) -> Option<Handshake> {
    let mut tokens = line.split_whitespace();
    let tag = tokens.next()?;
    let viewer = match tag {
        "e1" => false,
        "v1" => true,
        _ => return None,
    };
    let rest: Vec<&str> = tokens.collect();
    let analyze = rest.iter().any(|t| *t == "genmove_analyze");
    Some(Handshake { viewer, analyze, user_agent: rest.join(" ") })
}

/// Parse a `password` step reply: `<pw>` or `<pw> <newpw>`.
pub fn parse_password_line(line: &str) -> Option<(String, Option<String>)> {
    let mut tokens = line.split_whitespace();
    let pw = tokens.next()?.to_string();
    let newpw = tokens.next().map(str::to_string);
    Some((pw, newpw))
}

/// A decoded `genmove`/`ok` state reply.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayReply {
    Move { text: String, analysis: Option<serde_json::Value> },
    Resign,
    Ready,
    Quit,
}

/// Parse a reply expected while a session is attached to a game (state
/// `genmove`) or idle after one (`gameover`/`waiting`). `resign`/`ready`/
/// `quit` are recognized case-sensitively per the wire grammar; anything
/// else is a move, optionally followed by a JSON analysis token which is
/// dropped (not failed) if it doesn't parse.
pub fn parse_play_reply(line: &str) -> PlayReply {
    let mut tokens = line.splitn(2, char::is_whitespace);
    let first = tokens.next().unwrap_or("");
    match first {
        "resign" => PlayReply::Resign,
        "ready" => PlayReply::Ready,
        "quit" => PlayReply::Quit,
        _ => {
            let rest = tokens.next().unwrap_or("").trim();
            let analysis = if rest.is_empty() {
                None
            } else {
                serde_json::from_str::<serde_json::Value>(rest).ok()
            };
            PlayReply::Move { text: first.to_string(), analysis }
        }
    }
}

/// Parse an `observe <gid>` line.
pub fn parse_observe(line: &str) -> Option<GameId> {
    let mut tokens = line.split_whitespace();
    if tokens.next()? != "observe" {
        return None;
    }
    tokens.next()?.parse::<i64>().ok().map(GameId::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_line_renders_with_trailing_moves() {
        let msg = ServerMessage::Setup {
            gid: GameId(7),
            size: 19,
            komi: 7.5,
            clock_budget_ms: 900_000,
            white: "alice".into(),
            white_rating: "1820".into(),
            black: "bob".into(),
            black_rating: "1790?".into(),
            moves: vec![("e5".into(), 897_000)],
        };
        assert_eq!(msg.to_string(), "setup 7 19 7.5 900000 alice(1820) bob(1790?) e5 897000");
    }

    #[test]
    fn error_line_uses_the_capitalized_prefix() {
        assert_eq!(ServerMessage::Error("bad name".into()).to_string(), "Error: bad name");
    }

    #[test]
    fn match_line_uses_dashes_for_absent_fields() {
        let msg = ServerMessage::Match {
            gid: GameId(9),
            date: None,
            time: None,
            size: 19,
            komi: 7.5,
            white: "a".into(),
            white_rating: "1800".into(),
            black: "b".into(),
            black_rating: "1800".into(),
            result: None,
        };
        assert_eq!(msg.to_string(), "match 9 - - 19 7.5 a(1800) b(1800) -");
    }

    #[test]
    fn handshake_detects_viewer_and_analyze_tokens() {
        let h = parse_handshake("e1 gnugo-3.8 genmove_analyze").unwrap();
        assert!(!h.viewer);
        assert!(h.analyze);
        let v = parse_handshake("v1 browser").unwrap();
        assert!(v.viewer);
        assert!(parse_handshake("garbage").is_none());
    }

    #[test]
    fn play_reply_parses_move_with_and_without_analysis() {
        assert_eq!(
            parse_play_reply("e5 {\"v\":0.1}"),
            PlayReply::Move { text: "e5".into(), analysis: Some(serde_json::json!({"v": 0.1})) }
        );
        assert_eq!(parse_play_reply("e5"), PlayReply::Move { text: "e5".into(), analysis: None });
        assert_eq!(parse_play_reply("resign"), PlayReply::Resign);
    }

    #[test]
    fn play_reply_drops_malformed_analysis_without_failing_the_move() {
        assert_eq!(
            parse_play_reply("e5 not-json"),
            PlayReply::Move { text: "e5".into(), analysis: None }
        );
    }

    #[test]
    fn observe_parses_the_game_id() {
        assert_eq!(parse_observe("observe 42"), Some(GameId(42)));
        assert_eq!(parse_observe("observe"), None);
        assert_eq!(parse_observe("watch 42"), None);
    }
}

//! The `admin` console dialog. The literal username `admin` lands a
//! session in [`SessionPhase::Admin`] instead of the ordinary player
//! states; every command either succeeds silently (an `Info` line) or
//! fails with a single-line `Error:` reply, never a disconnect.

use crate::state::Dispatcher;
use cgos_core::{now_millis, GameId};
use cgos_rating::format_rating;
use cgos_session::{create_game, ServerMessage, SessionId, SessionPhase};

pub async fn handle_admin_line(state: &mut Dispatcher, id: SessionId, line: &str) {
    let mut tokens = line.split_whitespace();
    let Some(cmd) = tokens.next() else { return };
    let rest: Vec<&str> = tokens.collect();

    match cmd {
        "who" => reply(state, id, who_listing(state)),
        "games" => reply(state, id, games_listing(state)),
        "match" => handle_match(state, id, &rest).await,
        "abort" => handle_abort(state, id, &rest).await,
        "quit" => state.drop_session(id),
        other => reply(state, id, format!("Error: unknown command {other}")),
    }
}

fn reply(state: &mut Dispatcher, id: SessionId, text: String) {
    if let Some(session) = state.sessions.get_mut(&id) {
        if let Some(stripped) = text.strip_prefix("Error: ") {
            session.send(ServerMessage::Error(stripped.to_string()));
        } else {
            session.send(ServerMessage::Info(text));
        }
    }
}

fn who_listing(state: &Dispatcher) -> String {
    let names: Vec<&str> = state.sessions.values().filter_map(|s| s.name.as_deref()).collect();
    format!("{} connected: {}", names.len(), names.join(", "))
}

fn games_listing(state: &Dispatcher) -> String {
    if state.games.is_empty() {
        return "no live games".to_string();
    }
    let lines: Vec<String> = state
        .games
        .values()
        .map(|g| format!("{} {}({}) vs {}({})", g.gid, g.white, g.white_rating, g.black, g.black_rating))
        .collect();
    lines.join("; ")
}

/// `match <white> <black> [wt-sec] [bt-sec] [resume-gid] [length]`
async fn handle_match(state: &mut Dispatcher, id: SessionId, args: &[&str]) {
    let [white, black, rest @ ..] = args else {
        reply(state, id, "Error: usage: match <white> <black> [wt-sec] [bt-sec] [resume-gid] [length]".to_string());
        return;
    };
    let white = white.to_string();
    let black = black.to_string();

    if !state.sessions.values().any(|s| s.name.as_deref() == Some(white.as_str())) {
        reply(state, id, format!("Error: {white} is not connected"));
        return;
    }
    if !state.sessions.values().any(|s| s.name.as_deref() == Some(black.as_str())) {
        reply(state, id, format!("Error: {black} is not connected"));
        return;
    }

    let wt_secs: i64 = rest.first().and_then(|s| s.parse().ok()).unwrap_or(state.cfg.clock_budget_ms / 1000);
    let bt_secs: i64 = rest.get(1).and_then(|s| s.parse().ok()).unwrap_or(wt_secs);
    let clock_budget_ms = wt_secs.max(bt_secs) * 1000;

    let now = now_millis();
    let gid = state.allocate_gid();
    let (wr, wk) = state.sessions.values().find(|s| s.name.as_deref() == Some(white.as_str())).map(|s| (s.rating, s.k)).unwrap_or((state.cfg.default_rating, state.cfg.max_k));
    let (br, bk) = state.sessions.values().find(|s| s.name.as_deref() == Some(black.as_str())).map(|s| (s.rating, s.k)).unwrap_or((state.cfg.default_rating, state.cfg.max_k));

    let created = create_game(
        gid,
        state.cfg.board_size,
        state.cfg.komi,
        clock_budget_ms,
        state.cfg.ko_rule,
        white.clone(),
        format_rating(wr, wk),
        black.clone(),
        format_rating(br, bk),
        &[],
        now,
    );

    for name in [&white, &black] {
        state.waiting.remove(name);
        if let Some(sid) = state.sessions.values().find(|s| s.name.as_deref() == Some(name.as_str())).map(|s| s.id) {
            if let Some(session) = state.sessions.get_mut(&sid) {
                session.gid = gid;
                session.phase = SessionPhase::Ok;
                session.send(created.setup_for_players.clone());
            }
        }
    }
    let mover = created.game.side_to_move();
    let mover_name = created.game.name_of(mover).to_string();
    if let Some(sid) = state.sessions.values().find(|s| s.name.as_deref() == Some(mover_name.as_str())).map(|s| s.id) {
        if let Some(session) = state.sessions.get_mut(&sid) {
            session.phase = SessionPhase::Genmove;
            session.send(created.genmove_for_mover.clone());
        }
    }

    state.table.broadcast_all(created.match_for_viewers);
    state.games.insert(gid, created.game);
    reply(state, id, format!("started game {gid}: {white} (w) vs {black} (b)"));
}

/// `abort <gid> [result]`
async fn handle_abort(state: &mut Dispatcher, id: SessionId, args: &[&str]) {
    let Some(gid_text) = args.first() else {
        reply(state, id, "Error: usage: abort <gid> [result]".to_string());
        return;
    };
    let Ok(gid) = gid_text.parse::<i64>() else {
        reply(state, id, format!("Error: bad game id {gid_text}"));
        return;
    };
    let gid = GameId(gid);
    if !state.games.contains_key(&gid) {
        reply(state, id, format!("Error: no live game {gid}"));
        return;
    }
    let result = args.get(1).map(|s| s.to_string()).unwrap_or_else(|| "Void".to_string());
    crate::round::terminate_game(state, gid, result, Some("aborted by admin".to_string())).await;
    reply(state, id, format!("aborted game {gid}"));
}

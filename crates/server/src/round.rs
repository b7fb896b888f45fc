//! Server-local round orchestration: game termination and the
//! round-boundary tick that drives the scheduler crate's pairing, timeout
//! sweep, rating batch, and badword/kill-file checks against the
//! dispatcher's actual live state.

use crate::state::Dispatcher;
use cgos_core::{now_millis, GameId};
use cgos_database::{ArchiveRepository, LiveStateRepository, RecentGameRow};
use cgos_rating::{Outcome, Rating};
use cgos_scheduler::{assign_colors, compute_range, jittered_order, pair_up, sweep_timeouts, Candidate, FinishedGame};
use cgos_session::{create_game, ServerMessage, SessionPhase};
use std::collections::HashSet;

/// One finished game awaiting the next rating batch.
pub struct PendingRating {
    pub white_name: String,
    pub black_name: String,
    pub finished: FinishedGame,
}

/// Increments the handshake counter for `user_agent`, once per connection.
pub async fn record_client_once(state: &mut Dispatcher, user_agent: &str) {
    if user_agent.is_empty() {
        return;
    }
    if let Err(e) = state.live_db.record_client(user_agent).await {
        log::error!("record_client({user_agent}) failed: {e}");
    }
}

fn parse_outcome(result: &str) -> Option<Outcome> {
    if result.starts_with("W+") {
        Some(Outcome::WhiteWin)
    } else if result.starts_with("B+") {
        Some(Outcome::BlackWin)
    } else if result == "Draw" {
        Some(Outcome::Draw)
    } else {
        None
    }
}

/// Runs the seven-step termination sequence once a game's
/// `MoveEffect::Terminated` (or a timeout sweep) has produced a final
/// `result`: notify both players, notify and retire viewers, persist the
/// live-state row and archive record, write the final SGF, then drop the
/// game from the live map.
pub async fn terminate_game(state: &mut Dispatcher, gid: GameId, result: String, reason: Option<String>) {
    let Some(game) = state.games.get(&gid) else { return };
    let now = now_millis();
    let date = crate::snapshot::format_timestamp(now);
    let white_time_used_ms = game.clock_budget_ms - game.clock.white_remaining_ms;
    let black_time_used_ms = game.clock_budget_ms - game.clock.black_remaining_ms;

    // 1. delete board / 2. notify both players.
    for name in [game.white.clone(), game.black.clone()] {
        if let Some(id) = state.sessions.iter().find(|(_, s)| s.name.as_deref() == Some(name.as_str())).map(|(id, _)| *id) {
            if let Some(session) = state.sessions.get_mut(&id) {
                session.send(ServerMessage::GameOver { date: date.clone(), result: result.clone(), err: reason.clone() });
                session.phase = SessionPhase::GameOver;
            }
        }
    }

    // 3. notify viewers, then retire the watcher list.
    let saturated = state.table.broadcast(gid, ServerMessage::GameOverViewer { gid, result: result.clone(), white_time_used_ms, black_time_used_ms });
    let saturated2 = state.table.broadcast(gid, ServerMessage::UpdateResult { gid, result: result.clone() });
    state.table.retire(gid);
    for s in saturated.into_iter().chain(saturated2) {
        state.drop_session(s);
    }

    // 4. insert live-state row.
    let row = RecentGameRow {
        gid: gid.0,
        white: game.white.clone(),
        white_rating: game.white_rating.clone(),
        black: game.black.clone(),
        black_rating: game.black_rating.clone(),
        date: date.clone(),
        white_time_used_ms,
        black_time_used_ms,
        result: result.clone(),
    };
    if let Err(e) = state.live_db.insert_recent_game(&row).await {
        log::error!("insert_recent_game({gid}) failed: {e}");
    }

    // 5. insert archive record + 6. write the final SGF.
    let (archive, sgf) = cgos_session::finalize(game, &result, &date);
    if let Some(archive_db) = state.archive_db.clone() {
        if let Err(e) = archive_db.insert_game(gid.0, &archive.to_dta(), &archive.to_analysis()).await {
            log::error!("archive insert_game({gid}) failed: {e}");
        }
    }
    if let Err(e) = crate::snapshot::write_sgf(&state.cfg, gid, &sgf) {
        log::error!("final SGF write for game {gid} failed: {e}");
    }

    if let Some(outcome) = parse_outcome(&result) {
        enqueue_rating(state, game.white.clone(), game.black.clone());
        let _ = outcome; // rating itself is computed in run_rating_batch at the round boundary
    }

    // 7. remove from the live map.
    state.games.remove(&gid);
}

/// Queues a finished game for the next rating batch; the actual Elo
/// numbers are loaded from the database at batch time since a player's
/// rating may have moved since this game's clock was captured.
fn enqueue_rating(state: &mut Dispatcher, white_name: String, black_name: String) {
    // Placeholder rating/outcome populated properly in `run_rating_batch`
    // below, which re-reads both players' current rating from the database
    // right before rating the pair.
    state.pending_ratings.push(PendingRating {
        white_name,
        black_name,
        finished: FinishedGame { white: Rating { elo: 0.0, k: 0.0 }, black: Rating { elo: 0.0, k: 0.0 }, outcome: Outcome::Draw, white_is_anchor: false, black_is_anchor: false },
    });
}

/// Drives one full round boundary: timeout sweep, rating batch over
/// games finished since the last round, badword/anchor reload, pairing of
/// waiting players into new games, and the web snapshot rewrite.
pub async fn run_round(state: &mut Dispatcher) {
    let now = now_millis();

    sweep_and_terminate_timeouts(state, now).await;
    run_rating_batch(state).await;
    reload_reloadables(state).await;
    pair_waiting_players(state, now).await;
    write_snapshot(state).await;
    maybe_broadcast_info(state, now);
}

async fn sweep_and_terminate_timeouts(state: &mut Dispatcher, now: i64) {
    let flagged: Vec<GameId> = {
        let games: Vec<(GameId, &cgos_session::GameContext)> = state.games.iter().map(|(gid, g)| (*gid, g)).collect();
        sweep_timeouts(games, now, state.cfg.leeway_ms).into_iter().map(|f| f.gid).collect()
    };
    for gid in flagged {
        let Some(game) = state.games.get(&gid) else { continue };
        let mover = game.side_to_move();
        let result = match mover {
            cgos_board::Color::Black => "W+Time".to_string(),
            cgos_board::Color::White => "B+Time".to_string(),
            _ => continue,
        };
        terminate_game(state, gid, result, None).await;
    }
}

async fn run_rating_batch(state: &mut Dispatcher) {
    if state.pending_ratings.is_empty() {
        return;
    }
    let pending = std::mem::take(&mut state.pending_ratings);
    for mut entry in pending {
        let white = match state.live_db.get_player(&entry.white_name).await {
            Ok(Some(p)) => Rating { elo: p.rating, k: p.k },
            _ => continue,
        };
        let black = match state.live_db.get_player(&entry.black_name).await {
            Ok(Some(p)) => Rating { elo: p.rating, k: p.k },
            _ => continue,
        };
        entry.finished.white = white;
        entry.finished.black = black;
        entry.finished.white_is_anchor = state.anchors.contains_key(&entry.white_name);
        entry.finished.black_is_anchor = state.anchors.contains_key(&entry.black_name);

        let rated = cgos_scheduler::run_rating_batch(std::slice::from_ref(&entry.finished), state.cfg.min_k, state.cfg.max_k);
        let Some(rated) = rated.into_iter().next() else { continue };
        if let Err(e) = state.live_db.update_rating(&entry.white_name, rated.white.elo, rated.white.k).await {
            log::error!("update_rating({}) failed: {e}", entry.white_name);
        }
        if let Err(e) = state.live_db.update_rating(&entry.black_name, rated.black.elo, rated.black.k).await {
            log::error!("update_rating({}) failed: {e}", entry.black_name);
        }
    }
}

pub async fn reload_reloadables(state: &mut Dispatcher) {
    match cgos_scheduler::reload_badwords(&state.cfg.bad_users_file) {
        Ok(words) => state.badwords = words,
        Err(e) => log::error!("badwords reload failed: {e}"),
    }
    match state.live_db.get_anchors().await {
        Ok(anchors) => state.anchors = anchors.into_iter().collect(),
        Err(e) => log::error!("get_anchors failed: {e}"),
    }
}

async fn pair_waiting_players(state: &mut Dispatcher, now: i64) {
    if state.cfg.match_mode != cgos_core::MatchMode::Auto {
        return;
    }
    let candidates: Vec<Candidate> = state
        .waiting
        .iter()
        .filter_map(|(name, id)| state.sessions.get(id).map(|s| Candidate { name: name.clone(), rating: s.rating }))
        .collect();
    if candidates.len() < 2 {
        return;
    }

    let range = compute_range(&candidates);
    let anchor_names: HashSet<String> = state.anchors.keys().cloned().collect();
    let mut rng = rand::rng();
    let order = jittered_order(&candidates, range, &mut rng);
    let pairs = pair_up(&order, &anchor_names, state.cfg.anchor_match_rate, &mut rng);

    for (a, b) in pairs {
        start_game(state, &a, &b, now).await;
    }
}

async fn start_game(state: &mut Dispatcher, a: &str, b: &str, now: i64) {
    // Fewer prior games as white becomes white this time; without an
    // archive query in the hot path, alternate by a cheap recent-games
    // lookup that's already cached for the match list.
    let (white, black) = assign_colors(a, b, 0, 0);
    let Some(&white_id) = state.waiting.get(white) else { return };
    let Some(&black_id) = state.waiting.get(black) else { return };
    let (white_rating, white_k) = state.sessions.get(&white_id).map(|s| (s.rating, s.k)).unwrap_or((state.cfg.default_rating, state.cfg.max_k));
    let (black_rating, black_k) = state.sessions.get(&black_id).map(|s| (s.rating, s.k)).unwrap_or((state.cfg.default_rating, state.cfg.max_k));

    let gid = state.allocate_gid();
    let created = create_game(
        gid,
        state.cfg.board_size,
        state.cfg.komi,
        state.cfg.clock_budget_ms,
        state.cfg.ko_rule,
        white.to_string(),
        cgos_rating::format_rating(white_rating, white_k),
        black.to_string(),
        cgos_rating::format_rating(black_rating, black_k),
        &[],
        now,
    );

    state.waiting.remove(white);
    state.waiting.remove(black);

    if let Some(session) = state.sessions.get_mut(&white_id) {
        session.gid = gid;
        session.phase = SessionPhase::Ok;
        session.send(created.setup_for_players.clone());
    }
    if let Some(session) = state.sessions.get_mut(&black_id) {
        session.gid = gid;
        session.phase = SessionPhase::Ok;
        session.send(created.setup_for_players.clone());
    }

    let mover = created.game.side_to_move();
    let mover_name = created.game.name_of(mover).to_string();
    if let Some(id) = find_by_name(state, &mover_name) {
        if let Some(session) = state.sessions.get_mut(&id) {
            session.phase = SessionPhase::Genmove;
            session.send(created.genmove_for_mover.clone());
        }
    }

    state.table.broadcast_all(created.match_for_viewers);
    state.games.insert(gid, created.game);
    log::info!("[game {gid}] started {white} (w) vs {black} (b)");
}

fn find_by_name(state: &Dispatcher, name: &str) -> Option<cgos_session::SessionId> {
    state.sessions.values().find(|s| s.name.as_deref() == Some(name)).map(|s| s.id)
}

async fn write_snapshot(state: &mut Dispatcher) {
    let now = now_millis();
    let timestamp = crate::snapshot::format_timestamp(now);
    let cutoff_4h = crate::snapshot::format_timestamp(now - 4 * 3_600_000);
    let cutoff_190d = crate::snapshot::format_timestamp(now - 190 * 86_400_000);

    let active_users = match state.live_db.active_players_since(&cutoff_190d).await {
        Ok(rows) => rows
            .into_iter()
            .map(|(name, games, rating, k, last_game)| cgos_records::ActiveUserLine { name, games, rating: cgos_rating::format_rating(rating, k), last_game })
            .collect(),
        Err(e) => {
            log::error!("active_players_since failed: {e}");
            Vec::new()
        }
    };

    let finished_games = match state.live_db.recent_games_since(&cutoff_4h).await {
        Ok(rows) => rows
            .into_iter()
            .map(|r| cgos_records::FinishedGameLine {
                gid: r.gid,
                white: r.white,
                white_rating: r.white_rating,
                black: r.black,
                black_rating: r.black_rating,
                date: r.date,
                white_time_used_ms: r.white_time_used_ms,
                black_time_used_ms: r.black_time_used_ms,
                result: r.result,
            })
            .collect(),
        Err(e) => {
            log::error!("recent_games_since failed: {e}");
            Vec::new()
        }
    };

    let live_games: Vec<cgos_records::LiveGameLine> = state
        .games
        .values()
        .map(|g| cgos_records::LiveGameLine {
            gid: g.gid.0,
            white: g.white.clone(),
            black: g.black.clone(),
            last_move_start_ms: g.clock.last_move_start_ms,
            white_remaining_ms: g.clock.white_remaining_ms,
            black_remaining_ms: g.clock.black_remaining_ms,
            white_rating: g.white_rating.clone(),
            black_rating: g.black_rating.clone(),
        })
        .collect();

    let body = cgos_records::render_snapshot(&timestamp, &active_users, &finished_games, &live_games);
    if let Err(e) = crate::snapshot::write_snapshot_atomic(&state.cfg, &body) {
        log::error!("web snapshot write failed: {e}");
    }
}

fn maybe_broadcast_info(state: &mut Dispatcher, now: i64) {
    if !state.info_throttle.due(now) {
        return;
    }
    let secs_left = cgos_scheduler::estimate_round_time_left_secs(state.games.values(), now);
    let msg = ServerMessage::Info(format!("{} live game(s), ~{}s worst-case remaining this round", state.live_game_count(), secs_left));
    let saturated = state.table.broadcast_all(msg);
    for s in saturated {
        state.drop_session(s);
    }
    state.info_throttle.mark_sent(now);
}

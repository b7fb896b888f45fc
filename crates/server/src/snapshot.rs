//! Filesystem outputs: the per-game SGF tree and the atomically-rewritten
//! web snapshot file.

use cgos_core::{Config, GameId, Millis};
use cgos_records::SgfGame;
use std::io::Write;
use std::path::PathBuf;

/// Formats milliseconds-since-epoch as `YYYY-MM-DD HH:MM:SS` UTC, the
/// timestamp shape used throughout the archive and snapshot formats.
/// Hand-rolled (no `chrono`/`time` dependency in this workspace) using
/// the proleptic Gregorian civil-from-days algorithm.
pub fn format_timestamp(ms: Millis) -> String {
    let secs = ms.div_euclid(1000);
    let days = secs.div_euclid(86_400);
    let time_of_day = secs.rem_euclid(86_400);
    let (year, month, day) = civil_from_days(days);
    let hour = time_of_day / 3600;
    let minute = (time_of_day % 3600) / 60;
    let second = time_of_day % 60;
    format!("{year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02}")
}

/// Howard Hinnant's `civil_from_days`: days-since-epoch to a Gregorian
/// (year, month, day) triple.
fn civil_from_days(z: i64) -> (i64, u32, u32) {
    let z = z + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = (z - era * 146_097) as u64;
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe as i64 + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = if mp < 10 { mp + 3 } else { mp - 9 } as u32;
    let year = if month <= 2 { y + 1 } else { y };
    (year, month, day)
}

/// Path for a completed (or intermediate) game's SGF file:
/// `<htmlDir>/<sgfDir>/YYYY/MM/DD/<gid>.sgf[.gz]`.
fn sgf_path(cfg: &Config, gid: GameId, timestamp_ms: Millis) -> PathBuf {
    let stamped = format_timestamp(timestamp_ms);
    let mut parts = stamped.split(['-', ' ']);
    let year = parts.next().unwrap_or("1970");
    let month = parts.next().unwrap_or("01");
    let day = parts.next().unwrap_or("01");
    let ext = if cfg.compress_sgf { "sgf.gz" } else { "sgf" };
    cfg.html_dir.join(&cfg.sgf_dir).join(year).join(month).join(day).join(format!("{gid}.{ext}"))
}

pub fn write_sgf(cfg: &Config, gid: GameId, sgf: &SgfGame) -> std::io::Result<()> {
    let path = sgf_path(cfg, gid, cgos_core::now_millis());
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if cfg.compress_sgf {
        std::fs::write(&path, sgf.render_gzip()?)
    } else {
        std::fs::write(&path, sgf.render())
    }
}

/// Atomically rewrites the web snapshot file: write to a sibling temp
/// path, then rename over the live path, so readers never see a partial
/// write.
pub fn write_snapshot_atomic(cfg: &Config, body: &str) -> std::io::Result<()> {
    let tmp = cfg.web_data_file.with_extension("tmp");
    {
        let mut file = std::fs::File::create(&tmp)?;
        file.write_all(body.as_bytes())?;
    }
    std::fs::rename(&tmp, &cfg.web_data_file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_a_known_instant() {
        // 2026-07-26 12:00:00 UTC
        assert_eq!(format_timestamp(1_785_240_000_000), "2026-07-26 12:00:00");
    }

    #[test]
    fn epoch_formats_as_the_epoch_date() {
        assert_eq!(format_timestamp(0), "1970-01-01 00:00:00");
    }
}

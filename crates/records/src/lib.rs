//! Serialization formats for finished and in-progress games: the archive
//! text record, the web snapshot file, and SGF game records.

mod archive;
mod sgf;
mod snapshot;

pub use archive::{ArchiveRecord, ArchivedMove};
pub use sgf::{SgfColor, SgfGame, SgfMove};
pub use snapshot::{render_snapshot, ActiveUserLine, FinishedGameLine, LiveGameLine};

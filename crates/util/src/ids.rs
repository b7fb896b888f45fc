use std::fmt;

/// Monotonically increasing game identifier. Allocation is a persistent
/// counter in the live-state database; a round assigns a contiguous
/// block of these to the games it creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct GameId(pub i64);

impl GameId {
    pub const NONE: GameId = GameId(0);

    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    pub fn next(self) -> GameId {
        GameId(self.0 + 1)
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for GameId {
    fn from(value: i64) -> Self {
        GameId(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_is_zero() {
        assert!(GameId::NONE.is_none());
        assert!(!GameId(1).is_none());
    }

    #[test]
    fn next_increments() {
        assert_eq!(GameId(5).next(), GameId(6));
    }
}

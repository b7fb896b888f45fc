//! The pairing algorithm: rating-gap RANGE heuristic, jittered ordering,
//! stride-2 pairing, anchor-vs-anchor pair dropping, and color
//! assignment by prior-game direction.
//!
//! `SKIP = 4`, a floor of 500 widened to the largest rating gap seen
//! every `SKIP`-th player down the sorted waiting list, times 1.5;
//! players are then jittered by `rating + RANGE * U(0,1)` and walked
//! two at a time.

use rand::Rng;
use std::collections::HashSet;

/// A waiting player eligible for pairing.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub name: String,
    pub rating: f64,
}

/// Number of players skipped ahead when probing the rating ladder for
/// gaps (the reference implementation's `SKIP`).
pub const SKIP: usize = 4;

/// Floor RANGE used when the waiting pool is too small to probe a gap.
const MIN_RANGE: f64 = 500.0;

/// Fallback RANGE used when the pool has `SKIP` or fewer players.
const SEEDED_RANGE: f64 = 2000.0;

/// Computes the dynamic pairing RANGE from the current waiting pool's
/// rating distribution: the widest `SKIP`-apart rating gap among waiting
/// players, widened by 1.5x, floored at [`MIN_RANGE`].
pub fn compute_range(waiting: &[Candidate]) -> f64 {
    let mut sorted: Vec<&Candidate> = waiting.iter().collect();
    sorted.sort_by(|a, b| b.rating.partial_cmp(&a.rating).unwrap());

    let len = sorted.len();
    let probe_count = len.saturating_sub(SKIP);

    let mut max_interval = if probe_count == 0 { SEEDED_RANGE } else { 0.0 };
    for i in 0..probe_count {
        let gap = sorted[i].rating - sorted[i + SKIP].rating;
        if gap > max_interval {
            max_interval = gap;
        }
    }

    (max_interval * 1.5).max(MIN_RANGE)
}

/// Jitters each candidate's rating by `RANGE * U(0,1)` and sorts
/// descending, producing the walk order for `pair_up`.
pub fn jittered_order(waiting: &[Candidate], range: f64, rng: &mut impl Rng) -> Vec<Candidate> {
    let mut jittered: Vec<Candidate> =
        waiting.iter().map(|c| Candidate { name: c.name.clone(), rating: c.rating + range * rng.random::<f64>() }).collect();
    jittered.sort_by(|a, b| b.rating.partial_cmp(&a.rating).unwrap());
    jittered
}

/// Walks the jittered order two at a time, dropping anchor-vs-anchor
/// pairs with probability `1 - anchor_match_rate`. A trailing unpaired
/// candidate (odd-length pool) is left out.
pub fn pair_up(order: &[Candidate], anchors: &HashSet<String>, anchor_match_rate: f64, rng: &mut impl Rng) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    let mut it = order.chunks_exact(2);
    for pair in &mut it {
        let (a, b) = (&pair[0], &pair[1]);
        if anchors.contains(&a.name) && anchors.contains(&b.name) {
            let r: f64 = rng.random();
            if r > anchor_match_rate {
                continue;
            }
        }
        pairs.push((a.name.clone(), b.name.clone()));
    }
    pairs
}

/// Chooses colors for a freshly formed pair: whichever direction has
/// fewer prior games between these two names becomes the new
/// assignment, so repeat opponents alternate sides over time.
///
/// `games_as_a_white` is the count of archived games with `a` as white
/// and `b` as black; `games_as_b_white` is the reverse.
pub fn assign_colors<'a>(a: &'a str, b: &'a str, games_as_a_white: i64, games_as_b_white: i64) -> (&'a str, &'a str) {
    if games_as_b_white < games_as_a_white {
        (b, a)
    } else {
        (a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn candidates(ratings: &[f64]) -> Vec<Candidate> {
        ratings.iter().enumerate().map(|(i, r)| Candidate { name: format!("p{i}"), rating: *r }).collect()
    }

    #[test]
    fn small_pools_fall_back_to_the_seeded_range() {
        let pool = candidates(&[2000.0, 1900.0, 1800.0]);
        assert_eq!(compute_range(&pool), SEEDED_RANGE * 1.5);
    }

    #[test]
    fn wide_rating_gaps_widen_the_range_past_the_floor() {
        // 11 players, SKIP=4: a huge gap between the top and 5th player.
        let pool = candidates(&[3000.0, 2900.0, 2800.0, 2700.0, 1000.0, 900.0, 800.0, 700.0, 600.0, 500.0, 400.0]);
        let range = compute_range(&pool);
        assert!(range > MIN_RANGE, "expected a widened range, got {range}");
    }

    #[test]
    fn tight_rating_clusters_use_the_floor() {
        let pool = candidates(&[1800.0, 1799.0, 1798.0, 1797.0, 1796.0, 1795.0]);
        assert_eq!(compute_range(&pool), MIN_RANGE);
    }

    #[test]
    fn pairing_walks_two_at_a_time_and_drops_a_trailing_single() {
        let order = candidates(&[2000.0, 1900.0, 1800.0]);
        let mut rng = StdRng::seed_from_u64(1);
        let pairs = pair_up(&order, &HashSet::new(), 1.0, &mut rng);
        assert_eq!(pairs, vec![("p0".to_string(), "p1".to_string())]);
    }

    #[test]
    fn anchor_match_rate_one_never_drops_anchor_pairs() {
        let order = candidates(&[2000.0, 1900.0]);
        let anchors: HashSet<String> = ["p0".to_string(), "p1".to_string()].into_iter().collect();
        let mut rng = StdRng::seed_from_u64(7);
        let pairs = pair_up(&order, &anchors, 1.0, &mut rng);
        assert_eq!(pairs.len(), 1);
    }

    #[test]
    fn colors_favor_the_direction_with_fewer_prior_games() {
        assert_eq!(assign_colors("alice", "bob", 5, 1), ("bob", "alice"));
        assert_eq!(assign_colors("alice", "bob", 1, 5), ("alice", "bob"));
    }
}

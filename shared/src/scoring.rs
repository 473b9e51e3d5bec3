use std::collections::HashMap;
use serde::{Serialize, Deserialize};
use crate::models::{LeaderboardEntry, WeeklyVote};

/// Points for rank positions 1..=5 on the five-option scale.
pub const DEFAULT_POINTS: [u32; 5] = [5, 3, 2, 1, 0];

/// Maps a 0-based option position to points. Positions past the end score 0.
///
/// The table is pinned to the configured option count; changing the number of
/// options means changing this table in lockstep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointTable(Vec<u32>);

impl Default for PointTable {
    fn default() -> Self {
        Self(DEFAULT_POINTS.to_vec())
    }
}

impl From<Vec<u32>> for PointTable {
    fn from(points: Vec<u32>) -> Self {
        Self(points)
    }
}

impl PointTable {
    pub fn new(points: Vec<u32>) -> Self {
        Self(points)
    }

    pub fn points_for(&self, sort_order: i64) -> u32 {
        usize::try_from(sort_order)
            .ok()
            .and_then(|position| self.0.get(position).copied())
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_non_increasing(&self) -> bool {
        self.0.windows(2).all(|w| w[0] >= w[1])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn from_votes(votes: &[WeeklyVote], table: &PointTable) -> Self {
        let mut totals: HashMap<&str, u32> = HashMap::new();
        for vote in votes {
            *totals.entry(vote.username.as_str()).or_insert(0) += table.points_for(vote.sort_order);
        }

        let mut scored: Vec<(String, u32)> = totals.into_iter()
            .map(|(username, score)| (username.to_owned(), score))
            .collect();
        scored.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        Self { entries: rank_sorted(scored) }
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<LeaderboardEntry> {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Sports-style ("1-2-2-4") ranking over entries already sorted by descending score.
/// Tied scores share a rank; the next lower score takes its 1-based position.
pub fn rank_sorted(sorted: Vec<(String, u32)>) -> Vec<LeaderboardEntry> {
    let mut ranked: Vec<LeaderboardEntry> = Vec::with_capacity(sorted.len());
    for (position, (username, score)) in sorted.into_iter().enumerate() {
        let rank = match ranked.last() {
            Some(prev) if prev.score == score => prev.rank,
            _ => position + 1,
        };
        ranked.push(LeaderboardEntry { rank, username, score });
    }
    ranked
}

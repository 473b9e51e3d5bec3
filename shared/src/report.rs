use std::fmt;
use serde::{Serialize, Deserialize};
use crate::models::OptionTally;
use crate::scoring::Leaderboard;

pub const NO_MONTHLY_VOTES: &str = "No votes recorded this month for this channel.";
pub const NO_WEEKLY_VOTES: &str = "No votes recorded this week for this channel.";

/// Per-option vote counts over the trailing 30 days, in option order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyReport {
    pub tallies: Vec<OptionTally>,
}

impl MonthlyReport {
    pub fn new(tallies: Vec<OptionTally>) -> Self {
        Self { tallies }
    }

    pub fn is_empty(&self) -> bool {
        self.tallies.is_empty()
    }

    pub fn total_votes(&self) -> i64 {
        self.tallies.iter().map(|t| t.votes).sum()
    }
}

impl fmt::Display for MonthlyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str(NO_MONTHLY_VOTES);
        }
        write!(f, "📊 Monthly poll stats for this channel:")?;
        for tally in &self.tallies {
            write!(f, "\n{}: {} votes", tally.text, tally.votes)?;
        }
        Ok(())
    }
}

impl fmt::Display for Leaderboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str(NO_WEEKLY_VOTES);
        }
        write!(f, "🏆 Weekly leaderboard:")?;
        for entry in self.entries() {
            write!(f, "\n{}. {} - {}p", entry.rank, entry.username, entry.score)?;
        }
        Ok(())
    }
}

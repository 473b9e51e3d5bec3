pub mod error;
pub mod models;
pub mod report;
pub mod scoring;
pub mod validation;

pub use error::{Error, ErrorCode};
pub use models::*;
pub use report::{MonthlyReport, NO_MONTHLY_VOTES, NO_WEEKLY_VOTES};
pub use scoring::{Leaderboard, PointTable, DEFAULT_POINTS};
pub use validation::ValidationError;

#[cfg(test)]
mod tests;

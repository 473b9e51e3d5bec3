pub mod catchers;
pub mod config;
pub mod db;
pub mod error;
pub mod ledger;
pub mod reconciler;
pub mod registry;
pub mod routes;
pub mod scheduler;
pub mod stats;
pub mod store;
pub mod telegram;
pub mod transport;
pub mod updates;
pub mod utils;
pub use shared::{models::*, report::*, scoring::*};

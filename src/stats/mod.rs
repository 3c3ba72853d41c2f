//! Append-only prediction log and streaming aggregation

pub mod log;
pub mod aggregate;
pub mod export;

#[cfg(test)]
mod tests;

pub use aggregate::{summarize, StatisticsSummary};
pub use log::EventLog;

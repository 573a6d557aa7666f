mod agent;
mod collector;
mod retry;

pub use collector::{flatten, ProposalCollector};

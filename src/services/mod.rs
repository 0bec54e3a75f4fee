pub mod aggregator;
pub mod providers;
pub mod ranking;
pub mod search;

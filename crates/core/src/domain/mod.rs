pub mod contract;
pub mod pulse;

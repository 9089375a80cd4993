pub mod contract;
pub mod signal;

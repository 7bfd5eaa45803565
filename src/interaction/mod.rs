pub mod statistics;
pub mod volume;

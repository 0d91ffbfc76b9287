pub mod backup;
pub mod core;
pub mod payments;
pub mod progress;
pub mod roster;
pub mod schedule;

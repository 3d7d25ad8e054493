pub mod schedule;
pub mod verify;

pub mod datetime;
pub mod usecase;

pub mod reducer;
pub mod statistics;

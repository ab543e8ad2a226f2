pub mod range;
pub mod row;
pub mod settings;
pub mod trace;

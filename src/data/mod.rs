pub mod export;
pub mod loader;
pub mod parser;
pub mod trace_name;

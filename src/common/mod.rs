pub mod config;
pub mod errors;
pub mod fs;
pub mod json;

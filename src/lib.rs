pub mod cli;
pub mod commands;
pub mod common;
pub mod mdn;
pub mod sheet;
pub mod xlsx;

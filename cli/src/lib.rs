//! Command-line driver for the checking core.

pub mod check_cmd;

pub use check_cmd::CheckCli;

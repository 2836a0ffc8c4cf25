//! Command-line interface for operating the guard

pub mod commands;

//! Subcommand handlers.  Each one turns parsed arguments into adapter wiring
//! and core calls, then prints the outcome.

pub mod completions;
pub mod config;
pub mod init;
pub mod list;
pub mod new;

//! # CLI
//!
//! The command-line client of the library. This is the only place that
//! parses arguments, prints to stdout and decides the exit code.
//!
//! Every job command first loads `<work_dir>/jobslice.json`, then layers the
//! flags given on the command line over it. `prepare` and `run` save the
//! merged result, so later commands can be run without repeating flags:
//!
//! ```text
//! jobslice -C job prepare -q db.fa -t nr -c 'blastp -query {query} -db {target}'
//! jobslice -C job submit --sge '-q long.q'
//! jobslice -C job status
//! ```
//!
//! ## Module Structure
//!
//! - `setup`: clap definitions
//! - `commands`: dispatch and per-command handlers
//! - `render`: colored output of messages and reports

mod commands;
mod render;
pub mod setup;

pub use commands::run;

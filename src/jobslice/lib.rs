//! # Jobslice Architecture
//!
//! Jobslice turns one large flatfile database (FASTA, EMBL/UniProt style
//! entries) into thousands of small work units and runs a command over each of
//! them as a scheduler array job.
//!
//! A job lives in a **work directory**:
//!
//! ```text
//! work/
//! ├── jobslice.json     saved configuration
//! ├── manifest.tsv      "<index>\t<identifier>" per extracted item
//! ├── worker.sh         generated array task script
//! ├── input/<slice>/<index>
//! ├── output/<slice>/<index>
//! ├── error/<slice>/<index>
//! └── log/              scheduler stdout/stderr
//! ```
//!
//! Item `i` lives in slice `(i - 1) / slice_size + 1`, so no directory ever
//! holds more than `slice_size` files.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (main.rs + cli/)                                 │
//! │  - clap parsing, config loading, colored output, exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - JobApi<L: Launcher> facade                               │
//! │  - Returns structured CmdResult values                      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - prepare = extract + worker script                        │
//! │  - submit, status, clear/clean/distclean                    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Building blocks                                            │
//! │  - source/ (RecordSource), manifest, slicer, script,        │
//! │    launcher (Launcher trait)                                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! From `api.rs` inward nothing prints to stdout or exits the process. Record
//! sources and launchers are traits, so the whole pipeline runs in tests
//! against in-memory records and a recording launcher.
//!
//! ## Module Overview
//!
//! - [`api`]: Facade used by the CLI
//! - [`commands`]: One module per operation
//! - [`config`]: `JobConfig`, persisted as `jobslice.json`
//! - [`error`]: `JobError` and the crate `Result`
//! - [`launcher`]: Runs the scheduler submit command
//! - [`logging`]: `tracing` subscriber setup
//! - [`manifest`]: Append-only item log and extraction marker
//! - [`script`]: Worker script rendering and placeholder rewriting
//! - [`slicer`]: Index to slice directory mapping
//! - [`source`]: Record readers

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod launcher;
pub mod logging;
pub mod manifest;
pub mod script;
pub mod slicer;
pub mod source;

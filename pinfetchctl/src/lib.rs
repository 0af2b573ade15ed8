//! Library part of the `pinfetchctl` utility.
//!
//! The binary is a scheduled batch job: it reads the run configuration from
//! the data directory, submits one asynchronous report request per account
//! (or per stored template reference), polls until every request settles,
//! downloads the finished payloads and merges them into one output table with
//! its manifest sidecar.
//!
//! The access layer (client construction, pagination, report endpoints) lives
//! in the `pinfetch-sources` crate; date handling and logging come from
//! `pinfetch-common`.
//!

pub use cli::*;
pub use config::*;
pub use error::*;
pub use fetch::*;
pub use jobs::*;
pub use manifest::*;
pub use merge::*;
pub use poll::*;
pub use run::*;

mod cli;
mod config;
mod error;
mod fetch;
mod jobs;
mod manifest;
mod merge;
mod poll;
mod run;

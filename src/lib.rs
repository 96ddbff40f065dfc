// Library root
// -----------
// Client SDK for the Coriolis migration API plus the command flows the
// `coriolis` binary runs on top of it.
//
// Module responsibilities:
// - `api`: request type, the `Transport` seam and its reqwest implementation.
// - `client`: owns a transport and hands out one manager per resource.
// - `managers`: path building and response unwrapping per collection.
// - `resource`: generic JSON-backed record with lazy reloading.
// - `params`, `mappings`, `schedule`: argument encoding and validation shared
//   by the managers and the CLI.
// - `format`: plain text projections for terminal output.
// - `config`: layered settings and token persistence.
// - `ui`: clap command tree and the flows behind each command.
pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod format;
pub mod managers;
pub mod mappings;
pub mod params;
pub mod resource;
pub mod schedule;
pub mod ui;

pub use client::Client;
pub use config::Config;
pub use error::{Error, Result};
pub use resource::Resource;

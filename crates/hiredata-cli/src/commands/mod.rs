//! CLI command implementations
//!
//! Each subcommand has its own module with a `run` function that talks to
//! the server through [`ApiClient`](crate::api::ApiClient) and prints the
//! result.

pub mod backup;
pub mod report;
pub mod restore;
pub mod status;
pub mod upload;

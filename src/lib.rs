pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod job;
pub mod request;

pub use error::RequestError;
pub use request::{DeleteJobRequest, OutcomeStatus, Request, RequestOutcome};

#[cfg(test)]
pub mod testing;

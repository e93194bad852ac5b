#![allow(clippy::missing_errors_doc, clippy::must_use_candidate)]

pub mod classify;
pub mod client;
pub mod error;

pub use classify::{ErrorClassifier, UpstreamResponse};
pub use client::{UpstreamClient, UpstreamRequest};
pub use error::{ExecutorError, FailureKind, UpstreamFailure};

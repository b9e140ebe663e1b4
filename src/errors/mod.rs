//! Structured error types for graphctl
//!
//! Input-shape problems (bad paths, bad JSON, unreadable files) are
//! reported through [`InputError`] before any request is issued.
//! Failures raised by the remote API travel as [`RequestError`],
//! carrying the server's structured error list verbatim.

pub mod input;
pub mod request;

pub use input::InputError;
pub use request::{RequestError, ServerError};

/// Result type alias for input-document construction.
pub type InputResult<T> = Result<T, InputError>;

/// Result type alias for request execution.
pub type RequestResult<T> = Result<T, RequestError>;

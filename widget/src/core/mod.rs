//! # Core Module
//!
//! Cross-cutting concerns for the widget messaging core: configuration,
//! error types, and the service traits behind which the two transports sit.

pub mod config;
pub mod error;
pub mod service;

pub use config::ClientConfig;
pub use error::{ChatError, RequestError, Result, SendError};
pub use service::{ResponderApi, StreamFactory, StreamLink};

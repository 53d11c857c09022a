//! The `utils` module provides shared definitions used across the `meshmq`
//! gateway: the error taxonomy and logging initialization.

pub mod error;
pub mod logging;

pub use error::{BrokerError, CodecError, GatewayError, RadioError};

#[cfg(test)]
mod tests;

//! Error types for the gateway.
//!
//! Construction and lifecycle failures are reported as [`GatewayError`].
//! Each transport has its own error type so callers can tell a broker problem
//! from a radio problem, and both convert into `GatewayError` with `?`.

use thiserror::Error;

/// Failures surfaced by the gateway session and its startup sequence.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// A construction precondition was violated.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// `connect` was called while the broker client was already connected.
    #[error("broker client is already connected")]
    AlreadyConnected,

    /// The session was disconnected and cannot be reused.
    #[error("gateway session has been disconnected")]
    SessionClosed,

    #[error("broker: {0}")]
    Broker(#[from] BrokerError),

    #[error("radio: {0}")]
    Radio(#[from] RadioError),

    #[error("configuration: {0}")]
    Config(#[from] config::ConfigError),
}

/// Failures reported by a [`BrokerClient`](crate::transport::BrokerClient).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BrokerError {
    #[error("not connected to broker")]
    NotConnected,

    #[error("connect handshake failed: {0}")]
    Handshake(String),

    #[error("publish failed: {0}")]
    Publish(String),

    #[error("subscribe failed: {0}")]
    Subscribe(String),

    #[error("disconnect failed: {0}")]
    Disconnect(String),
}

/// Failures reported by a [`RadioLink`](crate::radio::RadioLink).
#[derive(Debug, Error)]
pub enum RadioError {
    #[error("radio link is not open")]
    NotOpen,

    #[error("radio link closed while waiting for a response")]
    Closed,

    #[error("no response from radio within timeout")]
    Timeout,

    /// Every frame id is taken by a request still awaiting its response.
    #[error("too many radio requests in flight")]
    Busy,

    #[error("radio i/o: {0}")]
    Io(#[from] std::io::Error),

    #[error("radio frame encoding: {0}")]
    Codec(#[from] serde_json::Error),

    #[error(transparent)]
    Address(#[from] CodecError),

    #[error("unexpected radio response: {0}")]
    UnexpectedResponse(String),
}

/// Malformed addresses or payloads.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("invalid node address {0:?}")]
    InvalidAddress(String),

    #[error("AT command must be two alphanumeric characters, got {0:?}")]
    InvalidCommand(String),

    #[error("AT parameter must be an even-length hex string, got {0:?}")]
    InvalidParameter(String),

    #[error("payload is not valid UTF-8")]
    NotUtf8,
}

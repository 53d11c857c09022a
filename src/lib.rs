//! # meshmq
//!
//! `meshmq` is a gateway between a local radio mesh and an MQTT broker. Radio
//! traffic is published on per-gateway, per-node topics, and messages sent to
//! the gateway's request topics are forwarded to the radio.
//!
//! ## Core Modules
//!
//! - `session`: the gateway session coordinating both transports, its
//!   lifecycle and availability announcements.
//! - `topic`: the topic naming scheme.
//! - `radio`: the radio link capability and a UDP implementation.
//! - `transport`: the broker client capability and an MQTT implementation.
//! - `bridge`: listeners and payload codecs that move traffic across.
//! - `config`: settings loading.
//! - `utils`: error types and logging.

pub mod bridge;
pub mod config;
pub mod radio;
pub mod session;
pub mod topic;
pub mod transport;
pub mod utils;

#[cfg(test)]
mod testing;

pub use session::GatewaySession;
pub use utils::GatewayError;

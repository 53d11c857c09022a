//! Topic naming
//!
//! Every topic the gateway publishes or subscribes to is derived from the
//! (root topic, gateway address) pair held by a [`TopicScheme`]. The scheme
//! is pure and immutable, so it can be shared freely between listeners.

pub mod scheme;

pub use scheme::{InboundRoute, TopicKind, TopicScheme};

#[cfg(test)]
mod tests;

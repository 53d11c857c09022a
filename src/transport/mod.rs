//! The `transport` module is responsible for the gateway's side of the
//! publish/subscribe broker.
//!
//! [`BrokerClient`] is the capability the session drives: connect with a
//! last-will, fire-and-forget publishes with a completion callback, and
//! subscriptions whose messages are handed to a single [`InboundListener`].
//! [`MqttBrokerClient`] implements it on top of `rumqttc`.

pub mod message;
pub mod mqtt;

use std::sync::Arc;

use async_trait::async_trait;

use crate::utils::BrokerError;

pub use message::{ConnectOptions, Credentials, DeliveryCallback, InboundMessage, LastWill, QoS};
pub use mqtt::MqttBrokerClient;

/// Receives every message arriving on the client's subscriptions.
#[async_trait]
pub trait InboundListener: Send + Sync {
    async fn message_arrived(&self, message: InboundMessage);
}

#[async_trait]
pub trait BrokerClient: Send + Sync {
    fn client_id(&self) -> &str;

    fn is_connected(&self) -> bool;

    /// Perform the connect handshake. Resolves once the broker has accepted
    /// or refused the connection.
    async fn connect(&self, options: ConnectOptions) -> Result<(), BrokerError>;

    async fn disconnect(&self) -> Result<(), BrokerError>;

    /// Hand a message to the client without waiting for delivery. The
    /// outcome is reported through `on_complete`.
    fn publish(
        &self,
        topic: &str,
        payload: Vec<u8>,
        qos: QoS,
        retained: bool,
        on_complete: DeliveryCallback,
    );

    async fn subscribe(&self, filters: &[(String, QoS)]) -> Result<(), BrokerError>;

    fn set_inbound_listener(&self, listener: Arc<dyn InboundListener>);
}

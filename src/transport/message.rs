//! Broker-side message and option types
//!
//! These types are independent of the MQTT library so that the session and
//! its listeners can be exercised against any [`BrokerClient`] implementation.
//!
//! [`BrokerClient`]: super::BrokerClient

use std::fmt;

use crate::utils::{BrokerError, GatewayError};

/// Delivery guarantee for a publish or subscription.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QoS {
    #[default]
    AtMostOnce,
    AtLeastOnce,
    ExactlyOnce,
}

impl TryFrom<u8> for QoS {
    type Error = GatewayError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            0 => Ok(QoS::AtMostOnce),
            1 => Ok(QoS::AtLeastOnce),
            2 => Ok(QoS::ExactlyOnce),
            other => Err(GatewayError::InvalidArgument(format!(
                "QoS must be 0, 1 or 2, got {other}"
            ))),
        }
    }
}

impl From<QoS> for rumqttc::QoS {
    fn from(qos: QoS) -> Self {
        match qos {
            QoS::AtMostOnce => rumqttc::QoS::AtMostOnce,
            QoS::AtLeastOnce => rumqttc::QoS::AtLeastOnce,
            QoS::ExactlyOnce => rumqttc::QoS::ExactlyOnce,
        }
    }
}

/// Broker login. Always a complete pair; see
/// [`GatewaySessionBuilder::credentials`](crate::session::GatewaySessionBuilder::credentials).
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Message the broker publishes on the client's behalf if the connection is
/// lost without a clean disconnect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastWill {
    pub topic: String,
    pub payload: Vec<u8>,
    pub qos: QoS,
    pub retained: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectOptions {
    /// When `false`, subscriptions and queued messages survive reconnection.
    pub clean_session: bool,
    pub last_will: Option<LastWill>,
    pub credentials: Option<Credentials>,
}

/// A message received from the broker on one of the subscribed topics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: String,
    pub payload: Vec<u8>,
    pub retained: bool,
}

/// Completion callback for [`BrokerClient::publish`](super::BrokerClient::publish).
/// Invoked exactly once, possibly on another task.
pub type DeliveryCallback = Box<dyn FnOnce(Result<(), BrokerError>) + Send + 'static>;

use std::sync::Arc;
use std::sync::atomic::AtomicU8;

use tracing::info;

use super::observer::{DeliveryObserver, TracingObserver};
use super::{GatewaySession, SessionPhase};
use crate::radio::RadioLink;
use crate::topic::TopicScheme;
use crate::transport::{BrokerClient, Credentials, QoS};
use crate::utils::GatewayError;

/// Collects the session's collaborators and validates them in [`build`].
///
/// [`build`]: GatewaySessionBuilder::build
#[derive(Default)]
pub struct GatewaySessionBuilder {
    radio: Option<Arc<dyn RadioLink>>,
    broker: Option<Arc<dyn BrokerClient>>,
    root_topic: String,
    username: Option<String>,
    password: Option<String>,
    qos: QoS,
    observer: Option<Arc<dyn DeliveryObserver>>,
}

impl GatewaySessionBuilder {
    /// An already-open radio link. The session never opens it.
    pub fn radio(mut self, radio: Arc<dyn RadioLink>) -> Self {
        self.radio = Some(radio);
        self
    }

    /// A broker client carrying a non-empty client id.
    pub fn broker(mut self, broker: Arc<dyn BrokerClient>) -> Self {
        self.broker = Some(broker);
        self
    }

    /// Prefix for every topic; may be empty.
    pub fn root_topic(mut self, root_topic: impl Into<String>) -> Self {
        self.root_topic = root_topic.into();
        self
    }

    /// Broker login. Both halves must be given, or neither.
    pub fn credentials(mut self, username: Option<String>, password: Option<String>) -> Self {
        self.username = username;
        self.password = password;
        self
    }

    /// QoS for bridged radio traffic. Availability messages always use QoS 0.
    pub fn qos(mut self, qos: QoS) -> Self {
        self.qos = qos;
        self
    }

    pub fn observer(mut self, observer: Arc<dyn DeliveryObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn build(self) -> Result<GatewaySession, GatewayError> {
        let radio = self
            .radio
            .ok_or_else(|| GatewayError::InvalidArgument("radio link is required".into()))?;
        let broker = self
            .broker
            .ok_or_else(|| GatewayError::InvalidArgument("broker client is required".into()))?;

        if !radio.is_open() {
            return Err(GatewayError::InvalidArgument("radio link is not open".into()));
        }
        if broker.client_id().is_empty() {
            return Err(GatewayError::InvalidArgument(
                "broker client requires a client id".into(),
            ));
        }

        let credentials = match (self.username, self.password) {
            (Some(username), Some(password)) => Some(Credentials { username, password }),
            (None, None) => None,
            _ => {
                return Err(GatewayError::InvalidArgument(
                    "username and password must both be given or both omitted".into(),
                ));
            }
        };

        let topics = TopicScheme::new(&self.root_topic, radio.local_address());
        info!(
            gateway = %topics.gateway(),
            base = topics.base(),
            client_id = broker.client_id(),
            "Gateway session created"
        );

        Ok(GatewaySession {
            radio,
            broker,
            topics,
            credentials,
            qos: self.qos,
            observer: self.observer.unwrap_or_else(|| Arc::new(TracingObserver)),
            phase: AtomicU8::new(SessionPhase::Constructed as u8),
        })
    }
}

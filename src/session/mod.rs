//! Gateway session
//!
//! A [`GatewaySession`] coordinates one radio link and one broker client:
//! - derives the gateway's [`TopicScheme`] once, at construction
//! - connects to the broker with an "offline" last will and announces
//!   "online" once the handshake completes
//! - publishes radio traffic without blocking the radio side
//! - closes the radio and announces "offline" on disconnect
//!
//! Every listener receives the same `Arc<GatewaySession>` and reaches the
//! transports only through it, so all code paths share one topic scope and
//! one availability status.
//!
//! Lifecycle is single-use: `Constructed -> Connecting -> Connected ->
//! Disconnected`. A failed handshake returns the session to `Constructed`.
//! `connect` and `disconnect` suspend the caller until the broker handshake
//! completes; timeouts are whatever the broker client imposes.
//!
//! Concurrency notes:
//! - methods may be called concurrently from radio and broker tasks
//! - the session holds no lock; it relies on the transports being internally
//!   synchronized
//! - no ordering is guaranteed between publishes issued from different tasks

pub mod builder;
pub mod observer;

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use tracing::{info, trace, warn};

use crate::radio::{DataListener, RadioFrame, RadioLink, SampleListener};
use crate::topic::TopicScheme;
use crate::transport::{BrokerClient, ConnectOptions, Credentials, InboundListener, LastWill, QoS};
use crate::utils::{BrokerError, GatewayError, RadioError};

pub use builder::GatewaySessionBuilder;
pub use observer::{DeliveryObserver, TracingObserver};

/// Availability payload published once connected.
pub const ONLINE: &[u8] = b"1";
/// Availability payload for clean shutdown and the broker last will.
pub const OFFLINE: &[u8] = b"0";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SessionPhase {
    Constructed = 0,
    Connecting = 1,
    Connected = 2,
    Disconnected = 3,
}

impl SessionPhase {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => SessionPhase::Connecting,
            2 => SessionPhase::Connected,
            3 => SessionPhase::Disconnected,
            _ => SessionPhase::Constructed,
        }
    }
}

pub struct GatewaySession {
    radio: Arc<dyn RadioLink>,
    broker: Arc<dyn BrokerClient>,
    topics: TopicScheme,
    credentials: Option<Credentials>,
    qos: QoS,
    observer: Arc<dyn DeliveryObserver>,
    phase: AtomicU8,
}

impl GatewaySession {
    pub fn builder() -> GatewaySessionBuilder {
        GatewaySessionBuilder::default()
    }

    pub fn topics(&self) -> &TopicScheme {
        &self.topics
    }

    pub fn phase(&self) -> SessionPhase {
        SessionPhase::from_u8(self.phase.load(Ordering::SeqCst))
    }

    fn set_phase(&self, phase: SessionPhase) {
        self.phase.store(phase as u8, Ordering::SeqCst);
    }

    /// Connect to the broker and announce this gateway as online.
    ///
    /// Returns once the broker has accepted the connection. The online
    /// announcement is handed off but not awaited.
    pub async fn connect(&self) -> Result<(), GatewayError> {
        // claim the handshake so concurrent callers cannot both connect
        if let Err(current) = self.phase.compare_exchange(
            SessionPhase::Constructed as u8,
            SessionPhase::Connecting as u8,
            Ordering::SeqCst,
            Ordering::SeqCst,
        ) {
            return Err(match SessionPhase::from_u8(current) {
                SessionPhase::Disconnected => GatewayError::SessionClosed,
                _ => GatewayError::AlreadyConnected,
            });
        }
        if self.broker.is_connected() {
            self.set_phase(SessionPhase::Constructed);
            return Err(GatewayError::AlreadyConnected);
        }

        let status = self.topics.availability(false, None);
        let options = ConnectOptions {
            clean_session: false,
            last_will: Some(LastWill {
                topic: status.clone(),
                payload: OFFLINE.to_vec(),
                qos: QoS::AtMostOnce,
                retained: true,
            }),
            credentials: self.credentials.clone(),
        };

        if let Err(e) = self.broker.connect(options).await {
            self.set_phase(SessionPhase::Constructed);
            return Err(e.into());
        }
        self.set_phase(SessionPhase::Connected);
        info!(topic = %status, "Gateway online");

        self.dispatch(&status, ONLINE.to_vec(), QoS::AtMostOnce, true);
        Ok(())
    }

    /// Close the radio, announce offline and disconnect from the broker.
    ///
    /// The radio stays closed even if the broker handshake fails, and the
    /// session cannot be connected again either way.
    pub async fn disconnect(&self) -> Result<(), GatewayError> {
        if self.phase() == SessionPhase::Disconnected {
            return Err(GatewayError::SessionClosed);
        }

        if let Err(e) = self.radio.close().await {
            warn!(error = %e, "Radio close failed");
        }

        let status = self.topics.availability(false, None);
        self.dispatch(&status, OFFLINE.to_vec(), QoS::AtMostOnce, true);

        let result = self.broker.disconnect().await;
        self.set_phase(SessionPhase::Disconnected);
        result?;

        info!(topic = %status, "Gateway offline");
        Ok(())
    }

    /// Publish `payload` on `topic` without waiting for delivery.
    ///
    /// Failures, including publishing while not connected, are reported to
    /// the session's [`DeliveryObserver`] and never to the caller.
    pub fn publish(&self, topic: &str, payload: impl Into<Vec<u8>>) {
        self.dispatch(topic, payload.into(), self.qos, false);
    }

    /// Like [`publish`](Self::publish), but the broker retains the message.
    pub fn publish_retained(&self, topic: &str, payload: impl Into<Vec<u8>>) {
        self.dispatch(topic, payload.into(), self.qos, true);
    }

    fn dispatch(&self, topic: &str, payload: Vec<u8>, qos: QoS, retained: bool) {
        if self.phase() != SessionPhase::Connected || !self.broker.is_connected() {
            self.observer.delivery_failed(topic, &BrokerError::NotConnected);
            return;
        }

        let observer = self.observer.clone();
        let owned_topic = topic.to_string();
        self.broker.publish(
            topic,
            payload,
            qos,
            retained,
            Box::new(move |result: Result<(), BrokerError>| match result {
                Ok(()) => trace!(topic = %owned_topic, "Message delivered"),
                Err(e) => observer.delivery_failed(&owned_topic, &e),
            }),
        );
    }

    /// Send a frame to the radio, resolving to its response if it has one.
    pub async fn send(&self, frame: RadioFrame) -> Result<Option<RadioFrame>, RadioError> {
        self.radio.send(frame).await
    }

    pub fn register_data_listener(&self, listener: Arc<dyn DataListener>) {
        self.radio.register_data_listener(listener);
    }

    pub fn register_sample_listener(&self, listener: Arc<dyn SampleListener>) {
        self.radio.register_sample_listener(listener);
    }

    pub fn set_inbound_listener(&self, listener: Arc<dyn InboundListener>) {
        self.broker.set_inbound_listener(listener);
    }

    /// Subscribe to this gateway's request topics.
    pub async fn subscribe_inbound(&self) -> Result<(), GatewayError> {
        let filters: Vec<(String, QoS)> = self
            .topics
            .subscriptions()
            .into_iter()
            .map(|topic| (topic, self.qos))
            .collect();
        self.broker.subscribe(&filters).await?;
        info!(filters = ?filters.iter().map(|(t, _)| t).collect::<Vec<_>>(), "Subscribed");
        Ok(())
    }
}

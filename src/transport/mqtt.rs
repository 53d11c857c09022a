//! MQTT broker client
//!
//! Wraps `rumqttc::AsyncClient`. Responsibilities:
//! - build `MqttOptions` from the configured endpoint and the per-connect
//!   [`ConnectOptions`] (clean session, last will, credentials)
//! - drive the event loop until the broker's CONNACK, then hand the event
//!   loop to a background task that forwards inbound publishes
//! - enqueue publishes without waiting and report the outcome to the caller's
//!   callback
//!
//! Publishes are enqueued with `try_publish`, so the callback fires once the
//! request has been handed to the event loop. A full request queue or a dead
//! event loop is reported as a failure. Enqueue order is preserved, which
//! keeps a publish issued just before `disconnect` ahead of the DISCONNECT.
//!
//! The event loop is not polled again after a connection error: `rumqttc`
//! would reconnect on the next poll, and reconnection policy belongs to the
//! application.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use rumqttc::{
    AsyncClient, ConnectReturnCode, Event, EventLoop, MqttOptions, Outgoing, Packet,
    SubscribeFilter,
};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{BrokerClient, ConnectOptions, DeliveryCallback, InboundListener, InboundMessage, QoS};
use crate::config::BrokerSettings;
use crate::utils::BrokerError;

const REQUEST_CAPACITY: usize = 64;

type SharedListener = Arc<RwLock<Option<Arc<dyn InboundListener>>>>;

pub struct MqttBrokerClient {
    client_id: String,
    host: String,
    port: u16,
    keep_alive: Duration,
    connected: Arc<AtomicBool>,
    client: Mutex<Option<AsyncClient>>,
    event_loop: Mutex<Option<JoinHandle<()>>>,
    inbound: SharedListener,
}

impl MqttBrokerClient {
    pub fn new(settings: &BrokerSettings) -> Self {
        Self {
            client_id: settings.client_id.clone(),
            host: settings.host.clone(),
            port: settings.port,
            keep_alive: Duration::from_secs(settings.keep_alive_secs),
            connected: Arc::new(AtomicBool::new(false)),
            client: Mutex::new(None),
            event_loop: Mutex::new(None),
            inbound: Arc::new(RwLock::new(None)),
        }
    }

    fn mqtt_options(&self, options: ConnectOptions) -> MqttOptions {
        let mut mqtt_opts = MqttOptions::new(self.client_id.clone(), self.host.clone(), self.port);
        mqtt_opts.set_keep_alive(self.keep_alive);
        mqtt_opts.set_clean_session(options.clean_session);

        if let Some(will) = options.last_will {
            mqtt_opts.set_last_will(rumqttc::LastWill::new(
                will.topic,
                will.payload,
                will.qos.into(),
                will.retained,
            ));
        }

        if let Some(credentials) = options.credentials {
            mqtt_opts.set_credentials(credentials.username, credentials.password);
        }

        mqtt_opts
    }

    fn current_client(&self) -> Option<AsyncClient> {
        self.client.lock().clone()
    }
}

#[async_trait]
impl BrokerClient for MqttBrokerClient {
    fn client_id(&self) -> &str {
        &self.client_id
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn connect(&self, options: ConnectOptions) -> Result<(), BrokerError> {
        let (client, mut event_loop) =
            AsyncClient::new(self.mqtt_options(options), REQUEST_CAPACITY);

        loop {
            match event_loop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                    if ack.code == ConnectReturnCode::Success {
                        break;
                    }
                    return Err(BrokerError::Handshake(format!("{:?}", ack.code)));
                }
                Ok(event) => debug!(?event, "MQTT event before CONNACK"),
                Err(e) => return Err(BrokerError::Handshake(e.to_string())),
            }
        }

        info!(
            client_id = %self.client_id,
            host = %self.host,
            port = self.port,
            "Connected to MQTT broker"
        );

        self.connected.store(true, Ordering::SeqCst);
        *self.client.lock() = Some(client);

        let handle = tokio::spawn(run_event_loop(
            event_loop,
            self.connected.clone(),
            self.inbound.clone(),
        ));
        *self.event_loop.lock() = Some(handle);

        Ok(())
    }

    async fn disconnect(&self) -> Result<(), BrokerError> {
        let client = self.client.lock().take().ok_or(BrokerError::NotConnected)?;

        client
            .disconnect()
            .await
            .map_err(|e| BrokerError::Disconnect(e.to_string()))?;

        let handle = self.event_loop.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(error = %e, "MQTT event loop task failed");
            }
        }

        self.connected.store(false, Ordering::SeqCst);
        info!(client_id = %self.client_id, "Disconnected from MQTT broker");
        Ok(())
    }

    fn publish(
        &self,
        topic: &str,
        payload: Vec<u8>,
        qos: QoS,
        retained: bool,
        on_complete: DeliveryCallback,
    ) {
        let result = match self.current_client() {
            Some(client) => client
                .try_publish(topic, qos.into(), retained, payload)
                .map_err(|e| BrokerError::Publish(e.to_string())),
            None => Err(BrokerError::NotConnected),
        };
        on_complete(result);
    }

    async fn subscribe(&self, filters: &[(String, QoS)]) -> Result<(), BrokerError> {
        let client = self.current_client().ok_or(BrokerError::NotConnected)?;
        let filters: Vec<SubscribeFilter> = filters
            .iter()
            .map(|(path, qos)| SubscribeFilter::new(path.clone(), (*qos).into()))
            .collect();

        client
            .subscribe_many(filters)
            .await
            .map_err(|e| BrokerError::Subscribe(e.to_string()))
    }

    fn set_inbound_listener(&self, listener: Arc<dyn InboundListener>) {
        *self.inbound.write() = Some(listener);
    }
}

async fn run_event_loop(
    mut event_loop: EventLoop,
    connected: Arc<AtomicBool>,
    inbound: SharedListener,
) {
    loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                let listener = inbound.read().clone();
                let Some(listener) = listener else {
                    debug!(topic = %publish.topic, "No inbound listener, dropping message");
                    continue;
                };
                let message = InboundMessage {
                    topic: publish.topic,
                    payload: publish.payload.to_vec(),
                    retained: publish.retain,
                };
                // listeners may wait on the radio; keep polling meanwhile
                tokio::spawn(async move { listener.message_arrived(message).await });
            }
            Ok(Event::Outgoing(Outgoing::Disconnect)) => break,
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, "MQTT connection lost");
                break;
            }
        }
    }
    connected.store(false, Ordering::SeqCst);
}

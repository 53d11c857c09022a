//! Test doubles for the radio link and broker client.
//!
//! Both record every call into a shared [`Journal`] so tests can assert on
//! the order of operations across the two transports.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::radio::{DataListener, IoSample, NodeAddress, RadioFrame, RadioLink, SampleListener};
use crate::session::{DeliveryObserver, GatewaySession};
use crate::transport::{
    BrokerClient, ConnectOptions, DeliveryCallback, InboundListener, InboundMessage, QoS,
};
use crate::utils::{BrokerError, RadioError};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    RadioClose,
    RadioSend(RadioFrame),
    Connect(ConnectOptions),
    Publish {
        topic: String,
        payload: Vec<u8>,
        qos: QoS,
        retained: bool,
    },
    Subscribe(Vec<(String, QoS)>),
    Disconnect,
}

#[derive(Debug, Default)]
pub struct Journal(Mutex<Vec<Call>>);

impl Journal {
    pub fn record(&self, call: Call) {
        self.0.lock().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().clone()
    }

    pub fn publishes(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Publish { .. }))
            .collect()
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }
}

pub struct MockRadio {
    address: NodeAddress,
    open: AtomicBool,
    journal: Arc<Journal>,
    responses: Mutex<VecDeque<Result<Option<RadioFrame>, RadioError>>>,
    data_listeners: Mutex<Vec<Arc<dyn DataListener>>>,
    sample_listeners: Mutex<Vec<Arc<dyn SampleListener>>>,
}

impl MockRadio {
    pub fn new(address: &str, open: bool, journal: Arc<Journal>) -> Self {
        Self {
            address: address.parse().unwrap(),
            open: AtomicBool::new(open),
            journal,
            responses: Mutex::new(VecDeque::new()),
            data_listeners: Mutex::new(Vec::new()),
            sample_listeners: Mutex::new(Vec::new()),
        }
    }

    /// Queue the result of the next `send`. Sends beyond the queue resolve
    /// to `Ok(None)`.
    pub fn respond_with(&self, response: Result<Option<RadioFrame>, RadioError>) {
        self.responses.lock().push_back(response);
    }

    pub fn emit_data(&self, node: &NodeAddress, payload: &[u8]) {
        for listener in self.data_listeners.lock().iter() {
            listener.data_received(node, payload);
        }
    }

    pub fn emit_sample(&self, node: &NodeAddress, sample: &IoSample) {
        for listener in self.sample_listeners.lock().iter() {
            listener.sample_received(node, sample);
        }
    }

    pub fn listener_counts(&self) -> (usize, usize) {
        (
            self.data_listeners.lock().len(),
            self.sample_listeners.lock().len(),
        )
    }
}

#[async_trait]
impl RadioLink for MockRadio {
    fn local_address(&self) -> NodeAddress {
        self.address.clone()
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    async fn close(&self) -> Result<(), RadioError> {
        self.journal.record(Call::RadioClose);
        self.open.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn send(&self, frame: RadioFrame) -> Result<Option<RadioFrame>, RadioError> {
        self.journal.record(Call::RadioSend(frame));
        self.responses.lock().pop_front().unwrap_or(Ok(None))
    }

    fn register_data_listener(&self, listener: Arc<dyn DataListener>) {
        self.data_listeners.lock().push(listener);
    }

    fn register_sample_listener(&self, listener: Arc<dyn SampleListener>) {
        self.sample_listeners.lock().push(listener);
    }
}

pub struct MockBroker {
    client_id: String,
    connected: AtomicBool,
    journal: Arc<Journal>,
    connect_error: Mutex<Option<BrokerError>>,
    connect_delay: Mutex<Option<Duration>>,
    disconnect_error: Mutex<Option<BrokerError>>,
    publish_error: Mutex<Option<BrokerError>>,
    inbound: Mutex<Option<Arc<dyn InboundListener>>>,
}

impl MockBroker {
    pub fn new(client_id: &str, journal: Arc<Journal>) -> Self {
        Self {
            client_id: client_id.to_string(),
            connected: AtomicBool::new(false),
            journal,
            connect_error: Mutex::new(None),
            connect_delay: Mutex::new(None),
            disconnect_error: Mutex::new(None),
            publish_error: Mutex::new(None),
            inbound: Mutex::new(None),
        }
    }

    pub fn fail_connect(&self, error: BrokerError) {
        *self.connect_error.lock() = Some(error);
    }

    pub fn clear_connect_failure(&self) {
        *self.connect_error.lock() = None;
    }

    /// Make the handshake take `delay`, so other tasks run while it is in flight.
    pub fn delay_connect(&self, delay: Duration) {
        *self.connect_delay.lock() = Some(delay);
    }

    pub fn fail_disconnect(&self, error: BrokerError) {
        *self.disconnect_error.lock() = Some(error);
    }

    /// Every subsequent publish completes with `error`.
    pub fn fail_publish(&self, error: BrokerError) {
        *self.publish_error.lock() = Some(error);
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    pub fn inbound_listener(&self) -> Option<Arc<dyn InboundListener>> {
        self.inbound.lock().clone()
    }

    pub async fn deliver(&self, topic: &str, payload: &[u8]) {
        let listener = self.inbound_listener().expect("no inbound listener set");
        listener
            .message_arrived(InboundMessage {
                topic: topic.to_string(),
                payload: payload.to_vec(),
                retained: false,
            })
            .await;
    }
}

#[async_trait]
impl BrokerClient for MockBroker {
    fn client_id(&self) -> &str {
        &self.client_id
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn connect(&self, options: ConnectOptions) -> Result<(), BrokerError> {
        self.journal.record(Call::Connect(options));
        let delay = *self.connect_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = self.connect_error.lock().clone() {
            return Err(error);
        }
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), BrokerError> {
        self.journal.record(Call::Disconnect);
        if let Some(error) = self.disconnect_error.lock().clone() {
            return Err(error);
        }
        self.connected.store(false, Ordering::SeqCst);
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
        self.journal.record(Call::Publish {
            topic: topic.to_string(),
            payload,
            qos,
            retained,
        });
        let error = self.publish_error.lock().clone();
        on_complete(match error {
            Some(error) => Err(error),
            None => Ok(()),
        });
    }

    async fn subscribe(&self, filters: &[(String, QoS)]) -> Result<(), BrokerError> {
        self.journal.record(Call::Subscribe(filters.to_vec()));
        Ok(())
    }

    fn set_inbound_listener(&self, listener: Arc<dyn InboundListener>) {
        *self.inbound.lock() = Some(listener);
    }
}

/// Collects every delivery failure reported by a session.
#[derive(Debug, Default)]
pub struct RecordingObserver(Mutex<Vec<(String, BrokerError)>>);

impl RecordingObserver {
    pub fn failures(&self) -> Vec<(String, BrokerError)> {
        self.0.lock().clone()
    }
}

impl DeliveryObserver for RecordingObserver {
    fn delivery_failed(&self, topic: &str, error: &BrokerError) {
        self.0.lock().push((topic.to_string(), error.clone()));
    }
}

/// A session over fresh mocks, built but not yet connected.
pub struct Harness {
    pub journal: Arc<Journal>,
    pub radio: Arc<MockRadio>,
    pub broker: Arc<MockBroker>,
    pub observer: Arc<RecordingObserver>,
    pub session: Arc<GatewaySession>,
}

impl Harness {
    pub fn new(root_topic: &str, gateway: &str) -> Self {
        let journal = Arc::new(Journal::default());
        let radio = Arc::new(MockRadio::new(gateway, true, journal.clone()));
        let broker = Arc::new(MockBroker::new("gw1", journal.clone()));
        let observer = Arc::new(RecordingObserver::default());
        let session = GatewaySession::builder()
            .radio(radio.clone())
            .broker(broker.clone())
            .root_topic(root_topic)
            .observer(observer.clone())
            .build()
            .unwrap();
        Self {
            journal,
            radio,
            broker,
            observer,
            session: Arc::new(session),
        }
    }

    /// Connect and forget the calls made while doing so.
    pub async fn connected(root_topic: &str, gateway: &str) -> Self {
        let harness = Self::new(root_topic, gateway);
        harness.session.connect().await.unwrap();
        harness.journal.clear();
        harness
    }
}

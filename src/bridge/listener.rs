//! Listeners that carry traffic across the bridge.
//!
//! Each listener holds the shared session and nothing else; radio events
//! become publishes, broker requests become radio sends.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::codec::{self, AtRequest};
use crate::radio::{AtStatus, DataListener, IoSample, NodeAddress, RadioFrame, SampleListener};
use crate::session::GatewaySession;
use crate::topic::{InboundRoute, TopicKind};
use crate::transport::{InboundListener, InboundMessage};
use crate::utils::RadioError;

/// Publishes data frames from remote nodes on `data/<node>`.
pub struct DataReceiveListener {
    session: Arc<GatewaySession>,
}

impl DataReceiveListener {
    pub fn new(session: Arc<GatewaySession>) -> Self {
        Self { session }
    }
}

impl DataListener for DataReceiveListener {
    fn data_received(&self, source: &NodeAddress, payload: &[u8]) {
        let topic = self.session.topics().topic_for(TopicKind::Data, Some(source));
        self.session.publish(&topic, payload);
    }
}

/// Publishes I/O samples on `io/<node>`.
pub struct SampleReceiveListener {
    session: Arc<GatewaySession>,
}

impl SampleReceiveListener {
    pub fn new(session: Arc<GatewaySession>) -> Self {
        Self { session }
    }
}

impl SampleListener for SampleReceiveListener {
    fn sample_received(&self, source: &NodeAddress, sample: &IoSample) {
        let timestamp = chrono::Utc::now().timestamp_millis();
        match codec::encode_sample(sample, timestamp) {
            Ok(payload) => {
                let topic = self.session.topics().topic_for(TopicKind::Io, Some(source));
                self.session.publish(&topic, payload);
            }
            Err(e) => warn!(node = %source, error = %e, "Failed to encode I/O sample"),
        }
    }
}

/// Turns requests published to the gateway into radio frames.
pub struct BrokerMessageListener {
    session: Arc<GatewaySession>,
}

impl BrokerMessageListener {
    pub fn new(session: Arc<GatewaySession>) -> Self {
        Self { session }
    }

    async fn forward_data(&self, node: NodeAddress, payload: Vec<u8>) {
        let frame = RadioFrame::Data {
            node: node.clone(),
            payload,
        };
        if let Err(e) = self.session.send(frame).await {
            warn!(node = %node, error = %e, "Failed to send data to radio");
        }
    }

    async fn forward_at(&self, node: NodeAddress, payload: &[u8]) {
        let request = match AtRequest::parse(payload) {
            Ok(request) => request,
            Err(e) => {
                warn!(node = %node, error = %e, "Dropping malformed AT request");
                return;
            }
        };

        let response = self
            .session
            .send(request.into_frame(node.clone()))
            .await
            .and_then(at_response);
        match response {
            Ok((command, status, value)) => {
                let topic = self.session.topics().topic_for(TopicKind::At, Some(&node));
                let body = codec::encode_at_response(&command, status, &value);
                self.session.publish(&topic, body);
            }
            Err(e) => warn!(node = %node, error = %e, "AT command failed"),
        }
    }

    async fn discover(&self) {
        let nodes = match self
            .session
            .send(RadioFrame::Discover { frame_id: 0 })
            .await
            .and_then(discovered_nodes)
        {
            Ok(nodes) => nodes,
            Err(e) => {
                warn!(error = %e, "Discovery failed");
                return;
            }
        };
        match codec::encode_discovery(&nodes) {
            Ok(payload) => {
                let topic = self.session.topics().topic_for(TopicKind::Discovery, None);
                self.session.publish(&topic, payload);
            }
            Err(e) => warn!(error = %e, "Failed to encode discovery result"),
        }
    }
}

/// Unpack the reply to an AT command.
pub(crate) fn at_response(
    response: Option<RadioFrame>,
) -> Result<(String, AtStatus, Vec<u8>), RadioError> {
    match response {
        Some(RadioFrame::AtResponse {
            command,
            status,
            value,
            ..
        }) => Ok((command, status, value)),
        other => Err(RadioError::UnexpectedResponse(format!("{other:?}"))),
    }
}

pub(crate) fn discovered_nodes(
    response: Option<RadioFrame>,
) -> Result<Vec<NodeAddress>, RadioError> {
    match response {
        Some(RadioFrame::DiscoverResponse { nodes, .. }) => Ok(nodes),
        other => Err(RadioError::UnexpectedResponse(format!("{other:?}"))),
    }
}

#[async_trait]
impl InboundListener for BrokerMessageListener {
    async fn message_arrived(&self, message: InboundMessage) {
        match self.session.topics().route(&message.topic) {
            Some(InboundRoute::Data(node)) => self.forward_data(node, message.payload).await,
            Some(InboundRoute::At(node)) => self.forward_at(node, &message.payload).await,
            Some(InboundRoute::Discovery) => self.discover().await,
            None => debug!(topic = %message.topic, "Ignoring message outside gateway scope"),
        }
    }
}

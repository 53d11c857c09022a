//! The `radio` module defines the gateway's view of the local radio.
//!
//! [`RadioLink`] is the capability the session coordinates: it reports whether
//! the radio is open, closes it, sends frames, and accepts listeners for
//! unsolicited traffic. Listeners are invoked on the link's own receive task,
//! so implementations of [`DataListener`] and [`SampleListener`] must not block.
//!
//! [`UdpRadioLink`] is the concrete link used by the binary: it exchanges
//! JSON-encoded frames with a radio modem bridge over UDP.

pub mod frame;
pub mod udp;

use std::sync::Arc;

use async_trait::async_trait;

use crate::utils::RadioError;

pub use frame::{AtStatus, IoSample, NodeAddress, RadioFrame};
pub use udp::UdpRadioLink;

/// Receives unsolicited data frames from remote nodes.
pub trait DataListener: Send + Sync {
    fn data_received(&self, source: &NodeAddress, payload: &[u8]);
}

/// Receives I/O samples pushed by remote nodes.
pub trait SampleListener: Send + Sync {
    fn sample_received(&self, source: &NodeAddress, sample: &IoSample);
}

#[async_trait]
pub trait RadioLink: Send + Sync {
    /// Hardware address of the local radio. Identifies the gateway.
    fn local_address(&self) -> NodeAddress;

    fn is_open(&self) -> bool;

    async fn close(&self) -> Result<(), RadioError>;

    /// Send a frame. Requests that expect an answer resolve to the response
    /// frame; everything else resolves to `None` once transmitted.
    async fn send(&self, frame: RadioFrame) -> Result<Option<RadioFrame>, RadioError>;

    fn register_data_listener(&self, listener: Arc<dyn DataListener>);

    fn register_sample_listener(&self, listener: Arc<dyn SampleListener>);
}

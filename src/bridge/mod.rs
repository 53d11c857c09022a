//! The `bridge` module wires the session's listeners to both transports.
//!
//! [`attach`] is the last step of startup: it registers one listener per
//! event source, each holding the same session, then subscribes to the
//! gateway's request topics.

pub mod codec;
pub mod listener;

use std::sync::Arc;

use crate::session::GatewaySession;
use crate::utils::GatewayError;

pub use listener::{BrokerMessageListener, DataReceiveListener, SampleReceiveListener};

pub async fn attach(session: &Arc<GatewaySession>) -> Result<(), GatewayError> {
    session.register_data_listener(Arc::new(DataReceiveListener::new(session.clone())));
    session.register_sample_listener(Arc::new(SampleReceiveListener::new(session.clone())));
    session.set_inbound_listener(Arc::new(BrokerMessageListener::new(session.clone())));
    session.subscribe_inbound().await
}

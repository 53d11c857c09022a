use tracing::error;

use crate::utils::BrokerError;

/// Side channel for publish failures.
///
/// Publishing is fire-and-forget, so by the time the broker reports a failure
/// the original caller has moved on. The session hands every such failure to
/// its observer instead.
pub trait DeliveryObserver: Send + Sync {
    fn delivery_failed(&self, topic: &str, error: &BrokerError);
}

/// Logs delivery failures at error level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl DeliveryObserver for TracingObserver {
    fn delivery_failed(&self, topic: &str, error: &BrokerError) {
        error!(topic, error = %error, "Failed to publish message");
    }
}

use super::error::{BrokerError, GatewayError, RadioError};
use super::logging;

#[test]
fn logging_init_accepts_levels() {
    // Should not panic
    logging::init("info");
    logging::init("debug");
    logging::init("warning");
    logging::init("bogus");
}

#[test]
fn broker_error_converts_into_gateway_error() {
    let err: GatewayError = BrokerError::Handshake("refused".into()).into();
    assert!(matches!(err, GatewayError::Broker(BrokerError::Handshake(_))));
    assert_eq!(err.to_string(), "broker: connect handshake failed: refused");
}

#[test]
fn radio_error_converts_into_gateway_error() {
    let err: GatewayError = RadioError::NotOpen.into();
    assert_eq!(err.to_string(), "radio: radio link is not open");
}

#[test]
fn already_connected_is_distinct_from_transport_errors() {
    let err = GatewayError::AlreadyConnected;
    assert!(!matches!(err, GatewayError::Broker(_)));
    assert_eq!(err.to_string(), "broker client is already connected");
}

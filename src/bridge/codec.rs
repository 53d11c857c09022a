//! Payload mappings between broker messages and radio frames.
//!
//! - AT requests are text: `CMD` queries a register, `CMD=VALUE` sets it,
//!   with `VALUE` in hex. Responses are `CMD=VALUE` or `CMD=ERROR:<status>`.
//! - Discovery results are a JSON array of node addresses.
//! - I/O samples are JSON objects with a millisecond timestamp.

use serde::Serialize;

use crate::radio::{AtStatus, IoSample, NodeAddress, RadioFrame};
use crate::utils::CodecError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtRequest {
    pub command: String,
    pub parameter: Option<Vec<u8>>,
}

impl AtRequest {
    pub fn parse(payload: &[u8]) -> Result<Self, CodecError> {
        let text = std::str::from_utf8(payload).map_err(|_| CodecError::NotUtf8)?;
        let text = text.trim();

        let (command, parameter) = match text.split_once('=') {
            Some((command, value)) => (command.trim(), Some(value.trim())),
            None => (text, None),
        };

        if command.len() != 2 || !command.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(CodecError::InvalidCommand(command.to_string()));
        }

        let parameter = parameter.map(decode_hex).transpose()?;

        Ok(Self {
            command: command.to_ascii_uppercase(),
            parameter,
        })
    }

    pub fn into_frame(self, node: NodeAddress) -> RadioFrame {
        RadioFrame::AtCommand {
            frame_id: 0,
            node,
            command: self.command,
            parameter: self.parameter,
        }
    }
}

fn decode_hex(value: &str) -> Result<Vec<u8>, CodecError> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    if digits.is_empty() {
        return Err(CodecError::InvalidParameter(value.to_string()));
    }
    hex::decode(digits).map_err(|_| CodecError::InvalidParameter(value.to_string()))
}

pub fn encode_at_response(command: &str, status: AtStatus, value: &[u8]) -> String {
    match status {
        AtStatus::Ok => format!("{command}={}", hex::encode_upper(value)),
        failed => format!("{command}=ERROR:{failed}"),
    }
}

pub fn encode_discovery(nodes: &[NodeAddress]) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(nodes)
}

#[derive(Serialize)]
struct SampleMessage<'a> {
    timestamp: i64,
    digital: &'a std::collections::BTreeMap<String, bool>,
    analog: &'a std::collections::BTreeMap<String, u16>,
}

pub fn encode_sample(sample: &IoSample, timestamp_ms: i64) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(&SampleMessage {
        timestamp: timestamp_ms,
        digital: &sample.digital,
        analog: &sample.analog,
    })
}

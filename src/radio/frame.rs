//! Radio frame definitions
//!
//! `RadioFrame` is the unit exchanged with the radio modem. Requests that
//! expect an answer (`AtCommand`, `Discover`) carry a `frame_id` which the
//! link assigns; the modem echoes it in the matching response.
//!
//! Frames are serialized as tagged JSON objects, e.g.
//! `{"type":"data","node":"0013A20040A1B2C3","payload":[104,105]}`.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::utils::CodecError;

/// Hardware address of a radio node.
///
/// Addresses are used verbatim as topic segments, so they must be non-empty
/// and free of the MQTT separator and wildcard characters.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodeAddress(String);

impl NodeAddress {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for NodeAddress {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let valid = !s.is_empty()
            && !s
                .chars()
                .any(|c| matches!(c, '/' | '+' | '#') || c.is_whitespace() || c.is_control());
        if valid {
            Ok(Self(s.to_string()))
        } else {
            Err(CodecError::InvalidAddress(s.to_string()))
        }
    }
}

impl TryFrom<String> for NodeAddress {
    type Error = CodecError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<NodeAddress> for String {
    fn from(address: NodeAddress) -> Self {
        address.0
    }
}

impl fmt::Display for NodeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of an AT command as reported by the radio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AtStatus {
    Ok,
    Error,
    InvalidCommand,
    InvalidParameter,
    TxFailure,
}

impl fmt::Display for AtStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AtStatus::Ok => "OK",
            AtStatus::Error => "ERROR",
            AtStatus::InvalidCommand => "INVALID_COMMAND",
            AtStatus::InvalidParameter => "INVALID_PARAMETER",
            AtStatus::TxFailure => "TX_FAILURE",
        };
        f.write_str(s)
    }
}

/// A set of I/O line readings sampled by a remote node.
///
/// Keys are line names as the radio reports them (`DIO0`, `AD1`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IoSample {
    #[serde(default)]
    pub digital: BTreeMap<String, bool>,
    #[serde(default)]
    pub analog: BTreeMap<String, u16>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RadioFrame {
    /// Raw payload to or from a node.
    Data { node: NodeAddress, payload: Vec<u8> },

    /// Query (`parameter` absent) or set an AT register on a node.
    AtCommand {
        #[serde(default)]
        frame_id: u8,
        node: NodeAddress,
        command: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parameter: Option<Vec<u8>>,
    },

    AtResponse {
        frame_id: u8,
        node: NodeAddress,
        command: String,
        status: AtStatus,
        #[serde(default)]
        value: Vec<u8>,
    },

    /// Ask the local radio to enumerate reachable nodes.
    Discover {
        #[serde(default)]
        frame_id: u8,
    },

    DiscoverResponse { frame_id: u8, nodes: Vec<NodeAddress> },

    IoSample { node: NodeAddress, sample: IoSample },
}

impl RadioFrame {
    /// Whether the radio answers this frame with a response frame.
    pub fn expects_response(&self) -> bool {
        matches!(self, RadioFrame::AtCommand { .. } | RadioFrame::Discover { .. })
    }

    /// Frame id of requests and responses; `None` for unsolicited frames.
    pub fn frame_id(&self) -> Option<u8> {
        match self {
            RadioFrame::AtCommand { frame_id, .. }
            | RadioFrame::AtResponse { frame_id, .. }
            | RadioFrame::Discover { frame_id }
            | RadioFrame::DiscoverResponse { frame_id, .. } => Some(*frame_id),
            RadioFrame::Data { .. } | RadioFrame::IoSample { .. } => None,
        }
    }

    pub fn with_frame_id(mut self, id: u8) -> Self {
        match &mut self {
            RadioFrame::AtCommand { frame_id, .. } | RadioFrame::Discover { frame_id } => {
                *frame_id = id;
            }
            _ => {}
        }
        self
    }
}

use std::fmt;

use crate::radio::NodeAddress;

/// Suffix appended to channel topics for requests sent *to* the gateway.
const REQUEST_SUFFIX: &str = "send";
const SINGLE_LEVEL_WILDCARD: &str = "+";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TopicKind {
    /// Gateway availability, retained `1`/`0`.
    Status,
    Data,
    At,
    Discovery,
    /// I/O samples pushed by nodes.
    Io,
}

impl TopicKind {
    pub fn suffix(self) -> &'static str {
        match self {
            TopicKind::Status => "status",
            TopicKind::Data => "data",
            TopicKind::At => "at",
            TopicKind::Discovery => "discovery",
            TopicKind::Io => "io",
        }
    }
}

impl fmt::Display for TopicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// Where an inbound broker message should be delivered on the radio side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundRoute {
    Data(NodeAddress),
    At(NodeAddress),
    Discovery,
}

/// Topic layout for one gateway: `[<root>/]<gateway>/<kind>[/<node>]`.
///
/// The root segment and its separator are omitted when the root is empty.
/// The gateway publishes on channel topics and listens on the matching
/// `.../send` request topics, so its own publications never come back to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicScheme {
    base: String,
    gateway: NodeAddress,
}

impl TopicScheme {
    pub fn new(root: &str, gateway: NodeAddress) -> Self {
        let root = root.trim_end_matches('/');
        let base = if root.is_empty() {
            gateway.to_string()
        } else {
            format!("{root}/{gateway}")
        };
        Self { base, gateway }
    }

    pub fn gateway(&self) -> &NodeAddress {
        &self.gateway
    }

    /// Prefix shared by every topic of this gateway.
    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn topic_for(&self, kind: TopicKind, node: Option<&NodeAddress>) -> String {
        match node {
            Some(node) => format!("{}/{}/{}", self.base, kind.suffix(), node),
            None => format!("{}/{}", self.base, kind.suffix()),
        }
    }

    /// Availability topic. The session announces on the session-scoped form;
    /// the node-scoped form is reserved for per-node announcements.
    pub fn availability(&self, node_scoped: bool, node: Option<&NodeAddress>) -> String {
        if node_scoped {
            self.topic_for(TopicKind::Status, node)
        } else {
            self.topic_for(TopicKind::Status, None)
        }
    }

    /// Subscription filter for requests of `kind`, or `None` for kinds the
    /// gateway only publishes.
    pub fn subscription(&self, kind: TopicKind) -> Option<String> {
        match kind {
            TopicKind::Data | TopicKind::At => Some(format!(
                "{}/{}/{}/{}",
                self.base,
                kind.suffix(),
                SINGLE_LEVEL_WILDCARD,
                REQUEST_SUFFIX
            )),
            TopicKind::Discovery => Some(format!(
                "{}/{}/{}",
                self.base,
                kind.suffix(),
                REQUEST_SUFFIX
            )),
            TopicKind::Status | TopicKind::Io => None,
        }
    }

    /// All request filters, in data, AT, discovery order.
    pub fn subscriptions(&self) -> Vec<String> {
        [TopicKind::Data, TopicKind::At, TopicKind::Discovery]
            .into_iter()
            .filter_map(|kind| self.subscription(kind))
            .collect()
    }

    /// Maps a request topic back to its radio destination. Topics outside
    /// this gateway's scope, or not shaped like a request, yield `None`.
    pub fn route(&self, topic: &str) -> Option<InboundRoute> {
        let rest = topic.strip_prefix(&self.base)?.strip_prefix('/')?;
        let segments: Vec<&str> = rest.split('/').collect();
        match segments.as_slice() {
            [kind, node, REQUEST_SUFFIX] if *kind == TopicKind::Data.suffix() => {
                node.parse().ok().map(InboundRoute::Data)
            }
            [kind, node, REQUEST_SUFFIX] if *kind == TopicKind::At.suffix() => {
                node.parse().ok().map(InboundRoute::At)
            }
            [kind, REQUEST_SUFFIX] if *kind == TopicKind::Discovery.suffix() => {
                Some(InboundRoute::Discovery)
            }
            _ => None,
        }
    }
}

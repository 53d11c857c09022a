use super::{InboundRoute, TopicKind, TopicScheme};
use crate::radio::NodeAddress;

fn addr(s: &str) -> NodeAddress {
    s.parse().unwrap()
}

fn all_topics(scheme: &TopicScheme, node: &NodeAddress) -> Vec<String> {
    let mut topics = vec![
        scheme.availability(false, None),
        scheme.availability(true, Some(node)),
        scheme.topic_for(TopicKind::Data, Some(node)),
        scheme.topic_for(TopicKind::At, Some(node)),
        scheme.topic_for(TopicKind::Discovery, None),
        scheme.topic_for(TopicKind::Io, Some(node)),
    ];
    topics.extend(scheme.subscriptions());
    topics
}

#[test]
fn test_status_topic_without_root() {
    let scheme = TopicScheme::new("", addr("00:11"));
    assert_eq!(scheme.availability(false, None), "00:11/status");
}

#[test]
fn test_status_topic_with_root() {
    let scheme = TopicScheme::new("site-a", addr("00:11"));
    assert_eq!(scheme.availability(false, None), "site-a/00:11/status");
}

#[test]
fn test_trailing_separator_on_root_is_not_doubled() {
    let scheme = TopicScheme::new("site-a/", addr("00:11"));
    assert_eq!(scheme.base(), "site-a/00:11");
}

#[test]
fn test_channel_topics() {
    let scheme = TopicScheme::new("site-a", addr("0013A200"));
    let node = addr("0013A2FF");
    assert_eq!(
        scheme.topic_for(TopicKind::Data, Some(&node)),
        "site-a/0013A200/data/0013A2FF"
    );
    assert_eq!(
        scheme.topic_for(TopicKind::At, Some(&node)),
        "site-a/0013A200/at/0013A2FF"
    );
    assert_eq!(
        scheme.topic_for(TopicKind::Discovery, None),
        "site-a/0013A200/discovery"
    );
    assert_eq!(
        scheme.topic_for(TopicKind::Io, Some(&node)),
        "site-a/0013A200/io/0013A2FF"
    );
}

#[test]
fn test_node_scoped_availability() {
    let scheme = TopicScheme::new("", addr("gw"));
    let node = addr("n1");
    assert_eq!(scheme.availability(true, Some(&node)), "gw/status/n1");
    assert_eq!(scheme.availability(true, None), "gw/status");
}

#[test]
fn test_topics_are_deterministic() {
    let a = TopicScheme::new("site-a", addr("00:11"));
    let b = TopicScheme::new("site-a", addr("00:11"));
    let node = addr("22:33");
    assert_eq!(all_topics(&a, &node), all_topics(&b, &node));
    assert_eq!(all_topics(&a, &node), all_topics(&a, &node));
}

#[test]
fn test_distinct_gateways_never_collide() {
    let node = addr("22:33");
    for root in ["", "site-a"] {
        let a = TopicScheme::new(root, addr("00:11"));
        let b = TopicScheme::new(root, addr("00:12"));
        let c = TopicScheme::new(root, addr("00:1"));
        let topics_a = all_topics(&a, &node);
        for other in [&b, &c] {
            for topic in all_topics(other, &node) {
                assert!(!topics_a.contains(&topic), "collision on {topic}");
            }
        }
    }
}

#[test]
fn test_subscriptions_are_scoped_to_gateway() {
    let scheme = TopicScheme::new("site-a", addr("00:11"));
    assert_eq!(
        scheme.subscriptions(),
        vec![
            "site-a/00:11/data/+/send".to_string(),
            "site-a/00:11/at/+/send".to_string(),
            "site-a/00:11/discovery/send".to_string(),
        ]
    );
    assert!(scheme.subscription(TopicKind::Status).is_none());
    assert!(scheme.subscription(TopicKind::Io).is_none());
    assert!(
        scheme
            .subscriptions()
            .iter()
            .all(|s| s.starts_with("site-a/00:11/") && !s.contains('#'))
    );
}

#[test]
fn test_route_request_topics() {
    let scheme = TopicScheme::new("site-a", addr("00:11"));
    assert_eq!(
        scheme.route("site-a/00:11/data/22:33/send"),
        Some(InboundRoute::Data(addr("22:33")))
    );
    assert_eq!(
        scheme.route("site-a/00:11/at/22:33/send"),
        Some(InboundRoute::At(addr("22:33")))
    );
    assert_eq!(
        scheme.route("site-a/00:11/discovery/send"),
        Some(InboundRoute::Discovery)
    );
}

#[test]
fn test_route_ignores_foreign_and_outbound_topics() {
    let scheme = TopicScheme::new("site-a", addr("00:11"));
    assert_eq!(scheme.route("site-a/00:12/data/22:33/send"), None);
    assert_eq!(scheme.route("site-a/00:110/discovery/send"), None);
    assert_eq!(scheme.route("site-a/00:11/data/22:33"), None);
    assert_eq!(scheme.route("site-a/00:11/discovery"), None);
    assert_eq!(scheme.route("site-a/00:11/status"), None);
    assert_eq!(scheme.route("site-a/00:11/io/22:33/send"), None);
    assert_eq!(scheme.route("00:11/data/22:33/send"), None);
}

#[test]
fn test_node_address_rejects_topic_metacharacters() {
    for bad in ["", "a/b", "a+b", "#", "a b"] {
        assert!(bad.parse::<NodeAddress>().is_err(), "{bad:?} accepted");
    }
}

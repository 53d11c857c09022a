use serde::Deserialize;

/// Top-level configuration settings for the gateway.
///
/// Groups the broker connection, topic scoping, radio link and logging.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub broker: BrokerSettings,
    pub gateway: GatewaySettings,
    pub radio: RadioSettings,
    pub log: LogSettings,
}

/// Connection parameters for the MQTT broker.
///
/// `username` and `password` must be given together; the session rejects a
/// lone half of the pair.
#[derive(Debug, Deserialize, Clone)]
pub struct BrokerSettings {
    pub host: String,
    pub port: u16,
    pub client_id: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub keep_alive_secs: u64,
}

/// Topic scoping and delivery level for bridged messages.
#[derive(Debug, Deserialize, Clone)]
pub struct GatewaySettings {
    pub root_topic: String,
    pub qos: u8,
}

/// UDP endpoint of the radio modem bridge and the local radio's address.
#[derive(Debug, Deserialize, Clone)]
pub struct RadioSettings {
    pub bind: String,
    pub peer: String,
    pub address: String,
    pub response_timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogSettings {
    pub level: String,
}

/// Partial configuration settings loaded from files or environment.
///
/// Allows partial specification of settings. Missing values are filled from
/// `Settings::default()`.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub broker: Option<PartialBrokerSettings>,
    pub gateway: Option<PartialGatewaySettings>,
    pub radio: Option<PartialRadioSettings>,
    pub log: Option<PartialLogSettings>,
}

#[derive(Debug, Deserialize)]
pub struct PartialBrokerSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub client_id: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub keep_alive_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct PartialGatewaySettings {
    pub root_topic: Option<String>,
    pub qos: Option<u8>,
}

#[derive(Debug, Deserialize)]
pub struct PartialRadioSettings {
    pub bind: Option<String>,
    pub peer: Option<String>,
    pub address: Option<String>,
    pub response_timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct PartialLogSettings {
    pub level: Option<String>,
}

/// Provides default values for `Settings`.
///
/// The default client id is unique per process so that two gateways started
/// without configuration do not steal each other's broker session.
impl Default for Settings {
    fn default() -> Self {
        Self {
            broker: BrokerSettings {
                host: "127.0.0.1".to_string(),
                port: 1883,
                client_id: format!("meshmq-{}", uuid::Uuid::new_v4()),
                username: None,
                password: None,
                keep_alive_secs: 30,
            },
            gateway: GatewaySettings {
                root_topic: String::new(),
                qos: 0,
            },
            radio: RadioSettings {
                bind: "0.0.0.0:9750".to_string(),
                peer: "127.0.0.1:9751".to_string(),
                address: "0013A20000000000".to_string(),
                response_timeout_ms: 2000,
            },
            log: LogSettings {
                level: "info".to_string(),
            },
        }
    }
}

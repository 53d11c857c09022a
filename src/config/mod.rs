//! The `config` module loads gateway settings.
//!
//! Sources, lowest precedence first: built-in defaults, an optional TOML file
//! (`config/default.toml` unless another path is given), and environment
//! variables prefixed with `MESHMQ_` using `__` between nested keys, e.g.
//! `MESHMQ_BROKER__HOST=broker.local`. Environment values stay strings until
//! deserialized, so addresses and passwords keep their leading zeros.

mod settings;

use crate::config::settings::PartialSettings;
use config::{Config, ConfigError, Environment, File};

pub use settings::{BrokerSettings, GatewaySettings, LogSettings, RadioSettings, Settings};

const DEFAULT_FILE: &str = "config/default";

/// Loads the configuration from the default file and environment variables.
pub fn load_config() -> Result<Settings, ConfigError> {
    load(DEFAULT_FILE, false)
}

/// Loads the configuration from `path`, which must exist, layered under the
/// environment.
pub fn load_config_file(path: &str) -> Result<Settings, ConfigError> {
    load(path, true)
}

fn load(path: &str, required: bool) -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name(path).required(required))
        .add_source(
            Environment::with_prefix("MESHMQ")
                .prefix_separator("_")
                .separator("__"),
        );

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    Ok(merge(partial, Settings::default()))
}

fn merge(partial: PartialSettings, default: Settings) -> Settings {
    let broker = partial.broker;
    let gateway = partial.gateway;
    let radio = partial.radio;
    let log = partial.log;

    Settings {
        broker: match broker {
            Some(b) => BrokerSettings {
                host: b.host.unwrap_or(default.broker.host),
                port: b.port.unwrap_or(default.broker.port),
                client_id: b.client_id.unwrap_or(default.broker.client_id),
                username: b.username.or(default.broker.username),
                password: b.password.or(default.broker.password),
                keep_alive_secs: b.keep_alive_secs.unwrap_or(default.broker.keep_alive_secs),
            },
            None => default.broker,
        },
        gateway: match gateway {
            Some(g) => GatewaySettings {
                root_topic: g.root_topic.unwrap_or(default.gateway.root_topic),
                qos: g.qos.unwrap_or(default.gateway.qos),
            },
            None => default.gateway,
        },
        radio: match radio {
            Some(r) => RadioSettings {
                bind: r.bind.unwrap_or(default.radio.bind),
                peer: r.peer.unwrap_or(default.radio.peer),
                address: r.address.unwrap_or(default.radio.address),
                response_timeout_ms: r
                    .response_timeout_ms
                    .unwrap_or(default.radio.response_timeout_ms),
            },
            None => default.radio,
        },
        log: match log {
            Some(l) => LogSettings {
                level: l.level.unwrap_or(default.log.level),
            },
            None => default.log,
        },
    }
}

//! Relay configuration.
//!
//! The declarative part of a relay: broker connection settings and the list
//! of handlers. Translate hooks are attached separately, see
//! [`RelayBuilder::translate`](crate::RelayBuilder::translate).
//!
//! Configuration files are YAML with the broker settings at the top level:
//!
//! ```yaml
//! mqtt_host: 127.0.0.1
//! mqtt_port: 1883
//! mqtt_client_id: mqtt-osc-relay
//! handlers:
//! - mqtt_topic: /light/+/on
//!   osc_address: /light/{capture_1}/turn-on
//!   relay_payload: false
//! ```
//!
//! Missing keys take their defaults; unknown keys are an error.

use mqosc_std::HandlerConfig;
use serde::{Deserialize, Serialize};
use std::{fmt, path::Path};
use thiserror::Error;

/// Errors while loading or storing a configuration file.
#[derive(Error, Debug)]
pub enum ConfigFileError {
    /// The file could not be read or written.
    #[error("couldn't access {path}: {source}")]
    Io {
        /// The file path.
        path: String,
        /// Underlying cause.
        #[source]
        source: std::io::Error,
    },

    /// The content is not a valid configuration.
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Connection settings for the MQTT broker.
///
/// Consumed by the transport implementation; the relay itself never connects.
#[derive(Clone, PartialEq, Eq)]
pub struct MqttConfig {
    /// Broker host name.
    pub host: String,
    /// Broker port.
    pub port: u16,
    /// Client id of this relay.
    pub client_id: String,
    /// User name for authentication.
    pub user: Option<String>,
    /// Password for authentication.
    pub password: Option<String>,
}

impl MqttConfig {
    /// The broker address as `tcp://host:port`.
    pub fn broker_url(&self) -> String {
        format!("tcp://{}:{}", self.host, self.port)
    }
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 1883,
            client_id: "mqtt-osc-relay".to_owned(),
            user: None,
            password: None,
        }
    }
}

impl fmt::Debug for MqttConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MqttConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("client_id", &self.client_id)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Complete relay configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ConfigFile", into = "ConfigFile")]
pub struct RelayConfig {
    /// Broker connection settings.
    pub mqtt: MqttConfig,
    /// Handlers, in registration order.
    pub handlers: Vec<HandlerConfig>,
}

/// On-disk layout of [`RelayConfig`].
#[derive(Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    mqtt_host: String,
    mqtt_port: u16,
    mqtt_client_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    mqtt_user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mqtt_password: Option<String>,
    handlers: Vec<HandlerConfig>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        RelayConfig::default().into()
    }
}

impl From<RelayConfig> for ConfigFile {
    fn from(config: RelayConfig) -> Self {
        let RelayConfig { mqtt, handlers } = config;
        Self {
            mqtt_host: mqtt.host,
            mqtt_port: mqtt.port,
            mqtt_client_id: mqtt.client_id,
            mqtt_user: mqtt.user,
            mqtt_password: mqtt.password,
            handlers,
        }
    }
}

impl From<ConfigFile> for RelayConfig {
    fn from(file: ConfigFile) -> Self {
        Self {
            mqtt: MqttConfig {
                host: file.mqtt_host,
                port: file.mqtt_port,
                client_id: file.mqtt_client_id,
                user: file.mqtt_user,
                password: file.mqtt_password,
            },
            handlers: file.handlers,
        }
    }
}

impl RelayConfig {
    /// A starting point for a new configuration file.
    pub fn sample() -> Self {
        Self {
            mqtt: MqttConfig {
                user: Some("user".to_owned()),
                password: Some("secret".to_owned()),
                ..MqttConfig::default()
            },
            handlers: vec![HandlerConfig::new(
                "/light/+/on",
                "/light/{capture_1}/turn-on",
            )],
        }
    }

    /// Load a configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigFileError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigFileError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Parse a configuration from YAML. JSON documents are accepted too.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigFileError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String, ConfigFileError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Write the configuration to a file.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<(), ConfigFileError> {
        let path = path.as_ref();
        std::fs::write(path, self.to_yaml()?).map_err(|source| ConfigFileError::Io {
            path: path.display().to_string(),
            source,
        })
    }
}

use tracing::trace;

/// MQTT broker connection settings
#[derive(Debug, Clone, serde::Deserialize)]
pub struct BrokerConfig {
    #[serde(default = "default_broker_host")]
    pub host: String,

    #[serde(default = "default_broker_port")]
    pub port: u16,

    /// Client identifier presented to the broker
    #[serde(default = "default_client_id")]
    pub client_id: String,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            host: default_broker_host(),
            port: default_broker_port(),
            client_id: default_client_id(),
        }
    }
}

fn default_broker_host() -> String {
    String::from("localhost")
}

fn default_broker_port() -> u16 {
    1883
}

fn default_client_id() -> String {
    String::from("invernadero-hub")
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    #[serde(default)]
    pub broker: BrokerConfig,

    /// Port the API/WebSocket server listens on
    #[serde(default = "default_listen_port")]
    pub port: u16,

    /// Capacity of each subscriber's outgoing event queue. A subscriber that
    /// falls this many events behind starts losing its oldest undelivered
    /// events instead of stalling ingestion.
    #[serde(default = "default_stream_capacity")]
    pub stream_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            broker: BrokerConfig::default(),
            port: default_listen_port(),
            stream_capacity: default_stream_capacity(),
        }
    }
}

fn default_listen_port() -> u16 {
    3000
}

fn default_stream_capacity() -> usize {
    256
}

pub fn read_config_file(path: &str) -> anyhow::Result<Config> {
    let file_content = std::fs::read_to_string(path)?;
    serde_json::from_str(&file_content)
        .map_err(|_| anyhow::anyhow!("Invalid configuration file provided!"))
        .inspect(|config| trace!("loaded config: {config:?}"))
}

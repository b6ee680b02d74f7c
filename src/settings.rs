use crate::crypto::{parse_address, FichainAddress};
use crate::error::Result;
use serde::Deserialize;

pub const DEFAULT_CONFIG_NAME: &str = "fichain";
pub const DEFAULT_ENDPOINT: &str = "ws://localhost:9001/ws";
pub const DEFAULT_VERSION: u32 = 1;
pub const DEFAULT_CHAIN_ID: u64 = 2510;
pub const DEFAULT_LOG_CAPACITY: usize = 100;

/// Values injected into every session: where to connect and what to stamp
/// into headers and transaction pre-images.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ClientSettings {
    pub endpoint: String,
    pub version: u32,
    pub chain_id: u64,
    #[serde(default = "default_log_capacity")]
    pub log_capacity: usize,
    /// When set, the handshake is aborted unless the node proves this address.
    #[serde(default)]
    pub server_address: Option<String>,
    /// Only read by the binaries. The library takes an explicit `Keypair`.
    #[serde(default)]
    pub private_key: Option<String>,
}

fn default_log_capacity() -> usize {
    DEFAULT_LOG_CAPACITY
}

impl Default for ClientSettings {
    fn default() -> Self {
        ClientSettings {
            endpoint: String::from(DEFAULT_ENDPOINT),
            version: DEFAULT_VERSION,
            chain_id: DEFAULT_CHAIN_ID,
            log_capacity: DEFAULT_LOG_CAPACITY,
            server_address: None,
            private_key: None,
        }
    }
}

impl ClientSettings {
    /// Layer defaults, an optional config file and `FICHAIN_*` environment
    /// variables, in that order.
    pub fn load(config_name: Option<&str>) -> Result<ClientSettings> {
        let mut settings = config::Config::default();
        settings.set_default("endpoint", DEFAULT_ENDPOINT)?;
        settings.set_default("version", DEFAULT_VERSION as i64)?;
        settings.set_default("chain_id", DEFAULT_CHAIN_ID as i64)?;
        settings.set_default("log_capacity", DEFAULT_LOG_CAPACITY as i64)?;

        settings.merge(
            config::File::with_name(config_name.unwrap_or(DEFAULT_CONFIG_NAME)).required(false),
        )?;
        settings.merge(config::Environment::with_prefix("FICHAIN"))?;

        Ok(settings.try_into::<ClientSettings>()?)
    }

    pub fn expected_server_address(&self) -> Result<Option<FichainAddress>> {
        self.server_address
            .as_deref()
            .map(parse_address)
            .transpose()
    }
}

use config_rs::{Config, ConfigError, File};
use destinations_common_logger::LoggerConfig;
use destinations_destination_common::config::HttpClientConfig;
use destinations_destination_encharge::EnchargeSettings;
use destinations_destination_tiktok_audiences::TikTokAudiencesSettings;
use log::*;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE_NAME: &str = "destinations.toml";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DestinationsConfig {
    /// The logger configuration
    #[serde(default)]
    pub logger: LoggerConfig,

    /// The transport configuration shared by all destinations
    #[serde(default)]
    pub http_client: HttpClientConfig,

    pub encharge: EnchargeSettings,

    pub tiktok_audiences: TikTokAudiencesSettings,
}

/// Reads the configuration from the `destinations.toml` file in `config_dir`.
pub fn build_config(config_dir: &str) -> Result<DestinationsConfig, ConfigError> {
    let config_file_path = format!("{}/{}", config_dir, CONFIG_FILE_NAME);
    debug!("Loading destinations configuration from [{}]", config_file_path);
    let mut s = Config::new();
    s.merge(File::with_name(&config_file_path))?;
    s.try_into()
}

use serde::{Deserialize, Serialize};

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct HttpClientConfig {
    /// If true, the client will not verify the SSL certificate
    #[serde(default)]
    pub disable_ssl_verification: bool,

    /// The call timeout in seconds. Default is 10 seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl HttpClientConfig {
    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)
    }
}

//! HTTP stream engine settings.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Bytes received before the engine reports it is ready.
pub const DEFAULT_PREBUFFER_BYTES: usize = 16 * 1024;

pub const DEFAULT_USER_AGENT: &str = concat!("radio-core/", env!("CARGO_PKG_VERSION"));

/// Settings for [`HttpStreamEngine`](crate::HttpStreamEngine).
///
/// Deserializable with every field optional:
///
/// ```
/// use bridge_desktop::HttpEngineConfig;
///
/// let config: HttpEngineConfig = serde_json::from_str(r#"{ "prebuffer_bytes": 4096 }"#).unwrap();
/// assert_eq!(config.prebuffer_bytes, 4096);
/// assert!(config.request_icy_metadata);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpEngineConfig {
    pub user_agent: String,
    pub prebuffer_bytes: usize,
    /// TCP connect timeout. Body reads never time out.
    #[serde(with = "optional_millis")]
    pub connect_timeout: Option<Duration>,
    /// Send `Icy-MetaData: 1` to receive in-band track titles.
    pub request_icy_metadata: bool,
}

impl Default for HttpEngineConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            prebuffer_bytes: DEFAULT_PREBUFFER_BYTES,
            connect_timeout: None,
            request_icy_metadata: true,
        }
    }
}

impl HttpEngineConfig {
    pub fn with_prebuffer_bytes(mut self, bytes: usize) -> Self {
        self.prebuffer_bytes = bytes;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn with_icy_metadata(mut self, enabled: bool) -> Self {
        self.request_icy_metadata = enabled;
        self
    }
}

mod optional_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(duration) => serializer.serialize_some(&(duration.as_millis() as u64)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
    }
}

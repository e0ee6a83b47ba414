use serde::Serialize;
use super::ConfigError;
use super::store::KeyValueStore;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/api";
pub const DEFAULT_MAX_HISTORY: usize = 50;

const ENDPOINT_KEY: &str = "chatbot.endpoint";
const MAX_HISTORY_KEY: &str = "chatbot.max_history";
const TEST_MODE_KEY: &str = "chatbot.test_mode";

/// Persisted client settings. The endpoint is stored as given; it is not validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    pub endpoint_base_url: String,
    pub max_history_length: usize,
    pub test_mode_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint_base_url: DEFAULT_ENDPOINT.to_string(),
            max_history_length: DEFAULT_MAX_HISTORY,
            test_mode_enabled: false,
        }
    }
}

fn parse_history_length(raw: &str) -> usize {
    match raw.trim().parse::<usize>() {
        Ok(len) if len > 0 => len,
        _ => DEFAULT_MAX_HISTORY,
    }
}

pub fn load(store: &dyn KeyValueStore) -> Settings {
    let endpoint_base_url = store
        .get(ENDPOINT_KEY)
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
    let max_history_length = store
        .get(MAX_HISTORY_KEY)
        .map(|raw| parse_history_length(&raw))
        .unwrap_or(DEFAULT_MAX_HISTORY);
    let test_mode_enabled = store.get(TEST_MODE_KEY).as_deref() == Some("true");

    Settings {
        endpoint_base_url,
        max_history_length,
        test_mode_enabled,
    }
}

pub fn save(store: &mut dyn KeyValueStore, settings: &Settings) -> Result<(), ConfigError> {
    store.set(ENDPOINT_KEY, &settings.endpoint_base_url)?;
    store.set(MAX_HISTORY_KEY, &settings.max_history_length.to_string())?;
    store.set(TEST_MODE_KEY, if settings.test_mode_enabled { "true" } else { "false" })?;
    Ok(())
}

use std::{
    path::{
        Path,
        PathBuf,
    },
    time::Duration,
};

use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    catalog::search::{
        SearchDebouncer,
        DEFAULT_MIN_CHARS,
    },
    core::{
        loader::DataSource,
        CatalogError,
    },
    persistence::{
        get_data_file_path,
        load_json_or_default,
        save_json,
    },
};

pub const CONFIG_FILE: &str = "config.json";
pub const DEFAULT_STORE_FILE: &str = "store.json";
const DEFAULT_DATA_SOURCE: &str = "data";
const DEFAULT_DEBOUNCE_MS: u64 = 300;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory or `http(s)://` base URL holding the generated data files.
    pub data_source: String,
    /// Key-value store file. Defaults to `store.json` in the app data dir.
    pub store_file: Option<PathBuf>,
    pub search_debounce_ms: u64,
    pub search_min_chars: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_source: DEFAULT_DATA_SOURCE.to_string(),
            store_file: None,
            search_debounce_ms: DEFAULT_DEBOUNCE_MS,
            search_min_chars: DEFAULT_MIN_CHARS,
        }
    }
}

impl AppConfig {
    pub fn load() -> Self {
        Self::load_from(&get_data_file_path(CONFIG_FILE))
    }

    pub fn load_from(path: &Path) -> Self {
        load_json_or_default(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), CatalogError> {
        save_json(self, path)
    }

    pub fn data_source(&self) -> DataSource {
        DataSource::parse(&self.data_source)
    }

    pub fn store_path(&self) -> PathBuf {
        self.store_file.clone().unwrap_or_else(|| get_data_file_path(DEFAULT_STORE_FILE))
    }

    pub fn debouncer(&self) -> SearchDebouncer {
        SearchDebouncer::new(Duration::from_millis(self.search_debounce_ms), self.search_min_chars)
    }
}

use std::path::PathBuf;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{
    info,
    warn,
};

use super::{
    BlueMageSpell,
    BlueMageTable,
    CatalogError,
    Dataset,
    ItemStore,
};

pub const COLLECTIONS_FILE: &str = "collections_data.json";
pub const BLUE_MAGE_FILE: &str = "bluemage_sources.json";
pub const WIKI_MAPPING_FILE: &str = "huiji_mapping.json";

/// Where the generated data files live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Directory(PathBuf),
    Remote(String),
}

impl DataSource {
    pub fn parse(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            DataSource::Remote(location.trim_end_matches('/').to_string())
        } else {
            DataSource::Directory(PathBuf::from(location))
        }
    }

    fn describe(&self, file: &str) -> String {
        match self {
            DataSource::Directory(dir) => dir.join(file).display().to_string(),
            DataSource::Remote(base) => format!("{base}/{file}"),
        }
    }
}

/// Loads the dataset and both auxiliary tables concurrently.
///
/// Only the collections file is required. The Blue Mage list and the wiki mapping are
/// optional: when either fails to load the store is built without it.
pub async fn load_store(source: &DataSource) -> Result<ItemStore, CatalogError> {
    let client = Client::new();

    let (dataset, blue_mage, wiki_mapping) = tokio::join!(
        fetch_json::<Dataset>(&client, source, COLLECTIONS_FILE),
        fetch_json::<Vec<BlueMageSpell>>(&client, source, BLUE_MAGE_FILE),
        fetch_json::<serde_json::Value>(&client, source, WIKI_MAPPING_FILE),
    );

    let dataset = dataset.map_err(|e| {
        CatalogError::DataLoad(format!("{}: {}", source.describe(COLLECTIONS_FILE), e))
    })?;
    info!(collections = dataset.collections.len(), "Data loaded");

    let blue_mage = optional(source, BLUE_MAGE_FILE, blue_mage).map(BlueMageTable::from_spells);
    if let Some(table) = &blue_mage {
        info!(spells = table.len(), "Blue Mage sources loaded");
    }

    let wiki_mapping = optional(source, WIKI_MAPPING_FILE, wiki_mapping);
    if wiki_mapping.is_some() {
        info!("Wiki mapping loaded");
    }

    Ok(ItemStore::new(dataset, blue_mage, wiki_mapping))
}

fn optional<T>(source: &DataSource, file: &str, result: Result<T, CatalogError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(file = %source.describe(file), error = %e, "Optional data unavailable");
            None
        }
    }
}

async fn fetch_json<T: DeserializeOwned>(
    client: &Client,
    source: &DataSource,
    file: &str,
) -> Result<T, CatalogError> {
    match source {
        DataSource::Directory(dir) => {
            let bytes = tokio::fs::read(dir.join(file)).await?;
            Ok(serde_json::from_slice(&bytes)?)
        }
        DataSource::Remote(base) => {
            let response = client.get(format!("{base}/{file}")).send().await?;
            if !response.status().is_success() {
                return Err(CatalogError::Status(response.status().as_u16()));
            }
            let bytes = response.bytes().await?;
            Ok(serde_json::from_slice(&bytes)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_parse_source() {
        assert_eq!(
            DataSource::parse("https://example.org/data/"),
            DataSource::Remote("https://example.org/data".to_string())
        );
        assert_eq!(DataSource::parse("data"), DataSource::Directory(PathBuf::from("data")));
    }

    #[tokio::test]
    async fn test_load_without_optional_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(COLLECTIONS_FILE),
            r#"{"Collections": [{"CollectionName": "Mounts", "OrderKey": 1, "Items": [{"Id": 1}]}]}"#,
        )
        .unwrap();

        let store = load_store(&DataSource::Directory(dir.path().to_path_buf())).await.unwrap();
        assert_eq!(store.collections().len(), 1);
        assert!(store.blue_mage().is_none());
        assert!(store.wiki_mapping().is_none());
    }

    #[tokio::test]
    async fn test_load_with_blue_mage_sources() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(COLLECTIONS_FILE),
            r#"{"Collections": [{"CollectionName": "Blue Mage", "Items": [{"Id": 11383}]}]}"#,
        )
        .unwrap();
        fs::write(
            dir.path().join(BLUE_MAGE_FILE),
            r#"[{"action": 11383, "no": "1", "method": [{"type": "mob"}]}]"#,
        )
        .unwrap();
        fs::write(dir.path().join(WIKI_MAPPING_FILE), "not json").unwrap();

        let store = load_store(&DataSource::Directory(dir.path().to_path_buf())).await.unwrap();
        assert!(store.blue_mage_spell("Blue Mage", 11383).is_some());
        assert!(store.wiki_mapping().is_none());
    }

    #[tokio::test]
    async fn test_missing_dataset_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_store(&DataSource::Directory(dir.path().to_path_buf())).await;
        assert!(matches!(result, Err(CatalogError::DataLoad(_))));
    }
}

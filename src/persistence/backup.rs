//! Backup codes: ownership, wishlist and settings packed into one copy-pasteable string.
//!
//! The payload is a versioned JSON envelope, UTF-8 encoded and then base64'd so it
//! survives chat apps and note-taking tools unchanged.

use std::{
    collections::{
        BTreeMap,
        BTreeSet,
    },
    fmt::Display,
};

use base64::{
    engine::general_purpose::STANDARD,
    Engine,
};
use chrono::{
    SecondsFormat,
    Utc,
};
use serde::{
    Deserialize,
    Serialize,
};
use serde_json::{
    Map,
    Value,
};
use tracing::{
    error,
    info,
    warn,
};

use super::{
    KeyValueStore,
    Repository,
    WishlistKey,
};
use crate::core::{
    BackupError,
    CatalogError,
};

pub const EXPORT_VERSION: u64 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupEnvelope {
    pub version: u64,
    pub exported_at: String,
    pub data: BackupData,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackupData {
    #[serde(default)]
    pub owned: BTreeMap<String, Vec<u32>>,
    #[serde(default)]
    pub wishlist: Vec<String>,
    #[serde(default)]
    pub settings: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportStats {
    pub total_owned: usize,
    pub wishlist_count: usize,
}

pub fn build_envelope<S: KeyValueStore>(
    repo: &Repository<S>,
) -> Result<BackupEnvelope, CatalogError> {
    let mut data = BackupData::default();

    for collection in repo.owned_collections() {
        let owned = repo.load_owned(&collection)?;
        if !owned.is_empty() {
            data.owned.insert(collection, owned.into_iter().collect());
        }
    }

    data.wishlist = repo.load_wishlist()?.iter().map(ToString::to_string).collect();
    data.settings = repo.load_settings_value().unwrap_or_default();

    Ok(BackupEnvelope {
        version: EXPORT_VERSION,
        exported_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        data,
    })
}

pub fn export_all_data<S: KeyValueStore>(repo: &Repository<S>) -> Result<String, CatalogError> {
    let envelope = build_envelope(repo)?;
    let json = serde_json::to_string(&envelope)?;
    Ok(STANDARD.encode(json.as_bytes()))
}

/// Decodes a backup code and replaces all stored data with its contents.
pub fn import_from_string<S: KeyValueStore>(
    repo: &mut Repository<S>,
    encoded: &str,
) -> Result<(), BackupError> {
    let payload = decode(encoded)?;
    import_all_data(repo, &payload)
}

/// Validates `payload`, then clears the store and writes back what it contains.
///
/// Nothing is touched unless validation passes. Collections, wishlist or settings
/// missing from the payload end up empty: this is a full replace, not a merge.
pub fn import_all_data<S: KeyValueStore>(
    repo: &mut Repository<S>,
    payload: &Value,
) -> Result<(), BackupError> {
    let data = validate(payload)?;

    let owned: Vec<(String, Vec<u32>)> = data
        .get("owned")
        .and_then(Value::as_object)
        .map(|owned| {
            owned
                .iter()
                .filter_map(|(collection, ids)| {
                    let ids: Vec<u32> = ids
                        .as_array()?
                        .iter()
                        .filter_map(Value::as_u64)
                        .filter_map(|id| u32::try_from(id).ok())
                        .collect();
                    (!ids.is_empty()).then(|| (collection.clone(), ids))
                })
                .collect()
        })
        .unwrap_or_default();

    let wishlist: BTreeSet<WishlistKey> = data
        .get("wishlist")
        .and_then(Value::as_array)
        .map(|keys| {
            keys.iter()
                .filter_map(|key| match key.as_str().map(str::parse::<WishlistKey>) {
                    Some(Ok(key)) => Some(key),
                    Some(Err(e)) => {
                        warn!(error = %e, "Dropping imported wishlist entry");
                        None
                    }
                    None => {
                        warn!(entry = %key, "Dropping non-string wishlist entry");
                        None
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    let settings = data.get("settings").and_then(Value::as_object).filter(|s| !s.is_empty());

    match replace_all(repo, &owned, &wishlist, settings) {
        Ok(()) => {
            info!(collections = owned.len(), wishlist = wishlist.len(), "Backup imported");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Failed to write imported backup");
            Err(BackupError::Corrupt)
        }
    }
}

pub fn export_stats<S: KeyValueStore>(repo: &Repository<S>) -> Result<ExportStats, CatalogError> {
    let mut total_owned = 0;
    for collection in repo.owned_collections() {
        total_owned += repo.load_owned(&collection)?.len();
    }
    Ok(ExportStats { total_owned, wishlist_count: repo.load_wishlist()?.len() })
}

fn replace_all<S: KeyValueStore>(
    repo: &mut Repository<S>,
    owned: &[(String, Vec<u32>)],
    wishlist: &BTreeSet<WishlistKey>,
    settings: Option<&Map<String, Value>>,
) -> Result<(), CatalogError> {
    repo.clear_all()?;
    for (collection, ids) in owned {
        repo.save_owned(collection, &ids.iter().copied().collect())?;
    }
    if !wishlist.is_empty() {
        repo.save_wishlist(wishlist)?;
    }
    if let Some(settings) = settings {
        repo.save_settings_value(settings)?;
    }
    Ok(())
}

fn decode(encoded: &str) -> Result<Value, BackupError> {
    let bytes = STANDARD.decode(encoded.trim()).map_err(|e| corrupt("base64", e))?;
    let json = String::from_utf8(bytes).map_err(|e| corrupt("utf-8", e))?;
    serde_json::from_str(&json).map_err(|e| corrupt("json", e))
}

fn corrupt(stage: &str, error: impl Display) -> BackupError {
    error!(stage, error = %error, "Failed to decode backup code");
    BackupError::Corrupt
}

fn validate(payload: &Value) -> Result<&Map<String, Value>, BackupError> {
    let envelope = payload.as_object().ok_or(BackupError::InvalidFormat)?;

    let version = envelope.get("version").and_then(Value::as_f64).filter(|v| *v != 0.0);
    let data = envelope.get("data").and_then(Value::as_object);
    let (Some(version), Some(data)) = (version, data) else {
        return Err(BackupError::MissingFields);
    };

    if version > EXPORT_VERSION as f64 {
        return Err(BackupError::VersionTooNew);
    }

    Ok(data)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{
        catalog::filter::{
            FilterSettings,
            OwnershipFilter,
        },
        persistence::MemoryStore,
    };

    fn populated_repo() -> Repository<MemoryStore> {
        let mut repo = Repository::new(MemoryStore::new());
        repo.save_owned("Mounts", &BTreeSet::from([1, 5, 42])).unwrap();
        repo.save_owned("Blue Mage", &BTreeSet::from([11383])).unwrap();
        repo.save_owned("Emotes", &BTreeSet::new()).unwrap();
        repo.save_wishlist(&BTreeSet::from([
            WishlistKey::new("Minions", 3),
            WishlistKey::new("Triple Triad", 88),
        ]))
        .unwrap();
        repo.save_settings(&FilterSettings {
            ownership_filter: OwnershipFilter::Owned,
            exclude_categories: BTreeSet::from(["MogStation".to_string()]),
        })
        .unwrap();
        repo
    }

    fn decode_envelope(code: &str) -> BackupEnvelope {
        serde_json::from_value(decode(code).unwrap()).unwrap()
    }

    #[test]
    fn test_round_trip_populated_store() {
        let source = populated_repo();
        let code = export_all_data(&source).unwrap();

        let mut target = Repository::new(MemoryStore::new());
        target.save_owned("Glamour", &BTreeSet::from([9])).unwrap();
        import_from_string(&mut target, &code).unwrap();

        assert_eq!(target.load_owned("Mounts").unwrap(), BTreeSet::from([1, 5, 42]));
        assert_eq!(target.load_owned("Blue Mage").unwrap(), BTreeSet::from([11383]));
        assert!(target.load_owned("Glamour").unwrap().is_empty());
        assert_eq!(target.load_wishlist().unwrap(), source.load_wishlist().unwrap());
        assert_eq!(target.load_settings(), source.load_settings());
    }

    #[test]
    fn test_round_trip_empty_store() {
        let source = Repository::new(MemoryStore::new());
        let code = export_all_data(&source).unwrap();

        let envelope = decode_envelope(&code);
        assert_eq!(envelope.version, EXPORT_VERSION);
        assert!(envelope.data.owned.is_empty());
        assert!(envelope.data.wishlist.is_empty());
        assert!(envelope.data.settings.is_empty());

        let raw = decode(&code).unwrap();
        assert_eq!(raw["data"]["owned"], json!({}));
        assert_eq!(raw["data"]["wishlist"], json!([]));

        let mut target = populated_repo();
        import_from_string(&mut target, &code).unwrap();
        assert!(target.load_owned("Mounts").unwrap().is_empty());
        assert!(target.load_wishlist().unwrap().is_empty());
        assert_eq!(target.load_settings(), FilterSettings::default());
        assert!(target.store().keys().is_empty());
    }

    #[test]
    fn test_export_skips_empty_owned_sets() {
        let envelope = build_envelope(&populated_repo()).unwrap();
        assert!(!envelope.data.owned.contains_key("Emotes"));
        assert_eq!(envelope.data.owned.get("Mounts"), Some(&vec![1, 5, 42]));
        assert_eq!(envelope.data.wishlist, vec!["Minions:3", "Triple Triad:88"]);
        assert!(envelope.exported_at.ends_with('Z'));
    }

    #[test]
    fn test_settings_keep_unknown_fields() {
        let mut source = Repository::new(MemoryStore::new());
        let settings = json!({"ownershipFilter": "all", "excludeCategories": [], "theme": "dark"});
        source.save_settings_value(settings.as_object().unwrap()).unwrap();

        let mut target = Repository::new(MemoryStore::new());
        import_from_string(&mut target, &export_all_data(&source).unwrap()).unwrap();
        assert_eq!(target.load_settings_value(), settings.as_object().cloned());
    }

    #[test]
    fn test_version_too_new_leaves_store_untouched() {
        let mut repo = populated_repo();
        let before = repo.store().clone();

        let payload = json!({"version": 99, "data": {"owned": {}}});
        let code = STANDARD.encode(payload.to_string());
        assert_eq!(import_from_string(&mut repo, &code), Err(BackupError::VersionTooNew));
        assert_eq!(repo.store().keys(), before.keys());
        assert_eq!(repo.load_owned("Mounts").unwrap(), BTreeSet::from([1, 5, 42]));
    }

    #[test]
    fn test_validation_errors() {
        let mut repo = populated_repo();

        assert_eq!(import_all_data(&mut repo, &json!([1, 2])), Err(BackupError::InvalidFormat));
        assert_eq!(import_all_data(&mut repo, &json!("text")), Err(BackupError::InvalidFormat));
        assert_eq!(
            import_all_data(&mut repo, &json!({"data": {}})),
            Err(BackupError::MissingFields)
        );
        assert_eq!(
            import_all_data(&mut repo, &json!({"version": 1})),
            Err(BackupError::MissingFields)
        );
        assert_eq!(
            import_all_data(&mut repo, &json!({"version": 0, "data": {}})),
            Err(BackupError::MissingFields)
        );

        assert_eq!(repo.load_owned("Mounts").unwrap(), BTreeSet::from([1, 5, 42]));
    }

    #[test]
    fn test_malformed_wishlist_entries_are_dropped() {
        let mut repo = Repository::new(MemoryStore::new());
        let payload = json!({"version": 1, "data": {
            "owned": {"Mounts": [1, "two", 3]},
            "wishlist": ["Mounts:1", "no-separator", 7, "Minions:x"]
        }});
        import_all_data(&mut repo, &payload).unwrap();

        assert_eq!(repo.load_owned("Mounts").unwrap(), BTreeSet::from([1, 3]));
        assert_eq!(repo.load_wishlist().unwrap(), BTreeSet::from([WishlistKey::new("Mounts", 1)]));
    }

    #[test]
    fn test_corrupt_codes() {
        let mut repo = populated_repo();
        assert_eq!(import_from_string(&mut repo, "%%%not base64"), Err(BackupError::Corrupt));

        let not_json = STANDARD.encode("{\"version\": 1,");
        assert_eq!(import_from_string(&mut repo, &not_json), Err(BackupError::Corrupt));

        let not_utf8 = STANDARD.encode([0xff, 0xfe, 0xfd]);
        assert_eq!(import_from_string(&mut repo, &not_utf8), Err(BackupError::Corrupt));

        assert_eq!(repo.load_owned("Mounts").unwrap(), BTreeSet::from([1, 5, 42]));
    }

    #[test]
    fn test_import_accepts_surrounding_whitespace_and_unicode() {
        let mut source = Repository::new(MemoryStore::new());
        source.save_owned("時尚配件", &BTreeSet::from([7])).unwrap();
        let code = format!("  {}\n", export_all_data(&source).unwrap());

        let mut target = Repository::new(MemoryStore::new());
        import_from_string(&mut target, &code).unwrap();
        assert_eq!(target.load_owned("時尚配件").unwrap(), BTreeSet::from([7]));
    }

    #[test]
    fn test_export_stats() {
        let stats = export_stats(&populated_repo()).unwrap();
        assert_eq!(stats, ExportStats { total_owned: 4, wishlist_count: 2 });
    }
}

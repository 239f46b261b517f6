use std::{
    collections::BTreeSet,
    fmt,
    str::FromStr,
};

use serde::{
    Deserialize,
    Deserializer,
    Serialize,
    Serializer,
};
use tracing::warn;

use super::KeyValueStore;
use crate::{
    catalog::filter::FilterSettings,
    core::CatalogError,
};

const OWNED_PREFIX: &str = "owned:";
const WISHLIST_KEY: &str = "wishlist";
const SETTINGS_KEY: &str = "filter-settings";

/// Which persisted record a read or write addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope<'a> {
    Owned(&'a str),
    Wishlist,
    Settings,
}

impl<'a> Scope<'a> {
    pub fn storage_key(&self) -> String {
        match self {
            Scope::Owned(collection) => format!("{OWNED_PREFIX}{collection}"),
            Scope::Wishlist => WISHLIST_KEY.to_string(),
            Scope::Settings => SETTINGS_KEY.to_string(),
        }
    }

    pub fn from_storage_key(key: &'a str) -> Option<Self> {
        match key {
            WISHLIST_KEY => Some(Scope::Wishlist),
            SETTINGS_KEY => Some(Scope::Settings),
            _ => key.strip_prefix(OWNED_PREFIX).map(Scope::Owned),
        }
    }
}

/// `"<collection>:<item id>"`, the only way wishlist entries are addressed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WishlistKey {
    pub collection: String,
    pub item_id: u32,
}

impl WishlistKey {
    pub fn new(collection: &str, item_id: u32) -> Self {
        Self { collection: collection.to_string(), item_id }
    }
}

impl fmt::Display for WishlistKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.collection, self.item_id)
    }
}

impl FromStr for WishlistKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (collection, item_id) =
            s.rsplit_once(':').ok_or_else(|| format!("malformed wishlist key: {s}"))?;
        let item_id = item_id.parse().map_err(|_| format!("malformed wishlist key: {s}"))?;
        Ok(Self { collection: collection.to_string(), item_id })
    }
}

impl Serialize for WishlistKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for WishlistKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Typed access to the membership sets and filter settings in a [`KeyValueStore`].
#[derive(Debug)]
pub struct Repository<S> {
    store: S,
}

impl<S: KeyValueStore> Repository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    pub fn load_owned(&self, collection: &str) -> Result<BTreeSet<u32>, CatalogError> {
        let owned = self.read_json::<Vec<u32>>(Scope::Owned(collection))?.unwrap_or_default();
        Ok(owned.into_iter().collect())
    }

    pub fn save_owned(
        &mut self,
        collection: &str,
        owned: &BTreeSet<u32>,
    ) -> Result<(), CatalogError> {
        self.write_json(Scope::Owned(collection), owned)
    }

    /// Collections that have an ownership record, in key order.
    pub fn owned_collections(&self) -> Vec<String> {
        self.store
            .keys()
            .iter()
            .filter_map(|key| match Scope::from_storage_key(key) {
                Some(Scope::Owned(collection)) => Some(collection.to_string()),
                _ => None,
            })
            .collect()
    }

    pub fn load_wishlist(&self) -> Result<BTreeSet<WishlistKey>, CatalogError> {
        let raw = self.read_json::<Vec<String>>(Scope::Wishlist)?.unwrap_or_default();
        Ok(raw
            .into_iter()
            .filter_map(|key| match key.parse::<WishlistKey>() {
                Ok(key) => Some(key),
                Err(e) => {
                    warn!(error = %e, "Dropping wishlist entry");
                    None
                }
            })
            .collect())
    }

    pub fn save_wishlist(&mut self, wishlist: &BTreeSet<WishlistKey>) -> Result<(), CatalogError> {
        self.write_json(Scope::Wishlist, wishlist)
    }

    /// Unreadable settings fall back to defaults, matching a first run.
    pub fn load_settings(&self) -> FilterSettings {
        match self.read_json::<FilterSettings>(Scope::Settings) {
            Ok(settings) => settings.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "Ignoring invalid filter settings");
                FilterSettings::default()
            }
        }
    }

    pub fn save_settings(&mut self, settings: &FilterSettings) -> Result<(), CatalogError> {
        self.write_json(Scope::Settings, settings)
    }

    /// Raw settings object, kept as-is so backups carry fields this build doesn't know.
    pub fn load_settings_value(&self) -> Option<serde_json::Map<String, serde_json::Value>> {
        match self.read_json::<serde_json::Value>(Scope::Settings) {
            Ok(Some(serde_json::Value::Object(map))) => Some(map),
            _ => None,
        }
    }

    pub fn save_settings_value(
        &mut self,
        settings: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<(), CatalogError> {
        self.write_json(Scope::Settings, settings)
    }

    /// Removes every ownership record, the wishlist and the settings.
    pub fn clear_all(&mut self) -> Result<(), CatalogError> {
        for collection in self.owned_collections() {
            self.store.remove(&Scope::Owned(&collection).storage_key())?;
        }
        self.store.remove(&Scope::Wishlist.storage_key())?;
        self.store.remove(&Scope::Settings.storage_key())
    }

    fn read_json<T: for<'de> Deserialize<'de>>(
        &self,
        scope: Scope<'_>,
    ) -> Result<Option<T>, CatalogError> {
        match self.store.get(&scope.storage_key())? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn write_json<T: Serialize + ?Sized>(
        &mut self,
        scope: Scope<'_>,
        value: &T,
    ) -> Result<(), CatalogError> {
        let json = serde_json::to_string(value)?;
        self.store.set(&scope.storage_key(), json)
    }
}

use std::{
    collections::BTreeSet,
    fmt,
    str::FromStr,
};

use serde::{
    Deserialize,
    Serialize,
};

use super::{
    profile::CollectionProfile,
    search,
};
use crate::core::{
    tables::{
        patch_bucket,
        ACHIEVEMENT_CERTIFICATE_CATEGORY,
        ACHIEVEMENT_CERTIFICATE_CURRENCY,
    },
    utils::normalize_query,
    Item,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OwnershipFilter {
    #[default]
    All,
    Owned,
    NotOwned,
}

impl OwnershipFilter {
    pub fn as_key(&self) -> &'static str {
        match self {
            OwnershipFilter::All => "all",
            OwnershipFilter::Owned => "owned",
            OwnershipFilter::NotOwned => "not-owned",
        }
    }
}

impl fmt::Display for OwnershipFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_key())
    }
}

impl FromStr for OwnershipFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(OwnershipFilter::All),
            "owned" => Ok(OwnershipFilter::Owned),
            "not-owned" => Ok(OwnershipFilter::NotOwned),
            other => Err(format!("unknown ownership filter: {other}")),
        }
    }
}

/// The persisted part of [`FilterState`], stored under `filter-settings`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSettings {
    pub ownership_filter: OwnershipFilter,
    pub exclude_categories: BTreeSet<String>,
}

#[derive(Debug, Clone, Default)]
pub struct FilterState {
    active_categories: BTreeSet<String>,
    active_patches: BTreeSet<String>,
    search_query: String,
    show_no_source: bool,
    ownership_filter: OwnershipFilter,
    exclude_categories: BTreeSet<String>, // Progress counting only
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_settings(settings: FilterSettings) -> Self {
        let mut state = Self::new();
        state.apply_settings(settings);
        state
    }

    pub fn apply_settings(&mut self, settings: FilterSettings) {
        self.ownership_filter = settings.ownership_filter;
        self.exclude_categories = settings.exclude_categories;
    }

    pub fn settings(&self) -> FilterSettings {
        FilterSettings {
            ownership_filter: self.ownership_filter,
            exclude_categories: self.exclude_categories.clone(),
        }
    }

    pub fn toggle_category(&mut self, category: &str) -> bool {
        toggle(&mut self.active_categories, category)
    }

    pub fn toggle_patch(&mut self, label: &str) -> bool {
        toggle(&mut self.active_patches, label)
    }

    pub fn toggle_exclude_category(&mut self, category: &str) -> bool {
        toggle(&mut self.exclude_categories, category)
    }

    pub fn toggle_show_no_source(&mut self) -> bool {
        self.show_no_source = !self.show_no_source;
        self.show_no_source
    }

    pub fn set_show_no_source(&mut self, show: bool) {
        self.show_no_source = show;
    }

    pub fn set_ownership_filter(&mut self, filter: OwnershipFilter) {
        self.ownership_filter = filter;
    }

    pub fn set_search_query(&mut self, query: &str) {
        self.search_query = normalize_query(query);
    }

    /// Resets categories, patches and search. The no-source toggle and the ownership
    /// filter are user preferences and survive.
    pub fn clear_all(&mut self) {
        self.active_categories.clear();
        self.active_patches.clear();
        self.search_query.clear();
    }

    pub fn has_active_filters(&self) -> bool {
        !self.active_categories.is_empty()
            || !self.active_patches.is_empty()
            || !self.search_query.is_empty()
    }

    pub fn active_categories(&self) -> &BTreeSet<String> {
        &self.active_categories
    }

    pub fn active_patches(&self) -> &BTreeSet<String> {
        &self.active_patches
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn show_no_source(&self) -> bool {
        self.show_no_source
    }

    pub fn ownership_filter(&self) -> OwnershipFilter {
        self.ownership_filter
    }

    pub fn exclude_categories(&self) -> &BTreeSet<String> {
        &self.exclude_categories
    }

    /// True when `item` passes every active filter.
    ///
    /// Checks run cheapest first and stop at the first rejection.
    pub fn passes_filters(
        &self,
        item: &Item,
        profile: &dyn CollectionProfile,
        is_owned: impl Fn(u32) -> bool,
    ) -> bool {
        match self.ownership_filter {
            OwnershipFilter::All => {}
            OwnershipFilter::Owned if !is_owned(item.id) => return false,
            OwnershipFilter::NotOwned if is_owned(item.id) => return false,
            _ => {}
        }

        if !self.show_no_source && !profile.has_sources(item) {
            return false;
        }

        if !search::matches_search(item, &self.search_query) {
            return false;
        }

        if !self.active_patches.is_empty() && !self.matches_patch(item) {
            return false;
        }

        if !self.active_categories.is_empty() && !self.matches_category(item, profile) {
            return false;
        }

        true
    }

    fn matches_patch(&self, item: &Item) -> bool {
        self.active_patches
            .iter()
            .filter_map(|label| patch_bucket(label))
            .any(|bucket| bucket.contains(item.patch_added))
    }

    fn matches_category(&self, item: &Item, profile: &dyn CollectionProfile) -> bool {
        let wants_certificate = self.active_categories.contains(ACHIEVEMENT_CERTIFICATE_CATEGORY);

        profile.resolve_sources(item).iter().any(|acquisition| {
            acquisition.categories().any(|category| self.active_categories.contains(category))
                || (wants_certificate && acquisition.pays_with(ACHIEVEMENT_CERTIFICATE_CURRENCY))
        })
    }
}

/// Whether `item` should be left out of completion counts.
///
/// Items without sources never count. Otherwise an item counts as long as one of its
/// sources is untagged or carries a category outside `exclude`.
pub fn should_exclude_from_progress(item: &Item, exclude: &BTreeSet<String>) -> bool {
    if item.sources.is_empty() {
        return true;
    }
    if exclude.is_empty() {
        return false;
    }

    item.sources.iter().all(|source| {
        !source.categories.is_empty()
            && source.categories.iter().all(|category| exclude.contains(category))
    })
}

fn toggle(set: &mut BTreeSet<String>, value: &str) -> bool {
    if set.remove(value) {
        false
    } else {
        set.insert(value.to_string());
        true
    }
}

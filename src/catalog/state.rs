use std::{
    collections::BTreeSet,
    ops::Range,
};

use tracing::{
    debug,
    info,
};

use super::{
    detail::ItemDetail,
    filter::{
        FilterState,
        OwnershipFilter,
    },
    pagination::{
        LoadMore,
        Paginator,
    },
    profile::{
        profile_for,
        CollectionProfile,
    },
    progress::{
        collection_progress,
        Progress,
    },
    search::SearchUpdate,
    sort::{
        self,
        SortKey,
    },
};
use crate::{
    core::{
        CatalogError,
        Collection,
        Item,
        ItemStore,
    },
    persistence::{
        backup::{
            self,
            ExportStats,
        },
        KeyValueStore,
        Repository,
        WishlistKey,
    },
};

/// A slice of the visible list to append to the grid.
#[derive(Debug, Clone)]
pub struct Page<'a> {
    pub items: Vec<&'a Item>,
    pub range: Range<usize>,
    pub load_more: LoadMore,
}

/// Numbers behind the "showing x / y (of z)" line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemCounts {
    pub rendered: usize,
    pub filtered: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct WishlistEntry<'a> {
    pub collection: &'a str,
    pub item: &'a Item,
}

/// Application state of one browsing session over a loaded [`ItemStore`].
///
/// Filter, sort and collection changes only mark the list dirty; [`Browser::refresh`]
/// recomputes it and renders the first page. Ownership, wishlist and persisted filter
/// settings are written through to the store before the mutating call returns.
pub struct Browser<'a, S: KeyValueStore> {
    store: &'a ItemStore,
    repo: Repository<S>,
    filters: FilterState,
    sort_key: SortKey,
    collection: Option<&'a Collection>,
    owned: BTreeSet<u32>,
    wishlist: BTreeSet<WishlistKey>,
    visible_indices: Vec<usize>,
    paginator: Paginator,
    dirty: bool,
}

impl<'a, S: KeyValueStore> Browser<'a, S> {
    pub fn new(store: &'a ItemStore, kv: S) -> Result<Self, CatalogError> {
        let repo = Repository::new(kv);
        let filters = FilterState::from_settings(repo.load_settings());
        let wishlist = repo.load_wishlist()?;

        Ok(Self {
            store,
            repo,
            filters,
            sort_key: SortKey::default(),
            collection: None,
            owned: BTreeSet::new(),
            wishlist,
            visible_indices: Vec::new(),
            paginator: Paginator::new(),
            dirty: true,
        })
    }

    pub fn item_store(&self) -> &'a ItemStore {
        self.store
    }

    pub fn repository(&self) -> &Repository<S> {
        &self.repo
    }

    pub fn into_store(self) -> S {
        self.repo.into_inner()
    }

    pub fn select_collection(&mut self, name: &str) -> Result<(), CatalogError> {
        let collection = self
            .store
            .collection(name)
            .ok_or_else(|| CatalogError::UnknownCollection(name.to_string()))?;

        self.owned = self.repo.load_owned(name)?;
        self.collection = Some(collection);
        self.visible_indices.clear();
        self.paginator.reset(0);
        self.dirty = true;
        debug!(collection = name, owned = self.owned.len(), "Collection selected");
        Ok(())
    }

    pub fn collection(&self) -> Option<&'a Collection> {
        self.collection
    }

    pub fn collection_name(&self) -> Option<&'a str> {
        self.collection.map(|c| c.collection_name.as_str())
    }

    pub fn profile(&self) -> Box<dyn CollectionProfile + 'a> {
        profile_for(self.collection_name().unwrap_or_default(), self.store)
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    /// The comparator actually used for the current collection.
    pub fn effective_sort_key(&self) -> SortKey {
        self.profile().sort_key_for(self.sort_key)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    // Filters and sort

    pub fn set_sort_key(&mut self, key: SortKey) {
        if self.sort_key != key {
            self.sort_key = key;
            self.dirty = true;
        }
    }

    pub fn set_sort(&mut self, key: &str) {
        self.set_sort_key(SortKey::from_key(key));
    }

    pub fn toggle_category(&mut self, category: &str) -> bool {
        self.dirty = true;
        self.filters.toggle_category(category)
    }

    pub fn toggle_patch(&mut self, label: &str) -> bool {
        self.dirty = true;
        self.filters.toggle_patch(label)
    }

    pub fn toggle_show_no_source(&mut self) -> bool {
        self.dirty = true;
        self.filters.toggle_show_no_source()
    }

    pub fn set_search_query(&mut self, query: &str) {
        let before = self.filters.search_query().to_string();
        self.filters.set_search_query(query);
        if self.filters.search_query() != before {
            self.dirty = true;
        }
    }

    pub fn apply_search_update(&mut self, update: SearchUpdate) {
        match update {
            SearchUpdate::Apply(query) => self.set_search_query(&query),
            SearchUpdate::Clear => self.set_search_query(""),
        }
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear_all();
        self.dirty = true;
    }

    pub fn set_ownership_filter(&mut self, filter: OwnershipFilter) -> Result<(), CatalogError> {
        if self.filters.ownership_filter() == filter {
            return Ok(());
        }
        self.filters.set_ownership_filter(filter);
        self.dirty = true;
        self.repo.save_settings(&self.filters.settings())
    }

    /// Only affects progress counting, the visible list stays as it is.
    pub fn toggle_exclude_category(&mut self, category: &str) -> Result<bool, CatalogError> {
        let excluded = self.filters.toggle_exclude_category(category);
        self.repo.save_settings(&self.filters.settings())?;
        Ok(excluded)
    }

    // Visible list

    /// Re-runs filter and sort for the current collection and renders the first page.
    pub fn refresh(&mut self) -> Page<'a> {
        self.recompute_indices();
        self.render_more().unwrap_or_else(|| Page {
            items: Vec::new(),
            range: 0..0,
            load_more: LoadMore::Hidden,
        })
    }

    pub fn refresh_if_dirty(&mut self) -> Option<Page<'a>> {
        if self.dirty {
            Some(self.refresh())
        } else {
            None
        }
    }

    pub fn render_more(&mut self) -> Option<Page<'a>> {
        let range = self.paginator.render_more()?;
        Some(self.page(range))
    }

    pub fn on_viewport(&mut self, sentinel_visible: bool) -> Option<Page<'a>> {
        let range = self.paginator.on_viewport(sentinel_visible)?;
        Some(self.page(range))
    }

    pub fn visible_items(&self) -> Vec<&'a Item> {
        let Some(collection) = self.collection else {
            return Vec::new();
        };
        self.visible_indices.iter().map(|&idx| &collection.items[idx]).collect()
    }

    pub fn load_more(&self) -> LoadMore {
        self.paginator.load_more()
    }

    pub fn counts(&self) -> ItemCounts {
        ItemCounts {
            rendered: self.paginator.rendered(),
            filtered: self.visible_indices.len(),
            total: self.collection.map_or(0, |c| c.items.len()),
        }
    }

    fn recompute_indices(&mut self) {
        self.visible_indices.clear();

        if let Some(collection) = self.collection {
            let profile = profile_for(&collection.collection_name, self.store);
            let owned = &self.owned;

            for (idx, item) in collection.items.iter().enumerate() {
                if self.filters.passes_filters(item, profile.as_ref(), |id| owned.contains(&id)) {
                    self.visible_indices.push(idx);
                }
            }

            let key = profile.sort_key_for(self.sort_key);
            sort::sort_indices(&mut self.visible_indices, &collection.items, key, profile.as_ref());
            debug!(
                collection = %collection.collection_name,
                visible = self.visible_indices.len(),
                sort = %key,
                "List recomputed"
            );
        }

        self.paginator.reset(self.visible_indices.len());
        self.dirty = false;
    }

    fn page(&self, range: Range<usize>) -> Page<'a> {
        let items = match self.collection {
            Some(collection) => self.visible_indices[range.clone()]
                .iter()
                .map(|&idx| &collection.items[idx])
                .collect(),
            None => Vec::new(),
        };
        Page { items, range, load_more: self.paginator.load_more() }
    }

    // Ownership and wishlist

    pub fn is_owned(&self, item_id: u32) -> bool {
        self.owned.contains(&item_id)
    }

    pub fn owned(&self) -> &BTreeSet<u32> {
        &self.owned
    }

    /// Flips ownership of `item_id` in the current collection and returns the new state.
    ///
    /// With an ownership filter active the item may leave the list, so it is marked dirty.
    pub fn toggle_owned(&mut self, item_id: u32) -> Result<bool, CatalogError> {
        let collection = self.collection.ok_or(CatalogError::NoCollectionSelected)?;
        let name = collection.collection_name.as_str();
        if self.store.find_item(name, item_id).is_none() {
            return Err(CatalogError::UnknownItem { collection: name.to_string(), item_id });
        }

        let owned = if self.owned.remove(&item_id) {
            false
        } else {
            self.owned.insert(item_id);
            true
        };
        self.repo.save_owned(name, &self.owned)?;

        if self.filters.ownership_filter() != OwnershipFilter::All {
            self.dirty = true;
        }
        Ok(owned)
    }

    pub fn is_wishlisted(&self, collection: &str, item_id: u32) -> bool {
        self.wishlist.contains(&WishlistKey::new(collection, item_id))
    }

    pub fn wishlist(&self) -> &BTreeSet<WishlistKey> {
        &self.wishlist
    }

    pub fn toggle_wishlist(
        &mut self,
        collection: &str,
        item_id: u32,
    ) -> Result<bool, CatalogError> {
        if self.store.find_item(collection, item_id).is_none() {
            return Err(CatalogError::UnknownItem { collection: collection.to_string(), item_id });
        }

        let key = WishlistKey::new(collection, item_id);
        let wishlisted = if self.wishlist.remove(&key) {
            false
        } else {
            self.wishlist.insert(key);
            true
        };
        self.repo.save_wishlist(&self.wishlist)?;
        Ok(wishlisted)
    }

    /// Wishlist keys resolved to items. Keys whose item no longer exists are skipped.
    pub fn wishlist_entries(&self) -> Vec<WishlistEntry<'a>> {
        self.wishlist
            .iter()
            .filter_map(|key| {
                let collection = self.store.collection(&key.collection)?;
                match collection.items.iter().find(|item| item.id == key.item_id) {
                    Some(item) => {
                        Some(WishlistEntry { collection: &collection.collection_name, item })
                    }
                    None => {
                        debug!(key = %key, "Skipping dangling wishlist entry");
                        None
                    }
                }
            })
            .collect()
    }

    // Detail, progress and backups

    pub fn item_detail(&self, item_id: u32) -> Result<ItemDetail<'a>, CatalogError> {
        let collection = self.collection.ok_or(CatalogError::NoCollectionSelected)?;
        self.item_detail_in(&collection.collection_name, item_id)
    }

    pub fn item_detail_in(
        &self,
        collection: &str,
        item_id: u32,
    ) -> Result<ItemDetail<'a>, CatalogError> {
        let unknown = || CatalogError::UnknownItem { collection: collection.to_string(), item_id };
        let found = self.store.collection(collection).ok_or_else(unknown)?;
        let item = found.items.iter().find(|item| item.id == item_id).ok_or_else(unknown)?;

        let name = found.collection_name.as_str();
        let owned = if self.collection_name() == Some(name) {
            self.owned.contains(&item_id)
        } else {
            self.repo.load_owned(name)?.contains(&item_id)
        };

        Ok(ItemDetail::build(self.store, name, item, owned, self.is_wishlisted(name, item_id)))
    }

    pub fn progress(&self) -> Option<Progress> {
        let collection = self.collection?;
        Some(collection_progress(collection, &self.owned, self.filters.exclude_categories()))
    }

    pub fn progress_for(&self, name: &str) -> Result<Progress, CatalogError> {
        let collection = self
            .store
            .collection(name)
            .ok_or_else(|| CatalogError::UnknownCollection(name.to_string()))?;
        let owned = self.repo.load_owned(name)?;
        Ok(collection_progress(collection, &owned, self.filters.exclude_categories()))
    }

    pub fn export_backup(&self) -> Result<String, CatalogError> {
        backup::export_all_data(&self.repo)
    }

    pub fn export_stats(&self) -> Result<ExportStats, CatalogError> {
        backup::export_stats(&self.repo)
    }

    /// Replaces everything stored with the backup's contents and reloads session state.
    pub fn import_backup(&mut self, encoded: &str) -> Result<(), CatalogError> {
        backup::import_from_string(&mut self.repo, encoded)?;

        self.filters.apply_settings(self.repo.load_settings());
        self.wishlist = self.repo.load_wishlist()?;
        self.owned = match self.collection_name() {
            Some(name) => self.repo.load_owned(name)?,
            None => BTreeSet::new(),
        };
        self.dirty = true;
        info!(wishlist = self.wishlist.len(), "Session reloaded from backup");
        Ok(())
    }
}

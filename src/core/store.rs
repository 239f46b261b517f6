use super::{
    tables::BLUE_MAGE,
    utils::text_matches_search,
    BlueMageSpell,
    BlueMageTable,
    Collection,
    Dataset,
    Item,
};

pub const GLOBAL_SEARCH_LIMIT: usize = 20;

/// Everything loaded at startup. Read-only once built.
#[derive(Debug, Clone, Default)]
pub struct ItemStore {
    collections: Vec<Collection>,
    blue_mage: Option<BlueMageTable>,
    wiki_mapping: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy)]
pub struct SearchHit<'a> {
    pub collection: &'a str,
    pub item: &'a Item,
}

impl ItemStore {
    pub fn new(
        dataset: Dataset,
        blue_mage: Option<BlueMageTable>,
        wiki_mapping: Option<serde_json::Value>,
    ) -> Self {
        Self { collections: dataset.collections, blue_mage, wiki_mapping }
    }

    pub fn from_json(collections_json: &str) -> Result<Self, serde_json::Error> {
        let dataset: Dataset = serde_json::from_str(collections_json)?;
        Ok(Self::new(dataset, None, None))
    }

    pub fn with_blue_mage(mut self, spells: Vec<BlueMageSpell>) -> Self {
        self.blue_mage = Some(BlueMageTable::from_spells(spells));
        self
    }

    pub fn collections(&self) -> &[Collection] {
        &self.collections
    }

    pub fn collection(&self, name: &str) -> Option<&Collection> {
        self.collections.iter().find(|c| c.collection_name == name)
    }

    /// Collections worth a tab: non-empty, ordered by `OrderKey`.
    pub fn tabs(&self) -> Vec<&Collection> {
        let mut tabs: Vec<&Collection> =
            self.collections.iter().filter(|c| !c.items.is_empty()).collect();
        tabs.sort_by_key(|c| c.order_key);
        tabs
    }

    pub fn find_item(&self, collection: &str, item_id: u32) -> Option<&Item> {
        self.collection(collection)?.items.iter().find(|item| item.id == item_id)
    }

    /// Name search across every collection, in dataset order.
    pub fn search_all(&self, query: &str, limit: usize) -> Vec<SearchHit<'_>> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }

        self.collections
            .iter()
            .flat_map(|collection| {
                collection
                    .items
                    .iter()
                    .map(move |item| SearchHit { collection: &collection.collection_name, item })
            })
            .filter(|hit| hit.item.name.is_some() && text_matches_search(hit.item.name(), &query))
            .take(limit)
            .collect()
    }

    pub fn blue_mage(&self) -> Option<&BlueMageTable> {
        self.blue_mage.as_ref()
    }

    /// Spell data only applies to the Blue Mage collection; ids collide elsewhere.
    pub fn blue_mage_spell(&self, collection: &str, item_id: u32) -> Option<&BlueMageSpell> {
        if collection != BLUE_MAGE {
            return None;
        }
        self.blue_mage.as_ref()?.get(item_id)
    }

    pub fn wiki_mapping(&self) -> Option<&serde_json::Value> {
        self.wiki_mapping.as_ref()
    }
}

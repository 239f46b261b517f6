use super::sort::SortKey;
use crate::core::{
    tables::{
        blue_mage_category,
        BLUE_MAGE,
        ORCHESTRIONS,
        TRIPLE_TRIAD,
    },
    BlueMageTable,
    Item,
    ItemStore,
    Source,
    SpellMethod,
};

/// One way of obtaining an item, either a dataset source or a Blue Mage learning method.
#[derive(Debug, Clone, Copy)]
pub enum Acquisition<'a> {
    Source(&'a Source),
    Spell(&'a SpellMethod),
}

impl<'a> Acquisition<'a> {
    /// Filter categories this acquisition counts towards.
    pub fn categories(&self) -> impl Iterator<Item = &'a str> + 'a {
        let no_tags: &'a [String] = &[];
        let (tags, mapped) = match *self {
            Acquisition::Source(source) => (source.categories.as_slice(), None),
            Acquisition::Spell(method) => (no_tags, blue_mage_category(&method.kind)),
        };
        tags.iter().map(String::as_str).chain(mapped)
    }

    pub fn pays_with(&self, currency: &str) -> bool {
        match self {
            Acquisition::Source(source) => source.pays_with(currency),
            Acquisition::Spell(_) => false,
        }
    }
}

const STANDARD_SORTS: &[SortKey] =
    &[SortKey::Name, SortKey::PatchDesc, SortKey::PatchAsc, SortKey::Id];

const ORCHESTRION_SORTS: &[SortKey] = &[
    SortKey::Name,
    SortKey::PatchDesc,
    SortKey::PatchAsc,
    SortKey::Id,
    SortKey::OrchestrionCategory,
];

/// Per-collection behavior of the filter and sort code.
pub trait CollectionProfile {
    fn resolve_sources<'a>(&'a self, item: &'a Item) -> Vec<Acquisition<'a>>;

    /// Gate for the "show items without sources" toggle.
    fn has_sources(&self, item: &Item) -> bool {
        !item.sources.is_empty()
    }

    fn sort_key_for(&self, requested: SortKey) -> SortKey {
        requested
    }

    fn sort_options(&self) -> &'static [SortKey] {
        STANDARD_SORTS
    }

    fn spell_number(&self, _item: &Item) -> Option<u32> {
        None
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StandardProfile;

impl CollectionProfile for StandardProfile {
    fn resolve_sources<'a>(&'a self, item: &'a Item) -> Vec<Acquisition<'a>> {
        item.sources.iter().map(Acquisition::Source).collect()
    }
}

/// Blue Mage categories come from the spell table, never from regular sources.
///
/// Without a spell table the regular sources stand in, and the name sort still
/// switches to spell numbers, which then all tie at the sentinel.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlueMageProfile<'s> {
    table: Option<&'s BlueMageTable>,
}

impl<'s> BlueMageProfile<'s> {
    pub fn new(table: Option<&'s BlueMageTable>) -> Self {
        Self { table }
    }
}

impl CollectionProfile for BlueMageProfile<'_> {
    fn resolve_sources<'a>(&'a self, item: &'a Item) -> Vec<Acquisition<'a>> {
        match self.table {
            Some(table) => table
                .get(item.id)
                .map(|spell| spell.method.iter().map(Acquisition::Spell).collect())
                .unwrap_or_default(),
            None => StandardProfile.resolve_sources(item),
        }
    }

    fn has_sources(&self, item: &Item) -> bool {
        !item.sources.is_empty()
            || self
                .table
                .and_then(|table| table.get(item.id))
                .is_some_and(|spell| !spell.method.is_empty())
    }

    fn sort_key_for(&self, requested: SortKey) -> SortKey {
        match requested {
            SortKey::Name => SortKey::SpellNo,
            other => other,
        }
    }

    fn spell_number(&self, item: &Item) -> Option<u32> {
        self.table?.get(item.id)?.number()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TripleTriadProfile;

impl CollectionProfile for TripleTriadProfile {
    fn resolve_sources<'a>(&'a self, item: &'a Item) -> Vec<Acquisition<'a>> {
        StandardProfile.resolve_sources(item)
    }

    fn sort_key_for(&self, requested: SortKey) -> SortKey {
        match requested {
            SortKey::Name => SortKey::CardNo,
            other => other,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OrchestrionProfile;

impl CollectionProfile for OrchestrionProfile {
    fn resolve_sources<'a>(&'a self, item: &'a Item) -> Vec<Acquisition<'a>> {
        StandardProfile.resolve_sources(item)
    }

    fn sort_options(&self) -> &'static [SortKey] {
        ORCHESTRION_SORTS
    }
}

pub fn profile_for<'s>(collection: &str, store: &'s ItemStore) -> Box<dyn CollectionProfile + 's> {
    match collection {
        BLUE_MAGE => Box::new(BlueMageProfile::new(store.blue_mage())),
        TRIPLE_TRIAD => Box::new(TripleTriadProfile),
        ORCHESTRIONS => Box::new(OrchestrionProfile),
        _ => Box::new(StandardProfile),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::BlueMageSpell;

    fn blue_mage_store() -> ItemStore {
        let store = ItemStore::from_json(
            r#"{"Collections": [{"CollectionName": "Blue Mage", "Items": [
                {"Id": 100, "Name": "Sticky Tongue"},
                {"Id": 101, "Name": "Off-guard"}
            ]}]}"#,
        )
        .unwrap();
        let spells: Vec<BlueMageSpell> = serde_json::from_str(
            r#"[{"action": 100, "no": "7", "method": [{"type": "dungeon"}, {"type": "totem"}]},
                {"action": 101, "no": "21", "method": []}]"#,
        )
        .unwrap();
        store.with_blue_mage(spells)
    }

    #[test]
    fn test_spell_methods_map_to_categories() {
        let store = blue_mage_store();
        let profile = profile_for(BLUE_MAGE, &store);
        let item = store.find_item(BLUE_MAGE, 100).unwrap();

        let categories: Vec<&str> =
            profile.resolve_sources(item).iter().flat_map(|a| a.categories()).collect();
        assert_eq!(categories, vec!["Duty"]);
        assert!(profile.has_sources(item));
        assert_eq!(profile.spell_number(item), Some(7));

        let empty_methods = store.find_item(BLUE_MAGE, 101).unwrap();
        assert!(!profile.has_sources(empty_methods));
    }

    #[test]
    fn test_name_sort_overrides() {
        let store = blue_mage_store();
        assert_eq!(profile_for(BLUE_MAGE, &store).sort_key_for(SortKey::Name), SortKey::SpellNo);
        assert_eq!(profile_for(BLUE_MAGE, &store).sort_key_for(SortKey::Id), SortKey::Id);
        assert_eq!(profile_for(TRIPLE_TRIAD, &store).sort_key_for(SortKey::Name), SortKey::CardNo);
        assert_eq!(profile_for(ORCHESTRIONS, &store).sort_key_for(SortKey::Name), SortKey::Name);
        let mounts = profile_for("Mounts", &store);
        assert_eq!(mounts.sort_key_for(SortKey::PatchAsc), SortKey::PatchAsc);
    }

    #[test]
    fn test_blue_mage_without_table_keeps_spell_sort() {
        let store = ItemStore::from_json(
            r#"{"Collections": [{"CollectionName": "Blue Mage", "Items": [
                {"Id": 10, "Name": "Zeta", "Sources": [{"Categories": ["Quest"]}]},
                {"Id": 11, "Name": "Alpha"}
            ]}]}"#,
        )
        .unwrap();
        let profile = profile_for(BLUE_MAGE, &store);
        let key = profile.sort_key_for(SortKey::Name);
        assert_eq!(key, SortKey::SpellNo);

        let list = &store.collection(BLUE_MAGE).unwrap().items;
        let mut indices: Vec<usize> = (0..list.len()).collect();
        crate::catalog::sort::sort_indices(&mut indices, list, key, profile.as_ref());
        let ids: Vec<u32> = indices.iter().map(|&idx| list[idx].id).collect();
        assert_eq!(ids, vec![10, 11]);

        let zeta = store.find_item(BLUE_MAGE, 10).unwrap();
        let categories: Vec<&str> =
            profile.resolve_sources(zeta).iter().flat_map(|a| a.categories()).collect();
        assert_eq!(categories, vec!["Quest"]);
        assert!(profile.has_sources(zeta));
        assert!(!profile.has_sources(store.find_item(BLUE_MAGE, 11).unwrap()));
    }

    #[test]
    fn test_sort_options() {
        let store = ItemStore::default();
        let orchestrions = profile_for(ORCHESTRIONS, &store);
        let mounts = profile_for("Mounts", &store);
        assert!(orchestrions.sort_options().contains(&SortKey::OrchestrionCategory));
        assert!(!mounts.sort_options().contains(&SortKey::OrchestrionCategory));
    }

    #[test]
    fn test_source_acquisition() {
        let source: Source = serde_json::from_str(
            r#"{"Categories": ["Quest", "Event"], "Costs": [{"ItemName": "成就幣", "Quantity": 1}]}"#,
        )
        .unwrap();
        let acquisition = Acquisition::Source(&source);
        assert_eq!(acquisition.categories().collect::<Vec<_>>(), vec!["Quest", "Event"]);
        assert!(acquisition.pays_with("成就幣"));
    }
}

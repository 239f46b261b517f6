use std::{
    cmp::Ordering,
    fmt,
};

use icu_collator::{
    Collator,
    CollatorOptions,
};
use icu_locid::locale;
use tracing::warn;

use super::profile::CollectionProfile;
use crate::core::{
    tables::orchestrion_category_order,
    Item,
};

const MISSING_SPELL_NO: u32 = 999;
const MISSING_CARD_NO: u32 = 9999;
const UNMAPPED_ORCHESTRION_CATEGORY: u32 = 999;
const MISSING_CATEGORY_ORDER: u32 = 99999;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortKey {
    #[default]
    Name,
    PatchDesc,
    PatchAsc,
    Id,
    SpellNo,
    CardNo,
    OrchestrionCategory,
}

impl SortKey {
    pub const ALL: [SortKey; 7] = [
        SortKey::Name,
        SortKey::PatchDesc,
        SortKey::PatchAsc,
        SortKey::Id,
        SortKey::SpellNo,
        SortKey::CardNo,
        SortKey::OrchestrionCategory,
    ];

    pub fn as_key(&self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::PatchDesc => "patch-desc",
            SortKey::PatchAsc => "patch-asc",
            SortKey::Id => "id",
            SortKey::SpellNo => "spell-no",
            SortKey::CardNo => "card-no",
            SortKey::OrchestrionCategory => "orchestrion-category",
        }
    }

    /// Unrecognized keys sort by name.
    pub fn from_key(key: &str) -> Self {
        Self::ALL.into_iter().find(|sort| sort.as_key() == key).unwrap_or_default()
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortKey::Name => "名稱",
            SortKey::PatchDesc => "版本（新到舊）",
            SortKey::PatchAsc => "版本（舊到新）",
            SortKey::Id => "ID",
            SortKey::SpellNo => "技能編號",
            SortKey::CardNo => "卡片編號",
            SortKey::OrchestrionCategory => "樂譜分類",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_key())
    }
}

thread_local! {
    static NAME_COLLATOR: Option<Collator> = build_collator();
}

/// Traditional Chinese stroke order. Plain `zh` collates by pinyin.
fn build_collator() -> Option<Collator> {
    match Collator::try_new(&locale!("zh-u-co-stroke").into(), CollatorOptions::new()) {
        Ok(collator) => Some(collator),
        Err(e) => {
            warn!(error = %e, "Stroke collation unavailable, sorting names by code point");
            None
        }
    }
}

/// Stable sort of `indices` (positions into `items`) by `key`.
///
/// `key` is used as given; apply [`CollectionProfile::sort_key_for`] first for the
/// collection-specific defaults.
pub fn sort_indices(
    indices: &mut [usize],
    items: &[Item],
    key: SortKey,
    profile: &dyn CollectionProfile,
) {
    NAME_COLLATOR.with(|collator| {
        indices.sort_by(|&lhs, &rhs| {
            compare_items(&items[lhs], &items[rhs], key, profile, collator.as_ref())
        });
    });
}

pub fn compare_items(
    left: &Item,
    right: &Item,
    key: SortKey,
    profile: &dyn CollectionProfile,
    collator: Option<&Collator>,
) -> Ordering {
    match key {
        SortKey::Name => compare_names(left.name(), right.name(), collator),
        SortKey::PatchDesc => right.patch_added.total_cmp(&left.patch_added),
        SortKey::PatchAsc => left.patch_added.total_cmp(&right.patch_added),
        SortKey::Id => left.id.cmp(&right.id),
        SortKey::SpellNo => {
            let left_no = profile.spell_number(left).unwrap_or(MISSING_SPELL_NO);
            let right_no = profile.spell_number(right).unwrap_or(MISSING_SPELL_NO);
            left_no.cmp(&right_no)
        }
        SortKey::CardNo => {
            let left_no = left.card_number.unwrap_or(MISSING_CARD_NO);
            let right_no = right.card_number.unwrap_or(MISSING_CARD_NO);
            left_no.cmp(&right_no)
        }
        SortKey::OrchestrionCategory => {
            orchestrion_rank(left).cmp(&orchestrion_rank(right))
        }
    }
}

/// Collation first, code points to break collation ties between distinct strings.
fn compare_names(left: &str, right: &str, collator: Option<&Collator>) -> Ordering {
    match collator {
        Some(collator) => collator.compare(left, right).then_with(|| left.cmp(right)),
        None => left.cmp(right),
    }
}

fn orchestrion_rank(item: &Item) -> (u32, u32) {
    let category = item
        .category
        .as_deref()
        .and_then(orchestrion_category_order)
        .unwrap_or(UNMAPPED_ORCHESTRION_CATEGORY);
    (category, item.category_order.unwrap_or(MISSING_CATEGORY_ORDER))
}

use std::collections::HashMap;

use serde::{
    Deserialize,
    Deserializer,
    Serialize,
};

use super::tables::UNKNOWN_PATCH;

/// Top level of `collections_data.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Dataset {
    #[serde(default, deserialize_with = "null_as_default")]
    pub collections: Vec<Collection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Collection {
    pub collection_name: String,
    #[serde(default)]
    pub order_key: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Item {
    pub id: u32, // Only unique within its collection
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>, // May contain inline markup tags
    #[serde(default)]
    pub icon_url: String,
    #[serde(default = "unknown_patch", deserialize_with = "patch_or_unknown")]
    pub patch_added: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_patch: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sources: Vec<Source>,

    // Triple Triad
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_number: Option<u32>,

    // Hairstyles
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprite_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprite_frames: Option<u32>,

    // Orchestrions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_order: Option<u32>,
}

impl Item {
    /// Name used for sorting and searching, empty when the record has none.
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    pub fn has_unknown_patch(&self) -> bool {
        self.patch_added >= UNKNOWN_PATCH
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Source {
    #[serde(default, deserialize_with = "null_as_default")]
    pub categories: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub costs: Vec<Cost>,
    /// Acquisition-method fields that only the detail view cares about.
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

impl Source {
    pub fn pays_with(&self, currency: &str) -> bool {
        self.costs.iter().any(|cost| cost.item_name == currency)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Cost {
    #[serde(default)]
    pub item_name: String,
    #[serde(default)]
    pub quantity: u32,
}

/// One entry of `bluemage_sources.json`, keyed by the spell's action id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlueMageSpell {
    pub action: u32,
    #[serde(deserialize_with = "string_or_number")]
    pub no: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub method: Vec<SpellMethod>,
}

impl BlueMageSpell {
    pub fn number(&self) -> Option<u32> {
        self.no.trim().parse().ok()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpellMethod {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default)]
pub struct BlueMageTable {
    spells: HashMap<u32, BlueMageSpell>,
}

impl BlueMageTable {
    pub fn from_spells(spells: Vec<BlueMageSpell>) -> Self {
        Self { spells: spells.into_iter().map(|spell| (spell.action, spell)).collect() }
    }

    pub fn get(&self, action_id: u32) -> Option<&BlueMageSpell> {
        self.spells.get(&action_id)
    }

    pub fn len(&self) -> usize {
        self.spells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spells.is_empty()
    }
}

fn unknown_patch() -> f64 {
    UNKNOWN_PATCH
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn patch_or_unknown<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?
        .filter(|patch| patch.is_finite())
        .unwrap_or(UNKNOWN_PATCH))
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("expected spell number, got {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_defaults_for_sparse_records() {
        let item: Item = serde_json::from_str(r#"{"Id": 7, "Name": null, "Sources": null}"#).unwrap();
        assert_eq!(item.id, 7);
        assert_eq!(item.name(), "");
        assert_eq!(item.description(), "");
        assert!(item.sources.is_empty());
        assert!(item.has_unknown_patch());
    }

    #[test]
    fn test_source_keeps_extra_fields() {
        let source: Source = serde_json::from_str(
            r#"{"Categories": ["Gil"], "Costs": [{"ItemName": "金幣", "Quantity": 300}], "Npc": "Maisenta"}"#,
        )
        .unwrap();
        assert_eq!(source.categories, vec!["Gil".to_string()]);
        assert!(source.pays_with("金幣"));
        assert_eq!(source.details.get("Npc").and_then(|v| v.as_str()), Some("Maisenta"));
    }

    #[test]
    fn test_blue_mage_table_keyed_by_action() {
        let spells: Vec<BlueMageSpell> = serde_json::from_str(
            r#"[{"action": 11383, "no": "1", "method": [{"type": "mob", "name": "Lost Lamb"}]},
                {"action": 11384, "no": 2, "method": []}]"#,
        )
        .unwrap();
        let table = BlueMageTable::from_spells(spells);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(11383).and_then(|s| s.number()), Some(1));
        assert_eq!(table.get(11384).map(|s| s.no.as_str()), Some("2"));
        assert_eq!(table.get(11383).unwrap().method[0].kind, "mob");
        assert!(table.get(1).is_none());
    }
}

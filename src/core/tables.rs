//! Fixed lookup tables shared by the filter and sort code.

pub const BLUE_MAGE: &str = "Blue Mage";
pub const TRIPLE_TRIAD: &str = "Triple Triad";
pub const ORCHESTRIONS: &str = "Orchestrions";
pub const HAIRSTYLES: &str = "Hairstyles";

/// Patch numbers at or above this are "unknown".
pub const UNKNOWN_PATCH: f64 = 999.0;

pub const ACHIEVEMENT_CERTIFICATE_CATEGORY: &str = "AchievementCertificate";

/// Display name of the achievement certificate currency. The dataset never tags it as a
/// category, so filtering on [`ACHIEVEMENT_CERTIFICATE_CATEGORY`] matches this cost name.
pub const ACHIEVEMENT_CERTIFICATE_CURRENCY: &str = "成就幣";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceCategory {
    pub key: &'static str,
    pub name: &'static str,
    pub icon_id: u32,
}

const fn category(key: &'static str, name: &'static str, icon_id: u32) -> SourceCategory {
    SourceCategory { key, name, icon_id }
}

pub const SOURCE_CATEGORIES: &[SourceCategory] = &[
    category("Gil", "金幣", 65002),
    category("Scrips", "工票", 65028),
    category("MGP", "金碟幣", 65025),
    category("PvP", "PvP", 61806),
    category("Duty", "副本", 60414),
    category("Quest", "任務", 61419),
    category("Event", "活動", 61757),
    category("Tomestones", "神典石", 65086),
    category("DeepDungeon", "深層迷宮", 61824),
    category("BeastTribes", "蠻族", 65016),
    category("MogStation", "商城", 61831),
    category("Achievement", "成就", 6),
    category(ACHIEVEMENT_CERTIFICATE_CATEGORY, "成就幣", 65059),
    category("CompanySeals", "軍票", 65005),
    category("IslandSanctuary", "無人島", 65096),
    category("HuntSeals", "狩獵", 65034),
    category("TreasureHunts", "挖寶", 115),
    category("Crafting", "製作", 62202),
    category("Voyages", "遠航探索", 65035),
    category("Venture", "雇員探索", 65049),
    category("FirmamentFete", "蒼天街", 65073),
    category("FATE", "FATE", 60722),
    category("Mob", "野怪", 60004),
    category("Special", "特殊", 60073),
];

pub fn source_category(key: &str) -> Option<&'static SourceCategory> {
    SOURCE_CATEGORIES.iter().find(|category| category.key == key)
}

/// Maps a Blue Mage learning method to the filter category it counts as.
pub fn blue_mage_category(method_type: &str) -> Option<&'static str> {
    match method_type {
        "dungeon" | "trail" | "raid" => Some("Duty"), // "trail" is how the data spells trial
        "fate" => Some("FATE"),
        "mob" => Some("Mob"),
        "special" => Some("Special"),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatchBucket {
    pub label: &'static str,
    pub name: &'static str,
    pub min_patch: f64,
    pub max_patch: f64,
    pub icon_id: u32,
}

impl PatchBucket {
    pub fn contains(&self, patch: f64) -> bool {
        patch >= self.min_patch && patch <= self.max_patch
    }
}

pub const UNKNOWN_PATCH_LABEL: &str = "未知";

pub const PATCH_BUCKETS: &[PatchBucket] = &[
    PatchBucket { label: "7.x", name: "Dawntrail", min_patch: 7.0, max_patch: 7.99, icon_id: 61880 },
    PatchBucket { label: "6.x", name: "Endwalker", min_patch: 6.0, max_patch: 6.99, icon_id: 61879 },
    PatchBucket {
        label: "5.x",
        name: "Shadowbringers",
        min_patch: 5.0,
        max_patch: 5.99,
        icon_id: 61878,
    },
    PatchBucket { label: "4.x", name: "Stormblood", min_patch: 4.0, max_patch: 4.99, icon_id: 61877 },
    PatchBucket { label: "3.x", name: "Heavensward", min_patch: 3.0, max_patch: 3.99, icon_id: 61876 },
    PatchBucket {
        label: "2.x",
        name: "A Realm Reborn",
        min_patch: 2.0,
        max_patch: 2.99,
        icon_id: 61875,
    },
    PatchBucket {
        label: UNKNOWN_PATCH_LABEL,
        name: "未知",
        min_patch: UNKNOWN_PATCH,
        max_patch: 9999.0,
        icon_id: 60074,
    },
];

pub fn patch_bucket(label: &str) -> Option<&'static PatchBucket> {
    PATCH_BUCKETS.iter().find(|bucket| bucket.label == label)
}

/// Order column of the orchestrion category sheet.
pub fn orchestrion_category_order(category: &str) -> Option<u32> {
    let order = match category {
        "區域場景1" => 1,
        "區域場景2" => 2,
        "迷宮挑戰" => 11,
        "迷宮挑戰2" => 12,
        "討伐殲滅戰" => 21,
        "大型任務1" => 31,
        "大型任務2" => 32,
        "環境音" => 41,
        "任務相關" => 51,
        "其他" => 52,
        "季節活動" => 61,
        "商城與特典" => 71,
        _ => return None,
    };
    Some(order)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_buckets_cover_known_patches() {
        for patch in [2.0, 2.55, 3.0, 3.57, 4.0, 4.58, 5.0, 5.55, 6.0, 6.58, 7.0, 7.2, 999.0] {
            let hits = PATCH_BUCKETS.iter().filter(|bucket| bucket.contains(patch)).count();
            assert_eq!(hits, 1, "patch {patch} should land in exactly one bucket");
        }
        assert!(patch_bucket(UNKNOWN_PATCH_LABEL).unwrap().contains(UNKNOWN_PATCH));
    }

    #[test]
    fn test_blue_mage_method_mapping() {
        assert_eq!(blue_mage_category("trail"), Some("Duty"));
        assert_eq!(blue_mage_category("raid"), Some("Duty"));
        assert_eq!(blue_mage_category("fate"), Some("FATE"));
        assert_eq!(blue_mage_category("totem"), None);
    }

    #[test]
    fn test_category_tables() {
        assert_eq!(SOURCE_CATEGORIES.len(), 24);
        assert_eq!(source_category("Quest").map(|c| c.name), Some("任務"));
        assert_eq!(orchestrion_category_order("其他"), Some(52));
        assert_eq!(orchestrion_category_order("不存在"), None);
    }
}

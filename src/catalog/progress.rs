use std::{
    collections::BTreeSet,
    fmt,
};

use super::filter::should_exclude_from_progress;
use crate::core::Collection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    pub owned: usize,
    pub total: usize,
}

impl Progress {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.owned as f64 * 100.0 / self.total as f64
    }

    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.owned >= self.total
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} ({:.1}%)", self.owned, self.total, self.percent())
    }
}

/// Owned versus total over the items that count towards completion.
pub fn collection_progress(
    collection: &Collection,
    owned: &BTreeSet<u32>,
    exclude: &BTreeSet<String>,
) -> Progress {
    collection
        .items
        .iter()
        .filter(|item| !should_exclude_from_progress(item, exclude))
        .fold(Progress::default(), |mut progress, item| {
            progress.total += 1;
            if owned.contains(&item.id) {
                progress.owned += 1;
            }
            progress
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mounts() -> Collection {
        serde_json::from_str(
            r#"{"CollectionName": "Mounts", "Items": [
                {"Id": 1, "Sources": [{"Categories": ["Quest"]}]},
                {"Id": 2, "Sources": [{"Categories": ["MogStation"]}]},
                {"Id": 3, "Sources": []},
                {"Id": 4, "Sources": [{"Categories": ["Duty"]}]}
            ]}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_progress_skips_sourceless_items() {
        let progress = collection_progress(&mounts(), &BTreeSet::from([1, 3]), &BTreeSet::new());
        assert_eq!(progress, Progress { owned: 1, total: 3 });
    }

    #[test]
    fn test_progress_honors_exclusions() {
        let exclude = BTreeSet::from(["MogStation".to_string()]);
        let progress = collection_progress(&mounts(), &BTreeSet::from([1, 2, 4]), &exclude);
        assert_eq!(progress, Progress { owned: 2, total: 2 });
        assert!(progress.is_complete());
        assert_eq!(progress.to_string(), "2/2 (100.0%)");
    }

    #[test]
    fn test_empty_progress() {
        let progress = Progress::default();
        assert_eq!(progress.percent(), 0.0);
        assert!(!progress.is_complete());
    }
}

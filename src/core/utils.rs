use std::sync::OnceLock;

use regex::Regex;

use super::Item;

const ICON_BASE_URL: &str = "https://xivapi.com/i";
pub const FALLBACK_ICON_URL: &str = "https://xivapi.com/i/000000/000000.png";
pub const MISSING_NAME: &str = "???";
pub const UNKNOWN_PATCH_DISPLAY: &str = "未知";

/// Case-insensitive substring test. `query` must already be lowercase.
pub fn text_matches_search(text: &str, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    text.to_lowercase().contains(query)
}

pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

/// Icons live in folders of 1000, e.g. 61419 -> `/i/061000/061419.png`.
pub fn icon_url(icon_id: u32) -> String {
    let folder = icon_id / 1000 * 1000;
    format!("{ICON_BASE_URL}/{folder:06}/{icon_id:06}.png")
}

pub fn display_name(item: &Item) -> &str {
    match item.name() {
        "" => MISSING_NAME,
        name => name,
    }
}

pub fn display_patch(item: &Item) -> String {
    if let Some(patch) = item.display_patch.as_deref().filter(|p| !p.is_empty()) {
        return patch.to_string();
    }
    if item.has_unknown_patch() {
        return UNKNOWN_PATCH_DISPLAY.to_string();
    }
    item.patch_added.to_string()
}

/// Turns `<br>` into newlines and drops the remaining inline formatting tags.
pub fn clean_game_text(text: &str) -> String {
    static LINE_BREAK: OnceLock<Regex> = OnceLock::new();
    static TAG: OnceLock<Regex> = OnceLock::new();

    let line_break = LINE_BREAK.get_or_init(|| Regex::new(r"(?i)<br\s*/?>").unwrap());
    let tag = TAG.get_or_init(|| Regex::new(r"<[^<>]+>").unwrap());

    let text = line_break.replace_all(text, "\n");
    tag.replace_all(&text, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(json: &str) -> Item {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_icon_url() {
        assert_eq!(icon_url(61419), "https://xivapi.com/i/061000/061419.png");
        assert_eq!(icon_url(6), "https://xivapi.com/i/000000/000006.png");
    }

    #[test]
    fn test_search_matching() {
        assert!(text_matches_search("Black Chocobo", "chocobo"));
        assert!(!text_matches_search("Black Chocobo", "moogle"));
        assert!(text_matches_search("anything", ""));
        assert_eq!(normalize_query("  ChoCobo "), "chocobo");
    }

    #[test]
    fn test_clean_game_text() {
        let raw = "Summons a <UIForeground>chocobo</UIForeground>.<br>Rideable.<BR/>";
        assert_eq!(clean_game_text(raw), "Summons a chocobo.\nRideable.");
    }

    #[test]
    fn test_display_fallbacks() {
        let unnamed = item(r#"{"Id": 1}"#);
        assert_eq!(display_name(&unnamed), MISSING_NAME);
        assert_eq!(display_patch(&unnamed), UNKNOWN_PATCH_DISPLAY);

        let patched = item(r#"{"Id": 2, "Name": "Moogle", "PatchAdded": 6.1}"#);
        assert_eq!(display_patch(&patched), "6.1");

        let overridden = item(r#"{"Id": 3, "PatchAdded": 2.0, "DisplayPatch": "2.0 (ARR)"}"#);
        assert_eq!(display_patch(&overridden), "2.0 (ARR)");
    }
}

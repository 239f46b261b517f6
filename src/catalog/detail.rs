use super::profile::Acquisition;
use crate::core::{
    tables::{
        source_category,
        HAIRSTYLES,
    },
    utils::{
        clean_game_text,
        display_name,
        display_patch,
        FALLBACK_ICON_URL,
    },
    Item,
    ItemStore,
};

pub const DEFAULT_SPRITE_FRAMES: u32 = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sprite<'a> {
    pub url: &'a str,
    pub frames: u32,
}

impl Sprite<'_> {
    /// Horizontal background offset of `frame`, 0% for the first and 100% for the last.
    pub fn frame_position(&self, frame: u32) -> f64 {
        if self.frames <= 1 {
            return 0.0;
        }
        f64::from(frame.min(self.frames - 1)) * 100.0 / f64::from(self.frames - 1)
    }
}

/// Everything the detail panel shows for one item.
#[derive(Debug, Clone)]
pub struct ItemDetail<'a> {
    pub collection: &'a str,
    pub item: &'a Item,
    pub name: String,
    pub patch: String,
    pub description: String,
    pub icon_url: &'a str,
    pub acquisitions: Vec<Acquisition<'a>>,
    pub sprite: Option<Sprite<'a>>,
    pub owned: bool,
    pub wishlisted: bool,
}

impl<'a> ItemDetail<'a> {
    pub fn build(
        store: &'a ItemStore,
        collection: &'a str,
        item: &'a Item,
        owned: bool,
        wishlisted: bool,
    ) -> Self {
        let spell = store.blue_mage_spell(collection, item.id);

        let name = match spell {
            Some(spell) => format!("No.{} {}", spell.no, display_name(item)),
            None => display_name(item).to_string(),
        };

        let acquisitions = match spell {
            Some(spell) if !spell.method.is_empty() => {
                spell.method.iter().map(Acquisition::Spell).collect()
            }
            _ => item.sources.iter().map(Acquisition::Source).collect(),
        };

        let sprite = match (collection, item.sprite_url.as_deref()) {
            (HAIRSTYLES, Some(url)) if !url.is_empty() => Some(Sprite {
                url,
                frames: item.sprite_frames.filter(|&n| n > 0).unwrap_or(DEFAULT_SPRITE_FRAMES),
            }),
            _ => None,
        };

        let icon_url = match item.icon_url.as_str() {
            "" => FALLBACK_ICON_URL,
            url => url,
        };

        Self {
            collection,
            item,
            name,
            patch: display_patch(item),
            description: clean_game_text(item.description()),
            icon_url,
            acquisitions,
            sprite,
            owned,
            wishlisted,
        }
    }
}

/// One-line text form of an acquisition, e.g. `任務` or `金幣: 金幣 x300`.
pub fn describe_acquisition(acquisition: &Acquisition<'_>) -> String {
    let categories: Vec<&str> = acquisition
        .categories()
        .map(|key| source_category(key).map_or(key, |category| category.name))
        .collect();

    let mut text = match acquisition {
        Acquisition::Spell(method) if categories.is_empty() => method.kind.clone(),
        _ => categories.join(" / "),
    };

    if let Acquisition::Source(source) = acquisition {
        let costs: Vec<String> = source
            .costs
            .iter()
            .map(|cost| format!("{} x{}", cost.item_name, cost.quantity))
            .collect();
        if !costs.is_empty() {
            if !text.is_empty() {
                text.push_str(": ");
            }
            text.push_str(&costs.join(", "));
        }
    }

    text
}

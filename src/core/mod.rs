pub mod errors;
pub mod loader;
pub mod models;
pub mod store;
pub mod tables;
pub mod utils;

pub use errors::{
    BackupError,
    CatalogError,
};
pub use models::{
    BlueMageSpell,
    BlueMageTable,
    Collection,
    Cost,
    Dataset,
    Item,
    Source,
    SpellMethod,
};
pub use store::{
    ItemStore,
    SearchHit,
};

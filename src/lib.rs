pub mod catalog;
pub mod config;
pub mod core;
pub mod persistence;

pub use catalog::Browser;
pub use config::AppConfig;
pub use crate::core::{
    CatalogError,
    ItemStore,
};

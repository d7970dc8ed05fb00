pub mod analysis;
pub mod catalog;
pub mod config;
pub mod export;
pub mod format;
pub mod i18n;
pub mod layout;
pub mod load;
pub mod loaders;
pub mod merge;
pub mod model;
pub mod page;
pub mod scroll;
pub mod selection;
pub mod sidebar;
pub mod site;
pub mod views;

pub use i18n::Language;
pub use model::{Dataset, TotalPolicy, YearRecord};

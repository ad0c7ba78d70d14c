//! Trait seams implemented by other Flashbox crates.

pub mod settings;

pub use settings::SettingsStore;

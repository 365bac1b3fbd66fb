//! Core module - settings and shared error types

pub mod error;
pub mod settings;

pub use error::{CoreError, CoreResult};
pub use settings::{
    load_settings, load_settings_from, save_settings_system, save_settings_to, settings_path,
    MatchSettings,
};

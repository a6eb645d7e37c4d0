//! Configuration management for sakani.
//!
//! This module handles loading and saving configuration from `~/.sakani/`.

mod paths;
mod settings;

pub use paths::{Paths, ROOT_ENV};
pub use settings::{
    BackendConfig, ColorSetting, Config, GeneralConfig, SyncConfig, API_KEY_ENV, BASE_URL_ENV,
};

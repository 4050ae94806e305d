// Author: Dustin Pilgrim
// License: MIT

use std::ffi::OsString;
use std::path::PathBuf;

use wdprofile_core::{Result, StoreError};

use crate::config::Settings;

/// Everything store path resolution depends on, captured once at startup.
#[derive(Debug, Clone, Default)]
pub struct PathInputs {
    /// `--config` flag.
    pub cli: Option<PathBuf>,
    /// `$WDPROFILE_STORE`
    pub env_store: Option<PathBuf>,
    pub xdg_config_home: Option<PathBuf>,
    pub home: Option<PathBuf>,
}

// empty vars count as unset
fn non_empty(v: Option<OsString>) -> Option<PathBuf> {
    v.filter(|s| !s.is_empty()).map(PathBuf::from)
}

impl PathInputs {
    pub fn from_env(cli: Option<PathBuf>) -> Self {
        Self {
            cli,
            env_store: non_empty(std::env::var_os("WDPROFILE_STORE")),
            xdg_config_home: non_empty(std::env::var_os("XDG_CONFIG_HOME")),
            home: non_empty(std::env::var_os("HOME")),
        }
    }

    /// $XDG_CONFIG_HOME, falling back to ~/.config.
    pub fn config_dir(&self) -> Option<PathBuf> {
        self.xdg_config_home
            .clone()
            .or_else(|| self.home.as_ref().map(|h| h.join(".config")))
    }
}

/// Config file the layout is stored in.
///
/// Priority:
/// 1) --config
/// 2) $WDPROFILE_STORE
/// 3) store_path from the settings file (or the legacy wdisplays config)
/// 4) $XDG_CONFIG_HOME/kanshi/config, then ~/.config/kanshi/config
pub fn resolve_store_path(inputs: &PathInputs, settings: &Settings) -> Result<PathBuf> {
    if let Some(p) = inputs.cli.as_ref().or(inputs.env_store.as_ref()) {
        return Ok(p.clone());
    }

    if let Some(p) = &settings.store_path {
        return Ok(p.clone());
    }

    inputs
        .config_dir()
        .map(|dir| dir.join("kanshi").join("config"))
        .ok_or_else(|| StoreError::PathResolution("neither XDG_CONFIG_HOME nor HOME is set".into()))
}

pub fn default_log_path(file: &str) -> PathBuf {
    let base = std::env::var_os("XDG_STATE_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".local/state")))
        .unwrap_or_else(|| PathBuf::from("/tmp"));
    base.join("wdprofile").join(file)
}

// Author: Dustin Pilgrim
// License: MIT

use std::path::{Path, PathBuf};

use rune_cfg::RuneConfig;
use wdprofile_core::OutputNaming;

use crate::paths::PathInputs;

#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub store_path: Option<PathBuf>,
    pub output_naming: OutputNaming,
    /// Name for newly created profile blocks.
    pub profile_name: Option<String>,
}

pub fn load(inputs: &PathInputs) -> Result<Settings, String> {
    let Some(dir) = inputs.config_dir() else {
        return Ok(Settings::default());
    };

    let path = dir.join("wdprofile").join("wdprofile.rune");
    let mut settings = if path.exists() {
        let rc = RuneConfig::from_file(&path)
            .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
        parse_settings(&rc, inputs)?
    } else {
        Settings::default()
    };

    if settings.store_path.is_none() {
        settings.store_path = legacy_store_path(&dir.join("wdisplays").join("config"), inputs);
    }

    Ok(settings)
}

fn parse_settings(rc: &RuneConfig, inputs: &PathInputs) -> Result<Settings, String> {
    let mut settings = Settings::default();

    if !rc.has("wdprofile") {
        return Ok(settings);
    }

    if let Some(p) = rc
        .get_optional::<String>("wdprofile.store_path")
        .map_err(|e| format!("config error at wdprofile.store_path: {e}"))?
    {
        if !p.trim().is_empty() {
            settings.store_path = Some(expand_path(p.trim(), inputs));
        }
    }

    if let Some(naming) = rc
        .get_optional::<String>("wdprofile.output_naming")
        .map_err(|e| format!("config error at wdprofile.output_naming: {e}"))?
    {
        settings.output_naming = naming
            .parse::<OutputNaming>()
            .map_err(|e| format!("config error at wdprofile.output_naming: {e}"))?;
    }

    if let Some(name) = rc
        .get_optional::<String>("wdprofile.profile_name")
        .map_err(|e| format!("config error at wdprofile.profile_name: {e}"))?
    {
        let name = name.trim();
        if !name.is_empty() {
            settings.profile_name = Some(name.to_string());
        }
    }

    Ok(settings)
}

/// `store_path=<path>` from an old wdisplays config, if present.
fn legacy_store_path(path: &Path, inputs: &PathInputs) -> Option<PathBuf> {
    let text = std::fs::read_to_string(path).ok()?;
    parse_legacy_store_path(&text).map(|p| expand_path(p, inputs))
}

fn parse_legacy_store_path(text: &str) -> Option<&str> {
    text.lines()
        .filter(|l| l.trim_start().starts_with("store_path"))
        .find_map(|l| l.split_once('=').map(|(_, v)| v.trim()))
        .filter(|v| !v.is_empty())
}

fn expand_path(s: &str, inputs: &PathInputs) -> PathBuf {
    let Some(home) = inputs.home.as_ref() else {
        return PathBuf::from(s);
    };

    if let Some(rest) = s.strip_prefix("~/") {
        return home.join(rest);
    }

    PathBuf::from(s.replace("$env.HOME", &home.to_string_lossy()))
}

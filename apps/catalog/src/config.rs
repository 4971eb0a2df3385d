use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context};
use client_core::{CatalogEndpoints, DEFAULT_API_BASE_URL};
use serde::Deserialize;
use url::Url;

const DEFAULT_CONFIG_FILE: &str = "catalog.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    pub api_base_url: String,
    pub brands_url: Option<String>,
    pub models_url: Option<String>,
    pub products_url: Option<String>,
    /// Per-request transport timeout; 0 disables it.
    pub request_timeout_secs: u64,
    pub log_level: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            brands_url: None,
            models_url: None,
            products_url: None,
            request_timeout_secs: 30,
            log_level: "warn".into(),
        }
    }
}

impl ClientSettings {
    pub fn endpoints(&self) -> CatalogEndpoints {
        let defaults = CatalogEndpoints::from_base(&self.api_base_url);
        CatalogEndpoints {
            brands: self.brands_url.clone().unwrap_or(defaults.brands),
            models: self.models_url.clone().unwrap_or(defaults.models),
            products: self.products_url.clone().unwrap_or(defaults.products),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }

    fn apply_env<F>(&mut self, var: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = var("CATALOG_API_URL") {
            self.api_base_url = v;
        }
        if let Some(v) = var("APP__API_BASE_URL") {
            self.api_base_url = v;
        }
        if let Some(v) = var("APP__BRANDS_URL") {
            self.brands_url = Some(v);
        }
        if let Some(v) = var("APP__MODELS_URL") {
            self.models_url = Some(v);
        }
        if let Some(v) = var("APP__PRODUCTS_URL") {
            self.products_url = Some(v);
        }
        if let Some(v) = var("APP__REQUEST_TIMEOUT_SECS") {
            self.request_timeout_secs = v
                .trim()
                .parse()
                .with_context(|| format!("APP__REQUEST_TIMEOUT_SECS is not a number: '{v}'"))?;
        }
        if let Some(v) = var("APP__LOG_LEVEL") {
            self.log_level = v;
        }
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let endpoints = self.endpoints();
        for url in [&endpoints.brands, &endpoints.models, &endpoints.products] {
            let parsed = Url::parse(url).with_context(|| format!("invalid catalog url '{url}'"))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                bail!("catalog url '{url}' must use http or https");
            }
        }
        Ok(())
    }
}

/// Defaults, then the config file, then the environment.
///
/// An explicitly requested file must exist; the default `catalog.toml` is
/// optional.
pub fn load_settings(explicit_path: Option<&Path>) -> anyhow::Result<ClientSettings> {
    load_settings_with(explicit_path, |key| std::env::var(key).ok())
}

fn load_settings_with<F>(explicit_path: Option<&Path>, var: F) -> anyhow::Result<ClientSettings>
where
    F: Fn(&str) -> Option<String>,
{
    let (path, required) = match explicit_path {
        Some(path) => (path.to_path_buf(), true),
        None => match var("CATALOG_CONFIG") {
            Some(path) => (PathBuf::from(path), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        },
    };

    let mut settings = match fs::read_to_string(&path) {
        Ok(raw) => toml::from_str::<ClientSettings>(&raw)
            .with_context(|| format!("failed to parse settings file '{}'", path.display()))?,
        Err(err) if !required && err.kind() == std::io::ErrorKind::NotFound => {
            ClientSettings::default()
        }
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read settings file '{}'", path.display()))
        }
    };

    settings.apply_env(var)?;
    settings.validate()?;
    Ok(settings)
}

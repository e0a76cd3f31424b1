//! Persisted settings and their resolution against flags and environment.

mod storage;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use geode_core::{ApiUrl, ListSource};
use geode_file::FileSource;
use geode_http::{DEFAULT_TIMEOUT, HttpSource, Proxy};
use geode_list::ControllerConfig;

use crate::cli::SourceArgs;

pub use storage::{config_path, load, save};

/// API used when neither flag, environment nor config file names one.
pub const DEFAULT_API: &str = "https://api.mindat.org";

/// Settings stored in `config.json`. Unset keys fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debounce_ms: Option<u64>,
}

/// A settings key as named on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SettingKey {
    Api,
    Proxy,
    PageSize,
    DebounceMs,
}

/// Effective settings for one run.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub api: ApiUrl,
    pub proxy: Option<Proxy>,
    pub controller: ControllerConfig,
}

impl Settings {
    /// Set or clear (`None`) one key, validating the value.
    pub fn set(&mut self, key: SettingKey, value: Option<&str>) -> Result<()> {
        match key {
            SettingKey::Api => {
                if let Some(v) = value {
                    ApiUrl::new(v).context("Invalid API URL")?;
                }
                self.api = value.map(str::to_string);
            }
            SettingKey::Proxy => {
                if let Some(v) = value {
                    Proxy::new(v).context("Invalid proxy prefix")?;
                }
                self.proxy = value.map(str::to_string);
            }
            SettingKey::PageSize => {
                self.page_size = value
                    .map(|v| v.parse::<u32>().context("Page size must be a positive integer"))
                    .transpose()?;
                if self.page_size == Some(0) {
                    bail!("Page size must be at least 1");
                }
            }
            SettingKey::DebounceMs => {
                self.debounce_ms = value
                    .map(|v| v.parse::<u64>().context("Debounce must be milliseconds"))
                    .transpose()?;
            }
        }
        Ok(())
    }

    /// Merge with command-line flags and environment.
    ///
    /// Flags and environment are already folded together by clap, so the
    /// order is flag, environment, config file, default.
    pub fn resolve(&self, source: &SourceArgs) -> Result<Resolved> {
        let api = source
            .api
            .as_deref()
            .or(self.api.as_deref())
            .unwrap_or(DEFAULT_API);
        let api = ApiUrl::new(api).with_context(|| format!("Invalid API URL: {}", api))?;

        let proxy = source
            .proxy
            .as_deref()
            .or(self.proxy.as_deref())
            .filter(|p| !p.is_empty())
            .map(Proxy::new)
            .transpose()
            .context("Invalid proxy prefix")?;

        let mut controller = ControllerConfig::default();
        if let Some(page_size) = self.page_size {
            controller = controller.with_page_size(page_size);
        }
        if let Some(ms) = self.debounce_ms {
            controller = controller.with_debounce(Duration::from_millis(ms));
        }

        Ok(Resolved {
            api,
            proxy,
            controller,
        })
    }
}

impl Resolved {
    /// Open the list source the API URL points at.
    pub fn open_source(&self) -> Result<Arc<dyn ListSource>> {
        if self.api.is_local() {
            if self.proxy.is_some() {
                tracing::warn!(api = %self.api, "proxy ignored for file:// sources");
            }
            let source =
                FileSource::new(self.api.clone()).context("Failed to open file source")?;
            Ok(Arc::new(source))
        } else {
            let source =
                HttpSource::with_options(self.api.clone(), self.proxy.clone(), DEFAULT_TIMEOUT)
                    .context("Failed to create HTTP client")?;
            Ok(Arc::new(source))
        }
    }
}

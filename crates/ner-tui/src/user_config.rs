//! User configuration: default search, sort order, polling and keymaps.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ner_core::SortMode;
use serde::{Deserialize, Serialize};

/// Logical action name → key notation, e.g. `refreshThreads = "<F5>"`.
pub type Keymap = BTreeMap<String, String>;

/// Look up an override by action name, ignoring case.
pub fn keymap_entry<'a>(keymap: &'a Keymap, name: &str) -> Option<&'a str> {
    keymap
        .get(name)
        .or_else(|| {
            keymap
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v)
        })
        .map(String::as_str)
}

/// One keymap per dispatch scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Keymaps {
    #[serde(default)]
    pub main: Keymap,
    #[serde(default)]
    pub view_manager: Keymap,
    /// Navigation shared by every line-oriented view.
    #[serde(default)]
    pub general: Keymap,
    #[serde(default)]
    pub search: Keymap,
    #[serde(default)]
    pub thread_view: Keymap,
}

pub const DEFAULT_SEARCH: &str = "tag:inbox";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct NerConfig {
    /// Search opened at startup.
    pub default_search: String,
    pub sort: SortMode,
    /// Upper bound on each wait for the collector while filling a page.
    pub poll_interval_ms: u64,
    /// JSON mailbox served by the in-memory store. Empty mailbox if unset.
    pub mailbox: Option<PathBuf>,
    pub keymaps: Keymaps,
}

impl Default for NerConfig {
    fn default() -> Self {
        Self {
            default_search: DEFAULT_SEARCH.to_string(),
            sort: SortMode::default(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            mailbox: None,
            keymaps: Keymaps::default(),
        }
    }
}

impl NerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    /// Layer `~/.config/ner/config.toml` (optional) under `NER_*` environment
    /// variables. Anything unreadable falls back to the defaults.
    pub fn load() -> Self {
        Self::load_from(&Self::default_config_path())
    }

    /// Like [`NerConfig::load`] with an explicit file. A missing file is
    /// created with the defaults so there is something to edit.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            match Self::default().save_to_path(path) {
                Ok(()) => tracing::info!(path = %path.display(), "wrote default configuration"),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "could not write default configuration"),
            }
        }

        let built = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix("NER")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .and_then(|c| c.try_deserialize::<NerConfig>());
        match built {
            Ok(cfg) => {
                tracing::debug!(path = %path.display(), "configuration loaded");
                cfg
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "using default configuration");
                Self::default()
            }
        }
    }

    /// Save the configuration to the specified path, replacing it atomically.
    pub fn save_to_path(&self, path: &Path) -> color_eyre::Result<()> {
        let toml_str = toml::to_string_pretty(self)?;
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        std::fs::create_dir_all(&dir)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        use std::io::Write as _;
        tmp.write_all(toml_str.as_bytes())?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(path)?;
        Ok(())
    }

    /// Default config.toml path: ~/.config/ner/config.toml
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ner")
            .join("config.toml")
    }
}

//! Application configuration
//!
//! Every recognized option with its validated type and default, loaded and
//! checked once at startup. Unknown keys are a load error, not something
//! discovered at access time.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

const DEFAULT_TAIL_POLL_MS: u64 = 500;
const DEFAULT_BOOTSTRAP_LINE_LIMIT: usize = 5000;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct AppConfig {
    /// The client log file to follow. Discovered defaults are only a guess;
    /// external process discovery can overwrite this at runtime.
    pub log_file: Option<PathBuf>,

    // Retained for the ladder-feed collaborator's contract.
    pub league: Option<String>,
    pub character_name: Option<String>,
    pub account_name: Option<String>,

    /// Sleep between polls while the tail has no new data.
    pub tail_poll_ms: u64,
    /// How many trailing lines the startup bootstrap scans.
    pub bootstrap_line_limit: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_file: default_log_file(),
            league: None,
            character_name: None,
            account_name: None,
            tail_poll_ms: DEFAULT_TAIL_POLL_MS,
            bootstrap_line_limit: DEFAULT_BOOTSTRAP_LINE_LIMIT,
        }
    }
}

impl AppConfig {
    pub fn load() -> Self {
        let config: AppConfig = confy::load("waystone", "config").unwrap_or_default();
        config.validated()
    }

    pub fn save(self) {
        confy::store("waystone", "config", self).expect("Failed to save configuration");
    }

    fn validated(mut self) -> Self {
        if self.tail_poll_ms == 0 {
            warn!("tail_poll_ms of 0 would busy-loop, using default");
            self.tail_poll_ms = DEFAULT_TAIL_POLL_MS;
        }
        if self.bootstrap_line_limit == 0 {
            warn!("bootstrap_line_limit of 0 disables catch-up, using default");
            self.bootstrap_line_limit = DEFAULT_BOOTSTRAP_LINE_LIMIT;
        }
        self
    }
}

fn default_log_file() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        let candidate = PathBuf::from(
            "C:\\Program Files (x86)\\Grinding Gear Games\\Path of Exile 2\\logs\\Client.txt",
        );
        candidate.is_file().then_some(candidate)
    }
    #[cfg(all(unix, not(target_os = "macos")))]
    {
        dirs::home_dir()
            .map(|p| {
                p.join(".local/share/Steam/steamapps/common/Path of Exile 2/logs/Client.txt")
            })
            .filter(|p| p.is_file())
    }
    #[cfg(target_os = "macos")]
    {
        None
    }
}

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const APP_NAME: &str = "decompiler-menu";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemConfig {
    #[serde(default = "default_true")]
    pub open_last_session: bool,
    #[serde(default)]
    pub last_session_path: Option<PathBuf>,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_true() -> bool {
    true
}

fn default_theme() -> String {
    "Solarized Dark".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            open_last_session: true,
            last_session_path: None,
            theme: default_theme(),
            log_level: default_log_level(),
        }
    }
}

impl SystemConfig {
    pub fn load() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", APP_NAME) {
            let config_path = proj_dirs.config_dir().join("config.json");
            if config_path.exists()
                && let Ok(data) = std::fs::read_to_string(config_path)
                && let Ok(config) = serde_json::from_str(&data)
            {
                return config;
            }
        }
        Self::default()
    }

    pub fn save(&self) -> anyhow::Result<()> {
        if let Some(proj_dirs) = ProjectDirs::from("", "", APP_NAME) {
            let config_dir = proj_dirs.config_dir();
            std::fs::create_dir_all(config_dir)?;
            let config_path = config_dir.join("config.json");
            let data = serde_json::to_string_pretty(self)?;
            std::fs::write(config_path, data)?;
        }
        Ok(())
    }

    /// Default log file, next to the config.
    pub fn default_log_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.data_local_dir().join("decompiler-menu.log"))
    }

    pub fn level_filter(&self) -> log::LevelFilter {
        parse_level(&self.log_level).unwrap_or(log::LevelFilter::Info)
    }
}

pub fn parse_level(level: &str) -> Option<log::LevelFilter> {
    level.parse().ok()
}

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::clipboard::Clipboard;
use crate::config::SystemConfig;
use crate::core::{Address, AnalysisCore};
use crate::memory_core::MemoryCore;

/// Document-side state: the engine, the clipboard and persisted settings.
pub struct AppState {
    pub core: Box<dyn AnalysisCore>,
    pub clipboard: Box<dyn Clipboard>,
    pub system_config: SystemConfig,
    pub session_path: Option<PathBuf>,
}

impl AppState {
    pub fn new(
        core: Box<dyn AnalysisCore>,
        clipboard: Box<dyn Clipboard>,
        system_config: SystemConfig,
    ) -> Self {
        Self {
            core,
            clipboard,
            system_config,
            session_path: None,
        }
    }

    /// Picks the session to start with: the explicit path, then the last
    /// session from the config, then the bundled sample.
    pub fn resolve_initial_load(
        system_config: &SystemConfig,
        path: Option<&Path>,
    ) -> Result<(MemoryCore, Option<PathBuf>)> {
        if let Some(path) = path {
            return Ok((MemoryCore::load(path)?, Some(path.to_path_buf())));
        }
        if system_config.open_last_session
            && let Some(last) = &system_config.last_session_path
            && last.exists()
        {
            match MemoryCore::load(last) {
                Ok(core) => return Ok((core, Some(last.clone()))),
                Err(e) => log::warn!("could not reopen {}: {:#}", last.display(), e),
            }
        }
        Ok((MemoryCore::sample()?, None))
    }

    pub fn remember_session(&mut self, path: Option<PathBuf>) {
        self.session_path = path.clone();
        if path.is_some() && self.system_config.last_session_path != path {
            self.system_config.last_session_path = path;
            if let Err(e) = self.system_config.save() {
                log::warn!("could not save config: {:#}", e);
            }
        }
    }

    /// Addresses among `offsets` that carry a breakpoint, in line order.
    pub fn breakpoints_in(&self, offsets: &[Address]) -> Vec<Address> {
        let mut found: Vec<Address> = offsets
            .iter()
            .copied()
            .filter(|addr| self.core.breakpoint_at(*addr).is_some())
            .collect();
        found.dedup();
        found
    }

    pub fn session_name(&self) -> String {
        self.session_path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "sample session".to_string())
    }
}

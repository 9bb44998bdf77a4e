use directories::ProjectDirs;
use serde::Deserialize;
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use tracing::warn;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    /// Where `<name>.json` saves live. `None` is the working directory.
    pub(crate) save_dir: Option<PathBuf>,
    pub(crate) enable_color: bool,
    /// Suspense before a dungeon fight resolves.
    pub(crate) fight_pause_ms: u64,
    /// How often a napping pet is redrawn.
    pub(crate) nap_poll_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            save_dir: None,
            enable_color: true,
            fight_pause_ms: 1000,
            nap_poll_ms: 2000,
        }
    }
}

impl Settings {
    pub(crate) fn save_dir(&self) -> PathBuf {
        self.save_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "tamagotchi", "Tamagotchi")
}

/// `settings.json` in the platform data directory.
pub(crate) fn settings_path() -> Option<PathBuf> {
    Some(project_dirs()?.data_local_dir().join("settings.json"))
}

/// Missing settings are normal; broken ones are worth a warning.
pub(crate) fn load_settings(path: &Path) -> Settings {
    let text = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Settings::default(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not read settings, using defaults");
            return Settings::default();
        }
    };
    match serde_json::from_str::<Settings>(&text) {
        Ok(v) => v,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "malformed settings, using defaults");
            Settings::default()
        }
    }
}

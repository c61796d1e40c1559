//! Path utilities

use std::path::PathBuf;

/// Data directory (~/.sreagent), or `.sreagent` when no home is known
pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".sreagent"))
        .unwrap_or_else(|| PathBuf::from(".sreagent"))
}

/// Config file location
pub fn config_path() -> PathBuf {
    data_dir().join("config.json")
}

/// Default location of the user pattern file
pub fn patterns_path() -> PathBuf {
    data_dir().join("patterns.json")
}

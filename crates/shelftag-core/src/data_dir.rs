// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-aware config directory resolution.

use std::path::PathBuf;

/// File name of the configuration document inside the config dir.
pub const CONFIG_FILE: &str = "config.json";

/// Return the Shelftag configuration directory (not created).
pub fn config_dir() -> PathBuf {
    dirs_fallback().join("shelftag")
}

/// Return the default location of the configuration document.
pub fn default_config_path() -> PathBuf {
    config_dir().join(CONFIG_FILE)
}

fn dirs_fallback() -> PathBuf {
    // Try XDG config dir, then fallback to home
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        if !xdg.is_empty() {
            return PathBuf::from(xdg);
        }
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".config");
    }
    // Last resort
    PathBuf::from("/tmp")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_path_ends_with_config_file() {
        let path = default_config_path();
        assert!(path.ends_with("shelftag/config.json"));
    }
}

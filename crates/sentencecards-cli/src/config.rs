// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fs::read_to_string;
use std::path::Path;

use serde::Deserialize;

use crate::error::Fallible;

pub const CONFIG_FILE_NAME: &str = "sentencecards.toml";

/// Settings read from `sentencecards.toml` in the collection directory.
/// Every key is optional.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// The user whose cards commands operate on.
    pub user: String,
    /// Address the API server binds to.
    pub bind: String,
    pub port: u16,
    /// Maximum number of due cards returned at once.
    pub due_limit: usize,
    /// Default page size for listings.
    pub page_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user: "local".to_string(),
            bind: "127.0.0.1".to_string(),
            port: 8000,
            due_limit: 20,
            page_limit: 20,
        }
    }
}

impl Config {
    /// Load the configuration in `directory`, or the defaults if there is
    /// no configuration file.
    pub fn load(directory: &Path) -> Fallible<Self> {
        let path = directory.join(CONFIG_FILE_NAME);
        if !path.exists() {
            log::debug!("No configuration file, using defaults.");
            return Ok(Self::default());
        }
        let content = read_to_string(&path)?;
        let config: Config = toml::from_str(&content)?;
        log::debug!("Loaded configuration from {}.", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::fs::write;

    use tempfile::tempdir;

    use super::*;
    use crate::error::Fallible;

    #[test]
    fn test_defaults_without_file() -> Fallible<()> {
        let dir = tempdir()?;
        assert_eq!(Config::load(dir.path())?, Config::default());
        Ok(())
    }

    #[test]
    fn test_partial_file() -> Fallible<()> {
        let dir = tempdir()?;
        write(
            dir.path().join(CONFIG_FILE_NAME),
            "user = \"anna\"\nport = 9123\n",
        )?;
        let config = Config::load(dir.path())?;
        assert_eq!(config.user, "anna");
        assert_eq!(config.port, 9123);
        assert_eq!(config.due_limit, 20);
        Ok(())
    }

    #[test]
    fn test_unknown_key() -> Fallible<()> {
        let dir = tempdir()?;
        write(dir.path().join(CONFIG_FILE_NAME), "colour = \"blue\"\n")?;
        assert!(Config::load(dir.path()).is_err());
        Ok(())
    }
}

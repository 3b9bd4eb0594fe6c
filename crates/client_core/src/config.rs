//! Boot configuration: API key, user id, token, and display name are
//! owned externally and validated here for presence only. A missing key
//! is fatal; the session never starts without one.

use std::{collections::HashMap, fs, io, path::Path};

use shared::domain::{UserId, UserIdentity};

use crate::error::ConfigError;

const ENV_OVERRIDES: [(&str, &str); 5] = [
    ("CHAT_API_KEY", "api_key"),
    ("CHAT_USER_ID", "user_id"),
    ("CHAT_USER_TOKEN", "user_token"),
    ("CHAT_DISPLAY_NAME", "display_name"),
    ("CHAT_AVATAR_URL", "avatar_url"),
];

#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: String,
    pub user_id: String,
    pub user_token: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

impl Settings {
    /// Build from a flat key/value table, enforcing required keys.
    pub fn from_table(table: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let require = |key: &'static str| {
            table
                .get(key)
                .filter(|value| !value.is_empty())
                .cloned()
                .ok_or(ConfigError::Missing(key))
        };
        Ok(Self {
            api_key: require("api_key")?,
            user_id: require("user_id")?,
            user_token: require("user_token")?,
            display_name: require("display_name")?,
            avatar_url: table
                .get("avatar_url")
                .filter(|value| !value.is_empty())
                .cloned(),
        })
    }

    /// The identity handed to the backend connect call. The avatar falls
    /// back to a templated placeholder image.
    pub fn identity(&self) -> UserIdentity {
        let avatar_url = self.avatar_url.clone().unwrap_or_else(|| {
            format!(
                "https://getstream.io/random_png/?id={}&name={}",
                self.user_id, self.display_name
            )
        });
        UserIdentity {
            id: UserId::new(self.user_id.clone()),
            display_name: self.display_name.clone(),
            avatar_url: Some(avatar_url),
        }
    }
}

/// Load settings from a TOML file, then apply environment overrides
/// (`CHAT_API_KEY`, `CHAT_USER_ID`, `CHAT_USER_TOKEN`,
/// `CHAT_DISPLAY_NAME`, `CHAT_AVATAR_URL`). A missing file is fine as
/// long as the environment supplies the required keys.
pub fn load_settings(path: impl AsRef<Path>) -> Result<Settings, ConfigError> {
    load_settings_from(path, |key| std::env::var(key).ok())
}

fn load_settings_from(
    path: impl AsRef<Path>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Settings, ConfigError> {
    let mut table: HashMap<String, String> = match fs::read_to_string(path) {
        Ok(raw) => toml::from_str(&raw)?,
        Err(err) if err.kind() == io::ErrorKind::NotFound => HashMap::new(),
        Err(err) => return Err(ConfigError::Io(err)),
    };
    for (env_key, key) in ENV_OVERRIDES {
        if let Some(value) = env(env_key) {
            table.insert(key.to_string(), value);
        }
    }
    Settings::from_table(&table)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;

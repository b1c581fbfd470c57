use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

const CONFIG_ENV: &str = "KUBEPICK_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginConfig {
    pub source: Option<PathBuf>,
    pub kubectl: String,
    pub shell: String,
    pub context: Option<String>,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            source: None,
            kubectl: default_kubectl(),
            shell: default_shell(),
            context: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    kubectl: Option<String>,
    #[serde(default)]
    shell: Option<String>,
    #[serde(default)]
    context: Option<String>,
}

impl PluginConfig {
    /// Loads the first config file found, or defaults when there is none.
    pub fn discover() -> Result<Self> {
        match discover_config_path() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = Self::parse(&raw)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        Ok(Self {
            source: Some(path.to_path_buf()),
            ..config
        })
    }

    fn parse(raw: &str) -> Result<Self> {
        let parsed: ConfigFile = if raw.trim().is_empty() {
            ConfigFile::default()
        } else {
            serde_yaml::from_str(raw)?
        };

        Ok(Self {
            source: None,
            kubectl: non_blank(parsed.kubectl).unwrap_or_else(default_kubectl),
            shell: non_blank(parsed.shell).unwrap_or_else(default_shell),
            context: non_blank(parsed.context),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn default_kubectl() -> String {
    "kubectl".to_string()
}

fn default_shell() -> String {
    "/bin/sh".to_string()
}

fn discover_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV)
        && !path.trim().is_empty()
    {
        return Some(PathBuf::from(path));
    }

    let cwd_candidates = [PathBuf::from("kubepick.yaml"), PathBuf::from("kubepick.yml")];
    for candidate in cwd_candidates {
        if candidate.exists() {
            return Some(candidate);
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let user_candidates = [
            PathBuf::from(&home).join(".config/kubepick/config.yaml"),
            PathBuf::from(&home).join(".config/kubepick/config.yml"),
        ];
        for candidate in user_candidates {
            if candidate.exists() {
                return Some(candidate);
            }
        }
    }

    None
}

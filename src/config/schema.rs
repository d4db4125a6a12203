//! Configuration schema for vidscaffold
//!
//! Configuration is read from `vidscaffold.toml` in the workspace root, or
//! from `~/.config/vidscaffold/config.toml`. Every section is optional.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Environment applied to every spawned command
    pub environment: EnvironmentConfig,

    /// Backend target settings
    pub backend: BackendConfig,

    /// Frontend target settings
    pub frontend: FrontendConfig,

    /// Tools that must be present before any target is touched
    pub prerequisites: Vec<PrerequisiteConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            environment: EnvironmentConfig::default(),
            backend: BackendConfig::default(),
            frontend: FrontendConfig::default(),
            prerequisites: default_prerequisites(),
        }
    }
}

/// General settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Backend directory name, relative to the workspace root
    pub backend_dir: String,

    /// Frontend directory name, relative to the workspace root
    pub frontend_dir: String,

    /// Template root (defaults to the templates shipped with the crate)
    pub templates_dir: Option<PathBuf>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            backend_dir: "backend".to_string(),
            frontend_dir: "frontend".to_string(),
            templates_dir: None,
        }
    }
}

/// Environment for spawned commands
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// Variables removed before spawning (proxy settings by default)
    pub clear: Vec<String>,

    /// Variables set before spawning
    pub set: BTreeMap<String, String>,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            clear: [
                "http_proxy",
                "https_proxy",
                "HTTP_PROXY",
                "HTTPS_PROXY",
                "all_proxy",
                "ALL_PROXY",
                "no_proxy",
                "NO_PROXY",
                "npm_config_proxy",
                "npm_config_https_proxy",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            set: BTreeMap::new(),
        }
    }
}

/// Backend package lists
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Runtime dependencies
    pub packages: Vec<String>,

    /// Development dependencies
    pub dev_packages: Vec<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            packages: [
                "express",
                "sequelize",
                "sqlite3",
                "bull",
                "fluent-ffmpeg",
                "multer",
                "cors",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            dev_packages: vec!["nodemon".to_string(), "sequelize-cli".to_string()],
        }
    }
}

/// Frontend package list
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontendConfig {
    /// Runtime dependencies added after the generator ran
    pub packages: Vec<String>,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            packages: [
                "axios",
                "@mui/material",
                "@emotion/react",
                "@emotion/styled",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

/// A required external tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrerequisiteConfig {
    /// Executable name looked up on PATH
    pub name: String,

    /// Minimum version, e.g. "18.0.0"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_version: Option<String>,

    /// Remediation shown when the check fails
    #[serde(default)]
    pub hint: String,
}

fn default_prerequisites() -> Vec<PrerequisiteConfig> {
    vec![
        PrerequisiteConfig {
            name: "node".to_string(),
            min_version: Some("18.0.0".to_string()),
            hint: "Install Node.js 18 or newer from https://nodejs.org".to_string(),
        },
        PrerequisiteConfig {
            name: "npm".to_string(),
            min_version: None,
            hint: "npm ships with Node.js: https://nodejs.org".to_string(),
        },
        PrerequisiteConfig {
            name: "npx".to_string(),
            min_version: None,
            hint: "npx ships with npm 7+: run npm install -g npm".to_string(),
        },
        PrerequisiteConfig {
            name: "ffmpeg".to_string(),
            min_version: None,
            hint: "Install ffmpeg: https://ffmpeg.org/download.html".to_string(),
        },
    ]
}

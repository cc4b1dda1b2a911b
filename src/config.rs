//! Configuration file loading and management

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the per-project config file looked up in the working directory
pub const LOCAL_CONFIG: &str = "levelkit.toml";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Wall merging
    pub merge: MergeConfig,
    /// levelData.js conversion
    pub convert: ConvertConfig,
    /// Wall generation
    pub walls: WallsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Appended to the input file stem to name the output
    pub suffix: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Write `color` values as 0xrrggbb
    pub hex_colors: bool,
    /// Emit the stock levels ahead of the converted one
    pub include_builtin_levels: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WallsConfig {
    pub height: f64,
    pub thickness: f64,
    /// `materialType` of the objects that get walls
    pub ground_material: String,
    pub suffix: String,
}

// ============== Defaults ==============

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            suffix: "_optimized".to_string(),
        }
    }
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            hex_colors: false,
            include_builtin_levels: true,
        }
    }
}

impl Default for WallsConfig {
    fn default() -> Self {
        Self {
            height: 6.0,
            thickness: 0.5,
            ground_material: "ground".to_string(),
            suffix: "_walls".to_string(),
        }
    }
}

// ============== Loading ==============

impl Config {
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, content)?;
        Ok(())
    }

    /// `<config dir>/levelkit/config.toml`
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("levelkit").join("config.toml"))
    }

    /// Load by priority:
    /// 1. `levelkit.toml` in the working directory
    /// 2. `config.toml` in the user config directory
    /// 3. built-in defaults
    ///
    /// A file that exists but does not parse is skipped with a warning.
    pub fn load() -> Self {
        let local = Path::new(LOCAL_CONFIG);
        let candidates = std::iter::once(local.to_path_buf()).chain(Self::default_config_path());

        for path in candidates {
            if !path.exists() {
                continue;
            }
            match Self::load_from_file(&path) {
                Ok(config) => {
                    tracing::debug!("Loaded config: {}", path.display());
                    return config;
                }
                Err(e) => tracing::warn!("Ignoring config {}: {:#}", path.display(), e),
            }
        }

        Self::default()
    }

    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

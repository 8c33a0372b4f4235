use crate::errors::{MinifyError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Options that control minification and bundling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinifyOptions {
    /// Bundle required modules behind a generated loader (default: false)
    #[serde(default)]
    pub module_mode: bool,

    /// Source file extension used to map module names to paths (default: lua)
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Directory that module names are resolved against
    #[serde(default)]
    pub module_root: Option<String>,

    /// Comments whose body starts with this marker survive minification (default: #)
    #[serde(default = "default_pragma_marker")]
    pub pragma_marker: String,

    /// Write a `.map` file next to each output (default: true)
    #[serde(default = "default_true")]
    pub source_map: bool,

    /// Append the source map as a data URI comment (default: false)
    #[serde(default)]
    pub inline_source_map: bool,

    /// Embed each module's original text in the map's `sourcesContent` (default: false)
    #[serde(default)]
    pub sources_content: bool,

    /// Output directory for minified files
    #[serde(default)]
    pub out_dir: Option<String>,

    /// Extra module names to bundle even when no static require names them
    #[serde(default)]
    pub include: Vec<String>,
}

fn default_extension() -> String {
    "lua".to_string()
}

fn default_pragma_marker() -> String {
    "#".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for MinifyOptions {
    fn default() -> Self {
        Self {
            module_mode: false,
            extension: default_extension(),
            module_root: None,
            pragma_marker: default_pragma_marker(),
            source_map: true,
            inline_source_map: false,
            sources_content: false,
            out_dir: None,
            include: Vec::new(),
        }
    }
}

/// Main configuration, as stored in `luamin.yaml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinifyConfig {
    #[serde(default)]
    pub minify_options: MinifyOptions,
}

/// Values given on the command line; `None` keeps the file value.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub module_mode: Option<bool>,
    pub extension: Option<String>,
    pub module_root: Option<String>,
    pub pragma_marker: Option<String>,
    pub source_map: Option<bool>,
    pub inline_source_map: Option<bool>,
    pub sources_content: Option<bool>,
    pub out_dir: Option<String>,
    pub include: Option<Vec<String>>,
}

impl MinifyConfig {
    pub const DEFAULT_FILE_NAME: &'static str = "luamin.yaml";

    /// Load configuration from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| MinifyError::Config(e.to_string()))
    }

    /// Write the default configuration to a file
    pub fn init_file(path: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(&MinifyConfig::default())
            .map_err(|e| MinifyError::Config(e.to_string()))?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Apply CLI overrides on top of the file values
    pub fn merge(&mut self, overrides: &CliOverrides) {
        let options = &mut self.minify_options;
        if let Some(module_mode) = overrides.module_mode {
            options.module_mode = module_mode;
        }
        if let Some(ref extension) = overrides.extension {
            options.extension = extension.clone();
        }
        if let Some(ref root) = overrides.module_root {
            options.module_root = Some(root.clone());
        }
        if let Some(ref marker) = overrides.pragma_marker {
            options.pragma_marker = marker.clone();
        }
        if let Some(source_map) = overrides.source_map {
            options.source_map = source_map;
        }
        if let Some(inline) = overrides.inline_source_map {
            options.inline_source_map = inline;
        }
        if let Some(sources_content) = overrides.sources_content {
            options.sources_content = sources_content;
        }
        if let Some(ref out_dir) = overrides.out_dir {
            options.out_dir = Some(out_dir.clone());
        }
        if let Some(ref include) = overrides.include {
            options.include = include.clone();
        }
    }
}

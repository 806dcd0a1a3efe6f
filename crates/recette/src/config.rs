//! Engine configuration, read from YAML.
//!
//! ```yaml
//! template: report
//! template_dirs:
//!   - ./templates
//! reload: once        # or: always
//! annotate_links: true
//! ```
//!
//! Every key is optional.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{RecetteError, Result};
use crate::store::{ReloadPolicy, DEFAULT_TEMPLATE};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Name of the template to render.
    pub template: String,
    /// Directories searched for template files, highest priority first.
    pub template_dirs: Vec<PathBuf>,
    pub reload: ReloadPolicy,
    /// Whether rendered fields are wrapped in their `link_*` URLs.
    pub annotate_links: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
            template_dirs: Vec::new(),
            reload: ReloadPolicy::Once,
            annotate_links: true,
        }
    }
}

impl EngineConfig {
    /// Parses a YAML document. An empty document yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`RecetteError::Yaml`] for malformed YAML or unknown keys and
    /// [`RecetteError::Config`] for an empty template name.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str::<Self>(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Reads a YAML file. Relative template directories are resolved against
    /// the file's directory.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut config = Self::from_yaml(&fs::read_to_string(path)?)?;
        if let Some(base) = path.parent() {
            for dir in &mut config.template_dirs {
                if dir.is_relative() {
                    *dir = base.join(&*dir);
                }
            }
        }
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.template.trim().is_empty() {
            return Err(RecetteError::Config("template name is empty".into()));
        }
        Ok(())
    }
}

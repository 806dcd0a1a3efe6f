//! Template loading and caching.
//!
//! A [`TemplateStore`] resolves template names against three sources, in
//! priority order:
//!
//! 1. inline templates registered with [`TemplateStore::add_inline`]
//! 2. template directories registered with [`TemplateStore::add_dir`], in
//!    registration order
//! 3. embedded templates compiled into the crate
//!    ([`TemplateStore::add_embedded_defaults`])
//!
//! Names are relative paths with or without extension. For an extensionless
//! name the extensions in [`TEMPLATE_EXTENSIONS`] are tried in order, so
//! `"report"` finds `report.html` before `report.htm`.
//!
//! # Reload Policy
//!
//! | Policy | File templates | Use |
//! |--------|----------------|-----|
//! | [`ReloadPolicy::Once`] | read and parsed on first load, then cached | batch rendering |
//! | [`ReloadPolicy::Always`] | re-read on every load | editing a template while previewing |
//!
//! Inline and embedded templates cannot change and are always cached. The
//! store is an ordinary value: callers own it and decide its lifetime.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RecetteError, Result};
use crate::template::Template;

/// Recognized template extensions, highest priority first.
pub const TEMPLATE_EXTENSIONS: &[&str] = &[".html", ".htm"];

/// Name of the report template shipped with the crate.
pub const DEFAULT_TEMPLATE: &str = "report";

const EMBEDDED_REPORT: &str = include_str!("../templates/report.html");

/// When file templates are read from disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReloadPolicy {
    /// Re-read on every load.
    Always,
    /// Read once, then served from the cache.
    #[default]
    Once,
}

/// Strips a recognized extension from a template name.
pub fn strip_extension(name: &str) -> &str {
    TEMPLATE_EXTENSIONS
        .iter()
        .find_map(|ext| name.strip_suffix(ext))
        .unwrap_or(name)
}

fn has_extension(name: &str) -> bool {
    TEMPLATE_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}

/// Where a resolved template comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
enum TemplateSource {
    File(PathBuf),
    Memory,
}

/// Resolves, loads and caches templates.
#[derive(Debug, Default)]
pub struct TemplateStore {
    policy: ReloadPolicy,
    dirs: Vec<PathBuf>,
    inline: HashMap<String, String>,
    embedded: HashMap<String, String>,
    cache: HashMap<String, Arc<Template>>,
}

impl TemplateStore {
    pub fn new(policy: ReloadPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// A store that already knows the embedded report template.
    pub fn with_embedded_defaults(policy: ReloadPolicy) -> Self {
        let mut store = Self::new(policy);
        store.add_embedded_defaults();
        store
    }

    pub fn policy(&self) -> ReloadPolicy {
        self.policy
    }

    /// Registers a directory of template files.
    ///
    /// # Errors
    ///
    /// Returns [`RecetteError::DirectoryNotFound`] if the path does not exist or
    /// is not a directory.
    pub fn add_dir<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.is_dir() {
            return Err(RecetteError::DirectoryNotFound(path.to_path_buf()));
        }
        self.dirs.push(path.to_path_buf());
        self.cache.clear();
        Ok(())
    }

    /// Registers template text under a name. Shadows files and embedded
    /// templates with the same name.
    pub fn add_inline(&mut self, name: &str, source: impl Into<String>) {
        let key = strip_extension(name).to_string();
        self.cache.retain(|cached, _| strip_extension(cached) != key);
        self.inline.insert(key, source.into());
    }

    /// Registers the embedded report template as [`DEFAULT_TEMPLATE`].
    pub fn add_embedded_defaults(&mut self) {
        self.embedded
            .insert(DEFAULT_TEMPLATE.to_string(), EMBEDDED_REPORT.to_string());
    }

    /// Loads a template by name.
    ///
    /// # Errors
    ///
    /// Returns [`RecetteError::TemplateUnavailable`] when the name is invalid,
    /// matches no source, or its file cannot be read.
    pub fn load(&mut self, name: &str) -> Result<Arc<Template>> {
        validate_name(name)?;
        let key = if has_extension(name) {
            name.to_string()
        } else {
            strip_extension(name).to_string()
        };

        if let Some(cached) = self.cache.get(&key) {
            debug!(template = %key, "template cache hit");
            return Ok(Arc::clone(cached));
        }

        let (source, text) = self.read(name)?;
        let template = Arc::new(Template::parse(strip_extension(name), text));
        let cacheable = match source {
            TemplateSource::File(path) => {
                debug!(template = %key, path = %path.display(), "loaded template file");
                self.policy == ReloadPolicy::Once
            }
            TemplateSource::Memory => {
                debug!(template = %key, "loaded in-memory template");
                true
            }
        };
        if cacheable {
            self.cache.insert(key, Arc::clone(&template));
        }
        Ok(template)
    }

    /// Drops one cached template; the next load reads it again.
    pub fn invalidate(&mut self, name: &str) {
        let base = strip_extension(name);
        self.cache.retain(|cached, _| strip_extension(cached) != base);
    }

    /// Drops every cached template.
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    /// Registered template directories, in priority order.
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    fn read(&self, name: &str) -> Result<(TemplateSource, String)> {
        let base = strip_extension(name);
        if let Some(text) = self.inline.get(base) {
            return Ok((TemplateSource::Memory, text.clone()));
        }
        if let Some(path) = self.find_file(name) {
            let text = fs::read_to_string(&path)
                .map_err(|err| RecetteError::unavailable(name, err.to_string()))?;
            return Ok((TemplateSource::File(path), text));
        }
        if let Some(text) = self.embedded.get(base) {
            return Ok((TemplateSource::Memory, text.clone()));
        }
        Err(RecetteError::unavailable(
            name,
            format!(
                "not found ({} template directories searched, no embedded match)",
                self.dirs.len()
            ),
        ))
    }

    fn find_file(&self, name: &str) -> Option<PathBuf> {
        let candidates: Vec<String> = if has_extension(name) {
            vec![name.to_string()]
        } else {
            TEMPLATE_EXTENSIONS
                .iter()
                .map(|ext| format!("{}{}", name, ext))
                .collect()
        };
        self.dirs.iter().find_map(|dir| {
            candidates
                .iter()
                .map(|candidate| dir.join(candidate))
                .find(|path| path.is_file())
        })
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(RecetteError::unavailable(name, "empty template name"));
    }
    let path = Path::new(name);
    if path.is_absolute() || name.split(|c| c == '/' || c == '\\').any(|part| part == "..") {
        return Err(RecetteError::unavailable(
            name,
            "template names must be relative and stay inside the template directories",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_known_extensions() {
        assert_eq!(strip_extension("report.html"), "report");
        assert_eq!(strip_extension("a/b.htm"), "a/b");
        assert_eq!(strip_extension("notes.txt"), "notes.txt");
    }

    #[test]
    fn inline_shadows_embedded() {
        let mut store = TemplateStore::with_embedded_defaults(ReloadPolicy::Once);
        store.add_inline("report", "<p>inline</p>");
        let template = store.load("report").unwrap();
        assert_eq!(template.source(), "<p>inline</p>");
        assert_eq!(store.load("report.html").unwrap().source(), "<p>inline</p>");
    }

    #[test]
    fn embedded_report_has_markers() {
        let mut store = TemplateStore::with_embedded_defaults(ReloadPolicy::Once);
        let template = store.load(DEFAULT_TEMPLATE).unwrap();
        assert!(!template.index().is_empty());
    }

    #[test]
    fn unknown_template() {
        let mut store = TemplateStore::new(ReloadPolicy::Once);
        let err = store.load("missing").unwrap_err();
        assert!(matches!(err, RecetteError::TemplateUnavailable { ref name, .. } if name == "missing"));
    }

    #[test]
    fn rejects_escaping_names() {
        let mut store = TemplateStore::with_embedded_defaults(ReloadPolicy::Once);
        for name in ["", "../report", "a/../../b", "/etc/passwd"] {
            assert!(store.load(name).is_err(), "{name:?} should be rejected");
        }
    }

    #[test]
    fn missing_dir() {
        let mut store = TemplateStore::new(ReloadPolicy::Once);
        let err = store.add_dir("/definitely/not/here").unwrap_err();
        assert!(matches!(err, RecetteError::DirectoryNotFound(_)));
    }

    #[test]
    fn reload_policy_deserializes() {
        let policy: ReloadPolicy = serde_yaml::from_str("always").unwrap();
        assert_eq!(policy, ReloadPolicy::Always);
        assert_eq!(ReloadPolicy::default(), ReloadPolicy::Once);
    }
}

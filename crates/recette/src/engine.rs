//! The report engine: template store plus the render pipeline.

use std::sync::Arc;

use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::extract::extract_document;
use crate::links::annotate_document;
use crate::migrate::load_record;
use crate::populate::populate_document;
use crate::record::Record;
use crate::store::TemplateStore;
use crate::template::Template;

/// Renders records with the configured template.
///
/// # Example
///
/// ```rust
/// use recette::{EngineConfig, Record, ReportEngine};
///
/// let mut engine = ReportEngine::from_config(&EngineConfig::default())?;
/// let mut record = Record::new();
/// record.set("project_name", "Atlas");
/// let html = engine.render(&record)?;
/// assert!(html.contains(">Atlas<"));
/// # Ok::<(), recette::RecetteError>(())
/// ```
#[derive(Debug)]
pub struct ReportEngine {
    store: TemplateStore,
    config: EngineConfig,
}

impl ReportEngine {
    /// Builds an engine whose store knows the embedded report template and
    /// the configured directories.
    ///
    /// # Errors
    ///
    /// Fails if a configured template directory does not exist.
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        let mut store = TemplateStore::with_embedded_defaults(config.reload);
        for dir in &config.template_dirs {
            store.add_dir(dir)?;
        }
        Ok(Self::new(store, config.clone()))
    }

    pub fn new(store: TemplateStore, config: EngineConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store_mut(&mut self) -> &mut TemplateStore {
        &mut self.store
    }

    /// The configured template.
    pub fn template(&mut self) -> Result<Arc<Template>> {
        self.store.load(&self.config.template)
    }

    /// Renders a record.
    ///
    /// # Errors
    ///
    /// Fails only when the template cannot be loaded.
    pub fn render(&mut self, record: &Record) -> Result<String> {
        let template = self.template()?;
        let mut doc = populate_document(&template, record);
        if self.config.annotate_links {
            annotate_document(&mut doc, record);
        }
        info!(template = template.name(), "rendered report");
        Ok(doc.render())
    }

    /// Renders a persisted JSON record, migrating it first. An unreadable
    /// record renders as the default record.
    pub fn render_json(&mut self, raw: &str) -> Result<String> {
        let record = load_record(raw);
        self.render(&record)
    }

    /// Renders a record and reads back what the rendered report shows.
    pub fn preview(&mut self, record: &Record) -> Result<Record> {
        let template = self.template()?;
        let doc = populate_document(&template, record);
        let extracted = extract_document(&doc);
        debug!(fields = extracted.len(), "preview extracted");
        Ok(extracted)
    }

    /// Fields exposed by the configured template.
    pub fn catalog(&mut self) -> Result<Catalog> {
        let template = self.template()?;
        Ok(Catalog::from_template(&template))
    }
}

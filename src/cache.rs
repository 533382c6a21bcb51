//! Process-wide template cache.
//!
//! Parsing a template bundle touches the disk several times (descriptor,
//! two template text files), and every page of every document needs the
//! same parsed bundle. This module guarantees a bundle is loaded at most
//! once per process lifetime, no matter how many documents are being built
//! concurrently.
//!
//! # Design
//!
//! The cache is an explicit object created at process start and passed by
//! reference to every builder, not a global. Lookups are keyed by template
//! id and hand out `Arc<TemplateModel>` clones of a single shared parse.
//!
//! The contract is **insert-if-absent**: concurrent resolution of the same
//! id must not race two loads into the map. First-load-per-id is serialized
//! by holding the map lock across the load; the thread that wins the lock
//! does the one load, everyone else finds the entry. A failed load stores
//! nothing, so a later resolve retries from a clean slate rather than
//! serving a poisoned entry.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::template::{self, LoadError, TemplateModel};

/// Map from template id to its single parsed instance.
#[derive(Debug, Default)]
pub struct TemplateCache {
    templates: Mutex<HashMap<String, Arc<TemplateModel>>>,
}

impl TemplateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `id` to its parsed bundle, loading it from `templates_dir`
    /// on first use.
    ///
    /// Every call for the same id returns the same `Arc` (identity, not
    /// just equality), and the backing load runs exactly once even under
    /// concurrent resolution.
    pub fn resolve(
        &self,
        templates_dir: &Path,
        id: &str,
    ) -> Result<Arc<TemplateModel>, LoadError> {
        self.resolve_with(id, || template::load_bundle(templates_dir, id))
    }

    /// Insert-if-absent with an injectable loader. The lock is held across
    /// the load so a second resolver for the same id blocks until the first
    /// finished, then finds the cached entry.
    fn resolve_with(
        &self,
        id: &str,
        load: impl FnOnce() -> Result<TemplateModel, LoadError>,
    ) -> Result<Arc<TemplateModel>, LoadError> {
        let mut templates = self.templates.lock().expect("template cache poisoned");
        if let Some(tpl) = templates.get(id) {
            return Ok(Arc::clone(tpl));
        }
        let tpl = Arc::new(load()?);
        templates.insert(id.to_string(), Arc::clone(&tpl));
        Ok(tpl)
    }

    /// Number of cached bundles.
    pub fn len(&self) -> usize {
        self.templates.lock().expect("template cache poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

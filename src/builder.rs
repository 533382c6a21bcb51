//! Page assembly and output emission.
//!
//! The [`PageBuilder`] is the orchestrating seam of one document build: it
//! resolves the template bundle through the shared cache, binds page and
//! record data through [`crate::binder`], and emits output files plus the
//! bundle's declared resources.
//!
//! ## Page kinds
//!
//! - **List page** — one per document: the full collection is exported as
//!   the companion data file (`const data = {...};`), the list template is
//!   bound with page-level properties only, and the client script builds the
//!   visible list entries from the data file. The item model's placeholders
//!   intentionally survive the server pass.
//! - **Detail page** — one per movie, written under the pages subfolder and
//!   named by the record's `Filename`.
//!
//! ## Pagination
//!
//! The builder never infers page boundaries. The caller constructs one
//! [`PaginationContext`] per page (zero-based index, total count, optional
//! home/previous/next links) and the builder only renders it.
//!
//! ## Write discipline
//!
//! Every page write is atomic at page granularity: content goes to a
//! sibling `.tmp` file and is renamed into place. A failed page is absent
//! from the output, never truncated. Resource copies overwrite silently, so
//! repeating them per page call is a no-op in effect.

use serde_json::{Map, Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

use crate::binder::Bindings;
use crate::cache::TemplateCache;
use crate::config::SiteConfig;
use crate::model::{Movie, MovieCollection, title_key};
use crate::template::{LoadError, TemplateModel};

#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("record '{record}' cannot be serialized: {source}")]
    Binding {
        record: String,
        source: serde_json::Error,
    },
}

/// Variable names with a fixed meaning across every template bundle.
const VAR_DATA: &str = "data";
const VAR_PROPS: &str = "props";
const PROP_OUTPUT_PAGES: &str = "output.pages";
const PROP_OUTPUT_EXT: &str = "output.ext";
const PROP_BACKGROUND: &str = "background";
const PROP_BACKGROUND_IDLE: &str = "backgroundIdle";
const PROP_INDEX: &str = "movies.index";
const PROP_TOTAL: &str = "movies.total";
const PROP_LINK_HOME: &str = "movies.home";
const PROP_LINK_PREVIOUS: &str = "movies.previous";
const PROP_LINK_NEXT: &str = "movies.next";

/// Navigation state of one page, computed by the caller.
///
/// Page indexes are zero-based; `{{movies.index}}` substitutes the index
/// verbatim. Links are opaque to the builder — relative paths, absolute
/// urls, whatever the caller's site layout calls for.
#[derive(Debug, Clone, Default)]
pub struct PaginationContext {
    pub index: usize,
    pub total: usize,
    pub home: Option<String>,
    pub previous: Option<String>,
    pub next: Option<String>,
}

impl PaginationContext {
    pub fn new(index: usize, total: usize) -> Self {
        Self {
            index,
            total,
            ..Self::default()
        }
    }

    pub fn with_links(
        mut self,
        home: Option<String>,
        previous: Option<String>,
        next: Option<String>,
    ) -> Self {
        self.home = home;
        self.previous = previous;
        self.next = next;
        self
    }
}

/// A file written by one build call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub path: PathBuf,
}

/// Builds the pages of one document into one output directory.
pub struct PageBuilder<'a> {
    cache: &'a TemplateCache,
    config: &'a SiteConfig,
    templates_dir: PathBuf,
    output_dir: PathBuf,
}

impl<'a> PageBuilder<'a> {
    pub fn new(cache: &'a TemplateCache, config: &'a SiteConfig, output_dir: &Path) -> Self {
        Self {
            cache,
            config,
            templates_dir: PathBuf::from(&config.templates.dir),
            output_dir: output_dir.to_path_buf(),
        }
    }

    /// Build the document's list page.
    ///
    /// Exports the full collection as the companion data file, binds the
    /// list template with page-level properties (background = the bundle's
    /// list backdrop), writes the configured list filename, and copies the
    /// bundle's resources.
    pub fn build_list_page(
        &self,
        template_id: &str,
        collection: &MovieCollection,
        pagination: &PaginationContext,
    ) -> Result<OutputFile, BuildError> {
        let tpl = self.cache.resolve(&self.templates_dir, template_id)?;

        self.export_data(collection)?;

        let props = self.page_props(&tpl, pagination, None);
        let mut bindings = Bindings::new();
        self.bind_props(&mut bindings, &props)?;
        let page = bindings.apply(&tpl.list_text);

        let filename = format!("{}{}", tpl.list.filename, self.config.build.html_ext);
        let path = self.output_dir.join(filename);
        self.write_page(&path, &page)?;
        self.copy_resources(&tpl)?;

        Ok(OutputFile { path })
    }

    /// Build one movie's detail page under the pages subfolder.
    ///
    /// Integrates the record's canonical JSON at `{{data}}`, binds record
    /// and page properties (background = the record's full picture when it
    /// has one, else the bundle's detail backdrop), writes the record's
    /// `Filename`, and copies the bundle's resources.
    pub fn build_detail_page(
        &self,
        template_id: &str,
        movie: &Movie,
        pagination: &PaginationContext,
    ) -> Result<OutputFile, BuildError> {
        let tpl = self.cache.resolve(&self.templates_dir, template_id)?;

        let record = serde_json::to_value(movie).map_err(|source| BuildError::Binding {
            record: record_label(movie),
            source,
        })?;
        let data = serde_json::to_string(&record).map_err(|source| BuildError::Binding {
            record: record_label(movie),
            source,
        })?;

        let props = self.page_props(&tpl, pagination, Some(movie));
        let mut bindings = Bindings::new();
        bindings.set(VAR_DATA, data);
        self.bind_props(&mut bindings, &props)?;
        bindings.add_object(&record);
        let page = bindings.apply(&tpl.detail_text);

        let filename = movie
            .filename
            .clone()
            .unwrap_or_else(|| self.default_filename(movie));
        let path = self
            .output_dir
            .join(&self.config.build.pages_folder)
            .join(filename);
        self.write_page(&path, &page)?;
        self.copy_resources(&tpl)?;

        Ok(OutputFile { path })
    }

    /// Fallback detail filename for a record that skipped `setup`.
    fn default_filename(&self, movie: &Movie) -> String {
        let key = title_key(movie.title.as_deref().unwrap_or_default());
        format!("{key}{}", self.config.build.html_ext)
    }

    /// The flat page-level property bag for one page.
    fn page_props(
        &self,
        tpl: &TemplateModel,
        pagination: &PaginationContext,
        movie: Option<&Movie>,
    ) -> Map<String, Value> {
        let background = match movie {
            // Detail pages prefer the record's own full-size picture
            Some(movie) => movie
                .pic_full_url
                .clone()
                .or_else(|| tpl.detail.background.clone()),
            None => tpl.list.background.clone(),
        };

        let mut props = Map::new();
        props.insert(
            PROP_OUTPUT_PAGES.into(),
            json!(self.config.build.pages_folder),
        );
        props.insert(PROP_OUTPUT_EXT.into(), json!(self.config.build.html_ext));
        props.insert(PROP_BACKGROUND.into(), json!(background));
        props.insert(
            PROP_BACKGROUND_IDLE.into(),
            json!(tpl.detail.background_idle),
        );
        props.insert(PROP_INDEX.into(), json!(pagination.index));
        props.insert(PROP_TOTAL.into(), json!(pagination.total));
        props.insert(PROP_LINK_HOME.into(), json!(pagination.home));
        props.insert(PROP_LINK_PREVIOUS.into(), json!(pagination.previous));
        props.insert(PROP_LINK_NEXT.into(), json!(pagination.next));
        props
    }

    /// Bind the property bag: the whole bag as JSON at `{{props}}`, plus
    /// each entry under its own (already final) dotted name.
    fn bind_props(
        &self,
        bindings: &mut Bindings,
        props: &Map<String, Value>,
    ) -> Result<(), BuildError> {
        let serialized =
            serde_json::to_string(props).map_err(|source| BuildError::Binding {
                record: VAR_PROPS.to_string(),
                source,
            })?;
        bindings.set(VAR_PROPS, serialized);
        bindings.add_props(props);
        Ok(())
    }

    /// Write the companion data file: the collection's canonical JSON as an
    /// embeddable `const data = {...};` literal.
    fn export_data(&self, collection: &MovieCollection) -> Result<(), BuildError> {
        let json = serde_json::to_string(collection).map_err(|source| BuildError::Binding {
            record: "collection".to_string(),
            source,
        })?;
        let path = self.output_dir.join(&self.config.build.data_filename);
        self.write_page(&path, &format!("const data = {json};"))
    }

    /// Atomic page write: temp sibling, then rename into place. On failure
    /// the temp file is removed so nothing truncated is left behind.
    fn write_page(&self, path: &Path, content: &str) -> Result<(), BuildError> {
        let write_err = |source| BuildError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        if let Err(source) = fs::write(&tmp, content) {
            let _ = fs::remove_file(&tmp);
            return Err(write_err(source));
        }
        if let Err(source) = fs::rename(&tmp, path) {
            let _ = fs::remove_file(&tmp);
            return Err(write_err(source));
        }
        Ok(())
    }

    /// Copy the bundle's declared resources into the output directory.
    ///
    /// `/`-prefixed entries copy a whole directory preserving its relative
    /// layout; unprefixed entries copy a single file. Existing files are
    /// overwritten, never an error; entries missing from the bundle are
    /// skipped.
    fn copy_resources(&self, tpl: &TemplateModel) -> Result<(), BuildError> {
        for entry in &tpl.resources {
            match entry.strip_prefix('/') {
                Some(dir_name) => {
                    let src = tpl.dir.join(dir_name);
                    if src.is_dir() {
                        self.copy_dir(&src, &self.output_dir.join(dir_name))?;
                    }
                }
                None => {
                    let src = tpl.dir.join(entry);
                    if src.is_file() {
                        self.copy_file(&src, &self.output_dir.join(entry))?;
                    }
                }
            }
        }
        Ok(())
    }

    fn copy_dir(&self, src: &Path, dst: &Path) -> Result<(), BuildError> {
        for entry in WalkDir::new(src) {
            let entry = entry.map_err(|e| BuildError::Write {
                path: src.to_path_buf(),
                source: e.into(),
            })?;
            let rel = entry
                .path()
                .strip_prefix(src)
                .expect("walked path is under its root");
            let target = dst.join(rel);
            if entry.file_type().is_dir() {
                fs::create_dir_all(&target).map_err(|source| BuildError::Write {
                    path: target.clone(),
                    source,
                })?;
            } else {
                self.copy_file(entry.path(), &target)?;
            }
        }
        Ok(())
    }

    fn copy_file(&self, src: &Path, dst: &Path) -> Result<(), BuildError> {
        let write_err = |source| BuildError::Write {
            path: dst.to_path_buf(),
            source,
        };
        if let Some(parent) = dst.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::copy(src, dst).map_err(write_err)?;
        Ok(())
    }
}

/// Human-readable identifier for a record in error messages: provider id,
/// else key, else title.
fn record_label(movie: &Movie) -> String {
    movie
        .id
        .clone()
        .or_else(|| movie.key.clone())
        .or_else(|| movie.title.clone())
        .unwrap_or_else(|| "<unidentified record>".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{sample_collection, write_template_bundle};
    use tempfile::TempDir;

    struct Fixture {
        _tmp: TempDir,
        cache: TemplateCache,
        config: SiteConfig,
        output_dir: PathBuf,
    }

    /// Template bundle + config wired to a temp directory.
    fn fixture() -> Fixture {
        let tmp = TempDir::new().unwrap();
        let templates_dir = tmp.path().join("templates");
        std::fs::create_dir_all(&templates_dir).unwrap();
        write_template_bundle(&templates_dir, "dark");

        let mut config = SiteConfig::default();
        config.templates.dir = templates_dir.to_string_lossy().into_owned();
        let output_dir = tmp.path().join("dist");

        Fixture {
            cache: TemplateCache::new(),
            config,
            output_dir,
            _tmp: tmp,
        }
    }

    // =========================================================================
    // List pages
    // =========================================================================

    #[test]
    fn list_page_binds_pagination_verbatim() {
        let f = fixture();
        let builder = PageBuilder::new(&f.cache, &f.config, &f.output_dir);
        let collection = sample_collection();

        let out = builder
            .build_list_page("dark", &collection, &PaginationContext::new(0, 1))
            .unwrap();

        let html = std::fs::read_to_string(&out.path).unwrap();
        assert!(html.contains("page 0 of 1"));
        assert_eq!(out.path, f.output_dir.join("index.html"));
    }

    #[test]
    fn list_page_uses_list_background() {
        let f = fixture();
        let builder = PageBuilder::new(&f.cache, &f.config, &f.output_dir);

        let out = builder
            .build_list_page("dark", &sample_collection(), &PaginationContext::new(0, 1))
            .unwrap();

        let html = std::fs::read_to_string(&out.path).unwrap();
        assert!(html.contains("img/back.jpg"));
    }

    #[test]
    fn list_page_exports_data_file() {
        let f = fixture();
        let builder = PageBuilder::new(&f.cache, &f.config, &f.output_dir);

        builder
            .build_list_page("dark", &sample_collection(), &PaginationContext::new(0, 1))
            .unwrap();

        let data = std::fs::read_to_string(f.output_dir.join("data.js")).unwrap();
        assert!(data.starts_with("const data = {"));
        assert!(data.ends_with("};"));
        assert!(data.contains("\"Movies\""));
        assert!(data.contains("Heat"));
    }

    #[test]
    fn list_page_leaves_item_model_placeholders() {
        let f = fixture();
        let builder = PageBuilder::new(&f.cache, &f.config, &f.output_dir);

        let out = builder
            .build_list_page("dark", &sample_collection(), &PaginationContext::new(0, 1))
            .unwrap();

        // Record-level placeholders belong to the client pass
        let html = std::fs::read_to_string(&out.path).unwrap();
        assert!(html.contains("{{title}}"));
    }

    #[test]
    fn list_page_copies_declared_resources() {
        let f = fixture();
        let builder = PageBuilder::new(&f.cache, &f.config, &f.output_dir);

        builder
            .build_list_page("dark", &sample_collection(), &PaginationContext::new(0, 1))
            .unwrap();

        assert!(f.output_dir.join("css/style.css").exists());
        assert!(f.output_dir.join("js/template.js").exists());
        assert!(f.output_dir.join("favicon.svg").exists());
    }

    #[test]
    fn resource_copy_is_idempotent() {
        let f = fixture();
        let builder = PageBuilder::new(&f.cache, &f.config, &f.output_dir);
        let collection = sample_collection();

        builder
            .build_list_page("dark", &collection, &PaginationContext::new(0, 1))
            .unwrap();
        // Second build overwrites resources without error
        builder
            .build_list_page("dark", &collection, &PaginationContext::new(0, 1))
            .unwrap();

        assert!(f.output_dir.join("css/style.css").exists());
    }

    #[test]
    fn pagination_links_substitute() {
        let f = fixture();
        let builder = PageBuilder::new(&f.cache, &f.config, &f.output_dir);
        let pagination = PaginationContext::new(1, 3).with_links(
            Some("../first/index.html".to_string()),
            Some("../first/index.html".to_string()),
            Some("../third/index.html".to_string()),
        );

        let out = builder
            .build_list_page("dark", &sample_collection(), &pagination)
            .unwrap();

        let html = std::fs::read_to_string(&out.path).unwrap();
        assert!(html.contains(r#"href="../third/index.html""#));
        assert!(html.contains("page 1 of 3"));
    }

    // =========================================================================
    // Detail pages
    // =========================================================================

    #[test]
    fn detail_page_lands_in_pages_folder_under_filename() {
        let f = fixture();
        let builder = PageBuilder::new(&f.cache, &f.config, &f.output_dir);
        let collection = sample_collection();
        let movie = &collection.movies[0];

        let out = builder
            .build_detail_page("dark", movie, &PaginationContext::new(0, 1))
            .unwrap();

        assert_eq!(
            out.path,
            f.output_dir
                .join("pages")
                .join(movie.filename.as_deref().unwrap())
        );
        assert!(out.path.exists());
    }

    #[test]
    fn detail_page_integrates_data_and_fields() {
        let f = fixture();
        let builder = PageBuilder::new(&f.cache, &f.config, &f.output_dir);
        let collection = sample_collection();
        let movie = &collection.movies[0];

        let out = builder
            .build_detail_page("dark", movie, &PaginationContext::new(0, 1))
            .unwrap();

        let html = std::fs::read_to_string(&out.path).unwrap();
        assert!(html.contains("const data = {"));
        assert!(html.contains("<h1>Heat</h1>"));
        assert!(html.contains("Michael Mann"));
        // Interests joined by the separator fragment
        assert!(html.contains(r#"Crime<span class="hsep"></span>Thriller"#));
    }

    #[test]
    fn detail_background_prefers_record_picture() {
        let f = fixture();
        let builder = PageBuilder::new(&f.cache, &f.config, &f.output_dir);
        let collection = sample_collection();

        let with_pic = &collection.movies[0];
        let out = builder
            .build_detail_page("dark", with_pic, &PaginationContext::new(0, 1))
            .unwrap();
        let html = std::fs::read_to_string(&out.path).unwrap();
        assert!(html.contains("heat-full.jpg"));
    }

    #[test]
    fn detail_background_falls_back_to_bundle_detail_backdrop() {
        let f = fixture();
        let builder = PageBuilder::new(&f.cache, &f.config, &f.output_dir);
        let collection = sample_collection();

        let without_pic = &collection.movies[1];
        assert!(without_pic.pic_full_url.is_none());
        let out = builder
            .build_detail_page("dark", without_pic, &PaginationContext::new(0, 1))
            .unwrap();
        let html = std::fs::read_to_string(&out.path).unwrap();
        assert!(html.contains("img/detail.jpg"));
    }

    #[test]
    fn detail_page_unknown_placeholders_stay_verbatim() {
        let f = fixture();
        let builder = PageBuilder::new(&f.cache, &f.config, &f.output_dir);
        let collection = sample_collection();

        let out = builder
            .build_detail_page("dark", &collection.movies[0], &PaginationContext::new(0, 1))
            .unwrap();

        let html = std::fs::read_to_string(&out.path).unwrap();
        assert!(html.contains("{{notAThing}}"));
    }

    #[test]
    fn missing_template_is_load_error() {
        let f = fixture();
        let builder = PageBuilder::new(&f.cache, &f.config, &f.output_dir);

        let err = builder
            .build_list_page("nope", &sample_collection(), &PaginationContext::new(0, 1))
            .unwrap_err();
        assert!(matches!(err, BuildError::Load(_)));
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn failed_write_leaves_no_partial_page() {
        let f = fixture();
        let builder = PageBuilder::new(&f.cache, &f.config, &f.output_dir);
        let collection = sample_collection();

        // A directory squatting on the list page path makes the rename fail
        let list_path = f.output_dir.join("index.html");
        std::fs::create_dir_all(&list_path).unwrap();

        let err = builder
            .build_list_page("dark", &collection, &PaginationContext::new(0, 1))
            .unwrap_err();
        assert!(matches!(err, BuildError::Write { .. }));
        // No truncated file, no leftover temp
        assert!(list_path.is_dir());
        assert!(!f.output_dir.join("index.html.tmp").exists());
    }

    // =========================================================================
    // Property bag
    // =========================================================================

    #[test]
    fn props_json_is_embedded_for_client_use() {
        let f = fixture();
        let builder = PageBuilder::new(&f.cache, &f.config, &f.output_dir);

        let out = builder
            .build_list_page("dark", &sample_collection(), &PaginationContext::new(0, 1))
            .unwrap();

        let html = std::fs::read_to_string(&out.path).unwrap();
        assert!(html.contains(r#"const props = {"#));
        assert!(html.contains(r#""output.pages":"pages""#));
        assert!(html.contains(r#""output.ext":".html""#));
    }
}

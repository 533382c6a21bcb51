//! Template bundle model and loading.
//!
//! A template bundle is a directory under the configured templates root,
//! named by its template id:
//!
//! ```text
//! templates/dark/
//! ├── template.toml        # bundle descriptor (name, resources, options)
//! ├── list.html            # list-page template text
//! ├── detail.html          # detail-page template text
//! └── css/, js/, img/ ...  # resources named by the descriptor
//! ```
//!
//! ## Descriptor format
//!
//! ```toml
//! name = "Dark"
//! resources = ["/css", "/js", "/img", "favicon.svg"]
//!
//! [list]
//! filename = "index"            # output name, site extension appended
//! background = "img/back.jpg"   # list page backdrop
//!
//! [detail]
//! background = "img/detail.jpg" # fallback when a movie has no full picture
//! background_idle = "img/idle.jpg"
//! ```
//!
//! A resource entry starting with `/` names a whole directory to copy into
//! the output; an unprefixed entry names a single file. Template text files
//! default to `list.html` / `detail.html` and can be renamed through the
//! `[content]` table.
//!
//! Bundles are parsed once per process by [`crate::cache::TemplateCache`];
//! this module only knows how to turn a directory into a [`TemplateModel`].

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("template bundle '{id}' not found at {path}")]
    NotFound { id: String, path: PathBuf },
    #[error("template bundle '{id}': cannot read {path}: {source}")]
    Unreadable {
        id: String,
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("template bundle '{id}': malformed descriptor: {source}")]
    Descriptor {
        id: String,
        source: toml::de::Error,
    },
}

/// Name of the bundle descriptor file inside a template directory.
const DESCRIPTOR_FILENAME: &str = "template.toml";

/// A parsed template bundle, shared read-only across all pages of a build.
#[derive(Debug)]
pub struct TemplateModel {
    /// Template id — the bundle directory name.
    pub id: String,
    /// Display name from the descriptor.
    pub name: String,
    /// Absolute-ish path of the bundle directory (resource copy source).
    pub dir: PathBuf,
    /// Raw list-page template text.
    pub list_text: String,
    /// Raw detail-page template text.
    pub detail_text: String,
    /// Resource manifest: `/`-prefixed entries are directories, the rest
    /// single files, all relative to the bundle directory.
    pub resources: Vec<String>,
    /// List-page options.
    pub list: ListOptions,
    /// Detail-page options.
    pub detail: DetailOptions,
}

/// List-page options from the descriptor.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ListOptions {
    /// Output filename without extension; the site extension is appended.
    pub filename: String,
    /// Backdrop for list pages (also the fallback nothing else overrides).
    pub background: Option<String>,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            filename: "index".to_string(),
            background: None,
        }
    }
}

/// Detail-page options from the descriptor.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DetailOptions {
    /// Fallback backdrop used when a movie carries no full-size picture.
    pub background: Option<String>,
    /// Backdrop shown while the real background is still loading.
    pub background_idle: Option<String>,
}

/// On-disk descriptor shape (`template.toml`).
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct Descriptor {
    name: Option<String>,
    resources: Vec<String>,
    content: ContentFiles,
    list: ListOptions,
    detail: DetailOptions,
}

/// Template text file names, overridable per bundle.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ContentFiles {
    list: String,
    detail: String,
}

impl Default for ContentFiles {
    fn default() -> Self {
        Self {
            list: "list.html".to_string(),
            detail: "detail.html".to_string(),
        }
    }
}

/// Load and parse the bundle for `id` under `templates_dir`.
///
/// Fails with a [`LoadError`] naming the id when the directory, descriptor,
/// or either template text file is missing or unreadable. Never returns a
/// partially populated model.
pub fn load_bundle(templates_dir: &Path, id: &str) -> Result<TemplateModel, LoadError> {
    let dir = templates_dir.join(id);
    if !dir.is_dir() {
        return Err(LoadError::NotFound {
            id: id.to_string(),
            path: dir,
        });
    }

    let descriptor_path = dir.join(DESCRIPTOR_FILENAME);
    let descriptor_text = read_bundle_file(id, &descriptor_path)?;
    let descriptor: Descriptor =
        toml::from_str(&descriptor_text).map_err(|source| LoadError::Descriptor {
            id: id.to_string(),
            source,
        })?;

    let list_text = read_bundle_file(id, &dir.join(&descriptor.content.list))?;
    let detail_text = read_bundle_file(id, &dir.join(&descriptor.content.detail))?;

    Ok(TemplateModel {
        id: id.to_string(),
        name: descriptor.name.unwrap_or_else(|| id.to_string()),
        dir,
        list_text,
        detail_text,
        resources: descriptor.resources,
        list: descriptor.list,
        detail: descriptor.detail,
    })
}

fn read_bundle_file(id: &str, path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| match source.kind() {
        std::io::ErrorKind::NotFound => LoadError::NotFound {
            id: id.to_string(),
            path: path.to_path_buf(),
        },
        _ => LoadError::Unreadable {
            id: id.to_string(),
            path: path.to_path_buf(),
            source,
        },
    })
}

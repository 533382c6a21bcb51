//! # moviedeck
//!
//! A static site generator for scraped movie catalogs. A JSON feed of movie
//! records goes in; a browsable HTML site comes out — one list page per
//! document, one detail page per movie, template assets copied alongside,
//! and a companion data file for the client script.
//!
//! # Architecture: Record Set → Bound Pages
//!
//! One invocation turns each input feed into one document:
//!
//! ```text
//! 1. Normalize   feed.json   →  MovieCollection   (filter, dedupe, sort, keys)
//! 2. Resolve     template id →  TemplateModel     (cached, loaded once per process)
//! 3. Bind        template + records → page text    (literal {{name}} substitution)
//! 4. Emit        page text   →  site/             (atomic writes + resource copies)
//! ```
//!
//! Templating is deliberately **not** a template language: binding is a
//! single find/replace pass over literal `{{name}}` tokens. Unresolved
//! placeholders stay in the text — that is a feature, not an error, because
//! the list page's item model is bound in the browser by the bundle's own
//! script, against the very same data shape the server exported. The
//! [`render`] module pins those client semantics as pure, tested functions.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`model`] | Movie record types, collection normalization, key/filename derivation |
//! | [`template`] | Template bundle model and loading (descriptor + template text + resources) |
//! | [`cache`] | Process-wide template cache: one load per template id, shared across builds |
//! | [`binder`] | Property flattening, per-field list renderers, single-pass placeholder substitution |
//! | [`builder`] | Page assembly: list/detail pages, data export, atomic writes, resource copies |
//! | [`render`] | Client render engine semantics over a plain element tree, plus backdrop geometry |
//! | [`config`] | `config.toml` loading and validation |
//! | [`output`] | CLI output formatting — pure `format_*` functions with `print_*` wrappers |
//!
//! # Design Decisions
//!
//! ## String Substitution Over a Template Engine
//!
//! The same `{{name}}` tokens are bound twice — once on the server, once in
//! the browser against the exported data file. Keeping binding as literal
//! find/replace keeps the two sides trivially in sync; a real template
//! engine would have to be ported to the client or abandoned there. The
//! contract that makes this safe: substitution never re-scans bound values,
//! so no value can smuggle in further expansion.
//!
//! ## One Parse Per Template Bundle
//!
//! Documents built in the same process — including concurrently on the
//! rayon pool — share one [`cache::TemplateCache`]. The cache owns every
//! parsed [`template::TemplateModel`] and hands out `Arc` clones;
//! first-load-per-id is serialized so concurrent builds cannot race two
//! loads of the same bundle.
//!
//! ## Absent Over Truncated
//!
//! Page writes go to a temp sibling and are renamed into place. A build
//! that dies mid-page leaves no half-written file that could be mistaken
//! for output; the page is simply absent.

pub mod binder;
pub mod builder;
pub mod cache;
pub mod config;
pub mod model;
pub mod output;
pub mod render;
pub mod template;

#[cfg(test)]
pub(crate) mod test_helpers;

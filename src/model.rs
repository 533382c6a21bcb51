//! Movie record types shared across the build pipeline.
//!
//! Records arrive from the scraping front end as JSON with PascalCase field
//! names; that shape is also what the generated pages' client script consumes,
//! so the serde representation here keeps it (`#[serde(rename_all =
//! "PascalCase")]`). The builder serializes these types back out verbatim as
//! the companion data file.
//!
//! ## Normalization
//!
//! A feed goes through `filter` → `distinct` → `sort` → `setup` before any
//! page is built:
//!
//! - [`MovieCollection::filter`] drops records without a usable title
//! - [`MovieCollection::distinct`] keeps the first occurrence per provider id
//! - [`MovieCollection::sort`] orders by title, untitled records first
//! - [`MovieCollection::setup`] assigns the derived `key` and `filename`
//!
//! `filter`, `distinct` and `sort` are idempotent; [`MovieCollection::merge`]
//! is append-only and order-sensitive.
//!
//! ## Derived fields
//!
//! `key` is a content hash of the title (truncated SHA-256 hex). It is the
//! record's stable identity for the whole build: deduplication of rendered
//! items, the HTML element id of the list entry, and the default output
//! filename stem of the detail page. `key` and `filename` are assigned
//! exactly once; assignment never overwrites a value that is already set.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Length of the truncated title-hash hex string used as a record key.
/// Long enough to be collision-safe for catalog-sized collections while
/// staying readable as an element id and filename stem.
const KEY_HEX_LEN: usize = 16;

/// A single scraped movie record.
///
/// Every field except `url` is optional or defaults to empty: scrapes are
/// ragged and the template layer is built to tolerate holes (that is what
/// the conditional-class conventions exist for).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Movie {
    /// Url of the scraped detail page.
    pub url: String,
    /// Provider movie id.
    pub id: Option<String>,
    /// Title content hash, assigned by [`Movie::setup`].
    pub key: Option<String>,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub interests: Vec<String>,
    pub rating: Option<String>,
    pub rating_count: Option<String>,
    pub duration: Option<String>,
    pub release_date: Option<String>,
    pub year: Option<String>,
    pub vote: Option<String>,
    pub director: Option<String>,
    pub writers: Vec<String>,
    pub stars: Vec<String>,
    pub actors: Vec<Actor>,
    pub anecdotes: Option<String>,
    pub min_pic_url: Option<String>,
    pub min_pic_width: Option<String>,
    pub min_pic_alt: Option<String>,
    pub pics_urls: Vec<String>,
    /// Full-size picture url, used as the detail page background when present.
    pub pic_full_url: Option<String>,
    pub pics_sizes: Vec<String>,
    /// Output file name of the detail page, assigned by [`Movie::setup`]
    /// unless the feed already carries one.
    pub filename: Option<String>,
}

/// A credited actor with picture and character names.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Actor {
    /// Actor name. The field is named `Actor` on the wire.
    #[serde(rename = "Actor")]
    pub name: String,
    pub pic_url: Option<String>,
    pub characters: Vec<String>,
}

impl Movie {
    /// Assign the derived `key` and `filename` fields.
    ///
    /// Both assignments are idempotent: a value that is already set is never
    /// overwritten, so calling `setup` again after a page was built cannot
    /// change the record's identity mid-build. A record with no title keeps
    /// an empty key source (such records are expected to be gone after
    /// [`MovieCollection::filter`]).
    pub fn setup(&mut self, html_ext: &str) {
        if self.key.is_none() {
            self.key = Some(title_key(self.title.as_deref().unwrap_or_default()));
        }
        if self.filename.is_none() {
            let key = self.key.as_deref().unwrap_or_default();
            self.filename = Some(format!("{key}{html_ext}"));
        }
    }
}

/// Content hash of a title: truncated SHA-256 hex.
///
/// Stable across builds for the same title, safe as an HTML element id and
/// as a filename stem.
pub fn title_key(title: &str) -> String {
    let digest = Sha256::digest(title.as_bytes());
    let hex = format!("{digest:x}");
    hex[..KEY_HEX_LEN].to_string()
}

/// An ordered collection of movie records, the unit one document is built
/// from.
///
/// Serialized as `{ "Movies": [...] }` — the exact shape the client script
/// receives through the companion data file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct MovieCollection {
    pub movies: Vec<Movie>,
}

impl MovieCollection {
    /// Wrap a list of records.
    pub fn new(movies: Vec<Movie>) -> Self {
        Self { movies }
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    /// Keep the first occurrence per provider id, preserving first-seen
    /// order. Records without an id are all kept (no id means nothing to
    /// collide on). Idempotent.
    pub fn distinct(&mut self) -> &mut Self {
        let mut seen = std::collections::HashSet::new();
        self.movies.retain(|movie| match &movie.id {
            Some(id) => seen.insert(id.clone()),
            None => true,
        });
        self
    }

    /// Stable sort, ascending by title. A record with no title is never
    /// found after a record with one; records with identical titles keep
    /// their relative order.
    pub fn sort(&mut self) -> &mut Self {
        self.movies
            .sort_by(|a, b| match (&a.title, &b.title) {
                (None, None) => std::cmp::Ordering::Equal,
                (None, Some(_)) => std::cmp::Ordering::Less,
                (Some(_), None) => std::cmp::Ordering::Greater,
                (Some(x), Some(y)) => x.cmp(y),
            });
        self
    }

    /// Drop records whose title is missing, empty, or whitespace-only,
    /// preserving the order of the rest. Idempotent.
    pub fn filter(&mut self) -> &mut Self {
        self.movies.retain(|movie| {
            movie
                .title
                .as_deref()
                .is_some_and(|t| !t.trim().is_empty())
        });
        self
    }

    /// Append another collection's records after this one's.
    ///
    /// Merging nothing is a no-op that returns `None`, signaling "nothing
    /// was merged". Append-only and order-sensitive: merging the same
    /// collection twice appends it twice.
    pub fn merge(&mut self, other: Option<MovieCollection>) -> Option<&mut Self> {
        let other = other?;
        self.movies.extend(other.movies);
        Some(self)
    }

    /// Assign derived `key` and `filename` on every record. Idempotent per
    /// record (see [`Movie::setup`]).
    pub fn setup(&mut self, html_ext: &str) -> &mut Self {
        for movie in &mut self.movies {
            movie.setup(html_ext);
        }
        self
    }
}

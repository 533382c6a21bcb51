//! Variable binding: property flattening and placeholder substitution.
//!
//! Template text carries literal `{{name}}` tokens. Binding is plain
//! find/replace over those tokens, not a template language: an unknown token
//! is left in the text verbatim (list templates rely on this — the item
//! model's placeholders survive the server pass and are bound in the client),
//! and a bound value is never re-scanned for further placeholders, so
//! substitution is order-independent and a value containing `{{other}}`
//! stays literal.
//!
//! ## Variable names
//!
//! A property becomes a placeholder name by lower-casing its first character.
//! Nested objects flatten recursively with `.`-joined names (`Actor.PicUrl`
//! → `actor.picUrl`). Lists are not dot-flattened: each list renders as one
//! HTML fragment, items joined by the separator element, with a per-field
//! renderer table deciding how one item renders (actors contribute their
//! name only; picture url/size lists are suppressed entirely and never
//! reach page text).
//!
//! ## Phases
//!
//! The builder binds in two phases: data integration first (`{{data}}` /
//! `{{props}}` receive canonical JSON), then property substitution. Both
//! land in one [`Bindings`] map and one scan of the template text; because
//! bound values are never re-scanned, the single scan is observably
//! identical to sequential phases.

use serde_json::Value;
use std::collections::BTreeMap;

/// Visual separator element placed between list item fragments.
pub const SEPARATOR_FRAGMENT: &str = r#"<span class="hsep"></span>"#;

/// How a list-valued field renders into a placeholder.
#[derive(Clone, Copy)]
enum ListRendering {
    /// Join item fragments with [`SEPARATOR_FRAGMENT`], one fragment per
    /// item from the given renderer.
    Join(fn(&Value) -> Option<String>),
    /// Field never reaches page text; its placeholder stays verbatim.
    Suppress,
}

/// Per-field renderer table, keyed by the wire field name.
///
/// Fields not listed here use the default: items rendered as their own
/// text, joined by the separator fragment.
const RENDERERS: &[(&str, ListRendering)] = &[
    ("Actors", ListRendering::Join(actor_name)),
    ("PicsUrls", ListRendering::Suppress),
    ("PicsSizes", ListRendering::Suppress),
];

fn renderer_for(field: &str) -> ListRendering {
    for (name, rendering) in RENDERERS {
        if *name == field {
            return *rendering;
        }
    }
    ListRendering::Join(scalar_text)
}

/// Default item fragment: the item's own text. Objects and nested arrays
/// produce nothing (they have no inline text form).
fn scalar_text(item: &Value) -> Option<String> {
    match item {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Object(_) | Value::Array(_) => None,
    }
}

/// Actor item fragment: the actor's name only.
fn actor_name(item: &Value) -> Option<String> {
    item.get("Actor")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Lower-case the first character of a property name.
pub fn var_name(property: &str) -> String {
    let mut chars = property.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// The flat variable map available to one substitution pass.
#[derive(Debug, Default)]
pub struct Bindings {
    vars: BTreeMap<String, String>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a variable under its final name, as-is.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    /// Flatten a record object into variables: first-char-lower-cased names,
    /// nested objects under `.`-joined prefixes, lists through the renderer
    /// table, scalars as text (null binds as empty).
    pub fn add_object(&mut self, object: &Value) {
        self.flatten(None, object);
    }

    /// Bind a page-property bag. Keys are already final variable names
    /// (`output.pages`, `movies.index`, ...) and are taken as-is; values
    /// bind as text, null as empty.
    pub fn add_props(&mut self, props: &serde_json::Map<String, Value>) {
        for (name, value) in props {
            let text = match value {
                Value::Null => String::new(),
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            self.vars.insert(name.clone(), text);
        }
    }

    fn flatten(&mut self, prefix: Option<&str>, value: &Value) {
        let Value::Object(map) = value else { return };
        for (field, item) in map {
            let name = match prefix {
                Some(prefix) => format!("{prefix}.{}", var_name(field)),
                None => var_name(field),
            };
            match item {
                Value::Object(_) => self.flatten(Some(&name), item),
                Value::Array(items) => match renderer_for(field) {
                    ListRendering::Suppress => {}
                    ListRendering::Join(render) => {
                        let fragments: Vec<String> =
                            items.iter().filter_map(render).collect();
                        self.vars.insert(name, fragments.join(SEPARATOR_FRAGMENT));
                    }
                },
                Value::Null => {
                    self.vars.insert(name, String::new());
                }
                Value::String(s) => {
                    self.vars.insert(name, s.clone());
                }
                Value::Number(n) => {
                    self.vars.insert(name, n.to_string());
                }
                Value::Bool(b) => {
                    self.vars.insert(name, b.to_string());
                }
            }
        }
    }

    /// Look up a bound variable (used by the client render engine and tests).
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Substitute every bound variable into `template` in a single scan.
    ///
    /// Tokens with no binding are emitted verbatim; bound values are copied,
    /// never re-scanned, so no value can trigger further expansion.
    pub fn apply(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;
        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let Some(end) = after.find("}}") else {
                // Unterminated opener: everything left is literal text
                out.push_str(&rest[start..]);
                return out;
            };
            let name = &after[..end];
            match self.vars.get(name) {
                Some(value) => out.push_str(value),
                None => {
                    out.push_str("{{");
                    out.push_str(name);
                    out.push_str("}}");
                }
            }
            rest = &after[end + 2..];
        }
        out.push_str(rest);
        out
    }
}

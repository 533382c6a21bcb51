//! Client render engine semantics, reproduced server-side.
//!
//! The generated pages ship a small script that finishes rendering in the
//! browser: list entries are cloned from an item model element and bound per
//! record, and elements carry class-name conventions that show, hide, or
//! restyle them depending on whether a data field is present. This module
//! reproduces those semantics as pure functions over a plain element tree,
//! so the behavior the site relies on is pinned by unit tests instead of
//! living only inside a bundle's JavaScript.
//!
//! ## Conditional class conventions
//!
//! For a leaf field with dotted name `d` (dots become dashes in class
//! names):
//!
//! - `if-<d>` — element is hidden when the value is empty, shown otherwise
//! - `if_no-<d>` — element is shown only when the value is empty
//! - `if_no-<d>--<replacement>` — when the value is empty, the class token
//!   itself is swapped for `<replacement>` (empty-state styling),
//!   independent of visibility
//!
//! Matching is exact on dotted-name boundaries: `if-year` never matches an
//! element classed `if-yearEnd`. "Empty" means a missing value, a null, an
//! empty string, or an empty list.
//!
//! ## List building
//!
//! [`render_items`] clones the element with id `ItemModel` once per record,
//! strips the template identity, assigns the record's `Key` as the clone's
//! id, binds placeholders and conditional classes scoped to the clone,
//! attaches the navigation target of the record's detail page, reveals the
//! clone, and finally removes the model element itself.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::binder::Bindings;
use crate::model::MovieCollection;

/// Class marking an element as not displayed.
pub const HIDDEN_CLASS: &str = "hidden";
/// Element id of the list-entry template inside a list page.
pub const ITEM_MODEL_ID: &str = "ItemModel";
/// Class of the container list entries are appended to.
pub const LIST_CONTAINER_CLASS: &str = "movie-list";
/// Attribute carrying a clone's navigation target.
pub const NAV_ATTR: &str = "data-nav";

const PREFIX_IF: &str = "if-";
const PREFIX_IF_NO: &str = "if_no-";
const SWAP_SEPARATOR: &str = "--";

/// A plain DOM-shaped node: enough structure to model binding and class
/// rewriting without a rendering surface.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attrs: BTreeMap<String, String>,
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Self::default()
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }

    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    /// Depth-first search for the first element matching `predicate`.
    pub fn find(&self, predicate: &dyn Fn(&Element) -> bool) -> Option<&Element> {
        if predicate(self) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(predicate))
    }

    fn find_mut(&mut self, predicate: &dyn Fn(&Element) -> bool) -> Option<&mut Element> {
        if predicate(self) {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_mut(predicate))
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Element> {
        self.find(&|e| e.id.as_deref() == Some(id))
    }

    /// Remove the first descendant with the given id. Returns whether an
    /// element was removed.
    fn remove_by_id(&mut self, id: &str) -> bool {
        if let Some(pos) = self
            .children
            .iter()
            .position(|c| c.id.as_deref() == Some(id))
        {
            self.children.remove(pos);
            return true;
        }
        self.children.iter_mut().any(|c| c.remove_by_id(id))
    }

    /// Apply bound variables to this subtree's text and attribute values.
    fn substitute(&mut self, bindings: &Bindings) {
        self.text = bindings.apply(&self.text);
        for value in self.attrs.values_mut() {
            *value = bindings.apply(value);
        }
        for child in &mut self.children {
            child.substitute(bindings);
        }
    }
}

/// Rewrite conditional classes on one element for one leaf field.
///
/// This is the unit the whole convention reduces to: given the element's
/// class list, a field's class-form name, and whether its value is empty,
/// decide hiding and token swaps in place.
pub fn apply_condition(element: &mut Element, class_name: &str, empty: bool) {
    let if_token = format!("{PREFIX_IF}{class_name}");
    let if_no_token = format!("{PREFIX_IF_NO}{class_name}");
    let swap_prefix = format!("{if_no_token}{SWAP_SEPARATOR}");

    if empty {
        if element.has_class(&if_token) {
            element.add_class(HIDDEN_CLASS);
        }
        if element.has_class(&if_no_token) {
            element.remove_class(HIDDEN_CLASS);
        }
        // Swap `if_no-<name>--<replacement>` tokens for their replacement
        let mut swapped = false;
        for class in &mut element.classes {
            let replacement = match class.strip_prefix(&swap_prefix) {
                Some(r) if !r.is_empty() && !r.contains(SWAP_SEPARATOR) => r.to_string(),
                _ => continue,
            };
            *class = replacement;
            swapped = true;
        }
        if swapped {
            element.classes.dedup();
        }
    } else if element.has_class(&if_no_token) {
        element.add_class(HIDDEN_CLASS);
    }
}

/// Apply every leaf field's conditions across a subtree.
pub fn apply_conditions(element: &mut Element, leaves: &[(String, bool)]) {
    for (class_name, empty) in leaves {
        apply_condition(element, class_name, *empty);
    }
    for child in &mut element.children {
        apply_conditions(child, leaves);
    }
}

/// Flatten a data object into `(class-form name, is-empty)` leaves.
///
/// Dotted names use the binder's naming (first char lower-cased) with dots
/// turned into dashes. Arrays are leaves (empty list = empty value);
/// nested objects recurse.
pub fn condition_leaves(data: &Value) -> Vec<(String, bool)> {
    let mut leaves = Vec::new();
    collect_leaves(None, data, &mut leaves);
    leaves
}

fn collect_leaves(prefix: Option<&str>, value: &Value, out: &mut Vec<(String, bool)>) {
    let Value::Object(map) = value else { return };
    for (field, item) in map {
        let name = crate::binder::var_name(field).replace('.', "-");
        let name = match prefix {
            Some(prefix) => format!("{prefix}-{name}"),
            None => name,
        };
        match item {
            Value::Object(_) => collect_leaves(Some(&name), item, out),
            Value::Array(items) => out.push((name, items.is_empty())),
            Value::Null => out.push((name, true)),
            Value::String(s) => out.push((name, s.is_empty())),
            Value::Number(_) | Value::Bool(_) => out.push((name, false)),
        }
    }
}

/// Merge record fields and page props into the one object the client binds
/// a list entry (or the detail body) against.
fn merged_context(record: &Value, props: &Map<String, Value>) -> Value {
    let mut merged = match record {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };
    for (key, value) in props {
        merged.insert(key.clone(), value.clone());
    }
    Value::Object(merged)
}

fn bindings_for(record: &Value, props: &Map<String, Value>) -> Bindings {
    let mut bindings = Bindings::new();
    bindings.add_object(record);
    bindings.add_props(props);
    bindings
}

/// Build the list entries of a list page in place.
///
/// Reproduces the client pass over the exported data object: one clone of
/// the item model per record, bound and revealed, appended to the
/// `movie-list` container; the model element is removed afterwards.
pub fn render_items(root: &mut Element, collection: &MovieCollection, props: &Map<String, Value>) {
    let Some(model) = root.find_by_id(ITEM_MODEL_ID).cloned() else {
        return;
    };

    let pages_folder = props
        .get("output.pages")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let mut items = Vec::with_capacity(collection.len());
    for movie in &collection.movies {
        let Ok(record) = serde_json::to_value(movie) else {
            continue;
        };

        let mut item = model.clone();
        item.id = movie.key.clone();
        item.remove_class(HIDDEN_CLASS);

        let bindings = bindings_for(&record, props);
        item.substitute(&bindings);

        if let Some(filename) = &movie.filename {
            item.attrs
                .insert(NAV_ATTR.to_string(), format!("./{pages_folder}/{filename}"));
        }

        apply_conditions(&mut item, &condition_leaves(&merged_context(&record, props)));
        items.push(item);
    }

    if let Some(container) = root.find_mut(&|e| e.has_class(LIST_CONTAINER_CLASS)) {
        container.children.extend(items);
    }
    root.remove_by_id(ITEM_MODEL_ID);
}

/// Bind a detail page's body in place: substitution plus conditional
/// classes over the whole tree.
pub fn render_detail(body: &mut Element, record: &Value, props: &Map<String, Value>) {
    let bindings = bindings_for(record, props);
    body.substitute(&bindings);
    apply_conditions(body, &condition_leaves(&merged_context(record, props)));
}

/// Placement of a backdrop image scaled to cover its container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverFit {
    pub width: f64,
    pub height: f64,
    pub left: f64,
    pub top: f64,
}

/// Scale an image uniformly so it fully covers the container, then center
/// it. The image is never distorted beyond the uniform scale; the overflow
/// hangs evenly off both sides.
pub fn fit_cover(image: (f64, f64), container: (f64, f64)) -> CoverFit {
    let (img_w, img_h) = image;
    let (box_w, box_h) = container;
    if img_w <= 0.0 || img_h <= 0.0 {
        return CoverFit {
            width: box_w,
            height: box_h,
            left: 0.0,
            top: 0.0,
        };
    }
    let scale = (box_w / img_w).max(box_h / img_h);
    let width = img_w * scale;
    let height = img_h * scale;
    CoverFit {
        width,
        height,
        left: (box_w - width) / 2.0,
        top: (box_h - height) / 2.0,
    }
}

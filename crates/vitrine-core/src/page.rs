//! A small shared element tree that widgets attach to.
//!
//! [`Page`] plays the role a document plays for browser widgets: host code
//! builds markup into it (or a fragment loader fills it in), widgets resolve
//! their container by id, and state such as "this dropdown is open" is
//! mirrored back as classes and attributes so every holder of the page sees
//! it.
//!
//! The tree lives behind a mutex. Every method takes the lock for exactly one
//! operation, so holders never keep the tree locked across an update.

use crate::markup::{self, ParsedNode};
use slotmap::SlotMap;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

slotmap::new_key_type! {
    /// Handle to an element inside a [`Page`].
    ///
    /// Storage of removed elements is reused, but keys are generational: a
    /// key whose element was removed stops resolving and never aliases a
    /// later element.
    pub struct NodeKey;
}

/// Errors from structural page edits.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageError {
    /// The referenced element does not exist (or was removed).
    #[error("element {0:?} is not in the page")]
    MissingNode(NodeKey),
    /// Another element already carries this id.
    #[error("duplicate element id `{0}`")]
    DuplicateId(String),
    /// The element has no parent to insert next to.
    #[error("element {0:?} has no parent")]
    Detached(NodeKey),
    /// A reorder did not name exactly the element's current children.
    #[error("new child order for {0:?} is not a permutation of its children")]
    NotAPermutation(NodeKey),
}

/// One element of the tree.
///
/// Build new elements with [`Element::new`] and the `with_*` methods, then
/// insert them with [`Page::append`] or [`Page::insert_after`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    attrs: BTreeMap<String, String>,
    text: String,
    parent: Option<NodeKey>,
    children: Vec<NodeKey>,
}

impl Element {
    /// A detached element with the given tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            id: None,
            classes: Vec::new(),
            attrs: BTreeMap::new(),
            text: String::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    /// Set the id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Add whitespace-separated classes.
    pub fn with_class(mut self, classes: &str) -> Self {
        for class in classes.split_whitespace() {
            if !self.has_class(class) {
                self.classes.push(class.to_string());
            }
        }
        self
    }

    /// Set an attribute.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    /// Set the text content.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Whether this element carries every class in `classes`.
    pub fn has_classes(&self, classes: &[&str]) -> bool {
        classes.iter().all(|c| self.has_class(c))
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// Own text content, excluding the text of child elements.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    pub fn children(&self) -> &[NodeKey] {
        &self.children
    }

    /// `a` and `button` elements receive forwarded clicks.
    pub fn is_interactive(&self) -> bool {
        matches!(self.tag.as_str(), "a" | "button")
    }
}

#[derive(Debug)]
struct Tree {
    slots: SlotMap<NodeKey, Element>,
    ids: HashMap<String, NodeKey>,
    head: Vec<String>,
    body: NodeKey,
}

impl Tree {
    fn new() -> Self {
        let mut slots = SlotMap::with_key();
        let body = slots.insert(Element::new("body"));
        Self {
            slots,
            ids: HashMap::new(),
            head: Vec::new(),
            body,
        }
    }

    fn get(&self, key: NodeKey) -> Result<&Element, PageError> {
        self.slots.get(key).ok_or(PageError::MissingNode(key))
    }

    fn get_mut(&mut self, key: NodeKey) -> Result<&mut Element, PageError> {
        self.slots.get_mut(key).ok_or(PageError::MissingNode(key))
    }

    fn register(&mut self, mut element: Element, parent: NodeKey) -> Result<NodeKey, PageError> {
        self.get(parent)?;
        if let Some(id) = element.id.as_deref() {
            if self.ids.contains_key(id) {
                return Err(PageError::DuplicateId(id.to_string()));
            }
        }
        element.parent = Some(parent);
        element.children.clear();
        let id = element.id.clone();
        let key = self.slots.insert(element);
        if let Some(id) = id {
            self.ids.insert(id, key);
        }
        Ok(key)
    }

    /// Append a parsed subtree under `parent`. Ids already taken in the page
    /// are dropped from the injected element.
    fn graft(&mut self, parent: NodeKey, node: ParsedNode) -> Result<NodeKey, PageError> {
        let ParsedNode {
            mut element,
            children,
        } = node;
        if let Some(id) = element.id.take_if(|id| self.ids.contains_key(id.as_str())) {
            tracing::warn!(%id, "dropping duplicate id from injected markup");
        }
        let key = self.register(element, parent)?;
        self.get_mut(parent)?.children.push(key);
        for child in children {
            self.graft(key, child)?;
        }
        Ok(key)
    }

    fn descendants(&self, scope: NodeKey) -> Vec<NodeKey> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeKey> = match self.get(scope) {
            Ok(el) => el.children.iter().rev().copied().collect(),
            Err(_) => return out,
        };
        while let Some(key) = stack.pop() {
            if let Ok(el) = self.get(key) {
                out.push(key);
                stack.extend(el.children.iter().rev().copied());
            }
        }
        out
    }

    fn remove_subtree(&mut self, key: NodeKey) {
        let mut doomed = self.descendants(key);
        doomed.push(key);
        for k in doomed {
            if let Some(el) = self.slots.remove(k) {
                if let Some(id) = el.id {
                    self.ids.remove(&id);
                }
            }
        }
    }
}

/// Cloneable handle to a shared element tree.
///
/// Cloning is cheap; all clones see the same tree.
#[derive(Debug, Clone)]
pub struct Page {
    inner: Arc<Mutex<Tree>>,
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

impl Page {
    /// An empty page with a `body` root and no head markup.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Tree::new())),
        }
    }

    fn tree(&self) -> MutexGuard<'_, Tree> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether two handles point at the same tree.
    pub fn same_page(&self, other: &Page) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// The root element.
    pub fn body(&self) -> NodeKey {
        self.tree().body
    }

    /// Resolve an id.
    pub fn find(&self, id: &str) -> Option<NodeKey> {
        self.tree().ids.get(id).copied()
    }

    /// Snapshot of an element.
    pub fn get(&self, key: NodeKey) -> Option<Element> {
        self.tree().get(key).ok().cloned()
    }

    /// Read an element without cloning it.
    pub fn with_element<R>(&self, key: NodeKey, f: impl FnOnce(&Element) -> R) -> Option<R> {
        self.tree().get(key).ok().map(f)
    }

    pub fn contains(&self, key: NodeKey) -> bool {
        self.tree().get(key).is_ok()
    }

    pub fn children(&self, key: NodeKey) -> Vec<NodeKey> {
        self.with_element(key, |el| el.children.clone())
            .unwrap_or_default()
    }

    pub fn parent(&self, key: NodeKey) -> Option<NodeKey> {
        self.with_element(key, |el| el.parent).flatten()
    }

    /// Append `element` as the last child of `parent`.
    pub fn append(&self, parent: NodeKey, element: Element) -> Result<NodeKey, PageError> {
        let mut tree = self.tree();
        let key = tree.register(element, parent)?;
        tree.get_mut(parent)?.children.push(key);
        Ok(key)
    }

    /// Insert `element` as the next sibling of `reference`.
    pub fn insert_after(&self, reference: NodeKey, element: Element) -> Result<NodeKey, PageError> {
        let mut tree = self.tree();
        let parent = tree.get(reference)?.parent.ok_or(PageError::Detached(reference))?;
        let key = tree.register(element, parent)?;
        let siblings = &mut tree.get_mut(parent)?.children;
        let at = siblings
            .iter()
            .position(|k| *k == reference)
            .map_or(siblings.len(), |i| i + 1);
        siblings.insert(at, key);
        Ok(key)
    }

    /// Remove an element and its whole subtree. Returns `false` if it was
    /// already gone. The body cannot be removed.
    pub fn remove(&self, key: NodeKey) -> bool {
        let mut tree = self.tree();
        if key == tree.body {
            return false;
        }
        let parent = match tree.get(key) {
            Ok(el) => el.parent,
            Err(_) => return false,
        };
        if let Some(parent) = parent {
            if let Ok(p) = tree.get_mut(parent) {
                p.children.retain(|k| *k != key);
            }
        }
        tree.remove_subtree(key);
        true
    }

    /// Replace the order of `key`'s children. `order` must name exactly the
    /// current children.
    pub fn reorder_children(&self, key: NodeKey, order: &[NodeKey]) -> Result<(), PageError> {
        let mut tree = self.tree();
        let el = tree.get_mut(key)?;
        let mut current = el.children.clone();
        let mut proposed = order.to_vec();
        current.sort();
        proposed.sort();
        if current != proposed {
            return Err(PageError::NotAPermutation(key));
        }
        el.children = order.to_vec();
        Ok(())
    }

    /// Replace an element's content with parsed markup. The old children
    /// are removed; the markup's elements become the new children and its
    /// loose text becomes the element's text.
    pub fn set_inner_markup(&self, key: NodeKey, markup: &str) -> Result<(), PageError> {
        let fragment = markup::parse(markup);
        let mut tree = self.tree();
        let children = std::mem::take(&mut tree.get_mut(key)?.children);
        for child in children {
            tree.remove_subtree(child);
        }
        tree.get_mut(key)?.text = fragment.text;
        for node in fragment.nodes {
            tree.graft(key, node)?;
        }
        Ok(())
    }

    pub fn set_text(&self, key: NodeKey, text: impl Into<String>) -> Result<(), PageError> {
        self.tree().get_mut(key)?.text = text.into();
        Ok(())
    }

    /// Add or remove a class. Returns `false` if the element is gone.
    pub fn toggle_class(&self, key: NodeKey, class: &str, on: bool) -> bool {
        let mut tree = self.tree();
        let Ok(el) = tree.get_mut(key) else {
            return false;
        };
        let present = el.has_class(class);
        if on && !present {
            el.classes.push(class.to_string());
        } else if !on && present {
            el.classes.retain(|c| c != class);
        }
        true
    }

    pub fn has_class(&self, key: NodeKey, class: &str) -> bool {
        self.with_element(key, |el| el.has_class(class))
            .unwrap_or(false)
    }

    pub fn set_attr(&self, key: NodeKey, name: &str, value: impl Into<String>) -> bool {
        let mut tree = self.tree();
        let Ok(el) = tree.get_mut(key) else {
            return false;
        };
        el.attrs.insert(name.to_string(), value.into());
        true
    }

    pub fn remove_attr(&self, key: NodeKey, name: &str) -> bool {
        let mut tree = self.tree();
        let Ok(el) = tree.get_mut(key) else {
            return false;
        };
        el.attrs.remove(name);
        true
    }

    pub fn attr(&self, key: NodeKey, name: &str) -> Option<String> {
        self.with_element(key, |el| el.attr(name).map(str::to_string))
            .flatten()
    }

    /// All descendants of `scope` (excluding `scope`) matching `pred`, in
    /// document order.
    pub fn query_all(&self, scope: NodeKey, pred: impl Fn(&Element) -> bool) -> Vec<NodeKey> {
        let tree = self.tree();
        tree.descendants(scope)
            .into_iter()
            .filter(|k| tree.get(*k).map(&pred).unwrap_or(false))
            .collect()
    }

    /// First descendant of `scope` carrying every class in `classes`.
    pub fn query_class(&self, scope: NodeKey, classes: &[&str]) -> Option<NodeKey> {
        self.query_all(scope, |el| el.has_classes(classes))
            .into_iter()
            .next()
    }

    /// `key` itself or its nearest ancestor matching `pred`.
    pub fn closest(&self, key: NodeKey, pred: impl Fn(&Element) -> bool) -> Option<NodeKey> {
        let tree = self.tree();
        let mut cursor = Some(key);
        while let Some(k) = cursor {
            let el = tree.get(k).ok()?;
            if pred(el) {
                return Some(k);
            }
            cursor = el.parent;
        }
        None
    }

    /// Whether `key` is `ancestor` or lies inside it.
    pub fn is_within(&self, key: NodeKey, ancestor: NodeKey) -> bool {
        self.ancestors_inclusive(key).contains(&ancestor)
    }

    fn ancestors_inclusive(&self, key: NodeKey) -> Vec<NodeKey> {
        let tree = self.tree();
        let mut out = Vec::new();
        let mut cursor = Some(key);
        while let Some(k) = cursor {
            let Ok(el) = tree.get(k) else { break };
            out.push(k);
            cursor = el.parent;
        }
        out
    }

    /// Text of `key` followed by the text of each descendant, one entry per
    /// non-empty element, in document order.
    pub fn text_lines(&self, key: NodeKey) -> Vec<(NodeKey, String)> {
        let tree = self.tree();
        let mut keys = vec![key];
        keys.extend(tree.descendants(key));
        keys.into_iter()
            .filter_map(|k| {
                let el = tree.get(k).ok()?;
                (!el.text.trim().is_empty()).then(|| (k, el.text.clone()))
            })
            .collect()
    }

    /// Append raw markup to the page head.
    pub fn append_head(&self, markup: impl Into<String>) {
        self.tree().head.push(markup.into());
    }

    /// Everything appended to the head so far, in order.
    pub fn head(&self) -> Vec<String> {
        self.tree().head.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pricing_page() -> (Page, NodeKey) {
        let page = Page::new();
        let wrapper = page
            .append(page.body(), Element::new("div").with_class("carousel-container"))
            .unwrap();
        let track = page
            .append(wrapper, Element::new("div").with_id("plans"))
            .unwrap();
        for name in ["Basic", "Pro", "Team"] {
            let card = page
                .append(track, Element::new("div").with_class("card").with_text(name))
                .unwrap();
            page.append(card, Element::new("button").with_text("Choose"))
                .unwrap();
        }
        (page, track)
    }

    #[test]
    fn find_and_children() {
        let (page, track) = pricing_page();
        assert_eq!(page.find("plans"), Some(track));
        assert_eq!(page.children(track).len(), 3);
        assert!(page.find("missing").is_none());
    }

    #[test]
    fn duplicate_ids_rejected() {
        let (page, _) = pricing_page();
        let err = page
            .append(page.body(), Element::new("div").with_id("plans"))
            .unwrap_err();
        assert_eq!(err, PageError::DuplicateId("plans".into()));
    }

    #[test]
    fn insert_after_places_sibling() {
        let (page, track) = pricing_page();
        let wrapper = page.parent(track).unwrap();
        let dots = page
            .insert_after(wrapper, Element::new("div").with_id("carouselDots"))
            .unwrap();
        assert_eq!(page.children(page.body()), vec![wrapper, dots]);
    }

    #[test]
    fn remove_unregisters_subtree_ids() {
        let (page, track) = pricing_page();
        let wrapper = page.parent(track).unwrap();
        assert!(page.remove(wrapper));
        assert!(page.find("plans").is_none());
        assert!(!page.contains(track));
        assert!(!page.remove(wrapper));
        assert!(!page.remove(page.body()));
    }

    #[test]
    fn reorder_requires_permutation() {
        let (page, track) = pricing_page();
        let mut kids = page.children(track);
        kids.rotate_left(1);
        page.reorder_children(track, &kids).unwrap();
        assert_eq!(page.children(track), kids);

        let err = page.reorder_children(track, &kids[..2]).unwrap_err();
        assert_eq!(err, PageError::NotAPermutation(track));
    }

    #[test]
    fn closest_finds_interactive_ancestor() {
        let (page, track) = pricing_page();
        let card = page.children(track)[0];
        let button = page.children(card)[0];
        assert_eq!(page.closest(button, Element::is_interactive), Some(button));
        assert_eq!(page.closest(card, Element::is_interactive), None);
        assert!(page.is_within(button, track));
        assert!(!page.is_within(track, button));
    }

    #[test]
    fn query_class_matches_all_classes() {
        let page = Page::new();
        let nav = page
            .append(page.body(), Element::new("button").with_class("carousel-nav next"))
            .unwrap();
        assert_eq!(page.query_class(page.body(), &["carousel-nav", "next"]), Some(nav));
        assert_eq!(page.query_class(page.body(), &["carousel-nav", "prev"]), None);
    }

    #[test]
    fn inner_markup_replaces_children() {
        let (page, track) = pricing_page();
        let old = page.children(track);
        page.set_inner_markup(track, r#"<p class="notice" id="soldOut">Sold <em>out</em></p>"#)
            .unwrap();
        assert!(old.iter().all(|k| !page.contains(*k)));

        let kids = page.children(track);
        assert_eq!(kids.len(), 1);
        let notice = page.get(kids[0]).unwrap();
        assert_eq!(notice.tag(), "p");
        assert!(notice.has_class("notice"));
        assert_eq!(notice.text(), "Sold");
        assert_eq!(page.find("soldOut"), Some(kids[0]));
        assert_eq!(page.parent(kids[0]), Some(track));
        assert_eq!(page.children(kids[0]).len(), 1);
    }

    #[test]
    fn inner_markup_drops_taken_ids() {
        let (page, track) = pricing_page();
        let slot = page
            .append(page.body(), Element::new("div").with_id("slot"))
            .unwrap();
        page.set_inner_markup(slot, r#"<div id="plans">copy</div>plain"#)
            .unwrap();
        assert_eq!(page.find("plans"), Some(track));
        let copy = page.children(slot)[0];
        assert_eq!(page.get(copy).unwrap().id(), None);
        assert_eq!(page.get(slot).unwrap().text(), "plain");
    }

    #[test]
    fn removed_storage_is_reused_without_aliasing() {
        let page = Page::new();
        let first = page
            .append(page.body(), Element::new("div").with_id("dots"))
            .unwrap();
        page.remove(first);
        for _ in 0..200 {
            let dots = page
                .append(page.body(), Element::new("div").with_id("dots"))
                .unwrap();
            for n in 0..5 {
                page.append(dots, Element::new("span").with_attr("data-slide", n.to_string()))
                    .unwrap();
            }
            assert!(page.remove(dots));
        }
        assert!(page.tree().slots.capacity() < 32);
        assert!(!page.contains(first));
        assert!(page.get(first).is_none());
        assert_eq!(page.children(page.body()), Vec::<NodeKey>::new());
    }

    #[test]
    fn classes_attrs_and_head() {
        let (page, track) = pricing_page();
        assert!(page.toggle_class(track, "carousel-initialized", true));
        assert!(page.has_class(track, "carousel-initialized"));
        page.toggle_class(track, "carousel-initialized", false);
        assert!(!page.has_class(track, "carousel-initialized"));

        page.set_attr(track, "aria-label", "Plans");
        assert_eq!(page.attr(track, "aria-label").as_deref(), Some("Plans"));
        page.remove_attr(track, "aria-label");
        assert!(page.attr(track, "aria-label").is_none());

        page.append_head("<style></style>");
        assert_eq!(page.head(), vec!["<style></style>"]);
    }

    #[test]
    fn text_lines_in_document_order() {
        let (page, track) = pricing_page();
        let card = page.children(track)[1];
        let lines: Vec<String> = page.text_lines(card).into_iter().map(|(_, t)| t).collect();
        assert_eq!(lines, vec!["Pro", "Choose"]);
    }

    #[test]
    fn clones_share_the_tree() {
        let (page, track) = pricing_page();
        let other = page.clone();
        other.toggle_class(track, "seen", true);
        assert!(page.has_class(track, "seen"));
        assert!(page.same_page(&other));
        assert!(!page.same_page(&Page::new()));
    }
}

//! In-memory document implementing `Page`.
//!
//! Emulates the browser behaviours the engine relies on: document-order
//! queries, visibility through ancestors, checkbox/radio toggling on click,
//! radio-group exclusivity, `select.value` semantics, disabled controls
//! ignoring clicks, and Escape closing open `role="listbox"` popups. Page
//! scripts are modelled as click reactions that mutate the document.
//!
//! Queries render the attached tree to HTML, tagging every element with its
//! `NodeId`, and run the selector with `scraper`. Live checkbox/radio state is
//! rendered as the `checked` attribute, so `[checked]` tracks clicks.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use scraper::{Html, Selector};

use crate::dom::{DomEventKind, ElementSnapshot, NodeId, Page};
use crate::errors::PageError;
use crate::models::ResumeFile;

type Reaction = Arc<dyn Fn(&mut Dom) + Send + Sync>;

/// Attribute carrying the `NodeId` through the rendered HTML.
const NODE_ATTR: &str = "data-autofill-node";

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track", "wbr",
];

/// Declarative element tree used to build synthetic pages.
#[derive(Debug, Clone, Default)]
pub struct ElementSpec {
    tag: String,
    attrs: Vec<(String, String)>,
    text: String,
    children: Vec<ElementSpec>,
}

impl ElementSpec {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Default::default()
        }
    }

    pub fn input(input_type: &str) -> Self {
        Self::new("input").attr("type", input_type)
    }

    pub fn option(value: &str, text: &str) -> Self {
        Self::new("option").attr("value", value).text(text)
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.push((name.to_ascii_lowercase(), value.to_string()));
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn child(mut self, child: ElementSpec) -> Self {
        self.children.push(child);
        self
    }

    pub fn children<I: IntoIterator<Item = ElementSpec>>(mut self, children: I) -> Self {
        self.children.extend(children);
        self
    }
}

#[derive(Debug, Clone)]
struct NodeData {
    tag: String,
    attrs: BTreeMap<String, String>,
    text: String,
    value: String,
    checked: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attached: bool,
}

/// A recorded event, in dispatch order.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedEvent {
    pub node: NodeId,
    pub kind: DomEventKind,
}

/// Mutable document state. Reachable from tests through `MemoryPage::with_dom`
/// and handed to click reactions.
pub struct Dom {
    url: String,
    nodes: Vec<NodeData>,
    body: NodeId,
    events: Vec<RecordedEvent>,
    reactions: HashMap<NodeId, Vec<Reaction>>,
    frozen_inputs: Vec<NodeId>,
    upload_failure: Option<String>,
    attachments: HashMap<NodeId, ResumeFile>,
}

impl Dom {
    fn new(url: &str) -> Self {
        let html = NodeData {
            tag: "html".to_string(),
            attrs: BTreeMap::new(),
            text: String::new(),
            value: String::new(),
            checked: false,
            parent: None,
            children: vec![NodeId(1)],
            attached: true,
        };
        let body = NodeData {
            tag: "body".to_string(),
            parent: Some(NodeId(0)),
            children: Vec::new(),
            ..html.clone()
        };
        Self {
            url: url.to_string(),
            nodes: vec![html, body],
            body: NodeId(1),
            events: Vec::new(),
            reactions: HashMap::new(),
            frozen_inputs: Vec::new(),
            upload_failure: None,
            attachments: HashMap::new(),
        }
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn set_url(&mut self, url: &str) {
        self.url = url.to_string();
    }

    /// Appends `spec` (and its subtree) as the last child of `parent`.
    pub fn append(&mut self, parent: NodeId, spec: ElementSpec) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let attrs: BTreeMap<String, String> = spec.attrs.into_iter().collect();
        let checked = attrs.contains_key("checked");
        let value = match spec.tag.as_str() {
            "textarea" => spec.text.clone(),
            _ => attrs.get("value").cloned().unwrap_or_default(),
        };
        let attached = self.node(parent).map(|p| p.attached).unwrap_or(false);
        self.nodes.push(NodeData {
            tag: spec.tag.clone(),
            attrs,
            text: if spec.tag == "textarea" {
                String::new()
            } else {
                spec.text
            },
            value,
            checked,
            parent: Some(parent),
            children: Vec::new(),
            attached,
        });
        if let Some(p) = self.node_mut(parent) {
            p.children.push(id);
        }
        for child in spec.children {
            self.append(id, child);
        }
        if spec.tag == "select" {
            self.initialise_select(id);
        }
        id
    }

    /// Detaches `node` and its subtree. Handles to them become stale.
    pub fn remove(&mut self, node: NodeId) {
        if let Some(parent) = self.node(node).and_then(|n| n.parent) {
            if let Some(p) = self.node_mut(parent) {
                p.children.retain(|c| *c != node);
            }
        }
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if let Some(n) = self.node_mut(current) {
                n.attached = false;
                stack.extend(n.children.iter().copied());
            }
        }
    }

    /// Removes every child of `node`.
    pub fn clear_children(&mut self, node: NodeId) {
        let children = self.node(node).map(|n| n.children.clone()).unwrap_or_default();
        for child in children {
            self.remove(child);
        }
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(n) = self.node_mut(node) {
            n.attrs.insert(name.to_ascii_lowercase(), value.to_string());
        }
    }

    pub fn remove_attribute(&mut self, node: NodeId, name: &str) {
        if let Some(n) = self.node_mut(node) {
            n.attrs.remove(&name.to_ascii_lowercase());
        }
    }

    pub fn first(&self, selector: &str) -> Option<NodeId> {
        self.query_all(selector).ok()?.into_iter().next()
    }

    pub fn all(&self, selector: &str) -> Vec<NodeId> {
        self.query_all(selector).unwrap_or_default()
    }

    pub fn value(&self, node: NodeId) -> String {
        self.node(node).map(|n| n.value.clone()).unwrap_or_default()
    }

    pub fn is_checked(&self, node: NodeId) -> bool {
        self.node(node).map(|n| n.checked).unwrap_or(false)
    }

    pub fn is_visible(&self, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            let Some(n) = self.node(id) else {
                return false;
            };
            if !n.attached || n.attrs.contains_key("hidden") {
                return false;
            }
            if n.tag == "input" && n.attrs.get("type").map(|t| t == "hidden").unwrap_or(false) {
                return false;
            }
            if let Some(style) = n.attrs.get("style") {
                let compact: String = style
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .collect::<String>()
                    .to_ascii_lowercase();
                if compact.contains("display:none") {
                    return false;
                }
            }
            current = n.parent;
        }
        true
    }

    /// Events dispatched on `node`, in order.
    pub fn events_for(&self, node: NodeId) -> Vec<DomEventKind> {
        self.events
            .iter()
            .filter(|e| e.node == node)
            .map(|e| e.kind.clone())
            .collect()
    }

    pub fn events(&self) -> &[RecordedEvent] {
        &self.events
    }

    /// Number of clicks the engine issued on `node`, including ignored ones.
    pub fn click_count(&self, node: NodeId) -> usize {
        self.events
            .iter()
            .filter(|e| e.node == node && e.kind == DomEventKind::Click)
            .count()
    }

    pub fn attachment(&self, node: NodeId) -> Option<&ResumeFile> {
        self.attachments.get(&node)
    }

    /// Makes `node` discard programmatic values, like a controlled input that
    /// re-renders from its own state.
    pub fn freeze_input(&mut self, node: NodeId) {
        self.frozen_inputs.push(node);
    }

    pub fn fail_uploads(&mut self, reason: &str) {
        self.upload_failure = Some(reason.to_string());
    }

    pub fn on_click<F>(&mut self, node: NodeId, reaction: F)
    where
        F: Fn(&mut Dom) + Send + Sync + 'static,
    {
        self.reactions.entry(node).or_default().push(Arc::new(reaction));
    }

    // ── internals ─────────────────────────────────────────────────────────

    fn node(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id.0 as usize)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        self.nodes.get_mut(id.0 as usize)
    }

    fn live(&self, id: NodeId) -> Result<&NodeData, PageError> {
        match self.node(id) {
            Some(n) if n.attached => Ok(n),
            _ => Err(PageError::StaleElement(id)),
        }
    }

    fn document_order(&self, root: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            order.push(id);
            if let Some(n) = self.node(id) {
                stack.extend(n.children.iter().rev().copied());
            }
        }
        order
    }

    fn query_all(&self, selector: &str) -> Result<Vec<NodeId>, PageError> {
        let selector = parse_selector(selector)?;
        let document = Html::parse_document(&self.render());
        Ok(document
            .select(&selector)
            .filter_map(|el| el.value().attr(NODE_ATTR))
            .filter_map(|id| id.parse().ok())
            .map(NodeId)
            .collect())
    }

    fn query_scoped(&self, scope: NodeId, selector: &str) -> Result<Vec<NodeId>, PageError> {
        self.live(scope)?;
        Ok(self
            .query_all(selector)?
            .into_iter()
            .filter(|id| *id != scope && self.is_descendant(*id, scope))
            .collect())
    }

    fn is_descendant(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut current = self.node(node).and_then(|n| n.parent);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.node(id).and_then(|n| n.parent);
        }
        false
    }

    /// Serialises the attached tree for `scraper`.
    fn render(&self) -> String {
        let mut out = String::from("<!DOCTYPE html>");
        self.render_node(NodeId(0), &mut out);
        out
    }

    fn render_node(&self, id: NodeId, out: &mut String) {
        let Some(n) = self.node(id) else {
            return;
        };
        out.push_str(&format!(r#"<{} {NODE_ATTR}="{}""#, n.tag, id.0));
        for (name, value) in &n.attrs {
            if name == "checked" || name == NODE_ATTR {
                continue;
            }
            out.push_str(&format!(r#" {name}="{}""#, escape(value)));
        }
        if n.checked {
            out.push_str(" checked");
        }
        out.push('>');
        if VOID_ELEMENTS.contains(&n.tag.as_str()) {
            return;
        }
        if n.tag == "html" {
            out.push_str("<head></head>");
        }
        out.push_str(&escape(&n.text));
        for child in &n.children {
            self.render_node(*child, out);
        }
        out.push_str(&format!("</{}>", n.tag));
    }

    fn text_content(&self, id: NodeId) -> String {
        self.document_order(id)
            .into_iter()
            .filter_map(|n| self.node(n))
            .map(|n| n.text.as_str())
            .collect()
    }

    fn option_value(&self, option: NodeId) -> String {
        match self.node(option).and_then(|n| n.attrs.get("value")) {
            Some(v) => v.clone(),
            None => self.text_content(option).trim().to_string(),
        }
    }

    fn options_of(&self, select: NodeId) -> Vec<NodeId> {
        self.document_order(select)
            .into_iter()
            .skip(1)
            .filter(|id| self.node(*id).map(|n| n.tag == "option").unwrap_or(false))
            .collect()
    }

    fn initialise_select(&mut self, select: NodeId) {
        let options = self.options_of(select);
        let chosen = options
            .iter()
            .find(|o| self.node(**o).map(|n| n.attrs.contains_key("selected")).unwrap_or(false))
            .or_else(|| options.first())
            .copied();
        let value = chosen.map(|o| self.option_value(o)).unwrap_or_default();
        if let Some(n) = self.node_mut(select) {
            n.value = value;
        }
    }

    fn record(&mut self, node: NodeId, kind: DomEventKind) {
        self.events.push(RecordedEvent { node, kind });
    }

    fn apply_checked(&mut self, node: NodeId, checked: bool) {
        let (is_radio, name) = match self.node(node) {
            Some(n) => (
                n.attrs.get("type").map(|t| t == "radio").unwrap_or(false),
                n.attrs.get("name").cloned(),
            ),
            None => return,
        };
        if is_radio && checked {
            if let Some(name) = name {
                let siblings: Vec<NodeId> = self
                    .document_order(NodeId(0))
                    .into_iter()
                    .filter(|id| {
                        self.node(*id)
                            .map(|n| {
                                n.attached
                                    && n.attrs.get("type").map(|t| t == "radio").unwrap_or(false)
                                    && n.attrs.get("name") == Some(&name)
                            })
                            .unwrap_or(false)
                    })
                    .collect();
                for sibling in siblings {
                    if let Some(n) = self.node_mut(sibling) {
                        n.checked = false;
                    }
                }
            }
        }
        if let Some(n) = self.node_mut(node) {
            n.checked = checked;
        }
    }

    fn snapshot(&self, id: NodeId) -> Result<ElementSnapshot, PageError> {
        let n = self.live(id)?;
        Ok(ElementSnapshot {
            node: id,
            tag: n.tag.clone(),
            attributes: n.attrs.clone(),
            text: self.text_content(id),
            value: n.value.clone(),
            checked: n.checked,
            visible: self.is_visible(id),
        })
    }
}

fn parse_selector(selector: &str) -> Result<Selector, PageError> {
    Selector::parse(selector).map_err(|e| PageError::InvalidSelector(format!("{selector}: {e:?}")))
}

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Thread-safe `Page` over an in-memory `Dom`.
pub struct MemoryPage {
    dom: Mutex<Dom>,
}

impl MemoryPage {
    pub fn new(url: &str) -> Self {
        Self {
            dom: Mutex::new(Dom::new(url)),
        }
    }

    /// Builds a page whose body holds `specs`.
    pub fn with_body<I: IntoIterator<Item = ElementSpec>>(url: &str, specs: I) -> Self {
        let page = Self::new(url);
        page.with_dom(|dom| {
            let body = dom.body();
            for spec in specs {
                dom.append(body, spec);
            }
        });
        page
    }

    pub fn with_dom<R>(&self, f: impl FnOnce(&mut Dom) -> R) -> R {
        let mut dom = self.lock();
        f(&mut *dom)
    }

    /// Convenience for tests: first match of `selector`.
    pub fn first(&self, selector: &str) -> Option<NodeId> {
        self.lock().first(selector)
    }

    pub fn value_of(&self, node: NodeId) -> String {
        self.lock().value(node)
    }

    fn lock(&self) -> MutexGuard<'_, Dom> {
        self.dom.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl Page for MemoryPage {
    async fn url(&self) -> Result<String, PageError> {
        Ok(self.lock().url.clone())
    }

    async fn query_selector(&self, selector: &str) -> Result<Option<NodeId>, PageError> {
        Ok(self.lock().query_all(selector)?.into_iter().next())
    }

    async fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>, PageError> {
        self.lock().query_all(selector)
    }

    async fn query_within(&self, scope: NodeId, selector: &str) -> Result<Vec<NodeId>, PageError> {
        self.lock().query_scoped(scope, selector)
    }

    async fn element(&self, node: NodeId) -> Result<ElementSnapshot, PageError> {
        self.lock().snapshot(node)
    }

    async fn set_value(&self, node: NodeId, value: &str) -> Result<(), PageError> {
        let mut dom = self.lock();
        let n = dom.live(node)?;
        if n.tag == "input" && n.attrs.get("type").map(|t| t == "file").unwrap_or(false) {
            return Err(PageError::Rejected {
                node,
                reason: "file inputs cannot be assigned a value".to_string(),
            });
        }
        if dom.frozen_inputs.contains(&node) {
            return Ok(());
        }
        let value = if n.tag == "select" {
            // Assigning a value with no matching option clears the selection.
            let options = dom.options_of(node);
            if options.iter().any(|o| dom.option_value(*o) == value) {
                value.to_string()
            } else {
                String::new()
            }
        } else {
            value.to_string()
        };
        if let Some(n) = dom.node_mut(node) {
            n.value = value;
        }
        Ok(())
    }

    async fn set_checked(&self, node: NodeId, checked: bool) -> Result<(), PageError> {
        let mut dom = self.lock();
        dom.live(node)?;
        if dom.frozen_inputs.contains(&node) {
            return Ok(());
        }
        dom.apply_checked(node, checked);
        Ok(())
    }

    async fn click(&self, node: NodeId) -> Result<(), PageError> {
        let mut dom = self.lock();
        let n = dom.live(node)?;
        let disabled = n.attrs.contains_key("disabled");
        let toggle = if n.tag == "input" {
            match n.attrs.get("type").map(String::as_str) {
                Some("checkbox") => Some(!n.checked),
                Some("radio") => Some(true),
                _ => None,
            }
        } else {
            None
        };
        dom.record(node, DomEventKind::Click);
        if disabled {
            return Ok(());
        }
        if let Some(checked) = toggle {
            dom.apply_checked(node, checked);
        }
        let reactions = dom.reactions.get(&node).cloned().unwrap_or_default();
        for reaction in reactions {
            reaction(&mut *dom);
        }
        Ok(())
    }

    async fn dispatch(&self, node: NodeId, event: DomEventKind) -> Result<(), PageError> {
        let mut dom = self.lock();
        dom.live(node)?;
        let closes_popups = matches!(&event, DomEventKind::KeyDown(key) if key == "Escape");
        dom.record(node, event);
        if closes_popups {
            for listbox in dom.all(r#"[role="listbox"]"#) {
                if dom.is_visible(listbox) {
                    dom.set_attribute(listbox, "hidden", "");
                }
            }
        }
        Ok(())
    }

    async fn attach_file(&self, node: NodeId, file: &ResumeFile) -> Result<(), PageError> {
        let mut dom = self.lock();
        let n = dom.live(node)?;
        let is_file_input =
            n.tag == "input" && n.attrs.get("type").map(|t| t == "file").unwrap_or(false);
        if !is_file_input {
            return Err(PageError::Rejected {
                node,
                reason: format!("<{}> is not a file input", n.tag),
            });
        }
        if let Some(reason) = dom.upload_failure.clone() {
            return Err(PageError::Rejected { node, reason });
        }
        if let Some(n) = dom.node_mut(node) {
            n.value = format!("C:\\fakepath\\{}", file.name);
        }
        dom.attachments.insert(node, file.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_page() -> MemoryPage {
        MemoryPage::with_body(
            "https://jobs.example.com/apply",
            [ElementSpec::new("form")
                .attr("id", "application")
                .child(ElementSpec::input("text").attr("name", "first_name"))
                .child(
                    ElementSpec::new("select")
                        .attr("name", "state")
                        .child(ElementSpec::option("", "Select..."))
                        .child(ElementSpec::option("CA", "California")),
                )
                .child(ElementSpec::input("radio").attr("name", "g").attr("value", "a"))
                .child(ElementSpec::input("radio").attr("name", "g").attr("value", "b"))
                .child(
                    ElementSpec::new("div")
                        .attr("style", "display: none")
                        .child(ElementSpec::input("text").attr("name", "hidden_child")),
                )],
        )
    }

    #[tokio::test]
    async fn test_query_selector_returns_document_order() {
        let page = sample_page();
        let radios = page.query_selector_all("input[type=radio]").await.unwrap();
        assert_eq!(radios.len(), 2);
        assert!(radios[0] < radios[1]);
        assert!(page.query_selector("textarea").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_attribute_operators_and_case_flag() {
        let page = MemoryPage::with_body(
            "https://x.test",
            [ElementSpec::new("form").children([
                ElementSpec::input("text").attr("name", "applicant.FirstName"),
                ElementSpec::input("text").attr("id", "ctl00_personal_info_LastName"),
                ElementSpec::input("text").attr("class", "field wide"),
            ])],
        );
        assert_eq!(page.query_selector_all(r#"input[name*="firstname" i]"#).await.unwrap().len(), 1);
        assert!(page.query_selector(r#"input[name*="firstname"]"#).await.unwrap().is_none());
        assert!(page.query_selector(r#"input[id$="LastName"]"#).await.unwrap().is_some());
        assert!(page.query_selector(r#"input[name^="applicant."]"#).await.unwrap().is_some());
        assert!(page.query_selector(r#"input[class~="wide"]"#).await.unwrap().is_some());
        assert_eq!(page.query_selector_all("input[type]").await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_combinators_groups_and_negation() {
        let page = sample_page();
        assert_eq!(page.query_selector_all("form input").await.unwrap().len(), 4);
        assert_eq!(page.query_selector_all("form > input").await.unwrap().len(), 3);
        assert_eq!(page.query_selector_all("div > input").await.unwrap().len(), 1);
        assert_eq!(page.query_selector_all("select, textarea").await.unwrap().len(), 1);
        assert_eq!(
            page.query_selector_all(r#"input:not([type="radio"])"#).await.unwrap().len(),
            2
        );
    }

    #[tokio::test]
    async fn test_checked_attribute_tracks_clicks() {
        let page = sample_page();
        assert!(page.query_selector("input[checked]").await.unwrap().is_none());
        let radios = page.query_selector_all("input[type=radio]").await.unwrap();
        page.click(radios[1]).await.unwrap();
        assert_eq!(page.query_selector("input[checked]").await.unwrap(), Some(radios[1]));
    }

    #[tokio::test]
    async fn test_scoped_query_excludes_scope() {
        let page = sample_page();
        let form = page.first("form").unwrap();
        let inside = page.query_within(form, "form, input").await.unwrap();
        assert_eq!(inside.len(), 4);
        assert!(!inside.contains(&form));
    }

    #[tokio::test]
    async fn test_invalid_selector_is_an_error() {
        let page = sample_page();
        for selector in ["", "input[name=]", "div >", "a..b"] {
            assert!(
                matches!(
                    page.query_selector_all(selector).await,
                    Err(PageError::InvalidSelector(_))
                ),
                "{selector:?} should not parse"
            );
        }
    }

    #[tokio::test]
    async fn test_text_with_markup_characters_is_escaped() {
        let page = MemoryPage::with_body(
            "https://x.test",
            [ElementSpec::new("div")
                .attr("data-label", r#"a "quoted" <b>"#)
                .text("<input id=fake> & more")],
        );
        assert!(page.query_selector("#fake").await.unwrap().is_none());
        assert!(page
            .query_selector(r#"div[data-label='a "quoted" <b>']"#)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_visibility_follows_ancestors() {
        let page = sample_page();
        let hidden = page.first("input[name=hidden_child]").unwrap();
        let shown = page.first("input[name=first_name]").unwrap();
        assert!(!page.element(hidden).await.unwrap().visible);
        assert!(page.element(shown).await.unwrap().visible);
    }

    #[tokio::test]
    async fn test_select_value_requires_matching_option() {
        let page = sample_page();
        let select = page.first("select").unwrap();
        assert_eq!(page.value_of(select), "");
        page.set_value(select, "CA").await.unwrap();
        assert_eq!(page.value_of(select), "CA");
        page.set_value(select, "TX").await.unwrap();
        assert_eq!(page.value_of(select), "");
    }

    #[tokio::test]
    async fn test_radio_group_is_exclusive() {
        let page = sample_page();
        let radios = page.query_selector_all("input[type=radio]").await.unwrap();
        page.click(radios[0]).await.unwrap();
        page.set_checked(radios[1], true).await.unwrap();
        page.with_dom(|dom| {
            assert!(!dom.is_checked(radios[0]));
            assert!(dom.is_checked(radios[1]));
        });
    }

    #[tokio::test]
    async fn test_removed_nodes_are_stale() {
        let page = sample_page();
        let input = page.first("input[name=first_name]").unwrap();
        page.with_dom(|dom| dom.remove(input));
        assert_eq!(
            page.element(input).await.unwrap_err(),
            PageError::StaleElement(input)
        );
        assert!(page.first("input[name=first_name]").is_none());
    }

    #[tokio::test]
    async fn test_click_reactions_run_unless_disabled() {
        let page = sample_page();
        let button = page.with_dom(|dom| {
            let form = dom.first("form").unwrap();
            let button = dom.append(form, ElementSpec::new("button").text("Go"));
            dom.on_click(button, |dom| {
                let body = dom.body();
                dom.append(body, ElementSpec::new("p").attr("id", "done"));
            });
            button
        });

        page.with_dom(|dom| dom.set_attribute(button, "disabled", ""));
        page.click(button).await.unwrap();
        assert!(page.first("#done").is_none());

        page.with_dom(|dom| dom.remove_attribute(button, "disabled"));
        page.click(button).await.unwrap();
        assert!(page.first("#done").is_some());
        assert_eq!(page.with_dom(|dom| dom.click_count(button)), 2);
    }

    #[tokio::test]
    async fn test_escape_hides_open_listbox() {
        let page = MemoryPage::with_body(
            "https://x.test",
            [ElementSpec::new("ul").attr("role", "listbox")],
        );
        let listbox = page.first("[role=listbox]").unwrap();
        page.dispatch(listbox, DomEventKind::KeyDown("Escape".to_string()))
            .await
            .unwrap();
        assert!(!page.with_dom(|dom| dom.is_visible(listbox)));
    }

    #[tokio::test]
    async fn test_attach_file_honours_failure_switch() {
        let page = MemoryPage::with_body("https://x.test", [ElementSpec::input("file")]);
        let input = page.first("input[type=file]").unwrap();
        let file = ResumeFile {
            name: "cv.pdf".to_string(),
            mime_type: "application/pdf".to_string(),
            data: Default::default(),
        };
        page.attach_file(input, &file).await.unwrap();
        assert_eq!(page.with_dom(|dom| dom.attachment(input).cloned()), Some(file.clone()));

        page.with_dom(|dom| dom.fail_uploads("network error"));
        assert!(page.attach_file(input, &file).await.is_err());
    }
}

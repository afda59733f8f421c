//! Page abstraction: the only way the engine touches a live document.
//!
//! Backends:
//! - `memory::MemoryPage`: in-process document queried through `scraper`
//!   selectors, used for synthetic pages and all behavioral tests.
//! - Browser backends (extension content script, CDP, WebDriver) implement
//!   `Page` outside this crate.

pub mod memory;

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::PageError;
use crate::models::ResumeFile;

pub use memory::{ElementSpec, MemoryPage};

/// Opaque handle to an element owned by a `Page` backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Synthetic signals dispatched after programmatic mutation so reactive
/// front ends observe the change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DomEventKind {
    Input,
    Change,
    Blur,
    Focus,
    Click,
    KeyDown(String),
}

/// Point-in-time view of one element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementSnapshot {
    pub node: NodeId,
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    pub text: String,
    pub value: String,
    pub checked: bool,
    pub visible: bool,
}

impl ElementSnapshot {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Lower-cased `type` for inputs; `text` when absent.
    pub fn input_type(&self) -> String {
        self.attr("type")
            .map(|t| t.trim().to_ascii_lowercase())
            .unwrap_or_else(|| "text".to_string())
    }

    pub fn is_disabled(&self) -> bool {
        self.has_attr("disabled")
            || self
                .attr("aria-disabled")
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(false)
    }

    pub fn is_readonly(&self) -> bool {
        self.has_attr("readonly")
    }

    /// Visible label-ish text: `aria-label`, then `value` for button inputs, then text content.
    pub fn accessible_name(&self) -> String {
        if let Some(label) = self.attr("aria-label") {
            return label.trim().to_string();
        }
        if self.tag == "input" {
            return self.attr("value").unwrap_or_default().trim().to_string();
        }
        self.text.trim().to_string()
    }
}

/// Async view of a live document.
///
/// Every call is a suspension point, so a backend talking to a real browser
/// can yield to the page's own scripting between engine steps.
#[async_trait]
pub trait Page: Send + Sync {
    async fn url(&self) -> Result<String, PageError>;

    /// First element in document order matching `selector`.
    async fn query_selector(&self, selector: &str) -> Result<Option<NodeId>, PageError>;

    async fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>, PageError>;

    /// Descendants of `scope` matching `selector`, in document order.
    async fn query_within(&self, scope: NodeId, selector: &str) -> Result<Vec<NodeId>, PageError>;

    async fn element(&self, node: NodeId) -> Result<ElementSnapshot, PageError>;

    async fn set_value(&self, node: NodeId, value: &str) -> Result<(), PageError>;

    async fn set_checked(&self, node: NodeId, checked: bool) -> Result<(), PageError>;

    async fn click(&self, node: NodeId) -> Result<(), PageError>;

    async fn dispatch(&self, node: NodeId, event: DomEventKind) -> Result<(), PageError>;

    async fn attach_file(&self, node: NodeId, file: &ResumeFile) -> Result<(), PageError>;
}

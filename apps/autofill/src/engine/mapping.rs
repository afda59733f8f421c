use std::fmt;

use crate::dom::NodeId;
use crate::engine::fill::ElementKind;
use crate::models::{FieldType, ResumeData};

pub type ValueResolver = fn(&ResumeData) -> Option<String>;

/// How the matched element should be driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Widget {
    /// Decide from the element itself (tag, type, role).
    Auto,
    /// A div/button masquerading as a select.
    Dropdown,
}

/// Declarative association between a semantic field and the DOM.
///
/// `selectors` are tried in order; the first one resolving to a live element wins.
#[derive(Clone, Copy)]
pub struct FieldMapping {
    pub field_type: FieldType,
    pub selectors: &'static [&'static str],
    pub value: ValueResolver,
    pub widget: Widget,
}

impl FieldMapping {
    pub const fn new(
        field_type: FieldType,
        selectors: &'static [&'static str],
        value: ValueResolver,
    ) -> Self {
        Self {
            field_type,
            selectors,
            value,
            widget: Widget::Auto,
        }
    }

    pub const fn dropdown(mut self) -> Self {
        self.widget = Widget::Dropdown;
        self
    }

    /// Resolved, trimmed value; `None` when the résumé has nothing for this field.
    pub fn get_value(&self, resume: &ResumeData) -> Option<String> {
        (self.value)(resume)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

impl fmt::Debug for FieldMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldMapping")
            .field("field_type", &self.field_type)
            .field("selectors", &self.selectors)
            .field("widget", &self.widget)
            .finish()
    }
}

/// A mapping resolved against the live page.
#[derive(Debug, Clone)]
pub struct DetectedField {
    pub mapping: &'static FieldMapping,
    pub node: NodeId,
    pub selector: &'static str,
    pub kind: ElementKind,
}

impl DetectedField {
    /// Document fields on file inputs are handled by the upload step, not the fill step.
    pub fn is_deferred_upload(&self) -> bool {
        self.mapping.field_type.is_document() && self.kind == ElementKind::File
    }
}

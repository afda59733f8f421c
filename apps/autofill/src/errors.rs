use thiserror::Error;

use crate::dom::NodeId;

/// Session-level error. Only detection failures abort a session; everything
/// else degrades into failed `FilledField` records.
#[derive(Debug, Error)]
pub enum AutofillError {
    #[error("Detection failed: no adapter recognised a form on {url}")]
    NoMatchingAdapter { url: String },

    #[error("Detection failed: {platform} adapter found no fillable fields")]
    NoFieldsDetected { platform: String },
}

impl AutofillError {
    pub fn is_detection_failure(&self) -> bool {
        matches!(
            self,
            AutofillError::NoMatchingAdapter { .. } | AutofillError::NoFieldsDetected { .. }
        )
    }
}

/// Errors raised by a `Page` backend.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PageError {
    #[error("Element {0} is no longer attached to the document")]
    StaleElement(NodeId),

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("Element {node} rejected the operation: {reason}")]
    Rejected { node: NodeId, reason: String },

    #[error("Backend error: {0}")]
    Backend(String),
}

/// Why a single field could not be filled. Rendered into `FilledField::error`.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FillError {
    #[error("element is disabled")]
    Disabled,

    #[error("element is read-only")]
    ReadOnly,

    #[error("no option matching '{wanted}'")]
    NoMatchingOption { wanted: String },

    #[error("dropdown options did not appear within {timeout_ms}ms")]
    DropdownTimeout { timeout_ms: u64 },

    #[error("value was not retained (expected '{expected}', found '{actual}')")]
    ValueNotRetained { expected: String, actual: String },

    #[error("no date sub-fields found in container")]
    MissingDateParts,

    #[error("invalid date '{0}'")]
    InvalidDate(String),

    #[error("upload failed: {0}")]
    Upload(#[from] UploadError),

    #[error("page error: {0}")]
    Page(#[from] PageError),
}

/// Errors returned by a `FileUploader`.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum UploadError {
    #[error("no resume file available")]
    NoFile,

    #[error("no file input or text fallback available")]
    NoTarget,

    #[error("uploader rejected the file: {0}")]
    Rejected(String),

    #[error("page error: {0}")]
    Page(#[from] PageError),
}

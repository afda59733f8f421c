//! Document upload and the text-résumé fallback chain.

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, info, warn};

use crate::dom::{DomEventKind, NodeId, Page};
use crate::engine::fill::fill_text;
use crate::engine::mapping::DetectedField;
use crate::engine::StepContext;
use crate::errors::{PageError, UploadError};
use crate::models::{FieldType, FilledField, ResumeData, ResumeFile};
use crate::text_resume;

/// Attaches a file to a file-input element.
///
/// Must return an error on any failure; a silent success would hide a
/// missing résumé from the user.
#[async_trait]
pub trait FileUploader: Send + Sync {
    async fn upload(&self, page: &dyn Page, file_input: NodeId, file: &ResumeFile) -> Result<(), UploadError>;
}

/// Default uploader: the page backend's `attach_file`, followed by the
/// events a user-picked file would fire.
pub struct PageFileUploader;

#[async_trait]
impl FileUploader for PageFileUploader {
    async fn upload(&self, page: &dyn Page, file_input: NodeId, file: &ResumeFile) -> Result<(), UploadError> {
        page.attach_file(file_input, file).await.map_err(|e| match e {
            PageError::Rejected { reason, .. } => UploadError::Rejected(reason),
            other => UploadError::Page(other),
        })?;
        page.dispatch(file_input, DomEventKind::Input).await?;
        page.dispatch(file_input, DomEventKind::Change).await?;
        Ok(())
    }
}

/// The file a document field should receive. Cover letters are synthesised
/// from text; `None` means there is nothing to upload.
pub fn document_for(field_type: FieldType, resume: &ResumeData) -> Option<ResumeFile> {
    match field_type {
        FieldType::Resume => resume.resume_file.clone(),
        FieldType::CoverLetter => resume
            .cover_letter
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(|text| ResumeFile {
                name: "cover_letter.txt".to_string(),
                mime_type: "text/plain".to_string(),
                data: Bytes::from(text.to_string()),
            }),
        _ => None,
    }
}

/// Uploads the document for one file-input field. Returns `None` only for
/// an optional document (cover letter) the résumé does not carry.
pub async fn upload_document(ctx: StepContext<'_>, field: &DetectedField) -> Option<FilledField> {
    let field_type = field.mapping.field_type;
    let Some(file) = document_for(field_type, ctx.resume) else {
        if field_type == FieldType::CoverLetter {
            debug!(selector = %field.selector, "No cover letter, skipping upload");
            return None;
        }
        return Some(FilledField::failed(field_type, "", field.selector, UploadError::NoFile));
    };

    match ctx.uploader.upload(ctx.page, field.node, &file).await {
        Ok(()) => {
            info!(field = %field_type, file = %file.name, "Document uploaded");
            Some(FilledField::succeeded(field_type, file.name, field.selector))
        }
        Err(e) => Some(FilledField::failed(field_type, file.name, field.selector, e)),
    }
}

/// Fills the first present text-résumé field with the synthesised résumé.
/// `reveal` controls (e.g. "Enter manually") are clicked first when present.
pub async fn fill_text_resume(
    ctx: StepContext<'_>,
    reveal: &[&str],
    selectors: &[&'static str],
) -> Option<FilledField> {
    for selector in reveal {
        if let Ok(Some(node)) = ctx.page.query_selector(selector).await {
            if let Err(e) = ctx.page.click(node).await {
                debug!(selector = %selector, error = %e, "Reveal click failed");
            }
            break;
        }
    }

    for &selector in selectors {
        let Ok(Some(node)) = ctx.page.query_selector(selector).await else {
            continue;
        };
        let text = text_resume::render(ctx.resume);
        let record = match fill_text(ctx.page, node, &text).await {
            Ok(()) => FilledField::succeeded(FieldType::ResumeText, text, selector),
            Err(e) => FilledField::failed(FieldType::ResumeText, text, selector, e),
        };
        return Some(record);
    }
    None
}

/// Binary upload first; when it fails or no file input exists, the text
/// résumé. A failed upload is recorded only when no text field exists.
pub async fn upload_with_text_fallback(
    ctx: StepContext<'_>,
    uploads: &[DetectedField],
    reveal: &[&str],
    text_selectors: &[&'static str],
) -> Vec<FilledField> {
    let mut records = Vec::new();
    let mut failed_resume = None;
    let mut resume_attempted = false;

    for field in uploads {
        let Some(record) = upload_document(ctx, field).await else {
            continue;
        };
        if field.mapping.field_type == FieldType::Resume {
            resume_attempted = true;
            if !record.success {
                failed_resume = Some(record);
                continue;
            }
        }
        records.push(record);
    }

    if resume_attempted && failed_resume.is_none() {
        return records;
    }
    if !resume_attempted && ctx.resume.resume_file.is_none() && !has_text_content(ctx.resume) {
        return records;
    }

    match fill_text_resume(ctx, reveal, text_selectors).await {
        Some(text) => {
            if let Some(failed) = &failed_resume {
                warn!(
                    error = failed.error.as_deref().unwrap_or_default(),
                    "Resume upload failed, used text fallback"
                );
            }
            records.push(text);
        }
        None => records.extend(failed_resume),
    }
    records
}

fn has_text_content(resume: &ResumeData) -> bool {
    !resume.personal_info.first_name.trim().is_empty()
        || !resume.experience.is_empty()
        || !resume.education.is_empty()
}

//! Greenhouse (`boards.greenhouse.io`).
//!
//! Single page. Résumé upload falls back to the "paste" textarea, EEOC
//! questions are declined, and required terms checkboxes are ticked before
//! submission.

use async_trait::async_trait;

use crate::adapters::resolvers as r;
use crate::engine::mapping::{DetectedField, FieldMapping};
use crate::engine::questions::{answer_decline_options, check_required_terms};
use crate::engine::steps::{self, SubmitOutcome};
use crate::engine::{AdapterFeatures, AdapterMetadata, AtsAdapter, Platform, StepContext};
use crate::models::{FieldType, FilledField};
use crate::upload::upload_with_text_fallback;

const FORM_SELECTORS: &[&str] = &["#application_form", "form#application-form", "#grnhse_app"];

const MAPPINGS: &[FieldMapping] = &[
    FieldMapping::new(
        FieldType::FirstName,
        &["#first_name", r#"input[name="job_application[first_name]"]"#],
        r::first_name,
    ),
    FieldMapping::new(
        FieldType::LastName,
        &["#last_name", r#"input[name="job_application[last_name]"]"#],
        r::last_name,
    ),
    FieldMapping::new(
        FieldType::Email,
        &["#email", r#"input[name="job_application[email]"]"#],
        r::email,
    ),
    FieldMapping::new(
        FieldType::Phone,
        &["#phone", r#"input[name="job_application[phone]"]"#],
        r::phone,
    ),
    FieldMapping::new(
        FieldType::City,
        &["#job_application_location", r#"input[name="job_application[location]"]"#],
        r::location,
    ),
    FieldMapping::new(
        FieldType::LinkedIn,
        &[r#"input[name*="linkedin" i]"#, r#"input[id*="linkedin" i]"#],
        r::linkedin,
    ),
    FieldMapping::new(
        FieldType::Github,
        &[r#"input[name*="github" i]"#, r#"input[id*="github" i]"#],
        r::github,
    ),
    FieldMapping::new(
        FieldType::Website,
        &[r#"input[name*="website" i]"#, r#"input[id*="portfolio" i]"#],
        r::website,
    ),
    FieldMapping::new(
        FieldType::CurrentCompany,
        &[r#"input[name*="current_company" i]"#, r#"input[autocomplete="organization"]"#],
        r::current_company,
    ),
    FieldMapping::new(
        FieldType::Resume,
        &[
            r#"input[type="file"]#resume"#,
            r#"#s3_upload_for_resume input[type="file"]"#,
            r#"input[type="file"][name*="resume" i]"#,
        ],
        r::resume,
    ),
    FieldMapping::new(
        FieldType::CoverLetter,
        &[
            r#"input[type="file"]#cover_letter"#,
            r#"#s3_upload_for_cover_letter input[type="file"]"#,
            "#cover_letter_text",
            r#"textarea[name*="cover_letter" i]"#,
        ],
        r::cover_letter,
    ),
];

const TEXT_RESUME_SELECTORS: &[&str] = &[
    "#resume_text",
    r#"textarea[name="job_application[resume_text]"]"#,
    r#"textarea[name*="resume" i]"#,
];

const REVEAL_TEXT_RESUME: &[&str] = &[r#"button[data-source="paste"]"#, r#"a[data-source="paste"]"#];

const EEOC_SCOPES: &[&str] = &["#eeoc_fields", ".eeoc", "#demographic-questions"];

pub struct GreenhouseAdapter;

#[async_trait]
impl AtsAdapter for GreenhouseAdapter {
    fn metadata(&self) -> AdapterMetadata {
        AdapterMetadata {
            name: "Greenhouse",
            platform: Platform::Greenhouse,
            version: "1.0.0",
            features: AdapterFeatures {
                file_upload: true,
                custom_questions: true,
                ..AdapterFeatures::default()
            },
        }
    }

    fn form_selectors(&self) -> &'static [&'static str] {
        FORM_SELECTORS
    }

    fn url_patterns(&self) -> &'static [&'static str] {
        &["boards.greenhouse.io", "job-boards.greenhouse.io"]
    }

    fn field_mappings(&self) -> &'static [FieldMapping] {
        MAPPINGS
    }

    fn submit_selectors(&self) -> &'static [&'static str] {
        &["#submit_app", r#"button[type="submit"]"#, r#"input[type="submit"]"#]
    }

    async fn handle_custom_questions(&self, ctx: StepContext<'_>) -> Vec<FilledField> {
        answer_decline_options(ctx, EEOC_SCOPES).await
    }

    async fn handle_file_uploads(&self, ctx: StepContext<'_>, uploads: &[DetectedField]) -> Vec<FilledField> {
        upload_with_text_fallback(ctx, uploads, REVEAL_TEXT_RESUME, TEXT_RESUME_SELECTORS).await
    }

    async fn submit_form(&self, ctx: StepContext<'_>) -> SubmitOutcome {
        let mut housekeeping = check_required_terms(ctx).await;
        let outcome = steps::submit_form(self, ctx).await;
        housekeeping.extend(outcome.housekeeping);
        SubmitOutcome {
            housekeeping,
            submitted: outcome.submitted,
        }
    }
}

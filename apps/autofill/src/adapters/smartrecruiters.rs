//! SmartRecruiters (`jobs.smartrecruiters.com`).

use async_trait::async_trait;

use crate::adapters::resolvers as r;
use crate::engine::mapping::FieldMapping;
use crate::engine::{AdapterFeatures, AdapterMetadata, AtsAdapter, Platform};
use crate::models::FieldType;

const FORM_SELECTORS: &[&str] = &[
    r#"form[name="applicationForm"]"#,
    r#"[data-test="application-form"]"#,
    "oc-apply-form",
];

const MAPPINGS: &[FieldMapping] = &[
    FieldMapping::new(
        FieldType::FirstName,
        &[r#"input[data-test="first-name-input"]"#, "#firstName", r#"input[name="firstName"]"#],
        r::first_name,
    ),
    FieldMapping::new(
        FieldType::LastName,
        &[r#"input[data-test="last-name-input"]"#, "#lastName", r#"input[name="lastName"]"#],
        r::last_name,
    ),
    FieldMapping::new(
        FieldType::Email,
        &[r#"input[data-test="email-input"]"#, "#email", r#"input[type="email"]"#],
        r::email,
    ),
    FieldMapping::new(
        FieldType::Phone,
        &[r#"input[data-test="phone-input"]"#, "#phoneNumber", r#"input[type="tel"]"#],
        r::phone,
    ),
    FieldMapping::new(
        FieldType::City,
        &[r#"input[data-test="location-input"]"#, r#"input[name="location"]"#],
        r::location,
    ),
    FieldMapping::new(
        FieldType::LinkedIn,
        &[r#"input[data-test="linkedin-input"]"#, r#"input[name*="linkedin" i]"#],
        r::linkedin,
    ),
    FieldMapping::new(
        FieldType::Website,
        &[r#"input[data-test="website-input"]"#, r#"input[name*="website" i]"#],
        r::website,
    ),
    FieldMapping::new(
        FieldType::Resume,
        &[r#"input[type="file"][data-test="resume-upload-input"]"#, r#"input[type="file"]"#],
        r::resume,
    ),
    FieldMapping::new(
        FieldType::CoverLetter,
        &[r#"textarea[data-test="cover-letter-input"]"#, r#"textarea[name*="message" i]"#],
        r::cover_letter,
    ),
];

pub struct SmartRecruitersAdapter;

#[async_trait]
impl AtsAdapter for SmartRecruitersAdapter {
    fn metadata(&self) -> AdapterMetadata {
        AdapterMetadata {
            name: "SmartRecruiters",
            platform: Platform::SmartRecruiters,
            version: "1.0.0",
            features: AdapterFeatures {
                dynamic_forms: true,
                file_upload: true,
                profile_import: true,
                ..AdapterFeatures::default()
            },
        }
    }

    fn form_selectors(&self) -> &'static [&'static str] {
        FORM_SELECTORS
    }

    fn url_patterns(&self) -> &'static [&'static str] {
        &["smartrecruiters.com"]
    }

    fn field_mappings(&self) -> &'static [FieldMapping] {
        MAPPINGS
    }

    fn submit_selectors(&self) -> &'static [&'static str] {
        &[r#"button[data-test="footer-submit"]"#, r#"button[type="submit"]"#]
    }
}

//! Indeed Apply (`indeed.com` / `smartapply.indeed.com`).

use async_trait::async_trait;

use crate::adapters::resolvers as r;
use crate::engine::mapping::FieldMapping;
use crate::engine::navigation::NavigationProfile;
use crate::engine::{AdapterFeatures, AdapterMetadata, AtsAdapter, Platform};
use crate::models::FieldType;

const FORM_SELECTORS: &[&str] = &["#ia-container", r#"[data-testid="ia-container"]"#, "#indeedApplyWidget"];

const MAPPINGS: &[FieldMapping] = &[
    FieldMapping::new(
        FieldType::FirstName,
        &[r#"input[name="firstName"]"#, r#"input[id*="applicant.firstName" i]"#],
        r::first_name,
    ),
    FieldMapping::new(
        FieldType::LastName,
        &[r#"input[name="lastName"]"#, r#"input[id*="applicant.lastName" i]"#],
        r::last_name,
    ),
    FieldMapping::new(
        FieldType::FullName,
        &[r#"input[name="applicant.name"]"#, r#"input[id="input-applicant.name"]"#],
        r::full_name,
    ),
    FieldMapping::new(
        FieldType::Email,
        &[r#"input[name="applicant.emailAddress"]"#, r#"input[type="email"]"#],
        r::email,
    ),
    FieldMapping::new(
        FieldType::Phone,
        &[r#"input[name="applicant.phoneNumber"]"#, r#"input[name="phoneNumber"]"#, r#"input[type="tel"]"#],
        r::phone,
    ),
    FieldMapping::new(
        FieldType::City,
        &[r#"input[name="location.city"]"#, r#"input[name*="city" i]"#],
        r::city,
    ),
    FieldMapping::new(
        FieldType::PostalCode,
        &[r#"input[name="location.postalCode"]"#],
        r::postal_code,
    ),
    FieldMapping::new(
        FieldType::CurrentTitle,
        &[r#"input[name="jobTitle"]"#],
        r::current_title,
    ),
    FieldMapping::new(
        FieldType::CurrentCompany,
        &[r#"input[name="companyName"]"#],
        r::current_company,
    ),
    FieldMapping::new(
        FieldType::Resume,
        &[r#"input[type="file"][data-testid*="resume" i]"#, r#"input[type="file"][name*="resume" i]"#],
        r::resume,
    ),
    FieldMapping::new(
        FieldType::CoverLetter,
        &[r#"textarea[name*="coverletter" i]"#, r#"textarea[id*="coverletter" i]"#],
        r::cover_letter,
    ),
];

pub struct IndeedAdapter;

#[async_trait]
impl AtsAdapter for IndeedAdapter {
    fn metadata(&self) -> AdapterMetadata {
        AdapterMetadata {
            name: "Indeed",
            platform: Platform::Indeed,
            version: "1.0.0",
            features: AdapterFeatures {
                multi_page: true,
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
        &["smartapply.indeed.com", "indeed.com/apply"]
    }

    fn field_mappings(&self) -> &'static [FieldMapping] {
        MAPPINGS
    }

    fn navigation(&self) -> NavigationProfile {
        NavigationProfile {
            next_selectors: &[r#"button[data-testid="continue-button"]"#, ".ia-continueButton"],
            next_labels: &["continue"],
            ..NavigationProfile::default()
        }
    }

    fn submit_selectors(&self) -> &'static [&'static str] {
        &[r#"button[data-testid="submit-application-button"]"#, r#"button[type="submit"]"#]
    }
}

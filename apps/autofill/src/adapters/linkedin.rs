//! LinkedIn Easy Apply modal.

use async_trait::async_trait;

use crate::adapters::resolvers as r;
use crate::engine::mapping::FieldMapping;
use crate::engine::navigation::NavigationProfile;
use crate::engine::steps::InitProfile;
use crate::engine::{AdapterFeatures, AdapterMetadata, AtsAdapter, Platform};
use crate::models::FieldType;

const FORM_SELECTORS: &[&str] = &[
    ".jobs-easy-apply-modal",
    r#"[data-test-modal-id="easy-apply-modal"]"#,
    ".jobs-easy-apply-content",
];

const MAPPINGS: &[FieldMapping] = &[
    FieldMapping::new(
        FieldType::FirstName,
        &[r#"input[id*="firstName" i]"#, r#"input[name*="firstName" i]"#],
        r::first_name,
    ),
    FieldMapping::new(
        FieldType::LastName,
        &[r#"input[id*="lastName" i]"#, r#"input[name*="lastName" i]"#],
        r::last_name,
    ),
    FieldMapping::new(
        FieldType::Email,
        &[r#"select[id*="emailAddress" i]"#, r#"input[id*="email" i]"#, r#"input[type="email"]"#],
        r::email,
    ),
    FieldMapping::new(
        FieldType::Phone,
        &[r#"input[id*="phoneNumber-nationalNumber" i]"#, r#"input[id*="phoneNumber" i]"#],
        r::phone,
    ),
    FieldMapping::new(
        FieldType::City,
        &[r#"input[id*="location-GEO-LOCATION" i]"#, r#"input[id*="city" i]"#],
        r::location,
    ),
    FieldMapping::new(
        FieldType::Resume,
        &[
            r#"input[type="file"][id*="jobs-document-upload" i]"#,
            r#"input[type="file"][name="file"]"#,
        ],
        r::resume,
    ),
];

pub struct LinkedInAdapter;

#[async_trait]
impl AtsAdapter for LinkedInAdapter {
    fn metadata(&self) -> AdapterMetadata {
        AdapterMetadata {
            name: "LinkedIn Easy Apply",
            platform: Platform::LinkedIn,
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
        &["linkedin.com/jobs"]
    }

    fn field_mappings(&self) -> &'static [FieldMapping] {
        MAPPINGS
    }

    fn init_profile(&self) -> InitProfile {
        InitProfile {
            container_selectors: &[".jobs-easy-apply-content", r#"[data-test-modal-id="easy-apply-modal"]"#],
            ..InitProfile::default()
        }
    }

    fn navigation(&self) -> NavigationProfile {
        NavigationProfile {
            next_selectors: &[
                r#"button[aria-label="Continue to next step"]"#,
                r#"button[aria-label="Review your application"]"#,
                "button[data-easy-apply-next-button]",
            ],
            next_labels: &["next", "review", "continue"],
            progress_selectors: &[r#"[role="progressbar"]"#, ".artdeco-completeness-meter-linear"],
            step_tab_selectors: &[],
        }
    }

    fn submit_selectors(&self) -> &'static [&'static str] {
        &[r#"button[aria-label="Submit application"]"#]
    }
}

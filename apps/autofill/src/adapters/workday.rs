//! Workday (`*.myworkdayjobs.com`).
//!
//! Multi-page flow keyed on `data-automation-id`. Country/state/degree are
//! button dropdowns whose options render as `promptOption` items in a popup.

use std::time::Duration;

use async_trait::async_trait;

use crate::adapters::resolvers as r;
use crate::engine::mapping::FieldMapping;
use crate::engine::navigation::NavigationProfile;
use crate::engine::questions::answer_decline_options;
use crate::engine::steps::InitProfile;
use crate::engine::{AdapterFeatures, AdapterMetadata, AtsAdapter, Platform, StepContext};
use crate::models::{FieldType, FilledField};

const FORM_SELECTORS: &[&str] = &[
    r#"[data-automation-id="applyFlowPage"]"#,
    r#"[data-automation-id="jobApplicationPage"]"#,
    r#"form[data-automation-id="applicationForm"]"#,
];

const MAPPINGS: &[FieldMapping] = &[
    FieldMapping::new(
        FieldType::FirstName,
        &[
            r#"input[data-automation-id="legalNameSection_firstName"]"#,
            r#"input[data-automation-id="firstName"]"#,
            r#"input[name*="firstName" i]"#,
        ],
        r::first_name,
    ),
    FieldMapping::new(
        FieldType::LastName,
        &[
            r#"input[data-automation-id="legalNameSection_lastName"]"#,
            r#"input[data-automation-id="lastName"]"#,
            r#"input[name*="lastName" i]"#,
        ],
        r::last_name,
    ),
    FieldMapping::new(
        FieldType::Email,
        &[r#"input[data-automation-id="email"]"#, r#"input[type="email"]"#],
        r::email,
    ),
    FieldMapping::new(
        FieldType::Phone,
        &[
            r#"input[data-automation-id="phone-number"]"#,
            r#"input[data-automation-id="phoneNumber"]"#,
            r#"input[type="tel"]"#,
        ],
        r::phone,
    ),
    FieldMapping::new(
        FieldType::Address,
        &[r#"input[data-automation-id="addressSection_addressLine1"]"#],
        r::street,
    ),
    FieldMapping::new(
        FieldType::City,
        &[r#"input[data-automation-id="addressSection_city"]"#],
        r::city,
    ),
    FieldMapping::new(
        FieldType::State,
        &[r#"button[data-automation-id="addressSection_countryRegion"]"#],
        r::state,
    )
    .dropdown(),
    FieldMapping::new(
        FieldType::PostalCode,
        &[r#"input[data-automation-id="addressSection_postalCode"]"#],
        r::postal_code,
    ),
    FieldMapping::new(
        FieldType::Country,
        &[r#"button[data-automation-id="countryDropdown"]"#],
        r::country,
    )
    .dropdown(),
    FieldMapping::new(
        FieldType::LinkedIn,
        &[r#"input[data-automation-id="linkedinQuestion"]"#],
        r::linkedin,
    ),
    FieldMapping::new(
        FieldType::CurrentTitle,
        &[r#"input[data-automation-id="jobTitle"]"#],
        r::current_title,
    ),
    FieldMapping::new(
        FieldType::CurrentCompany,
        &[r#"input[data-automation-id="company"]"#],
        r::current_company,
    ),
    FieldMapping::new(
        FieldType::School,
        &[r#"input[data-automation-id="school"]"#],
        r::school,
    ),
    FieldMapping::new(
        FieldType::Degree,
        &[r#"button[data-automation-id="degree"]"#],
        r::degree,
    )
    .dropdown(),
    FieldMapping::new(
        FieldType::Resume,
        &[
            r#"input[data-automation-id="file-upload-input-ref"]"#,
            r#"[data-automation-id="resumeSection"] input[type="file"]"#,
        ],
        r::resume,
    ),
];

const OPTION_SELECTORS: &[&str] = &[r#"[data-automation-id="promptOption"]"#, r#"[role="option"]"#];

const EEOC_SCOPES: &[&str] = &[
    r#"[data-automation-id="voluntaryDisclosuresPage"]"#,
    r#"[data-automation-id="selfIdentificationPage"]"#,
];

pub struct WorkdayAdapter;

#[async_trait]
impl AtsAdapter for WorkdayAdapter {
    fn metadata(&self) -> AdapterMetadata {
        AdapterMetadata {
            name: "Workday",
            platform: Platform::Workday,
            version: "1.0.0",
            features: AdapterFeatures {
                multi_page: true,
                dynamic_forms: true,
                file_upload: true,
                custom_questions: true,
                profile_import: true,
                auto_save: true,
            },
        }
    }

    fn form_selectors(&self) -> &'static [&'static str] {
        FORM_SELECTORS
    }

    fn url_patterns(&self) -> &'static [&'static str] {
        &["myworkdayjobs.com", ".workday.com"]
    }

    fn field_mappings(&self) -> &'static [FieldMapping] {
        MAPPINGS
    }

    fn init_profile(&self) -> InitProfile {
        InitProfile {
            timeout: Duration::from_secs(15),
            loading_selectors: &[
                r#"[data-automation-id="loadingSpinner"]"#,
                r#"[data-automation-id="wd-LoadingPanel"]"#,
            ],
            ..InitProfile::default()
        }
    }

    fn navigation(&self) -> NavigationProfile {
        NavigationProfile {
            next_selectors: &[
                r#"button[data-automation-id="bottom-navigation-next-button"]"#,
                r#"button[data-automation-id="pageFooterNextButton"]"#,
            ],
            next_labels: &["save and continue", "next", "continue"],
            progress_selectors: &[r#"[data-automation-id="progressBar"]"#],
            step_tab_selectors: &[r#"[data-automation-id="progressBarItem"]"#],
        }
    }

    fn option_selectors(&self) -> &'static [&'static str] {
        OPTION_SELECTORS
    }

    fn submit_selectors(&self) -> &'static [&'static str] {
        &[
            r#"button[data-automation-id="bottom-navigation-submit-button"]"#,
            r#"button[data-automation-id="submit"]"#,
        ]
    }

    async fn handle_custom_questions(&self, ctx: StepContext<'_>) -> Vec<FilledField> {
        answer_decline_options(ctx, EEOC_SCOPES).await
    }
}

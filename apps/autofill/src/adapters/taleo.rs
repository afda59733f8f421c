//! Oracle Taleo (`*.taleo.net`).

use std::time::Duration;

use async_trait::async_trait;

use crate::adapters::resolvers as r;
use crate::engine::mapping::FieldMapping;
use crate::engine::navigation::NavigationProfile;
use crate::engine::steps::InitProfile;
use crate::engine::{AdapterFeatures, AdapterMetadata, AtsAdapter, Platform};
use crate::models::FieldType;

const FORM_SELECTORS: &[&str] = &[
    r#"form[name="ftlform"]"#,
    "#requisitionDescriptionInterface",
    r#"[id*="taleo" i] form"#,
];

const MAPPINGS: &[FieldMapping] = &[
    FieldMapping::new(
        FieldType::FirstName,
        &[r#"input[id$="personal_info_FirstName"]"#, r#"input[id*="FirstName"]"#],
        r::first_name,
    ),
    FieldMapping::new(
        FieldType::LastName,
        &[r#"input[id$="personal_info_LastName"]"#, r#"input[id*="LastName"]"#],
        r::last_name,
    ),
    FieldMapping::new(
        FieldType::Email,
        &[r#"input[id$="personal_info_EmailAddress"]"#, r#"input[id*="EmailAddress"]"#],
        r::email,
    ),
    FieldMapping::new(
        FieldType::Phone,
        &[r#"input[id$="personal_info_HomePhone"]"#, r#"input[id*="Phone"]"#],
        r::phone,
    ),
    FieldMapping::new(
        FieldType::Address,
        &[r#"input[id$="personal_info_Address"]"#],
        r::street,
    ),
    FieldMapping::new(FieldType::City, &[r#"input[id$="personal_info_City"]"#], r::city),
    FieldMapping::new(
        FieldType::PostalCode,
        &[r#"input[id$="personal_info_ZipCode"]"#],
        r::postal_code,
    ),
    FieldMapping::new(
        FieldType::Country,
        &[r#"select[id$="personal_info_ResidenceLocation-0"]"#],
        r::country,
    ),
    FieldMapping::new(
        FieldType::State,
        &[r#"select[id$="personal_info_ResidenceLocation-1"]"#],
        r::state,
    ),
    FieldMapping::new(
        FieldType::Resume,
        &[r#"input[type="file"][id*="AttachedFile" i]"#, r#"input[type="file"]"#],
        r::resume,
    ),
];

pub struct TaleoAdapter;

#[async_trait]
impl AtsAdapter for TaleoAdapter {
    fn metadata(&self) -> AdapterMetadata {
        AdapterMetadata {
            name: "Taleo",
            platform: Platform::Taleo,
            version: "1.0.0",
            features: AdapterFeatures {
                multi_page: true,
                file_upload: true,
                auto_save: true,
                ..AdapterFeatures::default()
            },
        }
    }

    fn form_selectors(&self) -> &'static [&'static str] {
        FORM_SELECTORS
    }

    fn url_patterns(&self) -> &'static [&'static str] {
        &["taleo.net"]
    }

    fn field_mappings(&self) -> &'static [FieldMapping] {
        MAPPINGS
    }

    fn init_profile(&self) -> InitProfile {
        InitProfile {
            timeout: Duration::from_secs(10),
            ..InitProfile::default()
        }
    }

    fn navigation(&self) -> NavigationProfile {
        NavigationProfile {
            next_selectors: &[
                r#"input[id$="saveContinueCmdBottom"]"#,
                r#"button[id$="saveContinueCmdBottom"]"#,
            ],
            next_labels: &["save and continue", "continue", "next"],
            progress_selectors: &[".progressTracker", r#"[id*="progressBar" i]"#],
            step_tab_selectors: &[],
        }
    }

    fn submit_selectors(&self) -> &'static [&'static str] {
        &[r#"input[id$="submitCmdBottom"]"#, r#"button[id$="submitCmdBottom"]"#]
    }
}

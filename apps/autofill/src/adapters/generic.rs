//! Fallback for unknown sites: any page with a `<form>`.
//!
//! Uses only generic-tier selectors (case-insensitive `name`/`id`/
//! `placeholder`/`autocomplete` matching). First match wins; there is no
//! confidence scoring.

use async_trait::async_trait;

use crate::adapters::resolvers as r;
use crate::engine::mapping::FieldMapping;
use crate::engine::navigation::NavigationProfile;
use crate::engine::{AdapterFeatures, AdapterMetadata, AtsAdapter, Platform};
use crate::models::FieldType;

const MAPPINGS: &[FieldMapping] = &[
    FieldMapping::new(
        FieldType::FirstName,
        &[
            r#"input[autocomplete="given-name"]"#,
            r#"input[name*="first" i][name*="name" i]"#,
            r#"input[id*="first" i][id*="name" i]"#,
            r#"input[placeholder*="first name" i]"#,
        ],
        r::first_name,
    ),
    FieldMapping::new(
        FieldType::LastName,
        &[
            r#"input[autocomplete="family-name"]"#,
            r#"input[name*="last" i][name*="name" i]"#,
            r#"input[id*="last" i][id*="name" i]"#,
            r#"input[placeholder*="last name" i]"#,
        ],
        r::last_name,
    ),
    FieldMapping::new(
        FieldType::FullName,
        &[
            r#"input[autocomplete="name"]"#,
            r#"input[name="name" i]"#,
            r#"input[name*="full" i][name*="name" i]"#,
            r#"input[placeholder*="full name" i]"#,
        ],
        r::full_name,
    ),
    FieldMapping::new(
        FieldType::Email,
        &[
            r#"input[type="email"]"#,
            r#"input[name*="email" i]"#,
            r#"input[id*="email" i]"#,
        ],
        r::email,
    ),
    FieldMapping::new(
        FieldType::Phone,
        &[
            r#"input[type="tel"]"#,
            r#"input[name*="phone" i]"#,
            r#"input[id*="phone" i]"#,
        ],
        r::phone,
    ),
    FieldMapping::new(
        FieldType::Address,
        &[
            r#"input[autocomplete="address-line1"]"#,
            r#"input[name*="street" i]"#,
            r#"input[name*="address" i]:not([name*="email" i])"#,
        ],
        r::street,
    ),
    FieldMapping::new(
        FieldType::City,
        &[r#"input[autocomplete="address-level2"]"#, r#"input[name*="city" i]"#, r#"input[id*="city" i]"#],
        r::city,
    ),
    FieldMapping::new(
        FieldType::State,
        &[
            r#"select[name*="state" i]"#,
            r#"input[name*="state" i]"#,
            r#"input[autocomplete="address-level1"]"#,
        ],
        r::state,
    ),
    FieldMapping::new(
        FieldType::PostalCode,
        &[
            r#"input[autocomplete="postal-code"]"#,
            r#"input[name*="zip" i]"#,
            r#"input[name*="postal" i]"#,
        ],
        r::postal_code,
    ),
    FieldMapping::new(
        FieldType::Country,
        &[r#"select[name*="country" i]"#, r#"input[name*="country" i]"#],
        r::country,
    ),
    FieldMapping::new(
        FieldType::LinkedIn,
        &[r#"input[name*="linkedin" i]"#, r#"input[id*="linkedin" i]"#, r#"input[placeholder*="linkedin" i]"#],
        r::linkedin,
    ),
    FieldMapping::new(
        FieldType::Github,
        &[r#"input[name*="github" i]"#, r#"input[id*="github" i]"#],
        r::github,
    ),
    FieldMapping::new(
        FieldType::Website,
        &[r#"input[name*="website" i]"#, r#"input[name*="portfolio" i]"#, r#"input[type="url"]"#],
        r::website,
    ),
    FieldMapping::new(
        FieldType::CurrentCompany,
        &[r#"input[name*="company" i]"#, r#"input[name*="employer" i]"#],
        r::current_company,
    ),
    FieldMapping::new(
        FieldType::CurrentTitle,
        &[r#"input[name*="job_title" i]"#, r#"input[name*="jobtitle" i]"#, r#"input[name*="position" i]"#],
        r::current_title,
    ),
    FieldMapping::new(
        FieldType::School,
        &[r#"input[name*="school" i]"#, r#"input[name*="university" i]"#, r#"input[name*="institution" i]"#],
        r::school,
    ),
    FieldMapping::new(
        FieldType::Degree,
        &[r#"select[name*="degree" i]"#, r#"input[name*="degree" i]"#],
        r::degree,
    ),
    FieldMapping::new(
        FieldType::FieldOfStudy,
        &[r#"input[name*="major" i]"#, r#"input[name*="field_of_study" i]"#, r#"input[name*="discipline" i]"#],
        r::field_of_study,
    ),
    FieldMapping::new(
        FieldType::Skills,
        &[r#"textarea[name*="skill" i]"#, r#"input[name*="skill" i]"#],
        r::skills,
    ),
    FieldMapping::new(
        FieldType::Summary,
        &[r#"textarea[name*="summary" i]"#, r#"textarea[name*="about" i]"#],
        r::summary,
    ),
    FieldMapping::new(
        FieldType::CoverLetter,
        &[
            r#"textarea[name*="cover" i]"#,
            r#"textarea[id*="cover" i]"#,
            r#"input[type="file"][name*="cover" i]"#,
        ],
        r::cover_letter,
    ),
    FieldMapping::new(
        FieldType::Resume,
        &[
            r#"input[type="file"][name*="resume" i]"#,
            r#"input[type="file"][name*="cv" i]"#,
            r#"input[type="file"][id*="resume" i]"#,
            r#"input[type="file"]"#,
        ],
        r::resume,
    ),
];

pub struct GenericAdapter;

#[async_trait]
impl AtsAdapter for GenericAdapter {
    fn metadata(&self) -> AdapterMetadata {
        AdapterMetadata {
            name: "Generic",
            platform: Platform::Generic,
            version: "1.0.0",
            features: AdapterFeatures {
                file_upload: true,
                ..AdapterFeatures::default()
            },
        }
    }

    fn form_selectors(&self) -> &'static [&'static str] {
        &["form"]
    }

    fn field_mappings(&self) -> &'static [FieldMapping] {
        MAPPINGS
    }

    fn navigation(&self) -> NavigationProfile {
        NavigationProfile::default()
    }
}

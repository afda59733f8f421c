//! iCIMS (`*.icims.com`).
//!
//! Applicants must create an account before the profile form appears, and
//! dates are split into month/day/year sub-controls.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::adapters::resolvers as r;
use crate::credentials::AccountCredentials;
use crate::dom::{NodeId, Page};
use crate::engine::fill::{fill_date_parts, fill_text, has_date_parts};
use crate::engine::mapping::{DetectedField, FieldMapping};
use crate::engine::navigation::NavigationProfile;
use crate::engine::questions::answer_decline_options;
use crate::engine::steps::{self, InitProfile};
use crate::engine::{AdapterFeatures, AdapterMetadata, AtsAdapter, Platform, StepContext};
use crate::errors::FillError;
use crate::models::{FieldType, FilledField};

const FORM_SELECTORS: &[&str] = &["#iCIMS_MainWrapper", ".iCIMS_MainWrapper", "#iCIMS_Content"];

const MAPPINGS: &[FieldMapping] = &[
    FieldMapping::new(
        FieldType::FirstName,
        &[r#"input[id$="PersonProfileFields.FirstName"]"#, r#"input[name*="firstname" i]"#],
        r::first_name,
    ),
    FieldMapping::new(
        FieldType::LastName,
        &[r#"input[id$="PersonProfileFields.LastName"]"#, r#"input[name*="lastname" i]"#],
        r::last_name,
    ),
    FieldMapping::new(
        FieldType::Email,
        &[r#"input[id$="PersonProfileFields.Email"]"#, r#"input[name*="email" i]"#],
        r::email,
    ),
    FieldMapping::new(
        FieldType::Phone,
        &[r#"input[id*="PhoneNumber" i]"#, r#"input[type="tel"]"#],
        r::phone,
    ),
    FieldMapping::new(
        FieldType::Address,
        &[r#"input[id*="AddressStreet1" i]"#],
        r::street,
    ),
    FieldMapping::new(FieldType::City, &[r#"input[id*="AddressCity" i]"#], r::city),
    FieldMapping::new(
        FieldType::State,
        &[r#"select[id*="AddressState" i]"#],
        r::state,
    ),
    FieldMapping::new(
        FieldType::PostalCode,
        &[r#"input[id*="AddressZip" i]"#],
        r::postal_code,
    ),
    FieldMapping::new(
        FieldType::School,
        &[r#"input[id*="EducationSchool" i]"#, r#"input[name*="school" i]"#],
        r::school,
    ),
    FieldMapping::new(
        FieldType::Degree,
        &[r#"select[id*="EducationDegree" i]"#],
        r::degree,
    ),
    FieldMapping::new(
        FieldType::GraduationDate,
        &[r#"[data-field="graduationDate"]"#, r#"fieldset[id*="GraduationDate" i]"#, r#"div[id*="GraduationDate" i]"#],
        r::graduation_date,
    ),
    FieldMapping::new(
        FieldType::CurrentCompany,
        &[r#"input[id*="WorkExperienceEmployer" i]"#],
        r::current_company,
    ),
    FieldMapping::new(
        FieldType::CurrentTitle,
        &[r#"input[id*="WorkExperienceTitle" i]"#],
        r::current_title,
    ),
    FieldMapping::new(
        FieldType::StartDate,
        &[r#"[data-field="startDate"]"#, r#"div[id*="WorkExperienceStartDate" i]"#],
        r::current_start_date,
    ),
    FieldMapping::new(
        FieldType::Resume,
        &[r#"input[type="file"][id*="Resume" i]"#, r#"input[type="file"]"#],
        r::resume,
    ),
];

const CREATE_ACCOUNT_FORMS: &[&str] = &[
    "#iCIMS_CreateAccount",
    r#"form[id*="createAccount" i]"#,
    r#"form[name*="createAccount" i]"#,
];
const USERNAME_INPUT: &str = r#"input[name*="username" i], input[id*="username" i], input[type="email"]"#;
const PASSWORD_INPUT: &str = r#"input[type="password"]:not([name*="confirm" i]):not([id*="confirm" i])"#;
const CONFIRM_INPUT: &str = r#"input[type="password"][name*="confirm" i], input[type="password"][id*="confirm" i]"#;
const CREATE_ACCOUNT_BUTTON: &str = r#"button[type="submit"], input[type="submit"]"#;

const MASKED: &str = "********";

const EEOC_SCOPES: &[&str] = &["#iCIMS_EEOForm", r#"[id*="EEO" i] fieldset"#];

pub struct IcimsAdapter;

impl IcimsAdapter {
    async fn first_in(page: &dyn Page, scope: NodeId, selector: &str) -> Option<NodeId> {
        page.query_within(scope, selector)
            .await
            .ok()
            .and_then(|nodes| nodes.into_iter().next())
    }
}

#[async_trait]
impl AtsAdapter for IcimsAdapter {
    fn metadata(&self) -> AdapterMetadata {
        AdapterMetadata {
            name: "iCIMS",
            platform: Platform::Icims,
            version: "1.0.0",
            features: AdapterFeatures {
                multi_page: true,
                dynamic_forms: true,
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
        &[".icims.com"]
    }

    fn field_mappings(&self) -> &'static [FieldMapping] {
        MAPPINGS
    }

    fn init_profile(&self) -> InitProfile {
        InitProfile {
            timeout: Duration::from_secs(15),
            loading_selectors: &[".iCIMS_Loading", "#iCIMS_Spinner"],
            ..InitProfile::default()
        }
    }

    fn navigation(&self) -> NavigationProfile {
        NavigationProfile {
            next_selectors: &["#iCIMS_NextButton", r#"input[name="next"]"#],
            ..NavigationProfile::default()
        }
    }

    /// Creates the applicant account when the sign-up form is showing. The
    /// generated password is logged so the user can sign in later.
    async fn prepare_application(&self, ctx: StepContext<'_>) -> Vec<FilledField> {
        let page = ctx.page;
        let mut form = None;
        for selector in CREATE_ACCOUNT_FORMS {
            if let Ok(Some(node)) = page.query_selector(selector).await {
                form = Some(node);
                break;
            }
        }
        let Some(form) = form else {
            return Vec::new();
        };

        let credentials = AccountCredentials::for_email(&ctx.resume.personal_info.email);
        if credentials.username.is_empty() {
            warn!("Account creation form found but the resume has no email");
            return Vec::new();
        }

        let inputs = [
            (FieldType::Username, USERNAME_INPUT, credentials.username.as_str(), credentials.username.as_str()),
            (FieldType::Password, PASSWORD_INPUT, credentials.password.as_str(), MASKED),
            (FieldType::ConfirmPassword, CONFIRM_INPUT, credentials.password.as_str(), MASKED),
        ];
        let mut records = Vec::new();
        for (field_type, selector, value, shown) in inputs {
            let Some(node) = Self::first_in(page, form, selector).await else {
                continue;
            };
            records.push(match fill_text(page, node, value).await {
                Ok(()) => FilledField::succeeded(field_type, shown, selector),
                Err(e) => FilledField::failed(field_type, shown, selector, e),
            });
        }

        info!(
            username = %credentials.username,
            password = %credentials.password,
            "Created iCIMS account, keep these credentials to sign in later"
        );

        match Self::first_in(page, form, CREATE_ACCOUNT_BUTTON).await {
            Some(button) => match page.click(button).await {
                Ok(()) => steps::initialize(self, ctx).await,
                Err(e) => warn!(error = %e, "Create account click failed"),
            },
            None => warn!("Create account form has no submit control"),
        }
        records
    }

    async fn fill_field(
        &self,
        ctx: StepContext<'_>,
        field: &DetectedField,
        value: &str,
    ) -> Result<(), FillError> {
        let is_date = matches!(
            field.mapping.field_type,
            FieldType::GraduationDate | FieldType::StartDate
        );
        if is_date && has_date_parts(ctx.page, field.node).await {
            return fill_date_parts(ctx.page, field.node, value).await;
        }
        steps::fill_field(self, ctx, field, value).await
    }

    async fn handle_custom_questions(&self, ctx: StepContext<'_>) -> Vec<FilledField> {
        answer_decline_options(ctx, EEOC_SCOPES).await
    }
}

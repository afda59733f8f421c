use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed set of semantic field tags a mapping can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldType {
    FirstName,
    LastName,
    FullName,
    Email,
    Phone,
    Address,
    City,
    State,
    PostalCode,
    Country,
    LinkedIn,
    Github,
    Website,
    CurrentCompany,
    CurrentTitle,
    School,
    Degree,
    FieldOfStudy,
    GraduationDate,
    StartDate,
    Skills,
    Summary,
    Resume,
    ResumeText,
    CoverLetter,
    Username,
    Password,
    ConfirmPassword,
    CustomQuestion,
    Terms,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::FirstName => "firstName",
            FieldType::LastName => "lastName",
            FieldType::FullName => "fullName",
            FieldType::Email => "email",
            FieldType::Phone => "phone",
            FieldType::Address => "address",
            FieldType::City => "city",
            FieldType::State => "state",
            FieldType::PostalCode => "postalCode",
            FieldType::Country => "country",
            FieldType::LinkedIn => "linkedIn",
            FieldType::Github => "github",
            FieldType::Website => "website",
            FieldType::CurrentCompany => "currentCompany",
            FieldType::CurrentTitle => "currentTitle",
            FieldType::School => "school",
            FieldType::Degree => "degree",
            FieldType::FieldOfStudy => "fieldOfStudy",
            FieldType::GraduationDate => "graduationDate",
            FieldType::StartDate => "startDate",
            FieldType::Skills => "skills",
            FieldType::Summary => "summary",
            FieldType::Resume => "resume",
            FieldType::ResumeText => "resumeText",
            FieldType::CoverLetter => "coverLetter",
            FieldType::Username => "username",
            FieldType::Password => "password",
            FieldType::ConfirmPassword => "confirmPassword",
            FieldType::CustomQuestion => "customQuestion",
            FieldType::Terms => "terms",
        }
    }

    /// File-carrying fields are deferred from the fill step to the upload step.
    pub fn is_document(&self) -> bool {
        matches!(self, FieldType::Resume | FieldType::CoverLetter)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One fill attempt. Appended for every attempt, successful or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilledField {
    pub field_type: FieldType,
    pub value: String,
    /// Selector that matched; empty when no element was found at all.
    pub selector: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FilledField {
    pub fn succeeded(field_type: FieldType, value: impl Into<String>, selector: impl Into<String>) -> Self {
        Self {
            field_type,
            value: value.into(),
            selector: selector.into(),
            success: true,
            error: None,
        }
    }

    pub fn failed(
        field_type: FieldType,
        value: impl Into<String>,
        selector: impl Into<String>,
        error: impl fmt::Display,
    ) -> Self {
        Self {
            field_type,
            value: value.into(),
            selector: selector.into(),
            success: false,
            error: Some(error.to_string()),
        }
    }
}

/// Position within a multi-page application. Only the navigation step advances it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageState {
    pub current_page: u32,
    /// Best-effort, from a step indicator or step-tab count.
    pub total_pages: Option<u32>,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            current_page: 1,
            total_pages: None,
        }
    }
}

impl PageState {
    /// True once the indicator says the last page has been reached.
    pub fn on_last_page(&self) -> bool {
        self.total_pages
            .map(|total| self.current_page >= total)
            .unwrap_or(false)
    }

    pub fn advanced(self) -> Self {
        Self {
            current_page: self.current_page + 1,
            ..self
        }
    }
}

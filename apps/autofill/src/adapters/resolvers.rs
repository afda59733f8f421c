//! Value resolvers shared by every mapping table.
//!
//! Each is a plain `fn` so mapping tables stay `const`.

use crate::models::ResumeData;

fn owned(value: &str) -> Option<String> {
    Some(value.to_string())
}

pub fn first_name(r: &ResumeData) -> Option<String> {
    owned(&r.personal_info.first_name)
}

pub fn last_name(r: &ResumeData) -> Option<String> {
    owned(&r.personal_info.last_name)
}

pub fn full_name(r: &ResumeData) -> Option<String> {
    Some(r.full_name())
}

pub fn email(r: &ResumeData) -> Option<String> {
    owned(&r.personal_info.email)
}

pub fn phone(r: &ResumeData) -> Option<String> {
    r.personal_info.phone.clone()
}

pub fn street(r: &ResumeData) -> Option<String> {
    r.personal_info.address.as_ref()?.street.clone()
}

pub fn city(r: &ResumeData) -> Option<String> {
    r.personal_info.address.as_ref()?.city.clone()
}

pub fn state(r: &ResumeData) -> Option<String> {
    r.personal_info.address.as_ref()?.state.clone()
}

pub fn postal_code(r: &ResumeData) -> Option<String> {
    r.personal_info.address.as_ref()?.zip_code.clone()
}

pub fn country(r: &ResumeData) -> Option<String> {
    r.personal_info.address.as_ref()?.country.clone()
}

/// "City, State" for single location inputs.
pub fn location(r: &ResumeData) -> Option<String> {
    let address = r.personal_info.address.as_ref()?;
    let parts: Vec<&str> = [address.city.as_deref(), address.state.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    Some(parts.join(", "))
}

pub fn linkedin(r: &ResumeData) -> Option<String> {
    r.personal_info.linkedin.clone()
}

pub fn github(r: &ResumeData) -> Option<String> {
    r.personal_info.github.clone()
}

pub fn website(r: &ResumeData) -> Option<String> {
    r.personal_info.website.clone()
}

pub fn current_company(r: &ResumeData) -> Option<String> {
    r.current_experience().map(|e| e.company.clone())
}

pub fn current_title(r: &ResumeData) -> Option<String> {
    r.current_experience().map(|e| e.position.clone())
}

pub fn current_start_date(r: &ResumeData) -> Option<String> {
    r.current_experience()?.start_date.clone()
}

pub fn school(r: &ResumeData) -> Option<String> {
    r.latest_education().map(|e| e.institution.clone())
}

pub fn degree(r: &ResumeData) -> Option<String> {
    r.latest_education()?.degree.clone()
}

pub fn field_of_study(r: &ResumeData) -> Option<String> {
    r.latest_education()?.field_of_study.clone()
}

pub fn graduation_date(r: &ResumeData) -> Option<String> {
    r.latest_education()?.end_date.clone()
}

pub fn skills(r: &ResumeData) -> Option<String> {
    Some(r.skills.join(", "))
}

pub fn summary(r: &ResumeData) -> Option<String> {
    r.summary.clone()
}

pub fn cover_letter(r: &ResumeData) -> Option<String> {
    r.cover_letter.clone()
}

/// File name (or URL) of the résumé; only used for reporting.
pub fn resume(r: &ResumeData) -> Option<String> {
    r.resume_file
        .as_ref()
        .map(|f| f.name.clone())
        .or_else(|| r.resume_url.clone())
}

//! Plain-text résumé for "paste your résumé" fields.

use crate::models::{Education, Experience, ResumeData};

/// Renders the résumé as plain text: header, contact line, then summary,
/// experience, education, skills, certifications and projects. Empty
/// sections are omitted.
pub fn render(resume: &ResumeData) -> String {
    let mut sections = Vec::new();

    let mut header = resume.full_name();
    let contact = contact_line(resume);
    if !contact.is_empty() {
        if !header.is_empty() {
            header.push('\n');
        }
        header.push_str(&contact);
    }
    if !header.is_empty() {
        sections.push(header);
    }

    if let Some(summary) = non_empty(resume.summary.as_deref()) {
        sections.push(format!("SUMMARY\n{summary}"));
    }

    if !resume.experience.is_empty() {
        let entries: Vec<String> = resume.experience.iter().map(experience_entry).collect();
        sections.push(format!("EXPERIENCE\n{}", entries.join("\n\n")));
    }

    if !resume.education.is_empty() {
        let entries: Vec<String> = resume.education.iter().map(education_entry).collect();
        sections.push(format!("EDUCATION\n{}", entries.join("\n\n")));
    }

    if !resume.skills.is_empty() {
        sections.push(format!("SKILLS\n{}", resume.skills.join(", ")));
    }

    if !resume.certifications.is_empty() {
        let lines: Vec<String> = resume
            .certifications
            .iter()
            .map(|cert| {
                let mut line = cert.name.clone();
                if let Some(issuer) = non_empty(cert.issuer.as_deref()) {
                    line.push_str(&format!(" - {issuer}"));
                }
                if let Some(date) = non_empty(cert.date.as_deref()) {
                    line.push_str(&format!(" ({date})"));
                }
                line
            })
            .collect();
        sections.push(format!("CERTIFICATIONS\n{}", lines.join("\n")));
    }

    if !resume.projects.is_empty() {
        let entries: Vec<String> = resume
            .projects
            .iter()
            .map(|project| {
                let mut lines = vec![if project.technologies.is_empty() {
                    project.name.clone()
                } else {
                    format!("{} ({})", project.name, project.technologies.join(", "))
                }];
                lines.extend(non_empty(project.description.as_deref()).map(str::to_string));
                lines.extend(non_empty(project.url.as_deref()).map(str::to_string));
                lines.join("\n")
            })
            .collect();
        sections.push(format!("PROJECTS\n{}", entries.join("\n\n")));
    }

    sections.join("\n\n")
}

fn contact_line(resume: &ResumeData) -> String {
    let info = &resume.personal_info;
    let location = info.address.as_ref().map(|a| {
        [a.city.as_deref(), a.state.as_deref()]
            .into_iter()
            .filter_map(non_empty)
            .collect::<Vec<_>>()
            .join(", ")
    });

    [
        non_empty(Some(info.email.as_str())),
        non_empty(info.phone.as_deref()),
        location.as_deref().and_then(|l| non_empty(Some(l))),
        non_empty(info.linkedin.as_deref()),
        non_empty(info.github.as_deref()),
        non_empty(info.website.as_deref()),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" | ")
}

fn experience_entry(exp: &Experience) -> String {
    let mut title = format!("{} - {}", exp.position, exp.company);
    if let Some(location) = non_empty(exp.location.as_deref()) {
        title.push_str(&format!(" ({location})"));
    }
    let mut lines = vec![title];

    let end = if exp.current {
        Some("Present")
    } else {
        non_empty(exp.end_date.as_deref())
    };
    match (non_empty(exp.start_date.as_deref()), end) {
        (Some(start), Some(end)) => lines.push(format!("{start} - {end}")),
        (Some(start), None) => lines.push(start.to_string()),
        (None, Some(end)) => lines.push(end.to_string()),
        (None, None) => {}
    }

    lines.extend(non_empty(exp.description.as_deref()).map(str::to_string));
    lines.extend(
        exp.highlights
            .iter()
            .filter(|h| !h.trim().is_empty())
            .map(|h| format!("• {}", h.trim())),
    );
    lines.join("\n")
}

fn education_entry(edu: &Education) -> String {
    let degree = match (
        non_empty(edu.degree.as_deref()),
        non_empty(edu.field_of_study.as_deref()),
    ) {
        (Some(degree), Some(field)) => format!("{degree} in {field}"),
        (Some(degree), None) => degree.to_string(),
        (None, Some(field)) => field.to_string(),
        (None, None) => String::new(),
    };
    let mut lines = vec![if degree.is_empty() {
        edu.institution.clone()
    } else {
        format!("{degree} - {}", edu.institution)
    }];

    match (
        non_empty(edu.start_date.as_deref()),
        non_empty(edu.end_date.as_deref()),
    ) {
        (Some(start), Some(end)) => lines.push(format!("{start} - {end}")),
        (None, Some(end)) => lines.push(end.to_string()),
        _ => {}
    }
    if let Some(gpa) = non_empty(edu.gpa.as_deref()) {
        lines.push(format!("GPA: {gpa}"));
    }
    lines.join("\n")
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

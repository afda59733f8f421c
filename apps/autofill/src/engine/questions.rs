//! Platform question helpers: EEOC "decline to answer" and terms checkboxes.

use tracing::debug;

use crate::dom::{ElementSnapshot, NodeId, Page};
use crate::engine::fill::{check, fill_select, label_text};
use crate::engine::StepContext;
use crate::models::{FieldType, FilledField};

const DECLINE_PHRASES: &[&str] = &[
    "prefer not",
    "decline",
    "no answer",
    "not to answer",
    "not wish",
    "don't wish",
    "do not wish",
    "choose not",
];

const TERMS_HINTS: &[&str] = &["terms", "agree", "consent", "acknowledg", "privacy", "certif"];

const CHOICE_INPUTS: &str = r#"input[type="radio"], input[type="checkbox"]"#;

fn is_decline(text: &str) -> bool {
    let text = text.to_lowercase();
    DECLINE_PHRASES.iter().any(|phrase| text.contains(phrase))
}

/// Answers every unanswered question inside `scopes` with its "decline"
/// option, when one exists. Radio/checkbox groups are answered once per
/// `name`; selects take the first declining option.
pub async fn answer_decline_options(ctx: StepContext<'_>, scopes: &[&str]) -> Vec<FilledField> {
    let page = ctx.page;
    let mut records = Vec::new();
    let mut answered: Vec<String> = Vec::new();

    for scope_selector in scopes {
        let Ok(scope_nodes) = page.query_selector_all(scope_selector).await else {
            continue;
        };
        for scope in scope_nodes {
            for group in choice_groups(page, scope).await {
                if answered.contains(&group.name) {
                    continue;
                }
                answered.push(group.name.clone());
                if let Some(record) = answer_group(page, &group).await {
                    records.push(record);
                }
            }
            records.extend(answer_selects(page, scope).await);
        }
    }
    records
}

struct ChoiceGroup {
    name: String,
    members: Vec<ElementSnapshot>,
}

async fn choice_groups(page: &dyn Page, scope: NodeId) -> Vec<ChoiceGroup> {
    let mut groups: Vec<ChoiceGroup> = Vec::new();
    let Ok(inputs) = page.query_within(scope, CHOICE_INPUTS).await else {
        return groups;
    };
    for node in inputs {
        let Ok(el) = page.element(node).await else {
            continue;
        };
        let name = el
            .attr("name")
            .map(str::to_string)
            .unwrap_or_else(|| format!("{node}"));
        match groups.iter_mut().find(|g| g.name == name) {
            Some(group) => group.members.push(el),
            None => groups.push(ChoiceGroup { name, members: vec![el] }),
        }
    }
    groups
}

async fn answer_group(page: &dyn Page, group: &ChoiceGroup) -> Option<FilledField> {
    let mut decline = None;
    for el in &group.members {
        if el.is_disabled() {
            continue;
        }
        let label = label_text(page, el).await;
        let value = el.attr("value").unwrap_or_default();
        if is_decline(&label) || is_decline(value) {
            let shown = if label.is_empty() { value.to_string() } else { label };
            decline = Some((el, shown));
            break;
        }
    }
    let (el, shown) = decline?;
    let selector = format!(r#"input[name="{}"]"#, group.name);

    if let Some(answered) = group.members.iter().find(|m| m.checked) {
        if answered.node != el.node {
            debug!(group = %group.name, "Question already answered");
            return None;
        }
        return Some(FilledField::succeeded(FieldType::CustomQuestion, shown, selector));
    }
    Some(match check(page, el.node).await {
        Ok(()) => FilledField::succeeded(FieldType::CustomQuestion, shown, selector),
        Err(e) => FilledField::failed(FieldType::CustomQuestion, shown, selector, e),
    })
}

async fn answer_selects(page: &dyn Page, scope: NodeId) -> Vec<FilledField> {
    let mut records = Vec::new();
    let Ok(selects) = page.query_within(scope, "select").await else {
        return records;
    };
    for select in selects {
        let Ok(el) = page.element(select).await else {
            continue;
        };
        if el.is_disabled() {
            continue;
        }
        let Ok(options) = page.query_within(select, "option").await else {
            continue;
        };
        let mut decline = None;
        for option in options {
            if let Ok(opt) = page.element(option).await {
                if is_decline(&opt.text) {
                    let text = opt.text.trim().to_string();
                    let value = opt.attr("value").map(str::to_string).unwrap_or_else(|| text.clone());
                    decline = Some((text, value));
                    break;
                }
            }
        }
        let Some((text, value)) = decline else {
            continue;
        };
        let selector = match (el.attr("id"), el.attr("name")) {
            (Some(id), _) => format!("#{id}"),
            (None, Some(name)) => format!(r#"select[name="{name}"]"#),
            (None, None) => format!("select {select}"),
        };
        if el.value == value {
            records.push(FilledField::succeeded(FieldType::CustomQuestion, text, selector));
            continue;
        }
        if !el.value.is_empty() {
            continue;
        }
        records.push(match fill_select(page, select, &[text.clone()]).await {
            Ok(()) => FilledField::succeeded(FieldType::CustomQuestion, text, selector),
            Err(e) => FilledField::failed(FieldType::CustomQuestion, text, selector, e),
        });
    }
    records
}

/// Checks every required checkbox whose name or id reads like a
/// terms/consent agreement. Boxes already checked are reported without a click.
pub async fn check_required_terms(ctx: StepContext<'_>) -> Vec<FilledField> {
    let page = ctx.page;
    let mut records = Vec::new();
    let Ok(boxes) = page.query_selector_all(r#"input[type="checkbox"]"#).await else {
        return records;
    };
    for node in boxes {
        let Ok(el) = page.element(node).await else {
            continue;
        };
        let required = el.has_attr("required")
            || el
                .attr("aria-required")
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(false);
        if !required || el.is_disabled() {
            continue;
        }
        let key = format!(
            "{} {}",
            el.attr("name").unwrap_or_default(),
            el.attr("id").unwrap_or_default()
        )
        .to_lowercase();
        if !TERMS_HINTS.iter().any(|hint| key.contains(hint)) {
            continue;
        }
        let selector = match (el.attr("id"), el.attr("name")) {
            (Some(id), _) => format!("#{id}"),
            (None, Some(name)) => format!(r#"input[name="{name}"]"#),
            (None, None) => format!("input {node}"),
        };
        if el.checked {
            records.push(FilledField::succeeded(FieldType::Terms, "true", selector));
            continue;
        }
        records.push(match check(page, node).await {
            Ok(()) => FilledField::succeeded(FieldType::Terms, "true", selector),
            Err(e) => FilledField::failed(FieldType::Terms, "true", selector, e),
        });
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::dom::{ElementSpec, MemoryPage};
    use crate::models::ResumeData;
    use crate::upload::PageFileUploader;

    fn ctx<'a>(page: &'a MemoryPage, resume: &'a ResumeData, config: &'a EngineConfig) -> StepContext<'a> {
        StepContext {
            page,
            resume,
            config,
            uploader: &PageFileUploader,
        }
    }

    #[tokio::test]
    async fn test_decline_radio_chosen_once_per_group() {
        let page = MemoryPage::with_body(
            "https://x.test",
            [ElementSpec::new("fieldset").attr("class", "eeoc").children([
                ElementSpec::input("radio").attr("name", "gender").attr("value", "female"),
                ElementSpec::input("radio").attr("name", "gender").attr("value", "male"),
                ElementSpec::input("radio")
                    .attr("name", "gender")
                    .attr("id", "g3")
                    .attr("value", "decline"),
                ElementSpec::new("label").attr("for", "g3").text("I prefer not to answer"),
                ElementSpec::input("radio").attr("name", "veteran").attr("value", "yes"),
                ElementSpec::input("radio").attr("name", "veteran").attr("value", "no"),
            ])],
        );
        let (resume, config) = (ResumeData::default(), EngineConfig::default());
        let records = answer_decline_options(ctx(&page, &resume, &config), &[".eeoc"]).await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].field_type, FieldType::CustomQuestion);
        assert_eq!(records[0].value, "I prefer not to answer");
        assert!(page.with_dom(|dom| dom.is_checked(dom.first("#g3").unwrap())));
    }

    #[tokio::test]
    async fn test_decline_select_and_answered_groups_skipped() {
        let page = MemoryPage::with_body(
            "https://x.test",
            [ElementSpec::new("div").attr("id", "eeo").children([
                ElementSpec::new("select").attr("id", "race").children([
                    ElementSpec::option("", "Select..."),
                    ElementSpec::option("1", "Asian"),
                    ElementSpec::option("9", "Decline to self-identify"),
                ]),
                ElementSpec::input("radio")
                    .attr("name", "disability")
                    .attr("value", "no")
                    .attr("checked", ""),
                ElementSpec::input("radio").attr("name", "disability").attr("value", "decline"),
            ])],
        );
        let (resume, config) = (ResumeData::default(), EngineConfig::default());
        let records = answer_decline_options(ctx(&page, &resume, &config), &["#eeo"]).await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].selector, "#race");
        assert_eq!(page.value_of(page.first("#race").unwrap()), "9");
    }

    #[tokio::test]
    async fn test_required_terms_checked_only() {
        let page = MemoryPage::with_body(
            "https://x.test",
            [
                ElementSpec::input("checkbox").attr("id", "terms_agree").attr("required", ""),
                ElementSpec::input("checkbox").attr("id", "newsletter").attr("required", ""),
                ElementSpec::input("checkbox").attr("name", "privacy_consent"),
            ],
        );
        let (resume, config) = (ResumeData::default(), EngineConfig::default());
        let records = check_required_terms(ctx(&page, &resume, &config)).await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0], FilledField::succeeded(FieldType::Terms, "true", "#terms_agree"));
        page.with_dom(|dom| {
            assert!(dom.is_checked(dom.first("#terms_agree").unwrap()));
            assert!(!dom.is_checked(dom.first("#newsletter").unwrap()));
            assert!(!dom.is_checked(dom.first("[name=privacy_consent]").unwrap()));
        });
    }

    #[tokio::test]
    async fn test_second_pass_reports_existing_answers_without_clicking() {
        let page = MemoryPage::with_body(
            "https://x.test",
            [ElementSpec::new("div").attr("id", "eeo").children([
                ElementSpec::new("select").attr("id", "race").children([
                    ElementSpec::option("", "Select..."),
                    ElementSpec::option("9", "Decline to self-identify"),
                ]),
                ElementSpec::input("radio").attr("name", "veteran").attr("value", "yes"),
                ElementSpec::input("radio").attr("name", "veteran").attr("value", "I decline"),
                ElementSpec::input("checkbox").attr("id", "terms").attr("required", ""),
            ])],
        );
        let (resume, config) = (ResumeData::default(), EngineConfig::default());
        async fn run(page: &MemoryPage, resume: &ResumeData, config: &EngineConfig) -> Vec<FilledField> {
            let mut records = answer_decline_options(ctx(page, resume, config), &["#eeo"]).await;
            records.extend(check_required_terms(ctx(page, resume, config)).await);
            records
        }

        let first = run(&page, &resume, &config).await;
        let clicks = page.with_dom(|dom| dom.events().len());
        let second = run(&page, &resume, &config).await;

        assert_eq!(first.len(), 3);
        assert_eq!(first, second);
        assert_eq!(page.with_dom(|dom| dom.events().len()), clicks);
    }
}

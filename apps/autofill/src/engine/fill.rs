//! Per-element fill strategies.
//!
//! Text-like controls always get `input`, `change`, `blur` after assignment:
//! reactive front ends only observe those events, so a bare value write looks
//! filled in the DOM but is lost on submit.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dom::{DomEventKind, ElementSnapshot, NodeId, Page};
use crate::engine::mapping::Widget;
use crate::engine::wait::Poller;
use crate::engine::StepContext;
use crate::errors::FillError;

/// Default places custom dropdowns render their options.
pub const DEFAULT_OPTION_SELECTORS: &[&str] = &[r#"[role="listbox"] [role="option"]"#, r#"[role="option"]"#];

const TRUTHY: &[&str] = &["true", "yes", "y", "1", "on", "checked"];

const MONTH_NAMES: &[&str] = &[
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementKind {
    Text,
    TextArea,
    Select,
    Checkbox,
    Radio,
    File,
    CustomDropdown,
    /// Anything else: containers, buttons, hidden inputs.
    Other,
}

pub fn classify(el: &ElementSnapshot, widget: Widget) -> ElementKind {
    if widget == Widget::Dropdown {
        return ElementKind::CustomDropdown;
    }
    match el.tag.as_str() {
        "textarea" => ElementKind::TextArea,
        "select" => ElementKind::Select,
        "input" => match el.input_type().as_str() {
            "checkbox" => ElementKind::Checkbox,
            "radio" => ElementKind::Radio,
            "file" => ElementKind::File,
            "hidden" | "submit" | "button" | "reset" | "image" => ElementKind::Other,
            _ => ElementKind::Text,
        },
        _ if el.attr("role") == Some("combobox")
            || el.attr("aria-haspopup") == Some("listbox") =>
        {
            ElementKind::CustomDropdown
        }
        _ => ElementKind::Other,
    }
}

/// Fills one element according to its kind.
pub async fn fill_element(
    ctx: StepContext<'_>,
    node: NodeId,
    kind: ElementKind,
    value: &str,
    option_selectors: &[&str],
) -> Result<(), FillError> {
    let el = ctx.page.element(node).await?;
    if el.is_disabled() {
        return Err(FillError::Disabled);
    }

    match kind {
        ElementKind::Text | ElementKind::TextArea => {
            if el.is_readonly() {
                return Err(FillError::ReadOnly);
            }
            fill_text(ctx.page, node, value).await
        }
        ElementKind::Select => fill_select(ctx.page, node, &[value.to_string()]).await,
        ElementKind::CustomDropdown => fill_custom_dropdown(ctx, node, value, option_selectors).await,
        ElementKind::Checkbox => fill_checkbox(ctx.page, &el, value).await,
        ElementKind::Radio => fill_radio(ctx.page, &el, value).await,
        ElementKind::File | ElementKind::Other => Err(FillError::ValueNotRetained {
            expected: value.to_string(),
            actual: format!("<{}> cannot take a value", el.tag),
        }),
    }
}

/// Sets a text value and replays the events a user edit would produce.
pub async fn fill_text(page: &dyn Page, node: NodeId, value: &str) -> Result<(), FillError> {
    page.dispatch(node, DomEventKind::Focus).await?;
    page.set_value(node, value).await?;
    page.dispatch(node, DomEventKind::Input).await?;
    page.dispatch(node, DomEventKind::Change).await?;
    page.dispatch(node, DomEventKind::Blur).await?;

    let actual = page.element(node).await?.value;
    if actual != value {
        return Err(FillError::ValueNotRetained {
            expected: value.to_string(),
            actual,
        });
    }
    Ok(())
}

/// Picks the first option matching any candidate (by value, then text, then
/// text substring) and selects it.
pub async fn fill_select(page: &dyn Page, node: NodeId, candidates: &[String]) -> Result<(), FillError> {
    let mut options = Vec::new();
    for option in page.query_within(node, "option").await? {
        let el = page.element(option).await?;
        let value = el
            .attr("value")
            .map(str::to_string)
            .unwrap_or_else(|| el.text.trim().to_string());
        options.push((value, el.text.trim().to_string(), el.is_disabled()));
    }

    let chosen = candidates.iter().find_map(|candidate| {
        let wanted = candidate.trim().to_lowercase();
        if wanted.is_empty() {
            return None;
        }
        let usable = || options.iter().filter(|(v, _, disabled)| !disabled && !v.is_empty());
        usable()
            .find(|(v, _, _)| v.to_lowercase() == wanted)
            .or_else(|| usable().find(|(_, t, _)| t.to_lowercase() == wanted))
            .or_else(|| usable().find(|(_, t, _)| t.to_lowercase().contains(&wanted)))
            .map(|(v, _, _)| v.clone())
    });

    let Some(option_value) = chosen else {
        return Err(FillError::NoMatchingOption {
            wanted: candidates.first().cloned().unwrap_or_default(),
        });
    };

    page.set_value(node, &option_value).await?;
    page.dispatch(node, DomEventKind::Input).await?;
    page.dispatch(node, DomEventKind::Change).await?;

    let actual = page.element(node).await?.value;
    if actual != option_value {
        return Err(FillError::ValueNotRetained {
            expected: option_value,
            actual,
        });
    }
    Ok(())
}

/// Drives a div/button dropdown: open, poll for a matching option, click it, close.
pub async fn fill_custom_dropdown(
    ctx: StepContext<'_>,
    trigger: NodeId,
    value: &str,
    option_selectors: &[&str],
) -> Result<(), FillError> {
    let page = ctx.page;
    let wanted = value.trim().to_lowercase();
    page.click(trigger).await?;

    let mut poller = Poller::new(ctx.config.dropdown_timeout, ctx.config.poll_interval);
    let mut saw_options = false;
    let matched = loop {
        if let Some(option) = find_option(page, option_selectors, &wanted, &mut saw_options).await {
            break Some(option);
        }
        if !poller.tick().await {
            break None;
        }
    };

    let result = match matched {
        Some(option) => {
            debug!(option = %option, "Clicking dropdown option");
            page.click(option).await.map_err(FillError::from)
        }
        None if saw_options => Err(FillError::NoMatchingOption {
            wanted: value.to_string(),
        }),
        None => Err(FillError::DropdownTimeout {
            timeout_ms: ctx.config.dropdown_timeout.as_millis() as u64,
        }),
    };

    close_dropdown(page, trigger).await;
    result
}

async fn find_option(
    page: &dyn Page,
    option_selectors: &[&str],
    wanted: &str,
    saw_options: &mut bool,
) -> Option<NodeId> {
    for selector in option_selectors {
        let Ok(options) = page.query_selector_all(selector).await else {
            continue;
        };
        for option in options {
            let Ok(el) = page.element(option).await else {
                continue;
            };
            if !el.visible {
                continue;
            }
            *saw_options = true;
            if el.accessible_name().to_lowercase().contains(wanted) {
                return Some(option);
            }
        }
    }
    None
}

/// Closes any listbox the trigger left open.
async fn close_dropdown(page: &dyn Page, trigger: NodeId) {
    let open = match page.query_selector_all(r#"[role="listbox"]"#).await {
        Ok(listboxes) => {
            let mut open = false;
            for listbox in listboxes {
                if page.element(listbox).await.map(|el| el.visible).unwrap_or(false) {
                    open = true;
                    break;
                }
            }
            open
        }
        Err(_) => false,
    };
    if open {
        let _ = page
            .dispatch(trigger, DomEventKind::KeyDown("Escape".to_string()))
            .await;
    }
    let _ = page.dispatch(trigger, DomEventKind::Blur).await;
}

pub fn is_truthy(value: &str) -> bool {
    TRUTHY.contains(&value.trim().to_lowercase().as_str())
}

async fn fill_checkbox(page: &dyn Page, el: &ElementSnapshot, value: &str) -> Result<(), FillError> {
    let own_value = el.attr("value").unwrap_or_default();
    let select = is_truthy(value) || (!own_value.is_empty() && own_value.eq_ignore_ascii_case(value.trim()));
    if select && !el.checked {
        check(page, el.node).await?;
    }
    Ok(())
}

async fn fill_radio(page: &dyn Page, el: &ElementSnapshot, value: &str) -> Result<(), FillError> {
    let wanted = value.trim().to_lowercase();
    let group = match el.attr("name") {
        Some(name) => {
            page.query_selector_all(&format!(r#"input[type="radio"][name="{name}"]"#))
                .await?
        }
        None => vec![el.node],
    };

    for radio in &group {
        let candidate = page.element(*radio).await?;
        let label = label_text(page, &candidate).await;
        let own = candidate.attr("value").unwrap_or_default().to_lowercase();
        if own == wanted || (!label.is_empty() && label.to_lowercase() == wanted) {
            return check(page, *radio).await;
        }
    }

    if is_truthy(value) {
        return check(page, el.node).await;
    }
    Err(FillError::NoMatchingOption {
        wanted: value.to_string(),
    })
}

/// Checks a checkbox or radio and announces the change.
pub async fn check(page: &dyn Page, node: NodeId) -> Result<(), FillError> {
    page.set_checked(node, true).await?;
    page.dispatch(node, DomEventKind::Click).await?;
    page.dispatch(node, DomEventKind::Change).await?;
    if !page.element(node).await?.checked {
        return Err(FillError::ValueNotRetained {
            expected: "checked".to_string(),
            actual: "unchecked".to_string(),
        });
    }
    Ok(())
}

/// Accessible label of `el`: `aria-label`, then the `<label for=...>`
/// pointing at it, then an enclosing `<label>`.
pub async fn label_text(page: &dyn Page, el: &ElementSnapshot) -> String {
    if let Some(label) = el.attr("aria-label") {
        return label.trim().to_string();
    }
    if let Some(id) = el.attr("id") {
        if let Ok(Some(label)) = page.query_selector(&format!(r#"label[for="{id}"]"#)).await {
            if let Ok(label) = page.element(label).await {
                return label.text.trim().to_string();
            }
        }
    }
    let Ok(labels) = page.query_selector_all("label").await else {
        return String::new();
    };
    for label in labels {
        let Ok(controls) = page.query_within(label, "input, select, textarea").await else {
            continue;
        };
        if controls.contains(&el.node) {
            if let Ok(label) = page.element(label).await {
                return label.text.trim().to_string();
            }
        }
    }
    String::new()
}

// ────────────────────────────────────────────────────────────────────────────
// Date sub-fields
// ────────────────────────────────────────────────────────────────────────────

/// An ISO date split into the parts a form may ask for separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateParts {
    pub year: i32,
    pub month: u32,
    /// `None` when the source only carried year and month.
    pub day: Option<u32>,
}

impl DateParts {
    /// Accepts `YYYY-MM-DD`, `YYYY-MM`, and `MM/DD/YYYY`.
    pub fn parse(raw: &str) -> Result<Self, FillError> {
        let raw = raw.trim();
        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return Ok(Self::from_date(date, true));
        }
        if let Ok(date) = NaiveDate::parse_from_str(raw, "%m/%d/%Y") {
            return Ok(Self::from_date(date, true));
        }
        if let Ok(date) = NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d") {
            return Ok(Self::from_date(date, false));
        }
        Err(FillError::InvalidDate(raw.to_string()))
    }

    fn from_date(date: NaiveDate, has_day: bool) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            day: has_day.then(|| date.day()),
        }
    }

    /// Ways a month option may be written: "05", "5", "May", "may".
    pub fn month_candidates(&self) -> Vec<String> {
        let mut candidates = vec![format!("{:02}", self.month), self.month.to_string()];
        if let Some(name) = MONTH_NAMES.get(self.month as usize - 1) {
            candidates.push(name.to_string());
            candidates.push(name[..3].to_string());
        }
        candidates
    }
}

pub const MONTH_PART_SELECTORS: &str = r#"select[name*="month" i], input[name*="month" i], select[id*="month" i], input[id*="month" i], [data-part="month"]"#;
pub const DAY_PART_SELECTORS: &str = r#"select[name*="day" i], input[name*="day" i], select[id*="day" i], input[id*="day" i], [data-part="day"]"#;
pub const YEAR_PART_SELECTORS: &str = r#"select[name*="year" i], input[name*="year" i], select[id*="year" i], input[id*="year" i], [data-part="year"]"#;

/// True when `container` holds separate month/year sub-controls.
pub async fn has_date_parts(page: &dyn Page, container: NodeId) -> bool {
    let month = page.query_within(container, MONTH_PART_SELECTORS).await;
    let year = page.query_within(container, YEAR_PART_SELECTORS).await;
    matches!((month, year), (Ok(m), Ok(y)) if !m.is_empty() && !y.is_empty())
}

/// Decomposes `value` and fills each sub-control in `container`.
pub async fn fill_date_parts(page: &dyn Page, container: NodeId, value: &str) -> Result<(), FillError> {
    let parts = DateParts::parse(value)?;

    let month = first_within(page, container, MONTH_PART_SELECTORS).await?;
    let year = first_within(page, container, YEAR_PART_SELECTORS).await?;
    let (Some(month), Some(year)) = (month, year) else {
        return Err(FillError::MissingDateParts);
    };

    fill_part(page, month, &parts.month_candidates()).await?;
    if let (Some(day), Some(day_node)) = (
        parts.day,
        first_within(page, container, DAY_PART_SELECTORS).await?,
    ) {
        fill_part(page, day_node, &[format!("{day:02}"), day.to_string()]).await?;
    }
    fill_part(page, year, &[parts.year.to_string()]).await
}

async fn first_within(page: &dyn Page, scope: NodeId, selector: &str) -> Result<Option<NodeId>, FillError> {
    Ok(page.query_within(scope, selector).await?.into_iter().next())
}

async fn fill_part(page: &dyn Page, node: NodeId, candidates: &[String]) -> Result<(), FillError> {
    let el = page.element(node).await?;
    if el.tag == "select" {
        fill_select(page, node, candidates).await
    } else {
        fill_text(page, node, &candidates[0]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{ElementSpec, MemoryPage};

    #[tokio::test]
    async fn test_fill_text_fires_input_change_blur() {
        let page = MemoryPage::with_body("https://x.test", [ElementSpec::input("text").attr("id", "a")]);
        let node = page.first("#a").unwrap();
        fill_text(&page, node, "Ada").await.unwrap();

        assert_eq!(page.value_of(node), "Ada");
        let events = page.with_dom(|dom| dom.events_for(node));
        let input = events.iter().position(|e| *e == DomEventKind::Input).unwrap();
        let change = events.iter().position(|e| *e == DomEventKind::Change).unwrap();
        let blur = events.iter().position(|e| *e == DomEventKind::Blur).unwrap();
        assert!(input < change && change < blur);
    }

    #[tokio::test]
    async fn test_fill_text_detects_reverted_value() {
        let page = MemoryPage::with_body("https://x.test", [ElementSpec::input("text").attr("id", "a")]);
        let node = page.first("#a").unwrap();
        page.with_dom(|dom| dom.freeze_input(node));
        let err = fill_text(&page, node, "Ada").await.unwrap_err();
        assert!(matches!(err, FillError::ValueNotRetained { .. }));
    }

    #[tokio::test]
    async fn test_fill_select_matches_visible_text() {
        let page = MemoryPage::with_body(
            "https://x.test",
            [ElementSpec::new("select")
                .attr("id", "s")
                .child(ElementSpec::option("", "Choose"))
                .child(ElementSpec::option("CA", "California"))
                .child(ElementSpec::option("TX", "Texas"))],
        );
        let node = page.first("#s").unwrap();
        fill_select(&page, node, &["texas".to_string()]).await.unwrap();
        assert_eq!(page.value_of(node), "TX");

        let err = fill_select(&page, node, &["Ohio".to_string()]).await.unwrap_err();
        assert_eq!(
            err,
            FillError::NoMatchingOption {
                wanted: "Ohio".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_classify_by_tag_type_and_role() {
        let page = MemoryPage::with_body(
            "https://x.test",
            [
                ElementSpec::input("email").attr("id", "e"),
                ElementSpec::input("file").attr("id", "f"),
                ElementSpec::new("button").attr("id", "b").attr("aria-haspopup", "listbox"),
                ElementSpec::new("div").attr("id", "d"),
            ],
        );
        let mut kinds = Vec::new();
        for sel in ["#e", "#f", "#b", "#d"] {
            let el = page.element(page.first(sel).unwrap()).await.unwrap();
            kinds.push(classify(&el, Widget::Auto));
        }
        assert_eq!(
            kinds,
            vec![
                ElementKind::Text,
                ElementKind::File,
                ElementKind::CustomDropdown,
                ElementKind::Other
            ]
        );

        let div = page.element(page.first("#d").unwrap()).await.unwrap();
        assert_eq!(classify(&div, Widget::Dropdown), ElementKind::CustomDropdown);
    }

    #[tokio::test]
    async fn test_radio_picks_option_by_label() {
        let page = MemoryPage::with_body(
            "https://x.test",
            [
                ElementSpec::input("radio").attr("name", "auth").attr("id", "r1").attr("value", "1"),
                ElementSpec::new("label").attr("for", "r1").text("Yes"),
                ElementSpec::input("radio").attr("name", "auth").attr("id", "r2").attr("value", "2"),
                ElementSpec::new("label").attr("for", "r2").text("No"),
            ],
        );
        let first = page.first("#r1").unwrap();
        let second = page.first("#r2").unwrap();
        let el = page.element(first).await.unwrap();
        fill_radio(&page, &el, "No").await.unwrap();
        page.with_dom(|dom| {
            assert!(dom.is_checked(second));
            assert!(!dom.is_checked(first));
        });
    }

    #[tokio::test]
    async fn test_label_text_sources() {
        let page = MemoryPage::with_body(
            "https://x.test",
            [
                ElementSpec::input("checkbox").attr("id", "a").attr("aria-label", " Remote only "),
                ElementSpec::input("checkbox").attr("id", "b"),
                ElementSpec::new("label").attr("for", "b").text("Relocate"),
                ElementSpec::new("label")
                    .text("I decline to answer")
                    .child(ElementSpec::input("radio").attr("id", "c")),
                ElementSpec::input("radio").attr("id", "d"),
            ],
        );
        let mut labels = Vec::new();
        for id in ["#a", "#b", "#c", "#d"] {
            let el = page.element(page.first(id).unwrap()).await.unwrap();
            labels.push(label_text(&page, &el).await);
        }
        assert_eq!(labels, ["Remote only", "Relocate", "I decline to answer", ""]);
    }

    #[tokio::test]
    async fn test_checkbox_left_alone_for_falsy_value() {
        let page = MemoryPage::with_body("https://x.test", [ElementSpec::input("checkbox").attr("id", "c")]);
        let node = page.first("#c").unwrap();
        let el = page.element(node).await.unwrap();
        fill_checkbox(&page, &el, "no").await.unwrap();
        assert!(!page.with_dom(|dom| dom.is_checked(node)));
        fill_checkbox(&page, &el, "Yes").await.unwrap();
        assert!(page.with_dom(|dom| dom.is_checked(node)));
    }

    #[test]
    fn test_date_parts_parse_formats() {
        assert_eq!(
            DateParts::parse("2021-03-09").unwrap(),
            DateParts { year: 2021, month: 3, day: Some(9) }
        );
        assert_eq!(
            DateParts::parse("2019-11").unwrap(),
            DateParts { year: 2019, month: 11, day: None }
        );
        assert_eq!(DateParts::parse("12/31/2020").unwrap().day, Some(31));
        assert!(DateParts::parse("last spring").is_err());
    }

    #[test]
    fn test_month_candidates_cover_names() {
        let parts = DateParts::parse("2020-06").unwrap();
        assert_eq!(parts.month_candidates(), vec!["06", "6", "june", "jun"]);
    }

    #[tokio::test]
    async fn test_fill_date_parts_selects_and_types() {
        let page = MemoryPage::with_body(
            "https://x.test",
            [ElementSpec::new("div")
                .attr("id", "grad")
                .child(
                    ElementSpec::new("select")
                        .attr("name", "gradMonth")
                        .child(ElementSpec::option("", "--"))
                        .child(ElementSpec::option("6", "June")),
                )
                .child(ElementSpec::input("text").attr("name", "gradYear"))],
        );
        let container = page.first("#grad").unwrap();
        assert!(has_date_parts(&page, container).await);
        fill_date_parts(&page, container, "2018-06-15").await.unwrap();

        assert_eq!(page.value_of(page.first("select").unwrap()), "6");
        assert_eq!(page.value_of(page.first("input[name=gradYear]").unwrap()), "2018");
    }
}

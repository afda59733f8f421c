//! Next-step detection and page indicators for multi-step applications.

use tracing::debug;

use crate::dom::{NodeId, Page};
use crate::models::PageState;

/// Controls that can carry an accessible "Next" name.
const LABELLED_CONTROLS: &str =
    r#"button, input[type="submit"], input[type="button"], a[role="button"], [role="button"]"#;

/// Where a platform renders its step controls and progress.
#[derive(Debug, Clone, Copy)]
pub struct NavigationProfile {
    /// Platform-specific Next controls, most specific first.
    pub next_selectors: &'static [&'static str],
    /// Accessible names accepted as "Next", lower-case. Matched as a prefix.
    pub next_labels: &'static [&'static str],
    /// Elements whose text reads like "Step 2 of 5".
    pub progress_selectors: &'static [&'static str],
    /// One element per step in a step-tab strip.
    pub step_tab_selectors: &'static [&'static str],
}

impl NavigationProfile {
    /// Single-page forms: never looks for a Next control.
    pub const SINGLE_PAGE: Self = Self {
        next_selectors: &[],
        next_labels: &[],
        progress_selectors: &[],
        step_tab_selectors: &[],
    };

    pub const DEFAULT_LABELS: &'static [&'static str] = &[
        "next",
        "continue",
        "save and continue",
        "save & continue",
        "proceed",
    ];

    pub fn is_single_page(&self) -> bool {
        self.next_selectors.is_empty() && self.next_labels.is_empty()
    }
}

impl Default for NavigationProfile {
    fn default() -> Self {
        Self {
            next_selectors: &[],
            next_labels: Self::DEFAULT_LABELS,
            progress_selectors: &[
                r#"[role="progressbar"]"#,
                r#"[class*="progress" i]"#,
                r#"[class*="step-indicator" i]"#,
            ],
            step_tab_selectors: &[r#"[role="tab"][class*="step" i]"#],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextControl {
    Absent,
    Disabled(NodeId),
    Ready(NodeId),
}

/// Locates the Next/Continue control: platform selectors first, then
/// accessible-name matching over visible buttons.
pub async fn find_next_control(page: &dyn Page, profile: &NavigationProfile) -> NextControl {
    if profile.is_single_page() {
        return NextControl::Absent;
    }
    for selector in profile.next_selectors {
        let Ok(nodes) = page.query_selector_all(selector).await else {
            continue;
        };
        for node in nodes {
            let Ok(el) = page.element(node).await else {
                continue;
            };
            if !el.visible {
                continue;
            }
            // Some platforms reuse the Next button as Submit on the last page.
            if el.accessible_name().to_lowercase().starts_with("submit") {
                return NextControl::Absent;
            }
            debug!(selector = %selector, node = %node, "Next control found by selector");
            return control_state(el.is_disabled(), node);
        }
    }

    if profile.next_labels.is_empty() {
        return NextControl::Absent;
    }
    let Ok(candidates) = page.query_selector_all(LABELLED_CONTROLS).await else {
        return NextControl::Absent;
    };
    for node in candidates {
        let Ok(el) = page.element(node).await else {
            continue;
        };
        if !el.visible {
            continue;
        }
        let name = el.accessible_name().to_lowercase();
        if profile.next_labels.iter().any(|label| name.starts_with(label)) {
            debug!(label = %name, node = %node, "Next control found by label");
            return control_state(el.is_disabled(), node);
        }
    }
    NextControl::Absent
}

fn control_state(disabled: bool, node: NodeId) -> NextControl {
    if disabled {
        NextControl::Disabled(node)
    } else {
        NextControl::Ready(node)
    }
}

/// Extracts `(current, total)` from indicator text such as "Step 2 of 5",
/// "Page 2 of 5", or "2/5".
pub fn parse_page_indicator(text: &str) -> Option<(u32, u32)> {
    let lower = text.to_lowercase();
    let mut numbers = Vec::new();
    let mut start = None;
    for (i, c) in lower.char_indices() {
        match (c.is_ascii_digit(), start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                numbers.push((s, i));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        numbers.push((s, lower.len()));
    }

    numbers.windows(2).find_map(|pair| {
        let (a_start, a_end) = pair[0];
        let (b_start, b_end) = pair[1];
        let separator = lower[a_end..b_start].trim();
        if separator != "of" && separator != "/" {
            return None;
        }
        let current: u32 = lower[a_start..a_end].parse().ok()?;
        let total: u32 = lower[b_start..b_end].parse().ok()?;
        (current >= 1 && current <= total).then_some((current, total))
    })
}

/// Refreshes `state.total_pages` (and `current_page` when an indicator states
/// it) from the live page. Leaves `state` untouched when nothing is readable.
pub async fn read_page_state(page: &dyn Page, profile: &NavigationProfile, state: PageState) -> PageState {
    for selector in profile.progress_selectors {
        let Ok(nodes) = page.query_selector_all(selector).await else {
            continue;
        };
        for node in nodes {
            let Ok(el) = page.element(node).await else {
                continue;
            };
            let text = match el.attr("aria-valuetext") {
                Some(text) => text.to_string(),
                None => el.text.clone(),
            };
            if let Some((current, total)) = parse_page_indicator(&text) {
                return PageState {
                    current_page: current,
                    total_pages: Some(total),
                };
            }
        }
    }

    for selector in profile.step_tab_selectors {
        if let Ok(tabs) = page.query_selector_all(selector).await {
            if !tabs.is_empty() {
                return PageState {
                    total_pages: Some(tabs.len() as u32),
                    ..state
                };
            }
        }
    }
    state
}

//! Default engine steps. `AtsAdapter`'s default methods delegate here, and
//! platform overrides call these directly to wrap or extend them.

use std::collections::HashSet;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::dom::Page;
use crate::engine::fill::{classify, fill_element};
use crate::engine::mapping::DetectedField;
use crate::engine::wait::{wait_for_any, wait_until_gone};
use crate::engine::{AtsAdapter, StepContext};
use crate::errors::FillError;
use crate::models::FilledField;
use crate::upload::upload_document;

pub const DEFAULT_SUBMIT_SELECTORS: &[&str] = &[r#"button[type="submit"]"#, r#"input[type="submit"]"#];

/// How long `initialize` waits for a platform to render.
#[derive(Debug, Clone, Copy)]
pub struct InitProfile {
    /// Containers signalling the form has rendered. Empty means `form_selectors()`.
    pub container_selectors: &'static [&'static str],
    pub timeout: Duration,
    /// Spinners that must disappear before filling.
    pub loading_selectors: &'static [&'static str],
    pub loading_timeout: Duration,
    /// Overrides `EngineConfig::settle_delay`.
    pub settle: Option<Duration>,
}

impl Default for InitProfile {
    fn default() -> Self {
        Self {
            container_selectors: &[],
            timeout: Duration::from_secs(5),
            loading_selectors: &[],
            loading_timeout: Duration::from_secs(10),
            settle: None,
        }
    }
}

/// Outcome of the submit step.
#[derive(Debug, Clone, Default)]
pub struct SubmitOutcome {
    /// Records produced by pre-submit housekeeping (terms checkboxes).
    pub housekeeping: Vec<FilledField>,
    pub submitted: bool,
}

/// Platform DOM markers OR URL pattern.
pub async fn is_valid_form<A: AtsAdapter + ?Sized>(adapter: &A, page: &dyn Page) -> bool {
    for selector in adapter.form_selectors() {
        if let Ok(Some(_)) = page.query_selector(selector).await {
            return true;
        }
    }
    let patterns = adapter.url_patterns();
    if patterns.is_empty() {
        return false;
    }
    match page.url().await {
        Ok(url) => {
            let url = url.to_lowercase();
            patterns.iter().any(|pattern| url.contains(pattern))
        }
        Err(_) => false,
    }
}

/// Waits for the form container, then for spinners to clear, then settles.
/// A container that never appears is logged and tolerated: detection decides.
pub async fn initialize<A: AtsAdapter + ?Sized>(adapter: &A, ctx: StepContext<'_>) {
    let profile = adapter.init_profile();
    let platform = adapter.metadata().platform;
    let containers = if profile.container_selectors.is_empty() {
        adapter.form_selectors()
    } else {
        profile.container_selectors
    };

    match wait_for_any(ctx.page, containers, profile.timeout, ctx.config.poll_interval).await {
        Some((node, selector)) => debug!(platform = %platform, selector = %selector, node = %node, "Form container ready"),
        None => warn!(
            platform = %platform,
            timeout_ms = profile.timeout.as_millis() as u64,
            "Form container did not appear, continuing"
        ),
    }

    if !profile.loading_selectors.is_empty()
        && !wait_until_gone(
            ctx.page,
            profile.loading_selectors,
            profile.loading_timeout,
            ctx.config.poll_interval,
        )
        .await
    {
        warn!(platform = %platform, "Loading indicator still visible, continuing");
    }

    sleep(profile.settle.unwrap_or(ctx.config.settle_delay)).await;
}

/// Resolves each mapping to the first selector matching a live element.
/// An element already claimed by an earlier mapping is not reused.
pub async fn detect_fields<A: AtsAdapter + ?Sized>(adapter: &A, page: &dyn Page) -> Vec<DetectedField> {
    let mut detected = Vec::new();
    let mut claimed = HashSet::new();

    for mapping in adapter.field_mappings() {
        for &selector in mapping.selectors {
            let node = match page.query_selector(selector).await {
                Ok(Some(node)) if !claimed.contains(&node) => node,
                Ok(_) => continue,
                Err(e) => {
                    debug!(selector = %selector, error = %e, "Selector failed");
                    continue;
                }
            };
            let Ok(el) = page.element(node).await else {
                continue;
            };
            claimed.insert(node);
            detected.push(DetectedField {
                mapping,
                node,
                selector,
                kind: classify(&el, mapping.widget),
            });
            break;
        }
    }

    debug!(
        platform = %adapter.metadata().platform,
        count = detected.len(),
        "Field detection complete"
    );
    detected
}

/// Fills every field with a value, one record per attempt.
pub async fn fill_fields<A: AtsAdapter + ?Sized>(
    adapter: &A,
    ctx: StepContext<'_>,
    fields: &[DetectedField],
) -> Vec<FilledField> {
    let mut records = Vec::with_capacity(fields.len());
    for field in fields {
        let field_type = field.mapping.field_type;
        let Some(value) = field.mapping.get_value(ctx.resume) else {
            debug!(field = %field_type, "No value for field, skipping");
            continue;
        };
        let record = match adapter.fill_field(ctx, field, &value).await {
            Ok(()) => FilledField::succeeded(field_type, value, field.selector),
            Err(e) => FilledField::failed(field_type, value, field.selector, e),
        };
        records.push(record);
    }
    records
}

/// Drives one element. File inputs never reach here; see `handle_file_uploads`.
pub async fn fill_field<A: AtsAdapter + ?Sized>(
    adapter: &A,
    ctx: StepContext<'_>,
    field: &DetectedField,
    value: &str,
) -> Result<(), FillError> {
    fill_element(ctx, field.node, field.kind, value, adapter.option_selectors()).await
}

/// Uploads each deferred document field.
pub async fn handle_file_uploads(ctx: StepContext<'_>, uploads: &[DetectedField]) -> Vec<FilledField> {
    let mut records = Vec::new();
    for field in uploads {
        if let Some(record) = upload_document(ctx, field).await {
            records.push(record);
        }
    }
    records
}

/// Clicks the first visible, enabled submit control when auto-submit is on.
pub async fn submit_form<A: AtsAdapter + ?Sized>(adapter: &A, ctx: StepContext<'_>) -> SubmitOutcome {
    let platform = adapter.metadata().platform;
    if !ctx.config.auto_submit {
        info!(platform = %platform, "Auto-submit disabled, leaving submission to the user");
        return SubmitOutcome::default();
    }

    for selector in adapter.submit_selectors() {
        let Ok(nodes) = ctx.page.query_selector_all(selector).await else {
            continue;
        };
        for node in nodes {
            let Ok(el) = ctx.page.element(node).await else {
                continue;
            };
            if !el.visible || el.is_disabled() {
                continue;
            }
            match ctx.page.click(node).await {
                Ok(()) => {
                    info!(platform = %platform, selector = %selector, "Application submitted");
                    return SubmitOutcome {
                        housekeeping: Vec::new(),
                        submitted: true,
                    };
                }
                Err(e) => warn!(platform = %platform, error = %e, "Submit click failed"),
            }
        }
    }

    warn!(platform = %platform, "No usable submit control found");
    SubmitOutcome::default()
}

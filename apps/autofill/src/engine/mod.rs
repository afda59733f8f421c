//! Autofill engine: the `AtsAdapter` capability trait and the session state
//! machine that drives it.
//!
//! A session runs `initialize → detect → fill → custom questions → uploads`,
//! then loops over Next/Continue controls until the form runs out of steps,
//! and finally hands over to `submit_form`. Only a detection failure aborts
//! a session; every other failure is recorded and the session continues.

pub mod fill;
pub mod mapping;
pub mod navigation;
pub mod questions;
pub mod steps;
pub mod wait;

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::adapters::AdapterRegistry;
use crate::config::EngineConfig;
use crate::dom::{NodeId, Page};
use crate::errors::{AutofillError, FillError, UploadError};
use crate::models::{FieldType, FilledField, PageState, ResumeData};
use crate::upload::{FileUploader, PageFileUploader};

use self::fill::DEFAULT_OPTION_SELECTORS;
use self::mapping::{DetectedField, FieldMapping};
use self::navigation::{find_next_control, read_page_state, NavigationProfile, NextControl};
use self::steps::{InitProfile, SubmitOutcome, DEFAULT_SUBMIT_SELECTORS};

// ────────────────────────────────────────────────────────────────────────────
// Adapter metadata
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Workday,
    Greenhouse,
    Indeed,
    LinkedIn,
    Taleo,
    Icims,
    SmartRecruiters,
    Generic,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Workday => "workday",
            Platform::Greenhouse => "greenhouse",
            Platform::Indeed => "indeed",
            Platform::LinkedIn => "linkedin",
            Platform::Taleo => "taleo",
            Platform::Icims => "icims",
            Platform::SmartRecruiters => "smartrecruiters",
            Platform::Generic => "generic",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Descriptive capabilities. Reported, never branched on by the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdapterFeatures {
    pub multi_page: bool,
    pub dynamic_forms: bool,
    pub file_upload: bool,
    pub custom_questions: bool,
    pub profile_import: bool,
    pub auto_save: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdapterMetadata {
    pub name: &'static str,
    pub platform: Platform,
    pub version: &'static str,
    pub features: AdapterFeatures,
}

// ────────────────────────────────────────────────────────────────────────────
// Adapter trait
// ────────────────────────────────────────────────────────────────────────────

/// Everything a step needs from the session.
#[derive(Clone, Copy)]
pub struct StepContext<'a> {
    pub page: &'a dyn Page,
    pub resume: &'a ResumeData,
    pub config: &'a EngineConfig,
    pub uploader: &'a dyn FileUploader,
}

/// One ATS platform.
///
/// Implementors supply data (metadata, selectors, mapping table, timing
/// profiles) and override individual steps only for platform quirks. Every
/// step has a default that delegates to `engine::steps`, so an override can
/// wrap the default instead of replacing it.
///
/// Carried in `AdapterRegistry` as `Arc<dyn AtsAdapter>`.
#[async_trait]
pub trait AtsAdapter: Send + Sync {
    fn metadata(&self) -> AdapterMetadata;

    /// Platform DOM markers; any match means the page belongs to this adapter.
    fn form_selectors(&self) -> &'static [&'static str];

    /// Lower-case URL fragments identifying the platform.
    fn url_patterns(&self) -> &'static [&'static str] {
        &[]
    }

    fn field_mappings(&self) -> &'static [FieldMapping];

    fn init_profile(&self) -> InitProfile {
        InitProfile::default()
    }

    fn navigation(&self) -> NavigationProfile {
        NavigationProfile::SINGLE_PAGE
    }

    /// Where custom dropdown options render once opened.
    fn option_selectors(&self) -> &'static [&'static str] {
        DEFAULT_OPTION_SELECTORS
    }

    fn submit_selectors(&self) -> &'static [&'static str] {
        DEFAULT_SUBMIT_SELECTORS
    }

    async fn is_valid_form(&self, page: &dyn Page) -> bool {
        steps::is_valid_form(self, page).await
    }

    async fn initialize(&self, ctx: StepContext<'_>) {
        steps::initialize(self, ctx).await
    }

    /// Runs once per session before the first detection (account creation).
    async fn prepare_application(&self, _ctx: StepContext<'_>) -> Vec<FilledField> {
        Vec::new()
    }

    async fn detect_fields(&self, page: &dyn Page) -> Vec<DetectedField> {
        steps::detect_fields(self, page).await
    }

    async fn fill_fields(&self, ctx: StepContext<'_>, fields: &[DetectedField]) -> Vec<FilledField> {
        steps::fill_fields(self, ctx, fields).await
    }

    async fn fill_field(
        &self,
        ctx: StepContext<'_>,
        field: &DetectedField,
        value: &str,
    ) -> Result<(), FillError> {
        steps::fill_field(self, ctx, field, value).await
    }

    async fn handle_custom_questions(&self, _ctx: StepContext<'_>) -> Vec<FilledField> {
        Vec::new()
    }

    /// `uploads` holds the document fields detected on file inputs.
    async fn handle_file_uploads(&self, ctx: StepContext<'_>, uploads: &[DetectedField]) -> Vec<FilledField> {
        steps::handle_file_uploads(ctx, uploads).await
    }

    async fn submit_form(&self, ctx: StepContext<'_>) -> SubmitOutcome {
        steps::submit_form(self, ctx).await
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Session state
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    Uninitialized,
    Initializing,
    DetectingFields,
    Filling,
    HandlingCustomQuestions,
    HandlingFileUpload,
    CheckingForNextStep,
    NavigatingNext,
    Submitting,
    Done,
    DetectionFailed,
}

/// Why the navigation loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoopExit {
    NoNextControl,
    NextDisabled,
    LastPage,
    NoNewFields,
    MaxSteps,
    NavigationFailed,
    Cancelled,
    SessionTimeout,
}

/// Cooperative stop signal, checked before every page transition.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Full account of one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    pub session_id: Uuid,
    pub platform: Platform,
    pub started_at: DateTime<Utc>,
    pub filled: Vec<FilledField>,
    pub page_state: PageState,
    pub pages_visited: u32,
    pub loop_exit: LoopExit,
    pub submitted: bool,
    pub final_state: EngineState,
    /// Every state entered, in order.
    pub transitions: Vec<EngineState>,
}

impl SessionReport {
    pub fn succeeded(&self) -> usize {
        self.filled.iter().filter(|f| f.success).count()
    }

    pub fn failed(&self) -> usize {
        self.filled.len() - self.succeeded()
    }

    pub fn was_cancelled(&self) -> bool {
        self.loop_exit == LoopExit::Cancelled
    }

    pub fn timed_out(&self) -> bool {
        self.loop_exit == LoopExit::SessionTimeout
    }
}

struct Transitions {
    states: Vec<EngineState>,
}

impl Transitions {
    fn new() -> Self {
        Self {
            states: vec![EngineState::Uninitialized],
        }
    }

    fn enter(&mut self, state: EngineState) {
        debug!(from = ?self.current(), to = ?state, "State transition");
        self.states.push(state);
    }

    fn current(&self) -> EngineState {
        self.states.last().copied().unwrap_or(EngineState::Uninitialized)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Engine
// ────────────────────────────────────────────────────────────────────────────

pub struct AutofillEngine {
    config: EngineConfig,
    registry: AdapterRegistry,
    uploader: Arc<dyn FileUploader>,
    cancel: CancellationFlag,
}

impl AutofillEngine {
    /// Engine with every built-in adapter and the page-backed uploader.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            registry: AdapterRegistry::default(),
            uploader: Arc::new(PageFileUploader),
            cancel: CancellationFlag::new(),
        }
    }

    pub fn with_uploader(mut self, uploader: Arc<dyn FileUploader>) -> Self {
        self.uploader = uploader;
        self
    }

    pub fn with_registry(mut self, registry: AdapterRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    /// Handle the host can use to stop the session between pages.
    pub fn cancellation(&self) -> CancellationFlag {
        self.cancel.clone()
    }

    /// Selects the adapter for `page`, then runs a session with it.
    pub async fn autofill_page(
        &self,
        page: &dyn Page,
        resume: &ResumeData,
    ) -> Result<Vec<FilledField>, AutofillError> {
        let adapter = self.select_adapter(page).await?;
        self.autofill(adapter.as_ref(), page, resume).await
    }

    pub async fn autofill(
        &self,
        adapter: &dyn AtsAdapter,
        page: &dyn Page,
        resume: &ResumeData,
    ) -> Result<Vec<FilledField>, AutofillError> {
        Ok(self.run(adapter, page, resume).await?.filled)
    }

    pub async fn select_adapter(&self, page: &dyn Page) -> Result<Arc<dyn AtsAdapter>, AutofillError> {
        match self.registry.select(page).await {
            Some(adapter) => Ok(adapter),
            None => {
                let url = page.url().await.unwrap_or_default();
                warn!(url = %url, "No adapter recognised the page");
                Err(AutofillError::NoMatchingAdapter { url })
            }
        }
    }

    /// Runs one session and returns the full report.
    pub async fn run(
        &self,
        adapter: &dyn AtsAdapter,
        page: &dyn Page,
        resume: &ResumeData,
    ) -> Result<SessionReport, AutofillError> {
        let session_id = Uuid::new_v4();
        let platform = adapter.metadata().platform;
        let span = info_span!("autofill", session = %session_id, platform = %platform);
        self.run_session(session_id, adapter, page, resume)
            .instrument(span)
            .await
    }

    async fn run_session(
        &self,
        session_id: Uuid,
        adapter: &dyn AtsAdapter,
        page: &dyn Page,
        resume: &ResumeData,
    ) -> Result<SessionReport, AutofillError> {
        let started = Instant::now();
        let started_at = Utc::now();
        let platform = adapter.metadata().platform;
        let ctx = StepContext {
            page,
            resume,
            config: &self.config,
            uploader: self.uploader.as_ref(),
        };
        let nav = adapter.navigation();
        let mut trace = Transitions::new();

        let url = page.url().await.unwrap_or_default();
        info!(url = %url, "Autofill session started");

        trace.enter(EngineState::Initializing);
        adapter.initialize(ctx).await;
        let mut filled = adapter.prepare_application(ctx).await;
        log_records(&filled);
        let mut page_state = read_page_state(page, &nav, PageState::default()).await;

        trace.enter(EngineState::DetectingFields);
        let mut fields = adapter.detect_fields(page).await;
        if fields.is_empty() {
            trace.enter(EngineState::DetectionFailed);
            warn!("No fillable fields detected");
            return Err(AutofillError::NoFieldsDetected {
                platform: platform.to_string(),
            });
        }

        let mut pages_visited = 1;
        let mut seen: HashSet<(FieldType, NodeId)> = HashSet::new();
        let loop_exit = loop {
            info!(
                page = page_state.current_page,
                total = ?page_state.total_pages,
                fields = fields.len(),
                "Filling page"
            );
            let records = self.fill_page(adapter, ctx, &fields, &mut trace).await;
            seen.extend(fields.iter().map(|f| (f.mapping.field_type, f.node)));
            log_records(&records);
            filled.extend(records);

            trace.enter(EngineState::CheckingForNextStep);
            if pages_visited >= self.config.max_steps {
                warn!(max_steps = self.config.max_steps, "Step limit reached");
                break LoopExit::MaxSteps;
            }
            if page_state.on_last_page() {
                break LoopExit::LastPage;
            }
            let next = match find_next_control(page, &nav).await {
                NextControl::Absent => break LoopExit::NoNextControl,
                NextControl::Disabled(node) => {
                    debug!(node = %node, "Next control disabled");
                    break LoopExit::NextDisabled;
                }
                NextControl::Ready(node) => node,
            };
            if self.cancel.is_cancelled() {
                info!("Session cancelled before navigation");
                break LoopExit::Cancelled;
            }
            if let Some(budget) = self.config.session_timeout {
                if started.elapsed() >= budget {
                    warn!(budget_ms = budget.as_millis() as u64, "Session timeout reached");
                    break LoopExit::SessionTimeout;
                }
            }

            trace.enter(EngineState::NavigatingNext);
            if let Err(e) = page.click(next).await {
                warn!(error = %e, "Navigation failed");
                break LoopExit::NavigationFailed;
            }
            adapter.initialize(ctx).await;
            page_state = read_page_state(page, &nav, page_state.advanced()).await;

            trace.enter(EngineState::DetectingFields);
            fields = adapter.detect_fields(page).await;
            // An inert Next leaves the same elements in place.
            fields.retain(|f| !seen.contains(&(f.mapping.field_type, f.node)));
            if fields.is_empty() {
                break LoopExit::NoNewFields;
            }
            pages_visited += 1;
        };

        if let Some(record) = missing_resume_record(resume, &filled) {
            log_records(std::slice::from_ref(&record));
            filled.push(record);
        }

        trace.enter(EngineState::Submitting);
        let outcome = adapter.submit_form(ctx).await;
        log_records(&outcome.housekeeping);
        filled.extend(outcome.housekeeping);
        trace.enter(EngineState::Done);

        let report = SessionReport {
            session_id,
            platform,
            started_at,
            page_state,
            pages_visited,
            loop_exit,
            submitted: outcome.submitted,
            final_state: trace.current(),
            transitions: trace.states,
            filled,
        };
        info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            pages = report.pages_visited,
            exit = ?report.loop_exit,
            "Autofill session finished"
        );
        Ok(report)
    }

    async fn fill_page(
        &self,
        adapter: &dyn AtsAdapter,
        ctx: StepContext<'_>,
        fields: &[DetectedField],
        trace: &mut Transitions,
    ) -> Vec<FilledField> {
        let (uploads, fillable): (Vec<DetectedField>, Vec<DetectedField>) =
            fields.iter().cloned().partition(DetectedField::is_deferred_upload);

        trace.enter(EngineState::Filling);
        let mut records = adapter.fill_fields(ctx, &fillable).await;

        trace.enter(EngineState::HandlingCustomQuestions);
        records.extend(adapter.handle_custom_questions(ctx).await);

        trace.enter(EngineState::HandlingFileUpload);
        records.extend(adapter.handle_file_uploads(ctx, &uploads).await);
        records
    }
}

/// A résumé was supplied but nothing ever took it.
fn missing_resume_record(resume: &ResumeData, filled: &[FilledField]) -> Option<FilledField> {
    if resume.resume_file.is_none() && resume.resume_url.is_none() {
        return None;
    }
    let handled = filled
        .iter()
        .any(|f| matches!(f.field_type, FieldType::Resume | FieldType::ResumeText));
    if handled {
        return None;
    }
    let name = resume
        .resume_file
        .as_ref()
        .map(|f| f.name.clone())
        .or_else(|| resume.resume_url.clone())
        .unwrap_or_default();
    Some(FilledField::failed(
        FieldType::Resume,
        name,
        "",
        UploadError::NoTarget,
    ))
}

fn log_records(records: &[FilledField]) {
    for record in records {
        if record.success {
            debug!(field = %record.field_type, selector = %record.selector, "Field filled");
        } else {
            warn!(
                field = %record.field_type,
                selector = %record.selector,
                error = record.error.as_deref().unwrap_or_default(),
                "Field fill failed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ResumeFile;

    #[test]
    fn test_cancellation_flag_is_shared() {
        let flag = CancellationFlag::new();
        let handle = flag.clone();
        assert!(!flag.is_cancelled());
        handle.cancel();
        assert!(flag.is_cancelled());
    }

    #[test]
    fn test_missing_resume_record_only_when_resume_supplied() {
        let mut resume = ResumeData::default();
        assert!(missing_resume_record(&resume, &[]).is_none());

        resume.resume_file = Some(ResumeFile {
            name: "ada.pdf".to_string(),
            mime_type: "application/pdf".to_string(),
            data: Default::default(),
        });
        let record = missing_resume_record(&resume, &[]).unwrap();
        assert_eq!(record.field_type, FieldType::Resume);
        assert!(!record.success);

        let uploaded = FilledField::succeeded(FieldType::Resume, "ada.pdf", "#resume");
        assert!(missing_resume_record(&resume, &[uploaded]).is_none());
    }

    #[test]
    fn test_platform_ids_are_lowercase() {
        assert_eq!(Platform::SmartRecruiters.to_string(), "smartrecruiters");
        assert_eq!(
            serde_json::to_string(&Platform::LinkedIn).unwrap(),
            "\"linkedin\""
        );
    }
}

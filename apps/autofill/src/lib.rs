//! ATS autofill engine.
//!
//! Detects job-application forms on Applicant Tracking System pages
//! (Workday, Greenhouse, Indeed, LinkedIn, Taleo, iCIMS, SmartRecruiters,
//! or any page with a `<form>`) and fills them from a structured résumé.
//! The live document is reached only through the async `dom::Page` trait;
//! `dom::MemoryPage` is the in-process backend.

pub mod adapters;
pub mod config;
pub mod credentials;
pub mod dom;
pub mod engine;
pub mod errors;
pub mod models;
pub mod telemetry;
pub mod text_resume;
pub mod upload;

pub use adapters::AdapterRegistry;
pub use config::EngineConfig;
pub use dom::{MemoryPage, Page};
pub use engine::{
    AdapterMetadata, AtsAdapter, AutofillEngine, CancellationFlag, EngineState, LoopExit, Platform,
    SessionReport, StepContext,
};
pub use errors::{AutofillError, FillError, PageError, UploadError};
pub use models::{FieldType, FilledField, PageState, ResumeData, ResumeFile};
pub use upload::{FileUploader, PageFileUploader};

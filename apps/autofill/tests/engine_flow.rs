use std::time::Duration;

use async_trait::async_trait;

use ats_autofill::adapters::{resolvers, GenericAdapter};
use ats_autofill::dom::memory::Dom;
use ats_autofill::dom::{DomEventKind, ElementSpec, MemoryPage, NodeId};
use ats_autofill::engine::mapping::FieldMapping;
use ats_autofill::engine::{AdapterFeatures, AdapterMetadata, AtsAdapter, EngineState, LoopExit, Platform};
use ats_autofill::models::{Education, PersonalInfo};
use ats_autofill::{AutofillEngine, AutofillError, EngineConfig, FieldType, FilledField, ResumeData};

fn config() -> EngineConfig {
    EngineConfig {
        poll_interval: Duration::from_millis(50),
        settle_delay: Duration::from_millis(100),
        ..EngineConfig::default()
    }
}

fn ada() -> ResumeData {
    ResumeData {
        personal_info: PersonalInfo {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            ..Default::default()
        },
        ..Default::default()
    }
}

fn ada_page() -> MemoryPage {
    MemoryPage::with_body(
        "https://careers.example.com/apply",
        [ElementSpec::new("form").attr("id", "apply").children([
            ElementSpec::input("text").attr("name", "first_name"),
            ElementSpec::input("text").attr("name", "last_name"),
            ElementSpec::input("email").attr("name", "email"),
        ])],
    )
}

/// Three-step wizard: one field per step, Next disabled on the last step.
fn wizard_page() -> MemoryPage {
    let page = MemoryPage::with_body(
        "https://careers.example.com/wizard",
        [ElementSpec::new("form").attr("id", "wizard")],
    );
    page.with_dom(|dom| {
        let form = dom.first("#wizard").unwrap();
        render_step(dom, form, 1);
    });
    page
}

fn render_step(dom: &mut Dom, form: NodeId, step: u32) {
    dom.clear_children(form);
    let input = match step {
        1 => ElementSpec::input("text").attr("name", "first_name"),
        2 => ElementSpec::input("text").attr("name", "last_name"),
        _ => ElementSpec::input("email").attr("name", "email"),
    };
    dom.append(form, input);
    let mut next = ElementSpec::new("button").attr("type", "button").text("Next");
    if step == 3 {
        next = next.attr("disabled", "");
    }
    let button = dom.append(form, next);
    if step < 3 {
        dom.on_click(button, move |dom| render_step(dom, form, step + 1));
    }
}

#[tokio::test(start_paused = true)]
async fn test_simple_form_yields_three_successful_records() {
    let page = ada_page();
    let engine = AutofillEngine::new(config());

    let filled = engine.autofill_page(&page, &ada()).await.unwrap();

    assert_eq!(
        filled,
        vec![
            FilledField::succeeded(FieldType::FirstName, "Ada", r#"input[name*="first" i][name*="name" i]"#),
            FilledField::succeeded(FieldType::LastName, "Lovelace", r#"input[name*="last" i][name*="name" i]"#),
            FilledField::succeeded(FieldType::Email, "ada@example.com", r#"input[type="email"]"#),
        ]
    );
    for (selector, expected) in [
        ("input[name=first_name]", "Ada"),
        ("input[name=last_name]", "Lovelace"),
        ("input[name=email]", "ada@example.com"),
    ] {
        let node = page.first(selector).unwrap();
        assert_eq!(page.value_of(node), expected);
        let events = page.with_dom(|dom| dom.events_for(node));
        assert!(events.contains(&DomEventKind::Input), "{selector} missing input event");
        assert!(events.contains(&DomEventKind::Change), "{selector} missing change event");
        assert!(events.contains(&DomEventKind::Blur), "{selector} missing blur event");
    }
}

struct EmailOnly;

const EMAIL_ONLY: &[FieldMapping] = &[FieldMapping::new(
    FieldType::Email,
    &["#primary", "#secondary"],
    resolvers::email,
)];

#[async_trait]
impl AtsAdapter for EmailOnly {
    fn metadata(&self) -> AdapterMetadata {
        AdapterMetadata {
            name: "Email only",
            platform: Platform::Generic,
            version: "0.0.0",
            features: AdapterFeatures::default(),
        }
    }

    fn form_selectors(&self) -> &'static [&'static str] {
        &["form"]
    }

    fn field_mappings(&self) -> &'static [FieldMapping] {
        EMAIL_ONLY
    }
}

#[tokio::test(start_paused = true)]
async fn test_first_listed_selector_wins() {
    let page = MemoryPage::with_body(
        "https://careers.example.com/apply",
        [ElementSpec::new("form").children([
            ElementSpec::input("email").attr("id", "secondary"),
            ElementSpec::input("email").attr("id", "primary"),
        ])],
    );
    let engine = AutofillEngine::new(config());

    let filled = engine.autofill(&EmailOnly, &page, &ada()).await.unwrap();

    assert_eq!(filled.len(), 1);
    assert_eq!(filled[0].selector, "#primary");
    assert_eq!(page.value_of(page.first("#primary").unwrap()), "ada@example.com");
    assert_eq!(page.value_of(page.first("#secondary").unwrap()), "");
}

#[tokio::test(start_paused = true)]
async fn test_repeated_runs_produce_equal_records() {
    let page = ada_page();
    let engine = AutofillEngine::new(config());

    let first = engine.autofill_page(&page, &ada()).await.unwrap();
    let second = engine.autofill_page(&page, &ada()).await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test(start_paused = true)]
async fn test_wizard_stops_at_disabled_next() {
    let page = wizard_page();
    let engine = AutofillEngine::new(config());

    let report = engine.run(&GenericAdapter, &page, &ada()).await.unwrap();

    let types: Vec<FieldType> = report.filled.iter().map(|f| f.field_type).collect();
    assert_eq!(types, vec![FieldType::FirstName, FieldType::LastName, FieldType::Email]);
    assert!(report.filled.iter().all(|f| f.success));
    assert_eq!(report.pages_visited, 3);
    assert_eq!(report.page_state.current_page, 3);
    assert_eq!(report.loop_exit, LoopExit::NextDisabled);

    let last_next = page.first("button").unwrap();
    assert_eq!(page.with_dom(|dom| dom.click_count(last_next)), 0);
}

#[tokio::test(start_paused = true)]
async fn test_report_traces_state_machine() {
    let page = ada_page();
    let engine = AutofillEngine::new(config());

    let report = engine.run(&GenericAdapter, &page, &ada()).await.unwrap();

    assert_eq!(
        report.transitions,
        vec![
            EngineState::Uninitialized,
            EngineState::Initializing,
            EngineState::DetectingFields,
            EngineState::Filling,
            EngineState::HandlingCustomQuestions,
            EngineState::HandlingFileUpload,
            EngineState::CheckingForNextStep,
            EngineState::Submitting,
            EngineState::Done,
        ]
    );
    assert_eq!(report.final_state, EngineState::Done);
    assert_eq!(report.loop_exit, LoopExit::NoNextControl);
    assert_eq!((report.succeeded(), report.failed()), (3, 0));
    assert!(!report.submitted);
}

#[tokio::test(start_paused = true)]
async fn test_missing_resume_file_is_recorded_as_failed() {
    let page = MemoryPage::with_body(
        "https://careers.example.com/apply",
        [ElementSpec::new("form").children([
            ElementSpec::input("text").attr("name", "first_name"),
            ElementSpec::input("file").attr("name", "resume"),
        ])],
    );
    let engine = AutofillEngine::new(config());

    let filled = engine.autofill_page(&page, &ada()).await.unwrap();

    let resume: Vec<&FilledField> = filled
        .iter()
        .filter(|f| f.field_type == FieldType::Resume)
        .collect();
    assert_eq!(resume.len(), 1);
    assert!(!resume[0].success);
    assert_eq!(resume[0].error.as_deref(), Some("no resume file available"));
    assert!(filled.iter().any(|f| f.field_type == FieldType::FirstName && f.success));
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_stops_before_navigation() {
    let page = wizard_page();
    let engine = AutofillEngine::new(config());
    engine.cancellation().cancel();

    let report = engine.run(&GenericAdapter, &page, &ada()).await.unwrap();

    assert!(report.was_cancelled());
    assert_eq!(report.filled.len(), 1);
    assert_eq!(report.pages_visited, 1);
    assert!(page.first("input[name=first_name]").is_some());
}

#[tokio::test(start_paused = true)]
async fn test_session_timeout_stops_before_navigation() {
    let page = wizard_page();
    let engine = AutofillEngine::new(EngineConfig {
        session_timeout: Some(Duration::from_millis(50)),
        ..config()
    });

    let report = engine.run(&GenericAdapter, &page, &ada()).await.unwrap();

    assert!(report.timed_out());
    assert_eq!(report.pages_visited, 1);
}

#[tokio::test(start_paused = true)]
async fn test_max_steps_caps_navigation() {
    let page = wizard_page();
    let engine = AutofillEngine::new(EngineConfig {
        max_steps: 2,
        ..config()
    });

    let report = engine.run(&GenericAdapter, &page, &ada()).await.unwrap();

    assert_eq!(report.loop_exit, LoopExit::MaxSteps);
    assert_eq!(report.pages_visited, 2);
    assert_eq!(report.filled.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_page_without_form_is_a_detection_failure() {
    let page = MemoryPage::with_body("https://example.com/about", [ElementSpec::new("main")]);
    let engine = AutofillEngine::new(config());

    let err = engine.autofill_page(&page, &ada()).await.unwrap_err();

    assert!(err.is_detection_failure());
    assert!(matches!(err, AutofillError::NoMatchingAdapter { .. }));
}

#[tokio::test(start_paused = true)]
async fn test_form_without_known_fields_is_a_detection_failure() {
    let page = MemoryPage::with_body(
        "https://example.com/newsletter",
        [ElementSpec::new("form").child(ElementSpec::input("checkbox").attr("name", "subscribe"))],
    );
    let engine = AutofillEngine::new(config());

    let err = engine.autofill_page(&page, &ada()).await.unwrap_err();

    match err {
        AutofillError::NoFieldsDetected { platform } => assert_eq!(platform, "generic"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_inert_next_ends_with_no_new_fields() {
    let page = MemoryPage::with_body(
        "https://careers.example.com/apply",
        [ElementSpec::new("form").children([
            ElementSpec::input("text").attr("name", "first_name"),
            ElementSpec::new("button").attr("type", "button").text("Next"),
        ])],
    );
    let engine = AutofillEngine::new(config());

    let report = engine.run(&GenericAdapter, &page, &ada()).await.unwrap();

    assert_eq!(report.loop_exit, LoopExit::NoNewFields);
    assert_eq!(report.pages_visited, 1);
    assert_eq!(report.filled.len(), 1);
    assert_eq!(report.filled[0].field_type, FieldType::FirstName);
    let next = page.first("button").unwrap();
    assert_eq!(page.with_dom(|dom| dom.click_count(next)), 1);
}

#[tokio::test(start_paused = true)]
async fn test_education_fields_use_latest_degree() {
    let page = MemoryPage::with_body(
        "https://careers.example.com/apply",
        [ElementSpec::new("form").children([
            ElementSpec::input("text").attr("name", "school_name"),
            ElementSpec::input("text").attr("name", "degree"),
            ElementSpec::input("text").attr("name", "major"),
        ])],
    );
    let resume = ResumeData {
        education: vec![Education {
            institution: "University of London".to_string(),
            degree: Some("BSc".to_string()),
            field_of_study: Some("Mathematics".to_string()),
            ..Default::default()
        }],
        ..ada()
    };
    let engine = AutofillEngine::new(config());

    let filled = engine.autofill_page(&page, &resume).await.unwrap();

    let types: Vec<FieldType> = filled.iter().map(|f| f.field_type).collect();
    assert_eq!(types, vec![FieldType::School, FieldType::Degree, FieldType::FieldOfStudy]);
    assert_eq!(page.value_of(page.first("input[name=major]").unwrap()), "Mathematics");
}

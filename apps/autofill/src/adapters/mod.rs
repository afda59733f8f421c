//! Platform adapters and adapter selection.
//!
//! Each adapter is data (metadata, selectors, a `const` mapping table) plus
//! the few step overrides its platform needs. Selection asks each adapter in
//! fixed priority order and takes the first that recognises the page;
//! `GenericAdapter` is always last.

pub mod generic;
pub mod greenhouse;
pub mod icims;
pub mod indeed;
pub mod linkedin;
pub mod resolvers;
pub mod smartrecruiters;
pub mod taleo;
pub mod workday;

use std::sync::Arc;

use tracing::{debug, info};

use crate::dom::Page;
use crate::engine::{AdapterMetadata, AtsAdapter, Platform};

pub use generic::GenericAdapter;
pub use greenhouse::GreenhouseAdapter;
pub use icims::IcimsAdapter;
pub use indeed::IndeedAdapter;
pub use linkedin::LinkedInAdapter;
pub use smartrecruiters::SmartRecruitersAdapter;
pub use taleo::TaleoAdapter;
pub use workday::WorkdayAdapter;

/// Ordered set of adapters consulted by `select`.
pub struct AdapterRegistry {
    adapters: Vec<Arc<dyn AtsAdapter>>,
}

impl Default for AdapterRegistry {
    /// Every built-in adapter: Workday, Greenhouse, Indeed, LinkedIn, Taleo,
    /// iCIMS, SmartRecruiters, then Generic.
    fn default() -> Self {
        Self::new(vec![
            Arc::new(WorkdayAdapter),
            Arc::new(GreenhouseAdapter),
            Arc::new(IndeedAdapter),
            Arc::new(LinkedInAdapter),
            Arc::new(TaleoAdapter),
            Arc::new(IcimsAdapter),
            Arc::new(SmartRecruitersAdapter),
            Arc::new(GenericAdapter),
        ])
    }
}

impl AdapterRegistry {
    pub fn new(adapters: Vec<Arc<dyn AtsAdapter>>) -> Self {
        Self { adapters }
    }

    pub fn adapters(&self) -> &[Arc<dyn AtsAdapter>] {
        &self.adapters
    }

    /// First adapter whose `is_valid_form` holds. Never errors: a page that
    /// fails during probing simply does not match.
    pub async fn select(&self, page: &dyn Page) -> Option<Arc<dyn AtsAdapter>> {
        for adapter in &self.adapters {
            let platform = adapter.metadata().platform;
            if adapter.is_valid_form(page).await {
                info!(platform = %platform, "Adapter selected");
                return Some(Arc::clone(adapter));
            }
            debug!(platform = %platform, "Adapter did not match");
        }
        None
    }

    pub fn get(&self, platform: Platform) -> Option<Arc<dyn AtsAdapter>> {
        self.adapters
            .iter()
            .find(|a| a.metadata().platform == platform)
            .cloned()
    }

    pub fn metadata(&self) -> Vec<AdapterMetadata> {
        self.adapters.iter().map(|a| a.metadata()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{ElementSpec, MemoryPage};

    async fn selected(page: &MemoryPage) -> Option<Platform> {
        AdapterRegistry::default()
            .select(page)
            .await
            .map(|a| a.metadata().platform)
    }

    #[tokio::test]
    async fn test_priority_order_is_fixed() {
        let platforms: Vec<Platform> = AdapterRegistry::default()
            .metadata()
            .into_iter()
            .map(|m| m.platform)
            .collect();
        assert_eq!(
            platforms,
            vec![
                Platform::Workday,
                Platform::Greenhouse,
                Platform::Indeed,
                Platform::LinkedIn,
                Platform::Taleo,
                Platform::Icims,
                Platform::SmartRecruiters,
                Platform::Generic,
            ]
        );
    }

    #[tokio::test]
    async fn test_dom_markers_beat_generic() {
        let page = MemoryPage::with_body(
            "https://example.com/careers",
            [ElementSpec::new("form").attr("id", "application_form")],
        );
        assert_eq!(selected(&page).await, Some(Platform::Greenhouse));
    }

    #[tokio::test]
    async fn test_url_pattern_alone_selects_platform() {
        let page = MemoryPage::new("https://acme.wd5.myworkdayjobs.com/en-US/careers/job/apply");
        assert_eq!(selected(&page).await, Some(Platform::Workday));
    }

    #[tokio::test]
    async fn test_generic_needs_a_form() {
        let with_form = MemoryPage::with_body("https://example.com/jobs", [ElementSpec::new("form")]);
        assert_eq!(selected(&with_form).await, Some(Platform::Generic));

        let without = MemoryPage::with_body("https://example.com/about", [ElementSpec::new("main")]);
        assert_eq!(selected(&without).await, None);
    }

    #[tokio::test]
    async fn test_get_by_platform() {
        let registry = AdapterRegistry::default();
        assert_eq!(
            registry.get(Platform::Icims).map(|a| a.metadata().name),
            Some("iCIMS")
        );
    }
}

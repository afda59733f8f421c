//! Bounded waits. Every suspension in the engine goes through here, and every
//! wait has a hard deadline.

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, Instant};

use crate::dom::{NodeId, Page};

/// Deadline-aware polling clock.
pub struct Poller {
    deadline: Instant,
    interval: Duration,
}

impl Poller {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self {
            deadline: Instant::now() + timeout,
            // A zero interval would spin without yielding to the page.
            interval: interval.max(Duration::from_millis(1)),
        }
    }

    /// Sleeps one interval (clamped to the deadline). Returns `false` once expired.
    pub async fn tick(&mut self) -> bool {
        let now = Instant::now();
        if now >= self.deadline {
            return false;
        }
        sleep(self.interval.min(self.deadline - now)).await;
        true
    }
}

/// Polls `predicate` until it holds or `timeout` elapses.
pub async fn wait_for<F, Fut>(timeout: Duration, interval: Duration, mut predicate: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let mut poller = Poller::new(timeout, interval);
    loop {
        if predicate().await {
            return true;
        }
        if !poller.tick().await {
            return false;
        }
    }
}

/// Waits for the first of `selectors` to resolve. Returns the node and the selector that matched.
pub async fn wait_for_any<'s>(
    page: &dyn Page,
    selectors: &[&'s str],
    timeout: Duration,
    interval: Duration,
) -> Option<(NodeId, &'s str)> {
    let mut poller = Poller::new(timeout, interval);
    loop {
        for selector in selectors {
            if let Ok(Some(node)) = page.query_selector(selector).await {
                return Some((node, *selector));
            }
        }
        if !poller.tick().await {
            return None;
        }
    }
}

pub async fn wait_for_element(
    page: &dyn Page,
    selector: &str,
    timeout: Duration,
    interval: Duration,
) -> Option<NodeId> {
    wait_for_any(page, &[selector], timeout, interval)
        .await
        .map(|(node, _)| node)
}

/// Waits until none of `selectors` matches a visible element (loading spinners).
pub async fn wait_until_gone(
    page: &dyn Page,
    selectors: &[&str],
    timeout: Duration,
    interval: Duration,
) -> bool {
    wait_for(timeout, interval, move || none_visible(page, selectors)).await
}

async fn none_visible(page: &dyn Page, selectors: &[&str]) -> bool {
    for selector in selectors {
        let Ok(nodes) = page.query_selector_all(selector).await else {
            continue;
        };
        for node in nodes {
            if let Ok(el) = page.element(node).await {
                if el.visible {
                    return false;
                }
            }
        }
    }
    true
}

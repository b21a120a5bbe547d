use std::collections::HashSet;

use crate::source::is_remote_locator;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefetchRequest {
    pub page: usize,
    pub locator: String,
}

/// Sliding window of page images to warm around the current page. Each
/// locator is requested at most once per source list.
#[derive(Debug, Clone)]
pub struct PrefetchWindow {
    radius: usize,
    fetched: HashSet<String>,
}

impl PrefetchWindow {
    pub fn new(radius: usize) -> Self {
        Self {
            radius,
            fetched: HashSet::new(),
        }
    }

    pub fn plan(&mut self, current: usize, locators: &[String]) -> Vec<PrefetchRequest> {
        if locators.is_empty() {
            return Vec::new();
        }

        let first = current.saturating_sub(self.radius);
        let last = current
            .saturating_add(self.radius)
            .min(locators.len() - 1);
        if first > last {
            return Vec::new();
        }

        let mut requests = Vec::new();
        for (page, locator) in locators.iter().enumerate().take(last + 1).skip(first) {
            if is_remote_locator(locator) || self.fetched.contains(locator) {
                continue;
            }
            self.fetched.insert(locator.clone());
            requests.push(PrefetchRequest {
                page,
                locator: locator.clone(),
            });
        }
        requests
    }

    pub fn reset(&mut self) {
        self.fetched.clear();
    }

    pub fn is_fetched(&self, locator: &str) -> bool {
        self.fetched.contains(locator)
    }

    pub fn fetched_len(&self) -> usize {
        self.fetched.len()
    }
}

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;
use vlist_core::PageSource;

/// Generated data set whose items read `item-{n}`.
pub struct NumberedSource {
    page_size: usize,
    items: Option<usize>,
    latency: Duration,
    failing: HashSet<usize>,
    requested: Mutex<Vec<usize>>,
}

impl NumberedSource {
    /// A source with `items` entries in total, or unbounded when `None`.
    pub fn new(page_size: usize, items: Option<usize>) -> Self {
        Self {
            page_size,
            items,
            latency: Duration::ZERO,
            failing: HashSet::new(),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_failing_pages(mut self, pages: impl IntoIterator<Item = usize>) -> Self {
        self.failing = pages.into_iter().collect();
        self
    }

    /// Page indexes in the order they were fetched.
    pub fn requested(&self) -> Vec<usize> {
        self.requested
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl PageSource<String> for NumberedSource {
    async fn get_page(&self, page_index: usize) -> anyhow::Result<Vec<String>> {
        self.requested
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(page_index);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if self.failing.contains(&page_index) {
            anyhow::bail!("page {} is unavailable", page_index);
        }

        let first = page_index * self.page_size;
        let last = first + self.page_size;
        let last = self.items.map_or(last, |items| last.min(items));
        Ok((first..last).map(|n| format!("item-{n}")).collect())
    }
}

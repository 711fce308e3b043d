#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;
use uuid::Uuid;
use vlist_engine::{ContentRegion, ElementTemplate, PageSource, Translate};

pub const TOP: &str = "top-observer";
pub const BOTTOM: &str = "bottom-observer";

#[derive(Debug, Clone)]
pub struct Row {
    pub id: Uuid,
    pub text: String,
    pub offset: Option<f64>,
    pub binds: usize,
}

impl Translate for Row {
    fn translate_y(&mut self, offset: f64) {
        self.offset = Some(offset);
    }
}

pub struct RowTemplate;

impl ElementTemplate<String> for RowTemplate {
    type Element = Row;

    fn create(&self, datum: &String) -> Row {
        Row {
            id: Uuid::new_v4(),
            text: datum.clone(),
            offset: None,
            binds: 1,
        }
    }

    fn update(&self, datum: &String, element: &mut Row) {
        element.text = datum.clone();
        element.binds += 1;
    }
}

/// Region that records what it was asked to mount. `mounted` holds the rows
/// currently attached, in mount order.
#[derive(Default)]
pub struct RecordingRegion {
    pub mounted: Vec<(Uuid, usize)>,
    pub released: Vec<Uuid>,
    pub unmounted: bool,
}

impl RecordingRegion {
    pub fn mounted_ids(&self) -> Vec<Uuid> {
        let mut ids: Vec<Uuid> = self.mounted.iter().map(|(id, _)| *id).collect();
        ids.sort();
        ids
    }
}

impl ContentRegion<Row> for RecordingRegion {
    fn mount(&mut self, element: &Row, slot: usize) {
        self.mounted.push((element.id, slot));
    }

    fn unmount(&mut self, element: &Row) {
        self.mounted.retain(|(id, _)| *id != element.id);
        self.released.push(element.id);
    }

    fn unmount_all(&mut self) {
        self.unmounted = true;
    }
}

/// In-memory source serving fixed pages; pages past the end are empty.
pub struct VecSource {
    pages: Vec<Vec<String>>,
    requested: Mutex<Vec<usize>>,
}

impl VecSource {
    pub fn new(pages: Vec<Vec<&str>>) -> Self {
        Self {
            pages: pages
                .into_iter()
                .map(|page| page.into_iter().map(String::from).collect())
                .collect(),
            requested: Mutex::new(Vec::new()),
        }
    }

    /// `count` full pages whose items read `p{page}-{index}`.
    pub fn numbered(count: usize, page_size: usize) -> Self {
        Self {
            pages: (0..count)
                .map(|page| (0..page_size).map(|i| format!("p{page}-{i}")).collect())
                .collect(),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn requested(&self) -> Vec<usize> {
        self.requested.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requested.lock().unwrap().len()
    }
}

#[async_trait]
impl PageSource<String> for VecSource {
    async fn get_page(&self, page_index: usize) -> anyhow::Result<Vec<String>> {
        self.requested.lock().unwrap().push(page_index);
        Ok(self.pages.get(page_index).cloned().unwrap_or_default())
    }
}

/// Source that holds every fetch until a permit is released.
pub struct GatedSource {
    inner: VecSource,
    gate: Arc<Semaphore>,
    started: AtomicUsize,
}

impl GatedSource {
    pub fn new(inner: VecSource) -> Self {
        Self {
            inner,
            gate: Arc::new(Semaphore::new(0)),
            started: AtomicUsize::new(0),
        }
    }

    /// Let `n` more fetches finish.
    pub fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub fn requested(&self) -> Vec<usize> {
        self.inner.requested()
    }

    pub async fn wait_started(&self, n: usize) {
        while self.started() < n {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl PageSource<String> for GatedSource {
    async fn get_page(&self, page_index: usize) -> anyhow::Result<Vec<String>> {
        self.started.fetch_add(1, Ordering::SeqCst);
        let permit = self.gate.acquire().await?;
        permit.forget();
        self.inner.get_page(page_index).await
    }
}

pub fn texts<'a>(rows: impl Iterator<Item = &'a Row>) -> Vec<String> {
    rows.map(|row| row.text.clone()).collect()
}

pub fn ids<'a>(rows: impl Iterator<Item = &'a Row>) -> Vec<Uuid> {
    rows.map(|row| row.id).collect()
}

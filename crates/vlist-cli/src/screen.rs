//! A tiny in-memory document standing in for a real rendering surface.
//!
//! Elements are handles into the shared [`Screen`]; the engine moves and
//! rebinds them, and the command reads back what is mounted at the end.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;
use vlist_core::{ContentRegion, ElementTemplate, Translate};

#[derive(Debug, Clone, Serialize)]
pub struct RowView {
    pub id: Uuid,
    pub text: String,
    pub offset: f64,
    /// How many times this element has been bound to data
    pub binds: usize,
}

#[derive(Default)]
struct Document {
    nodes: HashMap<Uuid, RowView>,
    mounted: HashSet<Uuid>,
    created: usize,
}

#[derive(Clone, Default)]
pub struct Screen {
    document: Arc<Mutex<Document>>,
}

impl Screen {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Document> {
        self.document
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Mounted rows, top to bottom.
    pub fn snapshot(&self) -> Vec<RowView> {
        let document = self.lock();
        let mut rows: Vec<RowView> = document
            .mounted
            .iter()
            .filter_map(|id| document.nodes.get(id).cloned())
            .collect();
        rows.sort_by(|a, b| a.offset.total_cmp(&b.offset));
        rows
    }

    /// Elements ever created, including released ones.
    pub fn created(&self) -> usize {
        self.lock().created
    }
}

/// Handle to a row node on a [`Screen`].
pub struct RowElement {
    id: Uuid,
    screen: Screen,
}

impl RowElement {
    pub fn id(&self) -> Uuid {
        self.id
    }
}

impl Translate for RowElement {
    fn translate_y(&mut self, offset: f64) {
        if let Some(node) = self.screen.lock().nodes.get_mut(&self.id) {
            node.offset = offset;
        }
    }
}

pub struct RowTemplate {
    screen: Screen,
}

impl RowTemplate {
    pub fn new(screen: Screen) -> Self {
        Self { screen }
    }
}

impl ElementTemplate<String> for RowTemplate {
    type Element = RowElement;

    fn create(&self, datum: &String) -> RowElement {
        let id = Uuid::new_v4();
        let mut document = self.screen.lock();
        document.created += 1;
        document.nodes.insert(
            id,
            RowView {
                id,
                text: datum.clone(),
                offset: 0.0,
                binds: 1,
            },
        );
        RowElement {
            id,
            screen: self.screen.clone(),
        }
    }

    fn update(&self, datum: &String, element: &mut RowElement) {
        if let Some(node) = self.screen.lock().nodes.get_mut(&element.id) {
            node.text.clone_from(datum);
            node.binds += 1;
        }
    }
}

/// Content region backed by a [`Screen`].
pub struct ScreenRegion {
    screen: Screen,
    mounts: usize,
}

impl ScreenRegion {
    pub fn new(screen: Screen) -> Self {
        Self { screen, mounts: 0 }
    }

    pub fn mounts(&self) -> usize {
        self.mounts
    }
}

impl ContentRegion<RowElement> for ScreenRegion {
    fn mount(&mut self, element: &RowElement, slot: usize) {
        tracing::trace!("Mounting row {} at slot {}", element.id(), slot);
        self.screen.lock().mounted.insert(element.id());
        self.mounts += 1;
    }

    fn unmount(&mut self, element: &RowElement) {
        tracing::trace!("Releasing row {}", element.id());
        let mut document = self.screen.lock();
        document.mounted.remove(&element.id());
        document.nodes.remove(&element.id());
    }

    fn unmount_all(&mut self) {
        let mut document = self.screen.lock();
        document.mounted.clear();
        document.nodes.clear();
    }
}

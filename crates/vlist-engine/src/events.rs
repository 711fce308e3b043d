use crate::trigger::Edge;
use chrono::{DateTime, Utc};
use vlist_core::PageWindow;

/// What a trigger did to the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// New elements were appended below the window.
    GrewBottom { page: usize, created: usize },
    /// The top page was rebound with the new page and moved to the bottom.
    RecycledBottom {
        page: usize,
        retired_page: usize,
        rebound: usize,
    },
    /// New elements were prepended above the window.
    GrewTop { page: usize, created: usize },
    /// The bottom page was rebound with the new page and moved to the top.
    RecycledTop {
        page: usize,
        retired_page: usize,
        rebound: usize,
        created: usize,
    },
    /// The source has nothing at or after `page`.
    EndOfData { page: usize },
    /// Redundant trigger for an edge that is already being fetched.
    Ignored,
    /// Opposite-edge trigger held until the in-flight fetch commits.
    Queued,
    /// The page arrived after teardown and was thrown away.
    Discarded,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListEventKind {
    Applied(Outcome),
    FetchFailed {
        edge: Edge,
        page: usize,
        reason: String,
    },
    AtTop,
    TornDown,
}

/// Emitted on the controller's broadcast channel after every handled trigger.
#[derive(Debug, Clone)]
pub struct ListEvent {
    pub kind: ListEventKind,
    /// Window after the event
    pub window: PageWindow,
    /// Pool length after the event
    pub pool_len: usize,
    pub emitted_at: DateTime<Utc>,
}

impl ListEvent {
    pub fn new(kind: ListEventKind, window: PageWindow, pool_len: usize) -> Self {
        Self {
            kind,
            window,
            pool_len,
            emitted_at: Utc::now(),
        }
    }
}

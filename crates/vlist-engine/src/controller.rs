//! Window controller.
//!
//! Owns the pool and the page window and decides, for every edge trigger,
//! whether to grow the pool or recycle elements from the opposite end.
//!
//! A trigger is handled in two steps. [`WindowController::request`] validates
//! the trigger and marks the edge as pending, handing back a [`FetchTicket`].
//! [`WindowController::complete`] takes the fetched page and commits the whole
//! mutation, including repositioning, in one go. The fetch in between is the
//! only point where control is yielded, and [`WindowController::run`] keeps
//! listening to the bridge there: repeated triggers for the pending edge are
//! dropped, a trigger for the opposite edge is queued until the commit is done.

use crate::binder::DataBinder;
use crate::events::{ListEvent, ListEventKind, Outcome};
use crate::markup::ListMarkup;
use crate::pool::{ElementPool, PoolEnd};
use crate::position::PositionTranslator;
use crate::trigger::{Edge, EdgeTriggerBridge, TriggerEntry};
use std::collections::VecDeque;
use std::marker::PhantomData;
use tokio::sync::{broadcast, mpsc};
use vlist_core::{
    ContentRegion, ElementTemplate, ListConfig, ListResult, PageSource, PageWindow, Translate,
    VirtualListError,
};

/// Observable controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    FetchingBottom,
    FetchingTop,
    /// A top trigger fired while the window already starts at page 0.
    AtTop,
    TornDown,
}

/// Permission to fetch one page for one edge. Consumed by
/// [`WindowController::complete`] or [`WindowController::cancel`].
#[derive(Debug, PartialEq, Eq)]
pub struct FetchTicket {
    edge: Edge,
    page: usize,
}

impl FetchTicket {
    pub fn edge(&self) -> Edge {
        self.edge
    }

    pub fn page(&self) -> usize {
        self.page
    }
}

/// Result of validating a trigger.
#[derive(Debug, PartialEq)]
pub enum Request {
    /// Fetch the ticket's page, then complete it.
    Fetch(FetchTicket),
    /// Nothing to fetch; the trigger resolved immediately.
    Skip(Outcome),
}

/// Signals a running event loop to tear the list down.
#[derive(Clone)]
pub struct TeardownHandle {
    tx: mpsc::UnboundedSender<()>,
}

impl TeardownHandle {
    pub fn teardown(&self) {
        let _ = self.tx.send(());
    }
}

pub struct WindowController<T, S, B, R = ()>
where
    B: ElementTemplate<T>,
{
    config: ListConfig,
    markup: ListMarkup,
    source: S,
    binder: DataBinder<B>,
    translator: PositionTranslator,
    region: R,
    pool: ElementPool<B::Element>,
    window: PageWindow,
    /// Elements belonging to the last materialized page.
    tail_len: usize,
    bottom_exhausted: bool,
    bottom_pending: bool,
    top_pending: bool,
    at_top: bool,
    queued: VecDeque<Edge>,
    torn_down: bool,
    events: broadcast::Sender<ListEvent>,
    shutdown_tx: mpsc::UnboundedSender<()>,
    shutdown_rx: Option<mpsc::UnboundedReceiver<()>>,
    _data: PhantomData<fn() -> T>,
}

impl<T, S, B, R> WindowController<T, S, B, R>
where
    T: Send,
    S: PageSource<T>,
    B: ElementTemplate<T>,
    B::Element: Translate,
    R: ContentRegion<B::Element>,
{
    pub fn new(config: ListConfig, source: S, template: B, region: R) -> ListResult<Self> {
        config.validate()?;
        let (events, _) = broadcast::channel(64);
        let (shutdown_tx, shutdown_rx) = mpsc::unbounded_channel();
        Ok(Self {
            translator: PositionTranslator::from_config(&config),
            pool: ElementPool::new(config.pool_limit()),
            config,
            markup: ListMarkup::default(),
            source,
            binder: DataBinder::new(template),
            region,
            window: PageWindow::new(),
            tail_len: 0,
            bottom_exhausted: false,
            bottom_pending: false,
            top_pending: false,
            at_top: false,
            queued: VecDeque::new(),
            torn_down: false,
            events,
            shutdown_tx,
            shutdown_rx: Some(shutdown_rx),
            _data: PhantomData,
        })
    }

    pub fn with_markup(mut self, markup: ListMarkup) -> Self {
        self.markup = markup;
        self
    }

    pub fn config(&self) -> &ListConfig {
        &self.config
    }

    pub fn markup(&self) -> &ListMarkup {
        &self.markup
    }

    /// Container markup for the host to insert.
    pub fn render(&self) -> String {
        self.markup.to_html()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn region(&self) -> &R {
        &self.region
    }

    pub fn window(&self) -> PageWindow {
        self.window
    }

    pub fn pool_len(&self) -> usize {
        self.pool.len()
    }

    pub fn pool_limit(&self) -> usize {
        self.pool.limit()
    }

    /// Elements in visible order, top to bottom.
    pub fn elements(&self) -> impl Iterator<Item = &B::Element> {
        self.pool.iter()
    }

    pub fn element(&self, slot: usize) -> Option<&B::Element> {
        self.pool.get(slot)
    }

    /// Offsets the translator assigns to the current slots.
    pub fn offsets(&self) -> Vec<f64> {
        (0..self.pool.len())
            .map(|slot| self.translator.offset_of(slot))
            .collect()
    }

    /// Page shown by `slot`, if the slot is occupied.
    pub fn slot_page(&self, slot: usize) -> Option<usize> {
        if slot >= self.pool.len() {
            return None;
        }
        self.window.page_for_slot(slot, self.config.page_size)
    }

    pub fn state(&self) -> ControllerState {
        if self.torn_down {
            ControllerState::TornDown
        } else if self.bottom_pending {
            ControllerState::FetchingBottom
        } else if self.top_pending {
            ControllerState::FetchingTop
        } else if self.at_top {
            ControllerState::AtTop
        } else {
            ControllerState::Idle
        }
    }

    pub fn is_pending(&self, edge: Edge) -> bool {
        match edge {
            Edge::Top => self.top_pending,
            Edge::Bottom => self.bottom_pending,
        }
    }

    /// Opposite-edge triggers waiting for the in-flight fetch to finish.
    pub fn queued(&self) -> Vec<Edge> {
        self.queued.iter().copied().collect()
    }

    /// Whether the source has run out of pages below the window.
    pub fn is_exhausted(&self) -> bool {
        self.bottom_exhausted
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ListEvent> {
        self.events.subscribe()
    }

    pub fn teardown_handle(&self) -> TeardownHandle {
        TeardownHandle {
            tx: self.shutdown_tx.clone(),
        }
    }

    /// Pool size, window bounds and chunk layout all agree.
    pub fn invariants_hold(&self) -> bool {
        let page_size = self.config.page_size;
        if self.pool.len() > self.pool.limit() || self.window.start() > self.window.end() {
            return false;
        }
        if self.window.is_empty() {
            return self.pool.is_empty();
        }
        self.tail_len <= page_size
            && self.pool.len() == (self.window.len() - 1) * page_size + self.tail_len
    }

    pub async fn on_bottom_edge_visible(&mut self) -> ListResult<Outcome> {
        self.trigger(Edge::Bottom).await
    }

    pub async fn on_top_edge_visible(&mut self) -> ListResult<Outcome> {
        self.trigger(Edge::Top).await
    }

    /// Handle one trigger end to end: validate, fetch, commit.
    pub async fn trigger(&mut self, edge: Edge) -> ListResult<Outcome> {
        let ticket = match self.request(edge)? {
            Request::Fetch(ticket) => ticket,
            Request::Skip(outcome) => return Ok(outcome),
        };
        let result = self.source.get_page(ticket.page).await;
        self.complete(ticket, result)
    }

    /// Validate a trigger and mark its edge pending.
    ///
    /// Fails with [`VirtualListError::AtTopOfList`] when a top trigger fires
    /// at page 0; the window is left untouched.
    pub fn request(&mut self, edge: Edge) -> ListResult<Request> {
        if self.torn_down {
            return Ok(self.skip(Outcome::Ignored));
        }
        if self.is_pending(edge) {
            tracing::debug!("Dropping {} trigger, fetch already in flight", edge);
            return Ok(self.skip(Outcome::Ignored));
        }
        if self.is_pending(edge.opposite()) {
            let outcome = self.enqueue(edge);
            return Ok(self.skip(outcome));
        }

        let page = match edge {
            Edge::Bottom => {
                if self.bottom_exhausted {
                    return Ok(self.skip(Outcome::EndOfData {
                        page: self.window.next_page(),
                    }));
                }
                self.bottom_pending = true;
                self.window.next_page()
            }
            Edge::Top => match self.window.prev_page() {
                Some(page) => {
                    self.top_pending = true;
                    page
                }
                None => {
                    self.at_top = true;
                    self.emit(ListEventKind::AtTop);
                    return Err(VirtualListError::AtTopOfList);
                }
            },
        };

        tracing::debug!("Fetching page {} for {} edge", page, edge);
        Ok(Request::Fetch(FetchTicket { edge, page }))
    }

    /// Commit a fetched page. On failure the window and pool are unchanged.
    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        result: anyhow::Result<Vec<T>>,
    ) -> ListResult<Outcome> {
        self.clear_pending(ticket.edge);

        if self.torn_down {
            tracing::debug!("Discarding page {} fetched after teardown", ticket.page);
            return Ok(Outcome::Discarded);
        }

        let mut data = match result {
            Ok(data) => data,
            Err(e) => return Err(self.fetch_failed(&ticket, format!("{e:#}"))),
        };

        let page_size = self.config.page_size;
        if data.len() > page_size {
            tracing::warn!(
                "Page {} returned {} items, truncating to page size {}",
                ticket.page,
                data.len(),
                page_size
            );
            data.truncate(page_size);
        }

        let outcome = match ticket.edge {
            Edge::Bottom => self.apply_bottom(ticket.page, &data)?,
            Edge::Top => {
                if data.len() != page_size {
                    let reason = format!(
                        "page {} above the window returned {} items, expected {}",
                        ticket.page,
                        data.len(),
                        page_size
                    );
                    return Err(self.fetch_failed(&ticket, reason));
                }
                self.apply_top(ticket.page, &data)?
            }
        };

        self.translator.reindex_all(&mut self.pool);
        debug_assert!(self.invariants_hold());

        tracing::debug!(
            "{:?}: window [{}, {}), pool {}/{}",
            outcome,
            self.window.start(),
            self.window.end(),
            self.pool.len(),
            self.pool.limit()
        );
        self.emit(ListEventKind::Applied(outcome.clone()));
        Ok(outcome)
    }

    /// Abandon an in-flight fetch without touching the pool.
    pub fn cancel(&mut self, ticket: FetchTicket) {
        tracing::debug!(
            "Discarding in-flight fetch of page {} for {} edge",
            ticket.page,
            ticket.edge
        );
        self.clear_pending(ticket.edge);
    }

    /// Release every element and stop accepting triggers.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.bottom_pending = false;
        self.top_pending = false;
        self.queued.clear();
        self.region.unmount_all();
        self.pool.clear();
        tracing::info!("Virtual list torn down");
        self.emit(ListEventKind::TornDown);
    }

    /// Drive the list from a bridge until teardown or until the bridge goes away.
    ///
    /// Returns [`VirtualListError::UnknownTriggerSource`] if the bridge reports
    /// an element that is not one of this list's sentinels. The bridge is
    /// disconnected on every exit path, before the pool is released.
    ///
    /// The teardown receiver is handed back when the loop exits, so `run` can
    /// be called again with a fresh bridge.
    pub async fn run<Br: EdgeTriggerBridge>(&mut self, bridge: &mut Br) -> ListResult<()> {
        let mut shutdown = self.shutdown_rx.take();
        let result = self.event_loop(bridge, &mut shutdown).await;
        self.shutdown_rx = shutdown;
        result
    }

    async fn event_loop<Br: EdgeTriggerBridge>(
        &mut self,
        bridge: &mut Br,
        shutdown: &mut Option<mpsc::UnboundedReceiver<()>>,
    ) -> ListResult<()> {
        let mut entries = bridge.observe(&self.markup.sentinels());
        let mut inbox: VecDeque<Edge> = VecDeque::new();

        loop {
            let edge = match self.queued.pop_front().or_else(|| inbox.pop_front()) {
                Some(edge) => edge,
                None => {
                    tokio::select! {
                        batch = entries.recv() => match batch {
                            Some(batch) => match edges_of(&self.markup, batch) {
                                Ok(edges) => {
                                    for edge in edges {
                                        if inbox.contains(&edge) {
                                            tracing::debug!(
                                                "Dropping repeated {} trigger in one batch",
                                                edge
                                            );
                                            self.emit(ListEventKind::Applied(Outcome::Ignored));
                                        } else {
                                            inbox.push_back(edge);
                                        }
                                    }
                                    continue;
                                }
                                Err(e) => {
                                    bridge.disconnect();
                                    return Err(e);
                                }
                            },
                            None => {
                                tracing::debug!("Trigger bridge closed");
                                break;
                            }
                        },
                        _ = wait_for_shutdown(shutdown) => break,
                    }
                }
            };

            let ticket = match self.request(edge) {
                Ok(Request::Fetch(ticket)) => ticket,
                Ok(Request::Skip(_)) => continue,
                Err(e) if e.is_boundary() => {
                    tracing::debug!("Ignoring {} trigger: {}", edge, e);
                    continue;
                }
                Err(e) => return Err(e),
            };

            let fetched = {
                let mut fetch = self.source.get_page(ticket.page);
                loop {
                    tokio::select! {
                        result = &mut fetch => break Ok(Some(result)),
                        batch = entries.recv() => match batch {
                            Some(batch) => match edges_of(&self.markup, batch) {
                                Ok(edges) => {
                                    for incoming in edges {
                                        let outcome = if incoming == ticket.edge {
                                            tracing::debug!(
                                                "Dropping {} trigger, fetch already in flight",
                                                incoming
                                            );
                                            Outcome::Ignored
                                        } else if self.queued.contains(&incoming) {
                                            Outcome::Ignored
                                        } else {
                                            tracing::debug!(
                                                "Queueing {} trigger behind {} fetch",
                                                incoming,
                                                ticket.edge
                                            );
                                            self.queued.push_back(incoming);
                                            Outcome::Queued
                                        };
                                        self.emit(ListEventKind::Applied(outcome));
                                    }
                                }
                                Err(e) => break Err(e),
                            },
                            None => break Ok(None),
                        },
                        _ = wait_for_shutdown(shutdown) => break Ok(None),
                    }
                }
            };

            match fetched {
                Ok(Some(result)) => match self.complete(ticket, result) {
                    Ok(_) => {}
                    Err(e @ VirtualListError::FetchFailure { .. }) => {
                        tracing::warn!("{}", e);
                    }
                    Err(e) => {
                        if e.is_contract_violation() {
                            tracing::error!("Pool and window out of step: {}", e);
                        }
                        bridge.disconnect();
                        return Err(e);
                    }
                },
                Ok(None) => {
                    self.cancel(ticket);
                    break;
                }
                Err(e) => {
                    self.cancel(ticket);
                    bridge.disconnect();
                    return Err(e);
                }
            }
        }

        bridge.disconnect();
        self.teardown();
        Ok(())
    }

    fn apply_bottom(&mut self, page: usize, data: &[T]) -> ListResult<Outcome> {
        let page_size = self.config.page_size;
        if data.is_empty() {
            self.bottom_exhausted = true;
            tracing::debug!("Page {} is empty, reached end of data", page);
            return Ok(Outcome::EndOfData { page });
        }

        let outcome = if self.pool.spare_capacity() >= data.len() {
            let elements = self.binder.create(data);
            let first_slot = self.pool.len();
            self.pool.append(elements)?;
            for (slot, element) in self.pool.iter().enumerate().skip(first_slot) {
                self.region.mount(element, slot);
            }
            self.window.extend_end();
            self.tail_len = data.len();
            Outcome::GrewBottom {
                page,
                created: data.len(),
            }
        } else {
            let mut recycled = self.pool.recycle_front(page_size)?;
            let rebound = self.binder.rebind(data, &mut recycled);
            // A short page leaves surplus elements; they are unmounted and released.
            self.release_surplus(&mut recycled, rebound);
            self.pool.rotate(recycled, PoolEnd::Back)?;
            self.window.advance();
            self.tail_len = rebound;
            Outcome::RecycledBottom {
                page,
                retired_page: self.window.start() - 1,
                rebound,
            }
        };

        if data.len() < page_size {
            self.bottom_exhausted = true;
            tracing::debug!("Page {} is short, reached end of data", page);
        }
        if self.window.start() > 0 {
            self.at_top = false;
        }
        Ok(outcome)
    }

    fn apply_top(&mut self, page: usize, data: &[T]) -> ListResult<Outcome> {
        if self.pool.spare_capacity() >= data.len() {
            let elements = self.binder.create(data);
            self.pool.prepend(elements)?;
            self.window.extend_start()?;
            for (slot, element) in self.pool.iter().take(data.len()).enumerate() {
                self.region.mount(element, slot);
            }
            return Ok(Outcome::GrewTop {
                page,
                created: data.len(),
            });
        }

        let retired_page = self.window.end() - 1;
        let mut recycled = self.pool.recycle_back(self.tail_len)?;
        let rebound = self.binder.rebind(data, &mut recycled);
        self.release_surplus(&mut recycled, rebound);
        let refill = self.binder.create(&data[rebound..]);
        let created = refill.len();
        recycled.extend(refill);
        self.pool.rotate(recycled, PoolEnd::Front)?;
        self.window.retreat()?;
        for (slot, element) in self.pool.iter().enumerate().skip(rebound).take(created) {
            self.region.mount(element, slot);
        }
        self.tail_len = self.config.page_size;
        self.bottom_exhausted = false;

        Ok(Outcome::RecycledTop {
            page,
            retired_page,
            rebound,
            created,
        })
    }

    fn release_surplus(&mut self, recycled: &mut Vec<B::Element>, keep: usize) {
        if recycled.len() <= keep {
            return;
        }
        tracing::debug!("Releasing {} surplus elements", recycled.len() - keep);
        for element in recycled.drain(keep..) {
            self.region.unmount(&element);
        }
    }

    fn enqueue(&mut self, edge: Edge) -> Outcome {
        if self.queued.contains(&edge) {
            return Outcome::Ignored;
        }
        tracing::debug!("Queueing {} trigger behind in-flight fetch", edge);
        self.queued.push_back(edge);
        Outcome::Queued
    }

    fn skip(&self, outcome: Outcome) -> Request {
        self.emit(ListEventKind::Applied(outcome.clone()));
        Request::Skip(outcome)
    }

    fn fetch_failed(&self, ticket: &FetchTicket, reason: String) -> VirtualListError {
        self.emit(ListEventKind::FetchFailed {
            edge: ticket.edge,
            page: ticket.page,
            reason: reason.clone(),
        });
        VirtualListError::FetchFailure {
            page: ticket.page,
            message: reason,
        }
    }

    fn clear_pending(&mut self, edge: Edge) {
        match edge {
            Edge::Top => self.top_pending = false,
            Edge::Bottom => self.bottom_pending = false,
        }
    }

    fn emit(&self, kind: ListEventKind) {
        let _ = self.events.send(ListEvent::new(
            kind,
            self.window,
            self.pool.len(),
        ));
    }
}

/// Map a batch of entries onto edges, rejecting the whole batch if any entry
/// comes from an element that is not one of the list's sentinels.
fn edges_of(markup: &ListMarkup, batch: Vec<TriggerEntry>) -> ListResult<Vec<Edge>> {
    let mut edges = Vec::with_capacity(batch.len());
    for entry in batch {
        let Some(edge) = markup.edge_of(&entry.target) else {
            tracing::error!("Trigger entry from unknown element '{}'", entry.target);
            return Err(VirtualListError::UnknownTriggerSource(entry.target));
        };
        if entry.is_intersecting {
            edges.push(edge);
        }
    }
    Ok(edges)
}

async fn wait_for_shutdown(rx: &mut Option<mpsc::UnboundedReceiver<()>>) {
    match rx {
        Some(rx) => {
            rx.recv().await;
        }
        None => std::future::pending::<()>().await,
    }
}

use crate::cli::ScrollArgs;
use crate::context::CliContext;
use crate::output;
use crate::screen::{RowTemplate, RowView, Screen, ScreenRegion};
use crate::source::NumberedSource;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};
use vlist_engine::{
    BridgeHandle, ChannelBridge, Edge, ListConfig, ListEvent, ListEventKind, ListMarkup, Outcome,
    PageWindow, WindowController,
};

#[derive(Debug, Serialize)]
pub struct ScrollReport {
    pub start: usize,
    pub end: usize,
    pub pool_len: usize,
    pub pool_limit: usize,
    /// Elements created over the whole run
    pub created: usize,
    /// Mount calls made on the content region
    pub mounts: usize,
    /// Pages requested from the source, in order
    pub fetched: Vec<usize>,
    pub events: Vec<String>,
    pub rows: Vec<RowView>,
}

/// What the driver saw before the list was torn down.
#[derive(Default)]
struct Settled {
    events: Vec<String>,
    skipped: usize,
    window: PageWindow,
    pool_len: usize,
    created: usize,
    rows: Vec<RowView>,
}

impl Settled {
    fn seen(&self) -> usize {
        self.events.len() + self.skipped
    }

    fn record(&mut self, event: ListEvent) {
        self.window = event.window;
        self.pool_len = event.pool_len;
        self.events.push(describe(&event.kind));
    }
}

pub async fn handle(ctx: &CliContext, args: ScrollArgs) -> anyhow::Result<()> {
    let report = scroll(ctx.config.clone(), &args).await?;
    output::output_success(&report)
}

pub async fn scroll(config: ListConfig, args: &ScrollArgs) -> anyhow::Result<ScrollReport> {
    let moves = parse_moves(&args.moves)?;
    let pool_limit = config.pool_limit();
    let source = Arc::new(
        NumberedSource::new(config.page_size, args.items)
            .with_latency(Duration::from_millis(args.latency_ms))
            .with_failing_pages(args.fail_pages.iter().copied()),
    );
    let screen = Screen::new();

    tracing::info!(
        "Scrolling {} moves, page size {}, pool limit {}",
        moves.len(),
        config.page_size,
        pool_limit
    );

    let mut list = WindowController::new(
        config,
        source.clone(),
        RowTemplate::new(screen.clone()),
        ScreenRegion::new(screen.clone()),
    )?;
    let markup = list.markup().clone();
    let mut events = list.subscribe();
    let teardown = list.teardown_handle();
    let (mut bridge, handle) = ChannelBridge::new();

    let settled = {
        let run = list.run(&mut bridge);
        let driver = drive(&handle, &markup, &moves, args.burst, &mut events, &screen);
        tokio::pin!(run);
        tokio::pin!(driver);

        let settled = tokio::select! {
            result = &mut run => {
                result?;
                anyhow::bail!("list stopped before every move was applied");
            }
            settled = &mut driver => settled?,
        };
        teardown.teardown();
        run.await?;
        settled
    };

    Ok(ScrollReport {
        start: settled.window.start(),
        end: settled.window.end(),
        pool_len: settled.pool_len,
        pool_limit,
        created: settled.created,
        mounts: list.region().mounts(),
        fetched: source.requested(),
        events: settled.events,
        rows: settled.rows,
    })
}

/// `d` scrolls to the bottom sentinel, `u` to the top one.
pub fn parse_moves(moves: &str) -> anyhow::Result<Vec<Edge>> {
    moves
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| match c {
            'd' | 'D' => Ok(Edge::Bottom),
            'u' | 'U' => Ok(Edge::Top),
            other => anyhow::bail!("Invalid move '{}': use 'd' for down and 'u' for up", other),
        })
        .collect()
}

async fn drive(
    handle: &BridgeHandle,
    markup: &ListMarkup,
    moves: &[Edge],
    burst: bool,
    events: &mut broadcast::Receiver<ListEvent>,
    screen: &Screen,
) -> anyhow::Result<Settled> {
    let mut settled = Settled::default();
    // Every trigger ends in exactly one event; a queued one adds a second.
    let mut expected = 0;

    for &edge in moves {
        let target = match edge {
            Edge::Top => &markup.top_sentinel_id,
            Edge::Bottom => &markup.bottom_sentinel_id,
        };
        while !handle.reveal(target) {
            tokio::task::yield_now().await;
        }
        expected += 1;
        if !burst {
            settle(events, &mut settled, &mut expected).await?;
        }
    }
    settle(events, &mut settled, &mut expected).await?;

    settled.created = screen.created();
    settled.rows = screen.snapshot();
    Ok(settled)
}

async fn settle(
    events: &mut broadcast::Receiver<ListEvent>,
    settled: &mut Settled,
    expected: &mut usize,
) -> anyhow::Result<()> {
    while settled.seen() < *expected {
        match events.recv().await {
            Ok(event) => {
                if event.kind == ListEventKind::Applied(Outcome::Queued) {
                    *expected += 1;
                }
                settled.record(event);
            }
            Err(RecvError::Lagged(missed)) => {
                tracing::warn!("Event stream lagged, {} events missed", missed);
                settled.skipped += usize::try_from(missed).unwrap_or(usize::MAX);
            }
            Err(RecvError::Closed) => anyhow::bail!("list event stream closed"),
        }
    }
    Ok(())
}

fn describe(kind: &ListEventKind) -> String {
    match kind {
        ListEventKind::Applied(outcome) => match outcome {
            Outcome::GrewBottom { page, created } => {
                format!("grew-bottom page={page} created={created}")
            }
            Outcome::RecycledBottom {
                page,
                retired_page,
                rebound,
            } => format!("recycled-bottom page={page} retired={retired_page} rebound={rebound}"),
            Outcome::GrewTop { page, created } => format!("grew-top page={page} created={created}"),
            Outcome::RecycledTop {
                page,
                retired_page,
                rebound,
                created,
            } => format!(
                "recycled-top page={page} retired={retired_page} rebound={rebound} created={created}"
            ),
            Outcome::EndOfData { page } => format!("end-of-data page={page}"),
            Outcome::Ignored => "ignored".to_string(),
            Outcome::Queued => "queued".to_string(),
            Outcome::Discarded => "discarded".to_string(),
        },
        ListEventKind::FetchFailed { edge, page, reason } => {
            format!("fetch-failed edge={edge} page={page}: {reason}")
        }
        ListEventKind::AtTop => "at-top".to_string(),
        ListEventKind::TornDown => "torn-down".to_string(),
    }
}

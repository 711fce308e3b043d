//! Windowing and recycling engine for virtualized lists.
//!
//! A [`WindowController`] keeps at most `pool_pages × page_size` elements
//! alive, growing the pool while it has room and recycling whole pages from
//! the opposite end once it is full.

pub mod binder;
pub mod controller;
pub mod events;
pub mod markup;
pub mod pool;
pub mod position;
pub mod trigger;

pub use binder::DataBinder;
pub use controller::{ControllerState, FetchTicket, Request, TeardownHandle, WindowController};
pub use events::{ListEvent, ListEventKind, Outcome};
pub use markup::ListMarkup;
pub use pool::{ElementPool, PoolEnd};
pub use position::PositionTranslator;
pub use trigger::{BridgeHandle, ChannelBridge, Edge, EdgeTriggerBridge, EntryReceiver, TriggerEntry};

pub use vlist_core::{
    ContentRegion, ElementTemplate, ListConfig, ListResult, PageSource, PageWindow, Translate,
    VirtualListError,
};

//! Push-channel glue for the Arbor store.
//!
//! The remote store pushes two kinds of events to connected clients: batched
//! node-change events (one subscription per store) and individual
//! task-progress events (one subscription per store and task scope). This
//! crate holds the event types and the listener registries the socket glue
//! dispatches into; the socket transport itself lives outside the core.
//!
//! Subscriptions are explicit handles: [`Subscription::unsubscribe`] removes
//! the listener, and nothing relies on garbage-collected weak references.

pub mod hub;
pub mod node;
pub mod task;

pub use hub::{NodeEventHub, NodeEventListener, Subscription, TaskEventHub, TaskEventListener};
pub use node::{NodeEvent, NodeEventList};
pub use task::{TaskEvent, TaskEventKind};

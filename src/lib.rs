//! cascade is the layout core of a photo-gallery client: a waterfall
//! (masonry) engine that packs image and folder cards into columns, plus
//! the event-loop plumbing that feeds it asynchronous image measurements
//! and debounced resize events.
//!
//! The crate is split along those lines:
//!
//! * [`layout`] is the engine proper. It is synchronous and IO-free: passes
//!   are value objects advanced by measurement events, which makes every
//!   placement decision unit-testable without an event loop.
//! * [`runtime`] owns a calloop event loop and drives pending image loads
//!   through it, feeding outcomes back into the engine and debouncing
//!   viewport resizes.
//! * [`gallery`] maps backend listing payloads (`cascade-api`) into layout
//!   items and implements the client's sort orders and pagination.

pub mod gallery;
pub mod layout;
pub mod runtime;

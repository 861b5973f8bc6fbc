//! cascade-layout is a masonry ("waterfall") layout engine for dynamically
//! growing lists of heterogeneous-height items spread across a fixed number
//! of columns.
//!
//! Item heights are not known up front: each item is measured asynchronously
//! (in an off-screen sandbox by default, waiting out image loads), at most
//! [`MAX_IN_FLIGHT`] at a time. Once every height in a batch is known, items
//! are placed in input order into whichever column is currently shortest,
//! and the aggregate outputs (wrapper height, per-column heights, column
//! item lists and per-item [`Placement`]s) are republished.
//!
//! # Layout
//!
//! [`Waterfall`] is the entry point. It exposes two mutating operations:
//!
//! - [`Waterfall::layout`] appends a batch of new items onto the current
//!   column state.
//! - [`Waterfall::insert_items_before`] prepends items: it re-places the
//!   whole list against zeroed columns, but only measures the inserted
//!   items. Everything already placed reuses its stored height and keeps
//!   its rendering-identity hash, so the presentation layer can move nodes
//!   instead of recreating them.
//!
//! ```
//! use std::sync::Arc;
//!
//! use cascade_layout::{MeasureContext, MeasureError, Px, Waterfall, WaterfallArgs};
//! use futures_util::future::BoxFuture;
//!
//! struct Card {
//!     body: String,
//! }
//!
//! let hook = |card: Arc<Card>, _ctx: MeasureContext| -> BoxFuture<'static, Result<Px, MeasureError>> {
//!     Box::pin(async move { Ok(Px(card.body.lines().count() as i32 * 18)) })
//! };
//!
//! let mut feed = Waterfall::new(
//!     2,
//!     WaterfallArgs::default().item_width(Px(240)).column_gap(Px(16)),
//!     Arc::new(hook),
//! );
//!
//! let cards = vec![
//!     Arc::new(Card { body: "one\ntwo".into() }),
//!     Arc::new(Card { body: "one".into() }),
//! ];
//!
//! tokio::runtime::Builder::new_current_thread()
//!     .build()
//!     .unwrap()
//!     .block_on(async { feed.layout(&cards).await })
//!     .unwrap();
//!
//! assert_eq!(feed.column_heights(), &[Px(36), Px(18)]);
//! ```
//!
//! # Measurement
//!
//! Height resolution sits behind the [`HeightResolver`] capability. A
//! caller-supplied async closure hook fully replaces the default strategy,
//! as above. The default, [`SandboxResolver`], composes an [`ItemRenderer`]
//! with a [`MeasureHost`]: render the item off-screen at the configured
//! width, wait for every image inside the subtree to settle (substituting a
//! placeholder for broken ones and writing it back through [`ImagePatch`]),
//! read the rendered height, unmount. Hosts other than a browser DOM, such
//! as server-side renderers or test fixtures, implement the same traits
//! without touching the layout algorithm.

mod engine;
mod item;
mod queue;

pub mod config;
pub mod error;
pub mod hash;
pub mod measure;
pub mod placement;
pub mod px;
pub mod waterfall;

pub use config::{BottomGap, WaterfallArgs};
pub use error::{LayoutError, MeasureError};
pub use hash::{HashSource, RenderHash, SystemHashSource};
pub use measure::{
    FALLBACK_IMAGE_SRC, HeightResolver, ImageLoad, ImagePatch, ImageSlot, ItemRenderer,
    MeasureContext, MeasureHost, Sandbox, SandboxResolver, settle_images,
};
pub use placement::{CellPosition, Placement};
pub use px::Px;
pub use queue::MAX_IN_FLIGHT;
pub use waterfall::Waterfall;

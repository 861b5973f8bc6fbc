//! Layout orchestrator: measure, place, publish.

use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::{
    config::WaterfallArgs,
    engine::ColumnBoard,
    error::{LayoutError, MeasureError},
    hash::{HashSource, SystemHashSource},
    item::{ItemKey, PlacementTable},
    measure::{FALLBACK_IMAGE_SRC, HeightResolver, MeasureContext},
    placement::Placement,
    px::Px,
    queue::{MAX_IN_FLIGHT, for_each_bounded},
};

/// A fixed-column waterfall layout over caller-owned items.
///
/// Each pass measures the incoming items through the bounded queue, then
/// places them in input order onto whichever column is currently shortest,
/// and finally republishes the aggregate outputs (wrapper height, per-column
/// heights, column item lists, per-item placements).
///
/// The engine provides no mutual exclusion across passes: both mutating
/// operations take `&mut self`, and callers must serialize calls to the same
/// instance.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use cascade_layout::{MeasureContext, MeasureError, Px, Waterfall, WaterfallArgs};
/// use futures_util::future::BoxFuture;
///
/// struct Note {
///     lines: i32,
/// }
///
/// // A height hook fully replaces the sandbox measurement strategy.
/// let hook = |note: Arc<Note>, _ctx: MeasureContext| -> BoxFuture<'static, Result<Px, MeasureError>> {
///     Box::pin(async move { Ok(Px(note.lines * 18)) })
/// };
///
/// let mut feed = Waterfall::new(
///     3,
///     WaterfallArgs::default().item_width(Px(100)).column_gap(Px(10)),
///     Arc::new(hook),
/// );
///
/// let notes: Vec<Arc<Note>> = [3, 2, 5]
///     .into_iter()
///     .map(|lines| Arc::new(Note { lines }))
///     .collect();
///
/// tokio::runtime::Builder::new_current_thread()
///     .build()
///     .unwrap()
///     .block_on(async { feed.layout(&notes).await })
///     .unwrap();
///
/// assert_eq!(feed.wrapper_height(), Px(90));
/// assert_eq!(feed.placement(&notes[2]).unwrap().position.column, 2);
/// ```
pub struct Waterfall<T> {
    args: WaterfallArgs,
    resolver: Arc<dyn HeightResolver<T>>,
    hash_source: Arc<dyn HashSource>,
    board: ColumnBoard<T>,
    placements: PlacementTable<T>,
    wrapper_height: Px,
}

impl<T: Send + Sync + 'static> Waterfall<T> {
    /// Creates an empty layout with a fixed column count (clamped to ≥ 1).
    pub fn new(columns: usize, args: WaterfallArgs, resolver: Arc<dyn HeightResolver<T>>) -> Self {
        Self {
            args,
            resolver,
            hash_source: Arc::new(SystemHashSource::new()),
            board: ColumnBoard::new(columns),
            placements: PlacementTable::default(),
            wrapper_height: Px::ZERO,
        }
    }

    /// Replaces the rendering-identity hash source, for deterministic keys
    /// in tests.
    pub fn with_hash_source(mut self, source: Arc<dyn HashSource>) -> Self {
        self.hash_source = source;
        self
    }

    /// Total height of the laid-out content: the maximum column height.
    pub fn wrapper_height(&self) -> Px {
        self.wrapper_height
    }

    /// Next available top of every column, in column order.
    pub fn column_heights(&self) -> &[Px] {
        self.board.tops()
    }

    /// Items currently assigned to `column`, in placement order.
    pub fn column_items(&self, column: usize) -> &[Arc<T>] {
        self.board.column(column)
    }

    /// The fixed column count.
    pub fn column_count(&self) -> usize {
        self.board.column_count()
    }

    /// Current placement of `item`, if it has been laid out at least once.
    pub fn placement(&self, item: &Arc<T>) -> Option<&Placement> {
        self.placements.get(ItemKey::of(item))
    }

    /// The configuration this layout was built with.
    pub fn args(&self) -> &WaterfallArgs {
        &self.args
    }

    /// Appends `new_items` to the layout.
    ///
    /// Resolves heights for exactly `new_items`, then places them in input
    /// order onto the current column state, then republishes the wrapper
    /// height. An empty slice is a published-state-identical no-op. On error
    /// nothing is published.
    pub async fn layout(&mut self, new_items: &[Arc<T>]) -> Result<(), LayoutError> {
        if new_items.is_empty() {
            return Ok(());
        }
        debug!(count = new_items.len(), "layout pass");

        let bottom_gap = self.args.bottom_gap.resolve();
        let heights = self.measure_batch(new_items).await?;
        self.placements.sweep();

        for item in new_items {
            let height = heights
                .get(&ItemKey::of(item))
                .copied()
                .ok_or(LayoutError::MissingHeight)?;
            let hash = self.hash_source.next_hash();
            let placement = self.board.place(
                item,
                height,
                self.args.item_width,
                self.args.column_gap,
                bottom_gap,
                hash,
            );
            self.placements.insert(item, placement);
        }

        self.wrapper_height = self.board.wrapper_height();
        debug!(wrapper = self.wrapper_height.raw(), "layout pass published");
        Ok(())
    }

    /// Inserts `inserted` before `existing` and re-places everything.
    ///
    /// Only the inserted items are measured; existing items reuse the height
    /// stored on their placement. Column state is zeroed and the combined
    /// order (`inserted` first, then `existing`) is replayed through column
    /// assignment. Previously placed items keep their rendering-identity
    /// hash; inserted items get fresh ones. An empty insert list is a
    /// published-state-identical no-op. On error nothing is published.
    ///
    /// An item found in neither the fresh measurements nor the placement
    /// table is a logic error reported as [`LayoutError::MissingHeight`],
    /// never silently given a zero height.
    pub async fn insert_items_before(
        &mut self,
        existing: &[Arc<T>],
        inserted: &[Arc<T>],
    ) -> Result<(), LayoutError> {
        if inserted.is_empty() {
            return Ok(());
        }
        debug!(
            inserted = inserted.len(),
            existing = existing.len(),
            "prepend re-layout pass"
        );

        let bottom_gap = self.args.bottom_gap.resolve();
        let heights = self.measure_batch(inserted).await?;
        self.placements.sweep();

        // Validate the whole replay before touching column state, so a
        // missing height aborts with the published state intact.
        let mut replay = Vec::with_capacity(inserted.len() + existing.len());
        for (index, item) in inserted.iter().chain(existing).enumerate() {
            let key = ItemKey::of(item);
            let prior = self.placements.get(key);
            let height = if index < inserted.len() {
                heights.get(&key).copied()
            } else {
                prior
                    .map(|placement| placement.height)
                    .or_else(|| heights.get(&key).copied())
            }
            .ok_or(LayoutError::MissingHeight)?;
            replay.push((item, height, prior.map(|placement| placement.hash)));
        }

        self.board.reset();
        for (item, height, prior_hash) in replay {
            let hash = prior_hash.unwrap_or_else(|| self.hash_source.next_hash());
            let placement = self.board.place(
                item,
                height,
                self.args.item_width,
                self.args.column_gap,
                bottom_gap,
                hash,
            );
            self.placements.insert(item, placement);
        }

        self.wrapper_height = self.board.wrapper_height();
        debug!(
            wrapper = self.wrapper_height.raw(),
            "prepend re-layout published"
        );
        Ok(())
    }

    /// Resolves heights for `items` under the concurrency ceiling and
    /// collects them into an identity-keyed lookup.
    async fn measure_batch(&self, items: &[Arc<T>]) -> Result<FxHashMap<ItemKey, Px>, MeasureError> {
        let ctx = self.measure_context();
        let heights = Mutex::new(FxHashMap::default());
        {
            let heights = &heights;
            for_each_bounded(items, MAX_IN_FLIGHT, |item| {
                let ctx = ctx.clone();
                let resolver = self.resolver.clone();
                async move {
                    let key = ItemKey::of(&item);
                    let height = resolver.resolve(item, ctx).await?;
                    heights.lock().insert(key, height);
                    Ok::<_, MeasureError>(())
                }
            })
            .await?;
        }
        Ok(heights.into_inner())
    }

    fn measure_context(&self) -> MeasureContext {
        MeasureContext {
            width: self.args.item_width,
            error_image: Arc::from(
                self.args
                    .error_image
                    .as_deref()
                    .unwrap_or(FALLBACK_IMAGE_SRC),
            ),
            container: Arc::from(self.args.sandbox_container.as_str()),
        }
    }
}

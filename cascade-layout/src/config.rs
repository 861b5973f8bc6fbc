//! Engine configuration.

use std::{fmt, sync::Arc};

use derive_setters::Setters;

use crate::px::Px;

/// Vertical spacing reserved below every placed item.
///
/// The dynamic variant is re-evaluated once per layout pass, so responsive
/// gap values do not have to be re-derived per item.
#[derive(Clone)]
pub enum BottomGap {
    /// A fixed gap in physical pixels.
    Fixed(Px),
    /// A supplier evaluated once at the start of each layout pass.
    Dynamic(Arc<dyn Fn() -> Px + Send + Sync>),
}

impl BottomGap {
    /// Evaluates the gap for the current pass.
    pub(crate) fn resolve(&self) -> Px {
        match self {
            Self::Fixed(gap) => *gap,
            Self::Dynamic(supplier) => supplier(),
        }
    }
}

impl Default for BottomGap {
    fn default() -> Self {
        Self::Fixed(Px::ZERO)
    }
}

impl fmt::Debug for BottomGap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(gap) => f.debug_tuple("Fixed").field(gap).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

impl From<Px> for BottomGap {
    fn from(gap: Px) -> Self {
        Self::Fixed(gap)
    }
}

/// Arguments shared by every layout pass of a
/// [`Waterfall`](crate::Waterfall).
#[derive(Clone, Debug, Setters)]
pub struct WaterfallArgs {
    /// Fixed width of every item, in physical pixels.
    pub item_width: Px,
    /// Horizontal gap between adjacent columns.
    pub column_gap: Px,
    /// Spacing reserved below each placed item.
    #[setters(into)]
    pub bottom_gap: BottomGap,
    /// Identifier of the host container scoping the measurement sandbox.
    /// Hosts fall back to their root when no such container exists.
    pub sandbox_container: String,
    /// Placeholder source substituted for images that fail to load. Falls
    /// back to [`FALLBACK_IMAGE_SRC`](crate::FALLBACK_IMAGE_SRC) when unset.
    pub error_image: Option<String>,
}

impl Default for WaterfallArgs {
    fn default() -> Self {
        Self {
            item_width: Px(240),
            column_gap: Px(16),
            bottom_gap: BottomGap::default(),
            sandbox_container: "cascade-sandbox".to_string(),
            error_image: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dynamic_gap_resolves_per_call() {
        use std::sync::atomic::{AtomicI32, Ordering};

        let calls = Arc::new(AtomicI32::new(0));
        let gap = BottomGap::Dynamic(Arc::new({
            let calls = calls.clone();
            move || Px(calls.fetch_add(1, Ordering::Relaxed) * 10)
        }));
        assert_eq!(gap.resolve(), Px(0));
        assert_eq!(gap.resolve(), Px(10));
        assert_eq!(calls.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn fluent_setters() {
        let args = WaterfallArgs::default()
            .item_width(Px(100))
            .column_gap(Px(10))
            .bottom_gap(Px(4));
        assert_eq!(args.item_width, Px(100));
        assert_eq!(args.column_gap, Px(10));
        assert_eq!(args.bottom_gap.resolve(), Px(4));
    }
}

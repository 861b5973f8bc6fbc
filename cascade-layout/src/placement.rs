//! Placement records published for every laid-out item.

use crate::{hash::RenderHash, px::Px};

/// Column/row coordinates of an item inside the grid, both counted from 0.
///
/// Also the position context handed to renderers, so an item can render
/// differently depending on where it sits.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellPosition {
    /// Column index the item is assigned to.
    pub column: usize,
    /// Position of the item within its column's ordered list.
    pub row: usize,
}

impl CellPosition {
    /// Dummy position handed to renderers while measuring, before the real
    /// cell is known.
    pub const MEASURE: Self = Self { column: 0, row: 0 };
}

/// Where one item ended up after a layout pass.
///
/// Replaced wholesale on every re-layout; only [`Placement::hash`] survives
/// from the previous record, so the presentation layer can keep the rendered
/// node instead of treating the item as new.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    /// Stable rendering-identity key.
    pub hash: RenderHash,
    /// Fixed item width the layout was computed for.
    pub width: Px,
    /// Horizontal offset of the item's left edge.
    pub left: Px,
    /// Vertical offset of the item's top edge.
    pub top: Px,
    /// Measured rendered height.
    pub height: Px,
    /// Column and row the item was assigned to.
    pub position: CellPosition,
}

impl Placement {
    /// CSS positioning fragment for presentation layers that consume style
    /// strings directly.
    ///
    /// # Examples
    ///
    /// ```
    /// use cascade_layout::{CellPosition, Placement, Px, RenderHash};
    ///
    /// let placement = Placement {
    ///     hash: RenderHash(1),
    ///     width: Px(240),
    ///     left: Px(256),
    ///     top: Px(80),
    ///     height: Px(120),
    ///     position: CellPosition { column: 1, row: 0 },
    /// };
    /// assert_eq!(placement.style(), "width:240px;left:256px;top:80px");
    /// ```
    pub fn style(&self) -> String {
        format!(
            "width:{}px;left:{}px;top:{}px",
            self.width.raw(),
            self.left.raw(),
            self.top.raw()
        )
    }
}

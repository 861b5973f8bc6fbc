//! Column assignment: picks the shortest column and positions one item.

use std::sync::Arc;

use tracing::trace;

use crate::{
    hash::RenderHash,
    placement::{CellPosition, Placement},
    px::Px,
};

/// Per-column running state plus the ordered item lists.
///
/// `tops[i]` is the next available top of column `i`: the bottom edge of the
/// last item placed there plus the bottom gap, or zero for an empty column.
pub(crate) struct ColumnBoard<T> {
    tops: Vec<Px>,
    items: Vec<Vec<Arc<T>>>,
}

impl<T> ColumnBoard<T> {
    /// Creates a board with the given fixed column count, clamped to at
    /// least one column.
    pub(crate) fn new(columns: usize) -> Self {
        let columns = columns.max(1);
        Self {
            tops: vec![Px::ZERO; columns],
            items: (0..columns).map(|_| Vec::new()).collect(),
        }
    }

    /// Zeroes every column top and forgets the item lists, keeping capacity.
    pub(crate) fn reset(&mut self) {
        self.tops.fill(Px::ZERO);
        for column in &mut self.items {
            column.clear();
        }
    }

    pub(crate) fn column_count(&self) -> usize {
        self.tops.len()
    }

    pub(crate) fn tops(&self) -> &[Px] {
        &self.tops
    }

    pub(crate) fn column(&self, index: usize) -> &[Arc<T>] {
        self.items.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Maximum bottom edge across columns, published as the wrapper height.
    pub(crate) fn wrapper_height(&self) -> Px {
        self.tops.iter().copied().max().unwrap_or(Px::ZERO)
    }

    /// First-occurrence argmin over column tops; ties break left-to-right.
    fn shortest_column(&self) -> usize {
        let mut index = 0;
        let mut best = self.tops.first().copied().unwrap_or(Px::ZERO);
        for (candidate, top) in self.tops.iter().enumerate().skip(1) {
            if *top < best {
                best = *top;
                index = candidate;
            }
        }
        index
    }

    /// Places `item` into the currently shortest column, advances that
    /// column by `height + bottom_gap`, and returns the placement to store.
    pub(crate) fn place(
        &mut self,
        item: &Arc<T>,
        height: Px,
        width: Px,
        gap: Px,
        bottom_gap: Px,
        hash: RenderHash,
    ) -> Placement {
        let column = self.shortest_column();
        let top = self.tops[column];
        let left = (width + gap) * column as i32;
        self.tops[column] = top.saturating_add(height).saturating_add(bottom_gap);

        let list = &mut self.items[column];
        list.push(item.clone());
        let position = CellPosition {
            column,
            row: list.len() - 1,
        };

        trace!(
            column,
            row = position.row,
            top = top.raw(),
            left = left.raw(),
            height = height.raw(),
            "placed item"
        );

        Placement {
            hash,
            width,
            left,
            top,
            height,
            position,
        }
    }
}

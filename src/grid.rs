// A crafting table is always drawn as a 3x3 grid. Recipes are authored with
// only the rows and columns they use, so they are padded (and clamped) here
// before rendering.

use serde::{Deserialize, Serialize};

use crate::catalog::{Item, ItemId};

pub const GRID_SIZE: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub display_name: String,
    pub localized_display_name: String,
    pub image_ref: String,
}

impl From<Item> for Cell {
    fn from(item: Item) -> Self {
        Self {
            display_name: item.display_name,
            localized_display_name: item.localized_display_name,
            image_ref: item.image_ref,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedGrid {
    pub cells: [[Option<Cell>; GRID_SIZE]; GRID_SIZE],
}

impl NormalizedGrid {
    /// Places each in-bounds cell of `shape` at the same position, resolving ids
    /// through `resolve`. Rows or columns past the third are dropped.
    pub fn from_shape<F>(shape: &[Vec<Option<ItemId>>], mut resolve: F) -> Self
    where
        F: FnMut(ItemId) -> Item,
    {
        let mut grid = Self::default();

        for (row, cells) in shape.iter().take(GRID_SIZE).enumerate() {
            for (col, cell) in cells.iter().take(GRID_SIZE).enumerate() {
                grid.cells[row][col] = cell.map(|id| Cell::from(resolve(id)));
            }
        }

        grid
    }

    #[cfg(test)]
    pub(crate) fn get(&self, row: usize, col: usize) -> Option<&Cell> {
        self.cells.get(row)?.get(col)?.as_ref()
    }

    #[cfg(test)]
    pub(crate) fn filled_cells(&self) -> usize {
        self.cells.iter().flatten().filter(|cell| cell.is_some()).count()
    }
}

/// Returns true when the shape does not fit in the crafting table and was clamped
pub fn is_oversized(shape: &[Vec<Option<ItemId>>]) -> bool {
    shape.len() > GRID_SIZE || shape.iter().any(|row| row.len() > GRID_SIZE)
}

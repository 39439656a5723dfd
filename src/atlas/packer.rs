//! Shelf (row-based) bin packing for the fixed-size atlas.

/// Packs boxes left to right in rows ("shelves").
///
/// The cursor advances along the current row; a box that would overflow the
/// right edge starts a new row below the tallest box of the current one. Once
/// a row would overflow the bottom edge the packer is full and rejects every
/// further request.
pub(super) struct ShelfPacker {
    width: u32,
    height: u32,
    padding: u32,
    pen_x: u32,
    pen_y: u32,
    row_height: u32,
    full: bool,
}

impl ShelfPacker {
    pub(super) fn new(width: u32, height: u32, padding: u32) -> Self {
        Self {
            width,
            height,
            padding,
            pen_x: padding,
            pen_y: padding,
            row_height: 0,
            full: false,
        }
    }

    /// Find space for a `w` x `h` box.
    ///
    /// Returns the top-left position, or `None` when the box can never fit
    /// (wider than the atlas) or the atlas is full.
    pub(super) fn pack(&mut self, w: u32, h: u32) -> Option<(u32, u32)> {
        if self.full || w + 2 * self.padding > self.width {
            return None;
        }

        if self.pen_x + w + self.padding > self.width {
            self.pen_x = self.padding;
            self.pen_y += self.row_height + self.padding;
            self.row_height = 0;
        }

        if self.pen_y + h + self.padding > self.height {
            self.full = true;
            return None;
        }

        let pos = (self.pen_x, self.pen_y);
        self.pen_x += w + self.padding;
        self.row_height = self.row_height.max(h);
        Some(pos)
    }
}

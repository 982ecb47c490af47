/// Single coordinate axis used for board width, height, and positions.
pub type Coord = u8;

/// Count type used for mine counts and total-cell counts.
pub type CellCount = u16;

/// Two-dimensional coordinates `(x, y)`.
pub type Coord2 = (Coord, Coord);

/// Cells on a `width` by `height` board, never overflows since both sides fit in a [`Coord`].
pub const fn area((width, height): Coord2) -> CellCount {
    width as CellCount * height as CellCount
}

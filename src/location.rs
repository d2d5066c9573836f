use ndarray::Ix;

pub(crate) type Coord = usize;

#[derive(Clone, Eq, Hash, Copy, PartialEq, Ord, PartialOrd, Debug)]
/// A cell `(row, col)` on a puzzle grid. The top left corner is `Location(0, 0)`.
pub struct Location(pub Coord, pub Coord);

impl Location {
    pub(crate) fn as_index(&self) -> (Coord, Coord) {
        (self.0, self.1)
    }

    pub(crate) fn right(self) -> Self {
        Self(self.0, self.1 + 1)
    }

    pub(crate) fn below(self) -> Self {
        Self(self.0 + 1, self.1)
    }
}

impl From<(Ix, Ix)> for Location {
    fn from(value: (Ix, Ix)) -> Self {
        Self(value.0, value.1)
    }
}

use std::fmt;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Size2D {
    pub rows: usize,
    pub columns: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Location2D {
    pub row: usize,
    pub column: usize,
}

impl Location2D {
    pub const fn new(row: usize, column: usize) -> Self {
        Location2D { row, column }
    }
}

impl fmt::Display for Location2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.column)
    }
}

impl Size2D {
    pub const fn new(rows: usize, columns: usize) -> Self {
        Size2D { rows, columns }
    }

    pub fn area(self) -> usize {
        self.rows * self.columns
    }

    pub fn contains(self, location: Location2D) -> bool {
        location.row < self.rows && location.column < self.columns
    }

    pub fn including(self, location: Location2D) -> Self {
        Size2D {
            rows: self.rows.max(location.row + 1),
            columns: self.columns.max(location.column + 1),
        }
    }

    // Scans growing squares from the top-left corner: for each ring `i`,
    // column `i` (rows `0..i`) first, then row `i` (columns `0..=i`).
    // On a 3x3 grid:
    //   0 1 4
    //   2 3 5
    //   6 7 8
    pub fn find_first_location<F>(self, mut predicate: F) -> Option<Location2D>
    where
        F: FnMut(Location2D) -> bool,
    {
        let rings = self.rows.max(self.columns);
        for i in 0..rings {
            for row in 0..i {
                let location = Location2D::new(row, i);
                if self.contains(location) && predicate(location) {
                    return Some(location);
                }
            }
            for column in 0..=i {
                let location = Location2D::new(i, column);
                if self.contains(location) && predicate(location) {
                    return Some(location);
                }
            }
        }
        None
    }
}

//! FILENAME: core/pivot-table/src/grid.rs
//! PURPOSE: A rectangular grid of possibly joined cells with rules between
//! them, the form in which renderers receive a laid-out pivot table.
//! CONTEXT: Coordinates are (x, y) with x the column. Axis `H` runs across
//! columns and axis `V` down rows. Spans are half-open: a cell covers
//! columns `d[H][0]..d[H][1]` and rows `d[V][0]..d[V][1]`.

use crate::look::{Area, AreaStyle, Border, BorderStyle, Look, AREA_COUNT, BORDER_COUNT};
use crate::value::Value;
use once_cell::sync::Lazy;

pub const H: usize = 0;
pub const V: usize = 1;

static EMPTY_VALUE: Lazy<Value> = Lazy::new(|| Value::text(""));

#[derive(Debug, Clone)]
struct CellContent {
    d: [[usize; 2]; 2],
    area: Area,
    value: Option<Value>,
}

/// One (possibly joined) cell, as seen from any position it covers.
#[derive(Debug, Clone, Copy)]
pub struct GridCell<'a> {
    pub d: [[usize; 2]; 2],
    pub area: Area,
    /// Empty text for cells that were never filled or were filled without a
    /// value.
    pub value: &'a Value,
}

impl<'a> GridCell<'a> {
    /// True at the cell's top-left position.
    pub fn is_anchor(&self, x: usize, y: usize) -> bool {
        self.d[H][0] == x && self.d[V][0] == y
    }

    pub fn colspan(&self) -> usize {
        self.d[H][1] - self.d[H][0]
    }

    pub fn rowspan(&self) -> usize {
        self.d[V][1] - self.d[V][0]
    }

    pub fn is_joined(&self) -> bool {
        self.colspan() > 1 || self.rowspan() > 1
    }
}

#[derive(Debug, Clone)]
pub struct TableGrid {
    /// Columns (`n[H]`) and rows (`n[V]`).
    pub n: [usize; 2],
    /// Header columns or rows at the start (`[axis][0]`) and end
    /// (`[axis][1]`) of each axis.
    pub h: [[usize; 2]; 2],
    pub styles: [AreaStyle; AREA_COUNT],
    pub borders: [BorderStyle; BORDER_COUNT],
    positions: Vec<Option<usize>>,
    contents: Vec<CellContent>,
    /// Horizontal rules: `(n[V] + 1) * n[H]`, indexed `x + n[H] * y`.
    rh: Vec<Option<Border>>,
    /// Vertical rules: `n[V] * (n[H] + 1)`, indexed `x + (n[H] + 1) * y`.
    rv: Vec<Option<Border>>,
}

impl TableGrid {
    /// An empty `nc` by `nr` grid styled by `look`, with no rules drawn.
    pub fn new(nc: usize, nr: usize, look: &Look) -> Self {
        TableGrid {
            n: [nc, nr],
            h: [[0, 0], [0, 0]],
            styles: look.areas.clone(),
            borders: [BorderStyle::default(); BORDER_COUNT],
            positions: vec![None; nc * nr],
            contents: Vec::new(),
            rh: vec![None; (nr + 1) * nc],
            rv: vec![None; nr * (nc + 1)],
        }
    }

    pub fn with_headers(mut self, h: [[usize; 2]; 2]) -> Self {
        self.h = h;
        self
    }

    /// Fills the cells from (x1, y1) through (x2, y2) inclusive with one
    /// joined cell.
    pub fn put(&mut self, x1: usize, y1: usize, x2: usize, y2: usize, area: Area, value: Option<Value>) {
        assert!(
            x1 <= x2 && x2 < self.n[H] && y1 <= y2 && y2 < self.n[V],
            "cell ({}, {})-({}, {}) is outside a {}x{} grid",
            x1,
            y1,
            x2,
            y2,
            self.n[H],
            self.n[V]
        );
        let index = self.contents.len();
        self.contents.push(CellContent {
            d: [[x1, x2 + 1], [y1, y2 + 1]],
            area,
            value,
        });
        for y in y1..=y2 {
            for x in x1..=x2 {
                self.positions[x + self.n[H] * y] = Some(index);
            }
        }
    }

    /// The cell covering (x, y). Positions never filled are single empty
    /// cells in the corner area.
    pub fn get_cell(&self, x: usize, y: usize) -> GridCell<'_> {
        match self.positions[x + self.n[H] * y] {
            Some(index) => {
                let content = &self.contents[index];
                GridCell {
                    d: content.d,
                    area: content.area,
                    value: content.value.as_ref().unwrap_or(&*EMPTY_VALUE),
                }
            }
            None => GridCell {
                d: [[x, x + 1], [y, y + 1]],
                area: Area::Corner,
                value: &*EMPTY_VALUE,
            },
        }
    }

    /// The anchors of every cell in row-major order, each visited once.
    pub fn anchors(&self) -> impl Iterator<Item = (usize, usize, GridCell<'_>)> + '_ {
        (0..self.n[V]).flat_map(move |y| {
            (0..self.n[H]).filter_map(move |x| {
                let cell = self.get_cell(x, y);
                cell.is_anchor(x, y).then_some((x, y, cell))
            })
        })
    }

    /// The area style of `cell` with its value's overrides applied.
    pub fn cell_style(&self, cell: &GridCell) -> AreaStyle {
        cell.value.style(&self.styles[cell.area.index()])
    }

    /// True if `cell` lies in a header row or column.
    pub fn is_header(&self, cell: &GridCell) -> bool {
        cell.d[H][0] < self.h[H][0]
            || cell.d[H][0] >= self.n[H] - self.h[H][1]
            || cell.d[V][0] < self.h[V][0]
            || cell.d[V][0] >= self.n[V] - self.h[V][1]
    }

    // ------------------------------------------------------------------------
    // Rules
    // ------------------------------------------------------------------------

    /// Draws `border` along the top of row `y` (the bottom of the grid when
    /// `y == n[V]`) from column `x1` through `x2`.
    pub fn hline(&mut self, border: Border, x1: usize, x2: usize, y: usize) {
        assert!(
            x1 <= x2 && x2 < self.n[H] && y <= self.n[V],
            "horizontal rule {}..={} at {} is outside a {}x{} grid",
            x1,
            x2,
            y,
            self.n[H],
            self.n[V]
        );
        for x in x1..=x2 {
            self.rh[x + self.n[H] * y] = Some(border);
        }
    }

    /// Draws `border` along the left of column `x` (the right edge of the
    /// grid when `x == n[H]`) from row `y1` through `y2`.
    pub fn vline(&mut self, border: Border, x: usize, y1: usize, y2: usize) {
        assert!(
            y1 <= y2 && y2 < self.n[V] && x <= self.n[H],
            "vertical rule {}..={} at {} is outside a {}x{} grid",
            y1,
            y2,
            x,
            self.n[H],
            self.n[V]
        );
        for y in y1..=y2 {
            self.rv[x + (self.n[H] + 1) * y] = Some(border);
        }
    }

    /// The border drawn above cell (x, y), if any.
    pub fn hrule(&self, x: usize, y: usize) -> Option<Border> {
        self.rh[x + self.n[H] * y]
    }

    /// The border drawn left of cell (x, y), if any.
    pub fn vrule(&self, x: usize, y: usize) -> Option<Border> {
        self.rv[x + (self.n[H] + 1) * y]
    }

    /// The resolved style of a rule. With `axis == V` this is the horizontal
    /// rule above (x, y); with `axis == H` the vertical rule left of it.
    pub fn get_rule(&self, axis: usize, x: usize, y: usize) -> Option<BorderStyle> {
        let border = if axis == V {
            self.hrule(x, y)
        } else {
            self.vrule(x, y)
        };
        border.map(|b| self.borders[b.index()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::look::Stroke;

    #[test]
    fn test_joined_cells() {
        let look = Look::builtin_default();
        let mut grid = TableGrid::new(3, 2, &look);
        grid.put(0, 0, 1, 1, Area::RowLabels, Some(Value::text("big")));
        grid.put(2, 1, 2, 1, Area::Data, None);

        let cell = grid.get_cell(1, 1);
        assert_eq!(cell.d, [[0, 2], [0, 2]]);
        assert!(cell.is_joined());
        assert!(!cell.is_anchor(1, 1));
        assert_eq!(cell.value, &Value::text("big"));

        assert_eq!(grid.get_cell(2, 1).value, &Value::text(""));
        assert_eq!(grid.get_cell(2, 0).area, Area::Corner);

        let anchors: Vec<_> = grid.anchors().map(|(x, y, _)| (x, y)).collect();
        assert_eq!(anchors, vec![(0, 0), (2, 0), (2, 1)]);
    }

    #[test]
    fn test_rules_overwrite_and_resolve() {
        let look = Look::builtin_default();
        let mut grid = TableGrid::new(2, 2, &look);
        for border in Border::ALL {
            grid.borders[border.index()] = look.resolve_border(border, false);
        }
        grid.hline(Border::InnerTop, 0, 1, 0);
        grid.hline(Border::DataTop, 1, 1, 0);
        grid.vline(Border::InnerRight, 2, 0, 1);

        assert_eq!(grid.hrule(0, 0), Some(Border::InnerTop));
        assert_eq!(grid.hrule(1, 0), Some(Border::DataTop));
        assert_eq!(grid.hrule(0, 2), None);
        assert_eq!(grid.get_rule(H, 2, 1).map(|s| s.stroke), Some(Stroke::Thick));
        assert_eq!(grid.get_rule(H, 1, 1), None);
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn test_rule_out_of_bounds() {
        let mut grid = TableGrid::new(2, 2, &Look::builtin_default());
        grid.hline(Border::InnerTop, 0, 2, 0);
    }

    #[test]
    fn test_header_detection() {
        let mut grid = TableGrid::new(3, 3, &Look::builtin_default()).with_headers([[1, 0], [1, 0]]);
        grid.put(1, 1, 1, 1, Area::Data, None);
        assert!(grid.is_header(&grid.get_cell(0, 2)));
        assert!(grid.is_header(&grid.get_cell(2, 0)));
        assert!(!grid.is_header(&grid.get_cell(1, 1)));
    }
}

//! FILENAME: core/pivot-table/src/output.rs
//! PURPOSE: Lays out one layer of a pivot table as grids: title, layers,
//! body, caption and footnotes.
//! CONTEXT: The body has a stub of row headings on the left and column
//! headings on top, with the data cells to the lower right. Heading cells
//! join across the positions their category covers, and rules separate
//! dimensions and categories as the look prescribes.

use crate::dimension::{Axis, CategoryId, Dimension, DimensionDepth};
use crate::grid::{TableGrid, H, V};
use crate::look::{Area, Border};
use crate::table::PivotTable;
use crate::value::Value;

/// The grids that render one layer of a table. Absent parts are empty or
/// hidden.
#[derive(Debug, Clone)]
pub struct PivotOutput {
    pub title: Option<TableGrid>,
    pub layers: Option<TableGrid>,
    pub body: TableGrid,
    pub caption: Option<TableGrid>,
    pub footnotes: Option<TableGrid>,
    /// Indexes of the footnotes listed in `footnotes`, in order.
    pub footnote_indexes: Vec<usize>,
}

/// Heading parameters for one axis of the body.
struct HeadingSpec {
    axis: Axis,
    /// Grid axis along which the headings run.
    h: usize,
    dim_horz: Border,
    dim_vert: Border,
    cat_horz: Border,
    cat_vert: Border,
    area: Area,
}

impl PivotTable {
    /// Label depths of every dimension, indexed by top index.
    fn label_depths(&self) -> Vec<DimensionDepth> {
        let row_labels_in_corner = self.look.row_labels_in_corner && self.corner_text.is_none();
        self.dimensions()
            .iter()
            .map(|d| d.label_depths(d.axis == Axis::Row && row_labels_in_corner))
            .collect()
    }

    /// Heading depth of each axis. A row label shown in the corner needs at
    /// least one column heading row to sit in.
    fn axis_label_depths(&self, depths: &[DimensionDepth]) -> [usize; 3] {
        let mut axis_depths = [0; 3];
        for axis in Axis::ALL {
            axis_depths[axis.index()] = self
                .axis_dimensions(axis)
                .map(|d| depths[d.top_index].label_depth)
                .sum();
        }
        let row_label_in_corner = self
            .axis_dimensions(Axis::Row)
            .any(|d| depths[d.top_index].root().show_label_in_corner);
        if row_label_in_corner && axis_depths[Axis::Column.index()] == 0 {
            axis_depths[Axis::Column.index()] = 1;
        }
        axis_depths
    }

    /// Lays out the layer selected by `layer_indexes`. When `printing`,
    /// missing rules become dashed grid lines if the table shows them.
    pub fn output(&self, layer_indexes: &[usize], printing: bool) -> PivotOutput {
        let look = &self.look;
        let depths = self.label_depths();
        let axis_depths = self.axis_label_depths(&depths);

        let columns = self.enumerate_axis(Axis::Column, layer_indexes, look.omit_empty);
        let rows = self.enumerate_axis(Axis::Row, layer_indexes, look.omit_empty);
        let data = [columns.len(), rows.len()];
        let stub = [
            axis_depths[Axis::Row.index()],
            axis_depths[Axis::Column.index()],
        ];

        let mut body = TableGrid::new(data[H] + stub[H], data[V] + stub[V], look)
            .with_headers([[stub[H], 0], [stub[V], 0]]);
        for border in Border::ALL {
            body.borders[border.index()] =
                look.resolve_border(border, printing && self.show_grid_lines);
        }

        let column_spec = HeadingSpec {
            axis: Axis::Column,
            h: H,
            dim_horz: Border::DimColHorz,
            dim_vert: Border::DimColVert,
            cat_horz: Border::CatColHorz,
            cat_vert: Border::CatColVert,
            area: Area::ColumnLabels,
        };
        self.compose_headings(&mut body, &column_spec, &depths, &axis_depths, &columns);

        let row_spec = HeadingSpec {
            axis: Axis::Row,
            h: V,
            dim_horz: Border::DimRowVert,
            dim_vert: Border::DimRowHorz,
            cat_horz: Border::CatRowVert,
            cat_vert: Border::CatRowHorz,
            area: Area::RowLabels,
        };
        self.compose_headings(&mut body, &row_spec, &depths, &axis_depths, &rows);

        for (y, row) in rows.iter().enumerate() {
            for (x, column) in columns.iter().enumerate() {
                let dindexes = self.convert_indexes_ptod([layer_indexes, row, column]);
                let value = self.get(&dindexes).cloned();
                let (x, y) = (x + stub[H], y + stub[V]);
                body.put(x, y, x, y, Area::Data, value);
            }
        }

        if (self.corner_text.is_some() || !look.row_labels_in_corner) && stub[H] > 0 && stub[V] > 0 {
            body.put(0, 0, stub[H] - 1, stub[V] - 1, Area::Corner, self.corner_text.clone());
        }

        if body.n[H] > 0 && body.n[V] > 0 {
            let (nc, nr) = (body.n[H], body.n[V]);
            body.hline(Border::InnerTop, 0, nc - 1, 0);
            body.hline(Border::InnerBottom, 0, nc - 1, nr);
            body.vline(Border::InnerLeft, 0, 0, nr - 1);
            body.vline(Border::InnerRight, nc, 0, nr - 1);
            if stub[V] > 0 {
                body.hline(Border::DataTop, 0, nc - 1, stub[V]);
            }
            if stub[H] > 0 {
                body.vline(Border::DataLeft, stub[H], 0, nr - 1);
            }
        }

        let title = match &self.title {
            Some(title) if self.show_title => Some(self.aux_grid(Area::Title, vec![title.clone()])),
            _ => None,
        };
        let caption = match &self.caption {
            Some(caption) if self.show_caption => {
                Some(self.aux_grid(Area::Caption, vec![caption.clone()]))
            }
            _ => None,
        };
        let layers = self.layers_grid(layer_indexes);

        let footnote_indexes =
            self.collect_footnotes([title.as_ref(), layers.as_ref(), Some(&body), caption.as_ref()]);
        let footnotes = if footnote_indexes.is_empty() {
            None
        } else {
            let ctx = self.format_context();
            let lines = footnote_indexes
                .iter()
                .map(|&idx| {
                    let footnote = &self.footnotes()[idx];
                    Value::user_text(format!(
                        "{}. {}",
                        footnote.marker_text(&ctx),
                        footnote.content_text(&ctx)
                    ))
                })
                .collect();
            Some(self.aux_grid(Area::Footer, lines))
        };

        PivotOutput {
            title,
            layers,
            body,
            caption,
            footnotes,
            footnote_indexes,
        }
    }

    /// A one-column grid with one row per value, without rules.
    fn aux_grid(&self, area: Area, values: Vec<Value>) -> TableGrid {
        let mut grid = TableGrid::new(1, values.len(), &self.look);
        for (y, value) in values.into_iter().enumerate() {
            grid.put(0, y, 0, y, area, Some(value));
        }
        grid
    }

    /// One row per nonempty layer dimension, outermost first.
    fn layers_grid(&self, layer_indexes: &[usize]) -> Option<TableGrid> {
        let ctx = self.format_context();
        let mut names: Vec<Value> = self
            .axis_dimensions(Axis::Layer)
            .enumerate()
            .filter(|(_, d)| d.n_leaves() > 0)
            .map(|(i, d)| {
                let p = layer_indexes.get(i).copied().unwrap_or(0).min(d.n_leaves() - 1);
                let leaf = d.data_leaf(d.data_index_at(p));
                Value::user_text(leaf.name.to_string_with(&ctx))
            })
            .collect();
        if names.is_empty() {
            return None;
        }
        names.reverse();
        Some(self.aux_grid(Area::Layers, names))
    }

    /// Footnotes referenced from any cell anchor and marked to be shown, in
    /// index order.
    fn collect_footnotes(&self, grids: [Option<&TableGrid>; 4]) -> Vec<usize> {
        let footnotes = self.footnotes();
        let mut referenced = vec![false; footnotes.len()];
        for grid in grids.into_iter().flatten() {
            for (_, _, cell) in grid.anchors() {
                for &idx in cell.value.footnote_indexes() {
                    if footnotes.get(idx).is_some_and(|f| f.show) {
                        referenced[idx] = true;
                    }
                }
            }
        }
        referenced
            .iter()
            .enumerate()
            .filter_map(|(idx, &r)| r.then_some(idx))
            .collect()
    }

    /// Fills the headings of `spec.axis` into `grid`. Terms follow column
    /// headings: `h` runs across the data and `v` down through the heading
    /// rows; for row headings the two are exchanged.
    fn compose_headings(
        &self,
        grid: &mut TableGrid,
        spec: &HeadingSpec,
        depths: &[DimensionDepth],
        axis_depths: &[usize; 3],
        enumeration: &[Vec<usize>],
    ) {
        let h = spec.h;
        let v = 1 - h;
        let v_size = axis_depths[spec.axis.index()];
        let other_axis = if spec.axis == Axis::Column { Axis::Row } else { Axis::Column };
        let h_ofs = axis_depths[other_axis.index()];
        let dims: Vec<&Dimension> = self.axis_dimensions(spec.axis).collect();
        let n_columns = enumeration.len();
        if dims.is_empty() || n_columns == 0 || v_size == 0 {
            return;
        }

        // vrules[x] is set once a rule has started at position x; it then
        // continues to the bottom of the heading.
        let mut vrules = vec![false; n_columns + 1];
        vrules[0] = true;
        vrules[n_columns] = true;

        let mut top_row = 0;
        for dim_index in (0..dims.len()).rev() {
            let d = dims[dim_index];
            let depth = &depths[d.top_index];
            if d.hide_all_labels {
                continue;
            }

            for row_ofs in 0..depth.label_depth {
                let target = depth.label_depth - row_ofs - 1;
                let mut x1 = 0;
                while x1 < n_columns {
                    let Some(c) = find_category(d, depth, enumeration[x1][dim_index], target) else {
                        x1 += 1;
                        continue;
                    };

                    let mut x2 = x1 + 1;
                    while x2 < n_columns
                        && !vrules[x2]
                        && find_category(d, depth, enumeration[x2][dim_index], target) == Some(c)
                    {
                        x2 += 1;
                    }

                    let y1 = top_row + row_ofs;
                    let y2 = y1 + depth.categories[c].extra_depth + 1;
                    let category = d.category(c);
                    if category.is_leaf() || category.show_label {
                        let mut bb = [[0; 2]; 2];
                        bb[h] = [x1 + h_ofs, x2 + h_ofs - 1];
                        bb[v] = [y1, y2 - 1];
                        grid.put(
                            bb[H][0],
                            bb[V][0],
                            bb[H][1],
                            bb[V][1],
                            spec.area,
                            Some(category.name.clone()),
                        );

                        // Only rules that start in the last heading row use the
                        // category style.
                        let style = if y1 == v_size - 1 { spec.cat_vert } else { spec.dim_vert };
                        let end = grid.n[v] - 1;
                        for x in [x2, x1] {
                            if !vrules[x] {
                                draw_line(grid, style, v, x + h_ofs, y1, end);
                                vrules[x] = true;
                            }
                        }
                    }

                    if let Some(parent) = category.parent {
                        if d.category(parent).show_label {
                            draw_line(grid, spec.cat_horz, h, y1, x1 + h_ofs, x2 + h_ofs - 1);
                        }
                    }
                    x1 = x2;
                }
            }

            if depth.root().show_label_in_corner && h_ofs > 0 {
                let mut bb = [[0; 2]; 2];
                bb[h] = [0, h_ofs - 1];
                bb[v] = [top_row, top_row + depth.label_depth - 1];
                grid.put(
                    bb[H][0],
                    bb[V][0],
                    bb[H][1],
                    bb[V][1],
                    Area::Corner,
                    Some(d.name().clone()),
                );
            }

            if dim_index != dims.len() - 1 {
                let end = grid.n[h] - 1;
                draw_line(grid, spec.dim_horz, h, top_row, h_ofs, end);
            }
            top_row += depth.label_depth;
        }
    }
}

/// Draws a rule perpendicular to `axis` at position `a`, from `b0` through
/// `b1` along `axis`.
fn draw_line(grid: &mut TableGrid, border: Border, axis: usize, a: usize, b0: usize, b1: usize) {
    if axis == H {
        grid.hline(border, b0, b1, a);
    } else {
        grid.vline(border, a, b0, b1);
    }
}

/// The category labeling heading row `row_ofs` (counted up from the leaf) of
/// the leaf at presentation index `index`, if that row is where the
/// category's label starts.
fn find_category(
    d: &Dimension,
    depth: &DimensionDepth,
    index: usize,
    row_ofs: usize,
) -> Option<CategoryId> {
    let mut row_ofs = row_ofs as isize;
    let mut current = Some(d.presentation_leaf_id(index));
    while let Some(id) = current {
        let extra = depth.categories[id].extra_depth as isize;
        if row_ofs == extra {
            return Some(id);
        }
        row_ofs -= 1 + extra;
        if row_ofs < 0 {
            return None;
        }
        current = d.category(id).parent;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::look::{Look, Stroke};
    use std::sync::Arc;

    fn text_at(grid: &TableGrid, x: usize, y: usize) -> String {
        grid.get_cell(x, y).value.to_string_with(&crate::value::FormatContext::standalone())
    }

    #[test]
    fn test_single_cell_layout() {
        let mut table = PivotTable::new(Value::text("Default Title"));
        table.create_dimension_with_leaves(Axis::Row, "A", &["x"]);
        table.create_dimension_with_leaves(Axis::Column, "B", &["y"]);
        table.put(&[0, 0], Value::number(3.14));

        let out = table.output(&[], true);
        assert_eq!(out.body.n, [2, 2]);
        assert_eq!(out.body.h, [[1, 0], [1, 0]]);
        assert_eq!(text_at(&out.body, 0, 0), "");
        assert_eq!(text_at(&out.body, 1, 0), "y");
        assert_eq!(text_at(&out.body, 0, 1), "x");
        assert_eq!(out.body.get_cell(1, 1).area, Area::Data);
        assert_eq!(text_at(&out.body, 1, 1), "3.14");

        let title = out.title.unwrap();
        assert_eq!(text_at(&title, 0, 0), "Default Title");
        assert!(out.caption.is_none());
        assert!(out.layers.is_none());
        assert!(out.footnotes.is_none());

        assert_eq!(out.body.hrule(0, 0), Some(Border::InnerTop));
        assert_eq!(out.body.hrule(0, 1), Some(Border::DataTop));
        assert_eq!(out.body.vrule(1, 0), Some(Border::DataLeft));
        assert_eq!(out.body.vrule(2, 1), Some(Border::InnerRight));
    }

    #[test]
    fn test_group_label_spans_its_leaves() {
        let mut table = PivotTable::new(Value::text("T"));
        let d = table.create_dimension(Axis::Row, Value::text("A"));
        let g = table.dimension_mut(d).create_group(Dimension::ROOT, Value::text("G"));
        table.dimension_mut(d).create_leaf(g, Value::text("u"));
        table.dimension_mut(d).create_leaf(g, Value::text("v"));

        let out = table.output(&[], false);
        // Two stub columns (G, then the leaves), one data column, two rows.
        assert_eq!(out.body.n, [3, 2]);
        let group = out.body.get_cell(0, 1);
        assert_eq!(group.d, [[0, 1], [0, 2]]);
        assert_eq!(text_at(&out.body, 0, 0), "G");
        assert_eq!(text_at(&out.body, 1, 0), "u");
        assert_eq!(text_at(&out.body, 1, 1), "v");
        assert_eq!(out.body.get_cell(1, 0).area, Area::RowLabels);
    }

    #[test]
    fn test_nested_column_headings_repeat_outer_labels() {
        let mut table = PivotTable::new(Value::text("T"));
        table.create_dimension_with_leaves(Axis::Column, "Inner", &["i1", "i2"]);
        table.create_dimension_with_leaves(Axis::Column, "Outer", &["o1", "o2"]);
        table.create_dimension_with_leaves(Axis::Row, "R", &["r"]);

        let out = table.output(&[], false);
        assert_eq!(out.body.n, [5, 3]);
        let outer = out.body.get_cell(1, 0);
        assert_eq!(outer.d, [[1, 3], [0, 1]]);
        assert_eq!(text_at(&out.body, 1, 0), "o1");
        assert_eq!(text_at(&out.body, 3, 0), "o2");
        assert_eq!(text_at(&out.body, 2, 1), "i2");
        assert_eq!(text_at(&out.body, 3, 1), "i1");
        // The rule between o1 and o2 runs down through the inner headings.
        assert_eq!(out.body.vrule(3, 0), Some(Border::DimColVert));
        assert_eq!(out.body.vrule(3, 1), Some(Border::DimColVert));
        assert_eq!(out.body.vrule(2, 1), Some(Border::CatColVert));
        assert_eq!(out.body.hrule(1, 1), Some(Border::DimColHorz));
    }

    #[test]
    fn test_root_label_in_corner_and_nested() {
        let mut table = PivotTable::new(Value::text("T"));
        let r = table.create_dimension_with_leaves(Axis::Row, "Rows", &["a", "b"]);
        table.dimension_mut(r).root_mut().show_label = true;

        // No column dimensions: the corner label forces one heading row.
        let out = table.output(&[], false);
        assert_eq!(out.body.n, [2, 3]);
        assert_eq!(text_at(&out.body, 0, 0), "Rows");
        assert_eq!(out.body.get_cell(0, 0).area, Area::Corner);

        // Nested labels take a stub column of their own instead.
        let mut look = Look::builtin_default();
        look.row_labels_in_corner = false;
        table.look = Arc::new(look);
        let out = table.output(&[], false);
        assert_eq!(out.body.n, [3, 2]);
        assert_eq!(out.body.get_cell(0, 0).d, [[0, 1], [0, 2]]);
        assert_eq!(text_at(&out.body, 0, 1), "Rows");
    }

    #[test]
    fn test_footnotes_collected_once() {
        let mut table = PivotTable::new(Value::text("T"));
        table.create_dimension_with_leaves(Axis::Row, "A", &["x", "y"]);
        let a = table.create_footnote(Value::text("First note"));
        let b = table.create_footnote(Value::text("Second note"));
        let hidden = table.create_footnote(Value::text("Hidden"));
        table.footnote_mut(hidden).unwrap().show = false;

        table.put(&[0], Value::number(1.0).with_footnote(a).with_footnote(b));
        table.put(&[1], Value::number(2.0).with_footnote(a).with_footnote(hidden));

        let out = table.output(&[], false);
        assert_eq!(out.footnote_indexes, vec![a, b]);
        let footnotes = out.footnotes.unwrap();
        assert_eq!(footnotes.n, [1, 2]);
        assert_eq!(text_at(&footnotes, 0, 0), "a. First note");
        assert_eq!(text_at(&footnotes, 0, 1), "b. Second note");
    }

    #[test]
    fn test_layers_listed_outermost_first() {
        let mut table = PivotTable::new(Value::text("T"));
        table.create_dimension_with_leaves(Axis::Layer, "Inner", &["i1", "i2"]);
        table.create_dimension_with_leaves(Axis::Layer, "Outer", &["o1"]);
        table.create_dimension_with_leaves(Axis::Row, "R", &["r"]);

        let out = table.output(&[1, 0], false);
        let layers = out.layers.unwrap();
        assert_eq!(layers.n, [1, 2]);
        assert_eq!(text_at(&layers, 0, 0), "o1");
        assert_eq!(text_at(&layers, 0, 1), "i2");
    }

    #[test]
    fn test_grid_lines_only_when_printing() {
        let mut table = PivotTable::new(Value::text("T"));
        table.create_dimension_with_leaves(Axis::Row, "A", &["x"]);
        table.show_grid_lines = true;

        let screen = table.output(&[], false);
        assert_eq!(screen.body.borders[Border::CatRowHorz.index()].stroke, Stroke::None);
        let printed = table.output(&[], true);
        assert_eq!(printed.body.borders[Border::CatRowHorz.index()].stroke, Stroke::Dashed);
    }

    #[test]
    fn test_hidden_title_and_caption() {
        let mut table = PivotTable::new(Value::text("T")).with_caption(Value::text("C"));
        table.create_dimension_with_leaves(Axis::Row, "A", &["x"]);
        assert!(table.output(&[], false).caption.is_some());
        table.show_title = false;
        table.show_caption = false;
        let out = table.output(&[], false);
        assert!(out.title.is_none());
        assert!(out.caption.is_none());
    }
}

//! FILENAME: core/pivot-table/src/table.rs
//! PURPOSE: The pivot table: dimensions on three axes, sparse cell storage,
//! footnotes, and the table-level display settings.
//! CONTEXT: Procedures build a table, then hand it to the output engine,
//! which shares it behind an `Arc`. A shared table is read-only;
//! `PivotTable::unshare` clones it when a writer needs it back.
//!
//! Architecture:
//! - Dimensions are stored in creation order (their `top_index`). Each axis
//!   lists the dimensions it holds, innermost first.
//! - Cells are keyed by data indexes in creation order, so moving a dimension
//!   between axes never touches cell storage.

use crate::dimension::{Axis, CategoryId, Dimension, ResultClass};
use crate::footnote::Footnote;
use crate::look::Look;
use crate::settings::{settings, ValueShow};
use crate::value::{FormatContext, Value, ValueInner};
use dictionary::{Format, FormatType};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::sync::Arc;

/// Data indexes of one cell, one per dimension in creation order.
pub type CellIndex = SmallVec<[usize; 4]>;

#[derive(Debug, Clone)]
pub struct PivotTable {
    pub look: Arc<Look>,

    pub show_grid_lines: bool,
    pub show_title: bool,
    pub show_caption: bool,
    /// Table-level policy, consulted when a value has none of its own.
    pub show_values: ValueShow,
    pub show_variables: ValueShow,

    /// Format for leaves of `ResultClass::Count`.
    pub weight_format: Format,
    /// Nonzero magnitudes below this render in E notation.
    pub small: f64,

    /// Presentation index shown for each layer dimension, innermost first.
    pub current_layer: Vec<usize>,

    pub title: Option<Value>,
    pub subtype: Option<Value>,
    pub corner_text: Option<Value>,
    pub caption: Option<Value>,
    pub notes: Option<String>,
    pub command_name: Option<String>,

    dimensions: Vec<Dimension>,
    /// Per axis (indexed by `Axis::index`), top indexes innermost first.
    axes: [Vec<usize>; 3],
    footnotes: Vec<Footnote>,
    cells: FxHashMap<CellIndex, Value>,
}

impl PivotTable {
    /// An empty table with the process default look.
    pub fn new(title: Value) -> Self {
        let s = settings();
        PivotTable {
            look: Look::shared_default(),
            show_grid_lines: false,
            show_title: true,
            show_caption: true,
            show_values: ValueShow::Default,
            show_variables: ValueShow::Default,
            weight_format: Format::new(FormatType::F, 40, 0),
            small: s.small,
            current_layer: Vec::new(),
            title: Some(title),
            subtype: None,
            corner_text: None,
            caption: None,
            notes: None,
            command_name: None,
            dimensions: Vec::new(),
            axes: [Vec::new(), Vec::new(), Vec::new()],
            footnotes: Vec::new(),
            cells: FxHashMap::default(),
        }
    }

    pub fn with_caption(mut self, caption: Value) -> Self {
        self.caption = Some(caption);
        self
    }

    pub fn with_corner_text(mut self, corner_text: Value) -> Self {
        self.corner_text = Some(corner_text);
        self
    }

    pub fn with_look(mut self, look: Arc<Look>) -> Self {
        self.look = look;
        self
    }

    /// Write access to a table that may be shared, cloning it first if
    /// anyone else holds it.
    pub fn unshare(table: &mut Arc<PivotTable>) -> &mut PivotTable {
        Arc::make_mut(table)
    }

    pub fn is_shared(table: &Arc<PivotTable>) -> bool {
        Arc::strong_count(table) > 1
    }

    /// Write access to this table's look, copying it if other tables share it.
    pub fn look_mut(&mut self) -> &mut Look {
        Arc::make_mut(&mut self.look)
    }

    pub fn title_text(&self) -> String {
        self.title
            .as_ref()
            .map(|title| title.body_string(&self.format_context()))
            .unwrap_or_default()
    }

    /// The context for rendering this table's values.
    pub fn format_context(&self) -> FormatContext<'_> {
        let s = settings();
        FormatContext {
            show_values: self.show_values,
            show_variables: self.show_variables,
            global_show_values: s.show_values,
            global_show_variables: s.show_variables,
            default_format: s.default_format,
            small: self.small,
            include_leading_zero: s.include_leading_zero,
            footnotes: &self.footnotes,
            show_numeric_markers: self.look.show_numeric_markers,
        }
    }

    // ========================================================================
    // DIMENSIONS
    // ========================================================================

    /// Adds a dimension as the outermost on `axis` and returns its index.
    /// Panics if the table already has cells.
    pub fn create_dimension(&mut self, axis: Axis, name: Value) -> usize {
        assert!(
            self.cells.is_empty(),
            "dimensions must be created before any cell is written"
        );
        let top_index = self.dimensions.len();
        let level = self.axes[axis.index()].len();
        self.dimensions
            .push(Dimension::new(name, axis, level, top_index));
        self.axes[axis.index()].push(top_index);
        if axis == Axis::Layer {
            self.current_layer = vec![0; self.axes[Axis::Layer.index()].len()];
        }
        top_index
    }

    /// Adds a dimension with one leaf per name under its root.
    pub fn create_dimension_with_leaves(&mut self, axis: Axis, name: &str, leaves: &[&str]) -> usize {
        let d = self.create_dimension(axis, Value::text(name));
        for leaf in leaves {
            self.dimensions[d].create_leaf(Dimension::ROOT, Value::text(*leaf));
        }
        d
    }

    /// Adds a leaf whose numbers take the format of `class`.
    pub fn create_leaf_rc(
        &mut self,
        dimension: usize,
        parent: CategoryId,
        name: Value,
        class: ResultClass,
    ) -> usize {
        let (format, honor_small) = match class {
            ResultClass::Count => (self.weight_format, false),
            ResultClass::Other => (settings().default_format, true),
            _ => match class.fixed_format() {
                Some(format) => (format, false),
                None => (settings().default_format, true),
            },
        };
        self.dimensions[dimension].create_leaf_with_format(parent, name, Some(format), honor_small)
    }

    pub fn n_dimensions(&self) -> usize {
        self.dimensions.len()
    }

    pub fn dimension(&self, index: usize) -> &Dimension {
        &self.dimensions[index]
    }

    pub fn dimension_mut(&mut self, index: usize) -> &mut Dimension {
        &mut self.dimensions[index]
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    /// The dimensions on `axis`, innermost first.
    pub fn axis_dimensions(&self, axis: Axis) -> impl Iterator<Item = &Dimension> + '_ {
        self.axes[axis.index()]
            .iter()
            .map(move |&d| &self.dimensions[d])
    }

    pub fn axis_len(&self, axis: Axis) -> usize {
        self.axes[axis.index()].len()
    }

    /// Number of leaf combinations on `axis`: 1 with no dimensions, 0 if any
    /// dimension has no leaves.
    pub fn axis_extent(&self, axis: Axis) -> usize {
        self.axis_dimensions(axis).map(Dimension::n_leaves).product()
    }

    // ========================================================================
    // AXIS MANIPULATION
    // ========================================================================

    fn update_axes(&mut self) {
        for axis in Axis::ALL {
            for (level, &d) in self.axes[axis.index()].iter().enumerate() {
                let dim = &mut self.dimensions[d];
                dim.axis = axis;
                dim.level = level;
            }
        }
    }

    /// Exchanges the dimensions of two axes. Involving the layer axis resets
    /// the current layer.
    pub fn swap_axes(&mut self, a: Axis, b: Axis) {
        if a == b {
            return;
        }
        self.axes.swap(a.index(), b.index());
        self.update_axes();
        if a == Axis::Layer || b == Axis::Layer {
            self.current_layer = vec![0; self.axes[Axis::Layer.index()].len()];
        }
    }

    pub fn transpose(&mut self) {
        self.swap_axes(Axis::Row, Axis::Column);
    }

    /// Moves dimension `index` to position `pos` (clamped) on `axis`.
    pub fn move_dimension(&mut self, index: usize, axis: Axis, pos: usize) {
        let old_axis = self.dimensions[index].axis;
        let old_level = self.dimensions[index].level;

        self.axes[old_axis.index()].remove(old_level);
        let pos = pos.min(self.axes[axis.index()].len());
        if old_axis == axis && pos == old_level {
            self.axes[axis.index()].insert(pos, index);
            return;
        }

        if old_axis == Axis::Layer {
            let current = self.current_layer.remove(old_level);
            if axis == Axis::Layer {
                self.current_layer.insert(pos, current);
            }
        } else if axis == Axis::Layer {
            self.current_layer.insert(pos, 0);
        }

        self.axes[axis.index()].insert(pos, index);
        self.update_axes();
    }

    // ========================================================================
    // CELLS
    // ========================================================================

    fn cell_index(&self, dindexes: &[usize]) -> CellIndex {
        assert_eq!(
            dindexes.len(),
            self.dimensions.len(),
            "cell index has {} coordinates but the table has {} dimensions",
            dindexes.len(),
            self.dimensions.len()
        );
        for (d, &index) in self.dimensions.iter().zip(dindexes) {
            assert!(
                index < d.n_leaves(),
                "index {} is out of range for a dimension with {} leaves",
                index,
                d.n_leaves()
            );
        }
        CellIndex::from_slice(dindexes)
    }

    /// Stores `value` at `dindexes`, replacing any previous value. A number
    /// without a format takes the format of the first leaf along its
    /// coordinates that has one, else the process default format.
    pub fn put(&mut self, dindexes: &[usize], mut value: Value) {
        let key = self.cell_index(dindexes);
        if let ValueInner::Number(n) = &mut value.inner {
            if n.format.is_none() {
                let leaf_format = self
                    .dimensions
                    .iter()
                    .zip(dindexes)
                    .filter_map(|(d, &i)| d.data_leaf(i).leaf.as_ref())
                    .find_map(|leaf| leaf.format.map(|f| (f, leaf.honor_small)));
                let (format, honor_small) =
                    leaf_format.unwrap_or_else(|| (settings().default_format, true));
                n.format = Some(format);
                n.honor_small = honor_small;
            }
        }
        self.cells.insert(key, value);
    }

    pub fn get(&self, dindexes: &[usize]) -> Option<&Value> {
        self.cells.get(dindexes)
    }

    /// The cell at `dindexes`, created as empty text if absent.
    pub fn get_rw(&mut self, dindexes: &[usize]) -> &mut Value {
        let key = self.cell_index(dindexes);
        self.cells
            .entry(key)
            .or_insert_with(|| Value::user_text(""))
    }

    /// Removes the cell at `dindexes`. Returns whether there was one.
    pub fn delete(&mut self, dindexes: &[usize]) -> bool {
        self.cells.remove(dindexes).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn n_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn cells(&self) -> impl Iterator<Item = (&CellIndex, &Value)> {
        self.cells.iter()
    }

    /// Converts presentation indexes per axis (innermost first) to data
    /// indexes in creation order.
    pub fn convert_indexes_ptod(&self, pindexes: [&[usize]; 3]) -> CellIndex {
        let mut dindexes: CellIndex = SmallVec::from_elem(0, self.dimensions.len());
        for axis in Axis::ALL {
            for (level, &d) in self.axes[axis.index()].iter().enumerate() {
                if let Some(&p) = pindexes[axis.index()].get(level) {
                    dindexes[d] = self.dimensions[d].data_index_at(p);
                }
            }
        }
        dindexes
    }

    // ========================================================================
    // ENUMERATION
    // ========================================================================

    /// Every combination of presentation indexes on `axis`, innermost
    /// dimension varying fastest.
    pub fn axis_positions(&self, axis: Axis) -> Vec<Vec<usize>> {
        let sizes: Vec<usize> = self.axis_dimensions(axis).map(Dimension::n_leaves).collect();
        if sizes.iter().any(|&n| n == 0) {
            return Vec::new();
        }

        let mut positions = Vec::new();
        let mut current = vec![0; sizes.len()];
        loop {
            positions.push(current.clone());
            let mut i = 0;
            loop {
                if i == sizes.len() {
                    return positions;
                }
                current[i] += 1;
                if current[i] < sizes[i] {
                    break;
                }
                current[i] = 0;
                i += 1;
            }
        }
    }

    /// The positions on `axis` (row or column) to display for the layer
    /// `layer_indexes`. With `omit_empty`, positions whose cells are all empty
    /// across the other axis are dropped, unless that would drop them all.
    pub fn enumerate_axis(&self, axis: Axis, layer_indexes: &[usize], omit_empty: bool) -> Vec<Vec<usize>> {
        let positions = self.axis_positions(axis);
        if !omit_empty || axis == Axis::Layer {
            return positions;
        }

        let other_axis = if axis == Axis::Row { Axis::Column } else { Axis::Row };
        let others = self.axis_positions(other_axis);
        let kept: Vec<Vec<usize>> = positions
            .iter()
            .filter(|position| {
                others.iter().any(|other| {
                    let mut pindexes: [&[usize]; 3] = [layer_indexes, &[], &[]];
                    pindexes[axis.index()] = position.as_slice();
                    pindexes[other_axis.index()] = other.as_slice();
                    self.get(&self.convert_indexes_ptod(pindexes)).is_some()
                })
            })
            .cloned()
            .collect();

        if kept.is_empty() {
            positions
        } else {
            kept
        }
    }

    /// The layers to render: every layer when printing with a look that
    /// prints all layers, otherwise just the current layer.
    pub fn layers(&self, printing: bool) -> Vec<Vec<usize>> {
        if printing && self.look.print_all_layers {
            self.axis_positions(Axis::Layer)
        } else {
            vec![self.current_layer.clone()]
        }
    }

    // ========================================================================
    // FOOTNOTES
    // ========================================================================

    /// Appends a footnote and returns its index.
    pub fn create_footnote(&mut self, content: Value) -> usize {
        self.create_footnote_at(self.footnotes.len(), None, Some(content))
    }

    /// Sets the marker and content of footnote `idx`, creating it and any
    /// missing lower-numbered footnotes first.
    pub fn create_footnote_at(
        &mut self,
        idx: usize,
        marker: Option<Value>,
        content: Option<Value>,
    ) -> usize {
        while self.footnotes.len() <= idx {
            let next = self.footnotes.len();
            self.footnotes.push(Footnote::new(next));
        }
        let footnote = &mut self.footnotes[idx];
        if marker.is_some() {
            footnote.marker = marker;
        }
        if content.is_some() {
            footnote.content = content;
        }
        idx
    }

    pub fn footnotes(&self) -> &[Footnote] {
        &self.footnotes
    }

    pub fn footnote_mut(&mut self, idx: usize) -> Option<&mut Footnote> {
        self.footnotes.get_mut(idx)
    }
}

//! FILENAME: core/pivot-table/src/dimension.rs
//! PURPOSE: Dimensions and the category trees that label them.
//! CONTEXT: Each dimension owns an arena of categories. Index 0 is the root
//! group. Parents are plain arena indices, so the tree has no reference
//! cycles and clones deeply with the table.
//!
//! Architecture:
//! - Leaves carry a data index into cell storage. Leaves are appended in
//!   tree order, so the data order and the presentation order coincide.
//! - Label depths are computed on demand into a `DimensionDepth` so that a
//!   shared table can be laid out without mutation.

use crate::value::{Value, ValueInner};
use dictionary::{Format, FormatType};
use serde::{Deserialize, Serialize};

pub type CategoryId = usize;

// ============================================================================
// AXES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    Layer,
    Row,
    Column,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::Layer, Axis::Row, Axis::Column];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Axis::Layer => "layer",
            Axis::Row => "row",
            Axis::Column => "column",
        }
    }
}

// ============================================================================
// RESULT CLASSES
// ============================================================================

/// The kind of statistic a leaf labels, which picks the format of numbers in
/// that leaf's cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResultClass {
    Integer,
    Percent,
    Correlation,
    Significance,
    Residual,
    /// Counts use the table's weight format.
    Count,
    /// Uses the process default format and honors small numbers.
    Other,
}

impl ResultClass {
    /// The fixed format of this class, if it has one.
    pub fn fixed_format(self) -> Option<Format> {
        match self {
            ResultClass::Integer => Some(Format::new(FormatType::F, 40, 0)),
            ResultClass::Percent => Some(Format::new(FormatType::Pct, 40, 1)),
            ResultClass::Correlation | ResultClass::Significance => {
                Some(Format::new(FormatType::F, 40, 3))
            }
            ResultClass::Residual => Some(Format::new(FormatType::F, 40, 2)),
            ResultClass::Count | ResultClass::Other => None,
        }
    }
}

// ============================================================================
// CATEGORIES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leaf {
    pub data_index: usize,
    pub presentation_index: usize,
    /// Format for numbers stored under this leaf that have none.
    pub format: Option<Format>,
    pub honor_small: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub name: Value,
    pub parent: Option<CategoryId>,
    /// Children in order. Always empty for leaves.
    pub children: Vec<CategoryId>,
    /// Present for leaves, absent for groups.
    pub leaf: Option<Leaf>,
    /// Groups only: draw a heading for the group itself.
    pub show_label: bool,
}

impl Category {
    pub fn is_leaf(&self) -> bool {
        self.leaf.is_some()
    }

    pub fn is_group(&self) -> bool {
        self.leaf.is_none()
    }
}

/// Heading layout of one category, computed by `Dimension::label_depths`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CategoryDepth {
    /// Heading rows (or columns) taken by this category and its descendants.
    pub label_depth: usize,
    /// Extra rows a leaf (or empty group) spans to fill out its level.
    pub extra_depth: usize,
    pub show_label_in_corner: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DimensionDepth {
    pub label_depth: usize,
    pub categories: Vec<CategoryDepth>,
}

impl DimensionDepth {
    pub fn root(&self) -> CategoryDepth {
        self.categories.first().copied().unwrap_or_default()
    }
}

// ============================================================================
// DIMENSION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    pub axis: Axis,
    /// Position within the axis, 0 being innermost.
    pub level: usize,
    /// Position among all of the table's dimensions, in creation order.
    pub top_index: usize,
    categories: Vec<Category>,
    data_leaves: Vec<CategoryId>,
    presentation_leaves: Vec<CategoryId>,
    /// Suppress every heading of this dimension.
    pub hide_all_labels: bool,
}

impl Dimension {
    pub const ROOT: CategoryId = 0;

    pub(crate) fn new(name: Value, axis: Axis, level: usize, top_index: usize) -> Self {
        Dimension {
            axis,
            level,
            top_index,
            categories: vec![Category {
                name,
                parent: None,
                children: Vec::new(),
                leaf: None,
                show_label: false,
            }],
            data_leaves: Vec::new(),
            presentation_leaves: Vec::new(),
            hide_all_labels: false,
        }
    }

    pub fn root(&self) -> &Category {
        &self.categories[Self::ROOT]
    }

    pub fn root_mut(&mut self) -> &mut Category {
        &mut self.categories[Self::ROOT]
    }

    pub fn name(&self) -> &Value {
        &self.root().name
    }

    pub fn category(&self, id: CategoryId) -> &Category {
        &self.categories[id]
    }

    pub fn category_mut(&mut self, id: CategoryId) -> &mut Category {
        &mut self.categories[id]
    }

    pub fn n_categories(&self) -> usize {
        self.categories.len()
    }

    pub fn n_leaves(&self) -> usize {
        self.data_leaves.len()
    }

    /// The leaf with data index `data_index`.
    pub fn data_leaf(&self, data_index: usize) -> &Category {
        &self.categories[self.data_leaves[data_index]]
    }

    pub fn data_leaf_id(&self, data_index: usize) -> CategoryId {
        self.data_leaves[data_index]
    }

    pub fn presentation_leaf_id(&self, presentation_index: usize) -> CategoryId {
        self.presentation_leaves[presentation_index]
    }

    /// The data index of the leaf displayed at `presentation_index`.
    pub fn data_index_at(&self, presentation_index: usize) -> usize {
        self.categories[self.presentation_leaves[presentation_index]]
            .leaf
            .as_ref()
            .map(|leaf| leaf.data_index)
            .unwrap_or(presentation_index)
    }

    // ------------------------------------------------------------------------
    // Building the tree
    // ------------------------------------------------------------------------

    fn add_category(&mut self, parent: CategoryId, category: Category) -> CategoryId {
        assert!(
            self.categories[parent].is_group(),
            "parent category {} is a leaf",
            parent
        );
        let id = self.categories.len();
        self.categories.push(category);
        self.categories[parent].children.push(id);
        id
    }

    /// Adds a group under `parent`. Groups show their label by default.
    pub fn create_group(&mut self, parent: CategoryId, name: Value) -> CategoryId {
        self.add_category(
            parent,
            Category {
                name,
                parent: Some(parent),
                children: Vec::new(),
                leaf: None,
                show_label: true,
            },
        )
    }

    /// Adds a leaf under `parent` and returns its data index.
    pub fn create_leaf(&mut self, parent: CategoryId, name: Value) -> usize {
        self.create_leaf_with_format(parent, name, None, false)
    }

    /// Adds a leaf whose cells default to `format`. A numeric leaf name
    /// without a format takes it as well.
    pub fn create_leaf_with_format(
        &mut self,
        parent: CategoryId,
        mut name: Value,
        format: Option<Format>,
        honor_small: bool,
    ) -> usize {
        if let (Some(format), ValueInner::Number(n)) = (format, &mut name.inner) {
            if n.format.is_none() {
                n.format = Some(format);
            }
        }

        let index = self.data_leaves.len();
        let id = self.add_category(
            parent,
            Category {
                name,
                parent: Some(parent),
                children: Vec::new(),
                leaf: Some(Leaf {
                    data_index: index,
                    presentation_index: index,
                    format,
                    honor_small,
                }),
                show_label: false,
            },
        );
        self.data_leaves.push(id);
        self.presentation_leaves.push(id);
        assert!(
            self.next_leaf(id).is_none(),
            "leaves must be added in order; a later leaf already exists"
        );
        index
    }

    /// The first leaf at or below `id` in tree order.
    pub fn first_leaf(&self, id: CategoryId) -> Option<CategoryId> {
        let category = &self.categories[id];
        if category.is_leaf() {
            return Some(id);
        }
        category.children.iter().find_map(|&child| self.first_leaf(child))
    }

    /// The leaf after `id` in tree order.
    pub fn next_leaf(&self, mut id: CategoryId) -> Option<CategoryId> {
        while let Some(parent) = self.categories[id].parent {
            let siblings = &self.categories[parent].children;
            let position = siblings.iter().position(|&c| c == id)?;
            if let Some(next) = siblings[position + 1..]
                .iter()
                .find_map(|&sibling| self.first_leaf(sibling))
            {
                return Some(next);
            }
            id = parent;
        }
        None
    }

    // ------------------------------------------------------------------------
    // Label depth
    // ------------------------------------------------------------------------

    /// Computes how many heading rows each category takes. With
    /// `labels_in_corner`, the root's label goes in the table's corner rather
    /// than in a heading row of its own.
    pub fn label_depths(&self, labels_in_corner: bool) -> DimensionDepth {
        let mut categories = vec![CategoryDepth::default(); self.categories.len()];
        self.assign_label_depth(Self::ROOT, labels_in_corner, &mut categories);
        let label_depth = if self.hide_all_labels {
            0
        } else {
            categories[Self::ROOT].label_depth
        };
        DimensionDepth {
            label_depth,
            categories,
        }
    }

    fn assign_label_depth(&self, id: CategoryId, in_corner: bool, depths: &mut [CategoryDepth]) {
        depths[id].extra_depth = 0;
        let category = &self.categories[id];
        if category.is_leaf() {
            depths[id].label_depth = 1;
            return;
        }

        let mut depth = 0;
        for &child in &category.children {
            self.assign_label_depth(child, false, depths);
            depth = depth.max(depths[child].label_depth);
        }
        for &child in &category.children {
            let extra = depth - depths[child].label_depth;
            if extra > 0 {
                self.distribute_extra_depth(child, extra, depths);
            }
            depths[child].label_depth = depth;
        }

        let show_in_corner = category.show_label && in_corner;
        depths[id].show_label_in_corner = show_in_corner;
        depths[id].label_depth = if category.show_label && !show_in_corner {
            depth + 1
        } else {
            depth
        };
    }

    fn distribute_extra_depth(&self, id: CategoryId, extra: usize, depths: &mut [CategoryDepth]) {
        let category = &self.categories[id];
        if category.is_group() && !category.children.is_empty() {
            for &child in &category.children {
                self.distribute_extra_depth(child, extra, depths);
            }
        } else {
            depths[id].extra_depth += extra;
        }
    }
}

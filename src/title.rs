//! Header layout resolution
//!
//! Turns a sheet's tree of title nodes into concrete header cells: each node
//! gets a column, a row and, where it spans more than one cell, a merge
//! range. Leaves sit on the bottom header row so short branches line up with
//! deep ones; groups span their leaves horizontally on a single row.

use crate::export::FieldFormat;
use crate::types::{column_letter, CellRef, HorizontalAlign, MergeRange, VerticalAlign};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::warn;

//==============================================================================
// Title Trees
//==============================================================================

/// Per-field style attributes copied through to the resolved layout
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FieldStyle {
    #[serde(default)]
    pub width: Option<f64>,
    /// Font color, `#RRGGBB`
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub horizontal: Option<HorizontalAlign>,
    #[serde(default)]
    pub vertical: Option<VerticalAlign>,
}

/// One header node; leaves map to a record field, groups only head their children
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TitleNode {
    pub field: String,
    pub name: String,
    #[serde(default)]
    pub children: Vec<TitleNode>,
    #[serde(flatten)]
    pub style: FieldStyle,
    #[serde(skip)]
    pub format: Option<FieldFormat>,
}

impl TitleNode {
    pub fn leaf(field: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn group(
        field: impl Into<String>,
        name: impl Into<String>,
        children: Vec<TitleNode>,
    ) -> Self {
        Self {
            field: field.into(),
            name: name.into(),
            children,
            ..Default::default()
        }
    }

    pub fn width(mut self, width: f64) -> Self {
        self.style.width = Some(width);
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.style.color = Some(color.into());
        self
    }

    pub fn horizontal(mut self, align: HorizontalAlign) -> Self {
        self.style.horizontal = Some(align);
        self
    }

    pub fn vertical(mut self, align: VerticalAlign) -> Self {
        self.style.vertical = Some(align);
        self
    }

    pub fn format(mut self, format: FieldFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn leaf_count(&self) -> u32 {
        if self.is_leaf() {
            1
        } else {
            self.children.iter().map(TitleNode::leaf_count).sum()
        }
    }
}

/// The title forest of one sheet
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SheetTitle {
    /// Caps the header block; branches deeper than the cap are dropped
    #[serde(default)]
    pub header_rows: Option<u32>,
    #[serde(default)]
    pub children: Vec<TitleNode>,
}

impl SheetTitle {
    pub fn new(children: Vec<TitleNode>) -> Self {
        Self {
            header_rows: None,
            children,
        }
    }

    pub fn with_header_rows(mut self, rows: u32) -> Self {
        self.header_rows = Some(rows);
        self
    }
}

/// Header rows needed by a list of sibling nodes: 1 + the deepest group below
pub fn header_height(nodes: &[TitleNode]) -> u32 {
    1 + nodes
        .iter()
        .filter(|n| !n.is_leaf())
        .map(|n| header_height(&n.children))
        .max()
        .unwrap_or(0)
}

//==============================================================================
// Resolved Layout
//==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleKind {
    Leaf,
    Group,
}

#[derive(Debug, Clone)]
pub struct ResolvedTitle {
    pub field: String,
    pub name: String,
    pub kind: TitleKind,
    pub column: u32,
    /// Leaves report the bottom header row, groups their own row
    pub row: u32,
    pub merge: Option<MergeRange>,
    pub style: FieldStyle,
    pub format: Option<FieldFormat>,
}

impl ResolvedTitle {
    fn new(node: &TitleNode, kind: TitleKind, column: u32, row: u32) -> Self {
        Self {
            field: node.field.clone(),
            name: node.name.clone(),
            kind,
            column,
            row,
            merge: None,
            style: node.style.clone(),
            format: node.format.clone(),
        }
    }

    pub fn column_letter(&self) -> String {
        column_letter(self.column)
    }

    /// Top-left cell of the header, where its text is written
    pub fn anchor(&self) -> CellRef {
        self.merge
            .map(|m| m.anchor())
            .unwrap_or_else(|| CellRef::new(self.column, self.row))
    }

    pub fn is_leaf(&self) -> bool {
        self.kind == TitleKind::Leaf
    }
}

/// Header layout of one sheet
#[derive(Debug, Clone, Default)]
pub struct ResolvedTitles {
    entries: Vec<ResolvedTitle>,
    leaves: HashMap<String, usize>,
    header_rows: u32,
    truncated: Vec<String>,
}

impl ResolvedTitles {
    /// Layout of a sheet without titles: no headers, data below one empty row
    pub fn empty() -> Self {
        Self {
            header_rows: 1,
            ..Default::default()
        }
    }

    /// All header cells in pre-order
    pub fn entries(&self) -> &[ResolvedTitle] {
        &self.entries
    }

    /// The leaf entry a record field is written under
    pub fn leaf(&self, field: &str) -> Option<&ResolvedTitle> {
        self.leaves.get(field).map(|&i| &self.entries[i])
    }

    pub fn leaves(&self) -> impl Iterator<Item = &ResolvedTitle> {
        self.entries.iter().filter(|e| e.is_leaf())
    }

    pub fn header_rows(&self) -> u32 {
        self.header_rows
    }

    /// First row below the header block
    pub fn first_data_row(&self) -> u32 {
        self.header_rows + 1
    }

    /// Fields of the group nodes dropped for exceeding the header rows
    pub fn truncated(&self) -> &[String] {
        &self.truncated
    }
}

#[derive(Default)]
struct Placement {
    entries: Vec<ResolvedTitle>,
    columns: u32,
    truncated: Vec<String>,
}

/// Place `nodes` from `column` rightwards, starting at `row`, with `budget`
/// header rows left for this subtree
fn place(nodes: &[TitleNode], column: u32, row: u32, budget: u32) -> Placement {
    let mut placement = Placement::default();

    for node in nodes {
        let cursor = column + placement.columns;

        if node.is_leaf() {
            let bottom = row + budget - 1;
            let mut entry = ResolvedTitle::new(node, TitleKind::Leaf, cursor, bottom);
            if budget > 1 {
                entry.merge = Some(MergeRange::new(cursor, row, cursor, bottom));
            }
            placement.entries.push(entry);
            placement.columns += 1;
            continue;
        }

        if budget <= 1 {
            warn!(
                field = %node.field,
                row,
                "Header group does not fit in the header rows; dropping branch"
            );
            placement.truncated.push(node.field.clone());
            continue;
        }

        let inner = place(&node.children, cursor, row + 1, budget - 1);
        let width = inner.columns.max(1);

        let mut entry = ResolvedTitle::new(node, TitleKind::Group, cursor, row);
        if width > 1 {
            entry.merge = Some(MergeRange::new(cursor, row, cursor + width - 1, row));
        }
        placement.entries.push(entry);
        placement.entries.extend(inner.entries);
        placement.truncated.extend(inner.truncated);
        placement.columns += width;
    }

    placement
}

/// Resolve one sheet's title forest into its header layout
pub fn resolve(sheet: &SheetTitle) -> ResolvedTitles {
    let natural = header_height(&sheet.children);
    let header_rows = match sheet.header_rows {
        Some(cap) => cap.clamp(1, natural),
        None => natural,
    };

    let placement = place(&sheet.children, 1, 1, header_rows);

    let mut leaves = HashMap::new();
    for (index, entry) in placement.entries.iter().enumerate() {
        if entry.is_leaf() && leaves.insert(entry.field.clone(), index).is_some() {
            warn!(field = %entry.field, "Duplicate title field; the rightmost column wins");
        }
    }

    ResolvedTitles {
        entries: placement.entries,
        leaves,
        header_rows,
        truncated: placement.truncated,
    }
}

/// Resolve every sheet's title forest, indexed like the sheets
pub fn resolve_all(sheets: &[SheetTitle]) -> Vec<ResolvedTitles> {
    sheets.iter().map(resolve).collect()
}

//! # Range algebra
//!
//! Pure functions over rectangular cell ranges. A range is two corner
//! coordinates in any order; all functions normalize through
//! [`calculate_range_boundary`] first, and all bounds are inclusive.
//!
//! The selection controller relies on these to keep multi-range selections
//! free of overlaps after a drag: subtraction via
//! [`break_range_to_smaller_part`], exact-area
//! rectangle completion via [`try_make_rectangle`], and the fixed-point
//! merge in [`try_combine_ranges`].

use crate::ids::{create_cell_id, CellCoordinates, CellId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Two corners of a rectangle, unordered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRange {
    pub start: CellCoordinates,
    pub end: CellCoordinates,
}

impl CellRange {
    pub fn new(start: CellCoordinates, end: CellCoordinates) -> Self {
        Self { start, end }
    }

    pub fn single(cell: CellCoordinates) -> Self {
        Self::new(cell, cell)
    }

    /// Build from (row, column) pairs
    pub fn from_bounds(start: (usize, usize), end: (usize, usize)) -> Self {
        Self::new(
            CellCoordinates::new(start.0, start.1),
            CellCoordinates::new(end.0, end.1),
        )
    }

    pub fn boundary(&self) -> RangeBoundary {
        calculate_range_boundary(self)
    }

    pub fn row_count(&self) -> usize {
        let b = self.boundary();
        b.max.row_index - b.min.row_index + 1
    }

    pub fn column_count(&self) -> usize {
        let b = self.boundary();
        b.max.column_index - b.min.column_index + 1
    }

    pub fn area(&self) -> usize {
        self.row_count() * self.column_count()
    }

    pub fn contains(&self, cell: CellCoordinates) -> bool {
        let b = self.boundary();
        (b.min.row_index..=b.max.row_index).contains(&cell.row_index)
            && (b.min.column_index..=b.max.column_index).contains(&cell.column_index)
    }

    /// Every coordinate in the rectangle, row-major
    pub fn coordinates(&self) -> impl Iterator<Item = CellCoordinates> {
        let b = self.boundary();
        (b.min.row_index..=b.max.row_index).flat_map(move |row| {
            (b.min.column_index..=b.max.column_index)
                .map(move |column| CellCoordinates::new(row, column))
        })
    }
}

/// Normalized inclusive bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RangeBoundary {
    pub min: CellCoordinates,
    pub max: CellCoordinates,
}

impl RangeBoundary {
    pub fn to_range(self) -> CellRange {
        CellRange::new(self.min, self.max)
    }
}

/// Side of a cell lying on the outline of its range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

/// Per-cell outline annotation, consumed only by renderers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeCell {
    pub edges: Vec<Edge>,
}

/// A selected rectangle together with its enumerated cells.
///
/// `cells` is always exactly the Cartesian product of the row and column
/// spans of `range`.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedRange {
    pub range: CellRange,
    pub start: CellId,
    pub end: CellId,
    pub cells: HashMap<CellId, RangeCell>,
}

impl SelectedRange {
    pub fn new(range: CellRange) -> Self {
        Self {
            start: create_cell_id(range.start),
            end: create_cell_id(range.end),
            cells: get_cells_in_range(range.start, range.end),
            range,
        }
    }

    pub fn single(cell: CellCoordinates) -> Self {
        Self::new(CellRange::single(cell))
    }

    pub fn boundary(&self) -> RangeBoundary {
        self.range.boundary()
    }

    pub fn contains_id(&self, id: &CellId) -> bool {
        self.cells.contains_key(id)
    }
}

impl From<CellRange> for SelectedRange {
    fn from(range: CellRange) -> Self {
        SelectedRange::new(range)
    }
}

pub fn calculate_range_boundary(range: &CellRange) -> RangeBoundary {
    RangeBoundary {
        min: CellCoordinates::new(
            range.start.row_index.min(range.end.row_index),
            range.start.column_index.min(range.end.column_index),
        ),
        max: CellCoordinates::new(
            range.start.row_index.max(range.end.row_index),
            range.start.column_index.max(range.end.column_index),
        ),
    }
}

/// Enumerate a rectangle, tagging the cells that sit on its outline
pub fn get_cells_in_range(
    start: CellCoordinates,
    end: CellCoordinates,
) -> HashMap<CellId, RangeCell> {
    let b = calculate_range_boundary(&CellRange::new(start, end));
    let mut cells = HashMap::new();

    for row in b.min.row_index..=b.max.row_index {
        for column in b.min.column_index..=b.max.column_index {
            let mut edges = Vec::new();
            if row == b.min.row_index {
                edges.push(Edge::Top);
            }
            if row == b.max.row_index {
                edges.push(Edge::Bottom);
            }
            if column == b.min.column_index {
                edges.push(Edge::Left);
            }
            if column == b.max.column_index {
                edges.push(Edge::Right);
            }
            cells.insert(
                create_cell_id(CellCoordinates::new(row, column)),
                RangeCell { edges },
            );
        }
    }

    cells
}

/// True if the rectangles share at least one cell
pub fn is_range_overlapping(a: &CellRange, b: &CellRange) -> bool {
    let (a, b) = (a.boundary(), b.boundary());
    // Half-open test on [min, max + 1)
    a.min.row_index < b.max.row_index + 1
        && b.min.row_index < a.max.row_index + 1
        && a.min.column_index < b.max.column_index + 1
        && b.min.column_index < a.max.column_index + 1
}

pub fn is_range_equal(a: &CellRange, b: &CellRange) -> bool {
    a.boundary() == b.boundary()
}

/// Indices of the ranges in `others` that fully contain `range`
pub fn is_range_inside_others(range: &CellRange, others: &[CellRange]) -> Vec<usize> {
    let inner = range.boundary();
    others
        .iter()
        .enumerate()
        .filter(|(_, other)| {
            let outer = other.boundary();
            outer.min.row_index <= inner.min.row_index
                && outer.min.column_index <= inner.min.column_index
                && outer.max.row_index >= inner.max.row_index
                && outer.max.column_index >= inner.max.column_index
        })
        .map(|(index, _)| index)
        .collect()
}

/// True if the rectangles touch along an edge with overlapping spans
pub fn is_range_adjacent(a: &CellRange, b: &CellRange) -> bool {
    let (a, b) = (a.boundary(), b.boundary());

    let rows_overlap = a.min.row_index <= b.max.row_index && b.min.row_index <= a.max.row_index;
    let columns_overlap =
        a.min.column_index <= b.max.column_index && b.min.column_index <= a.max.column_index;

    let touch_vertically =
        a.max.row_index + 1 == b.min.row_index || b.max.row_index + 1 == a.min.row_index;
    let touch_horizontally = a.max.column_index + 1 == b.min.column_index
        || b.max.column_index + 1 == a.min.column_index;

    (touch_vertically && columns_overlap) || (touch_horizontally && rows_overlap)
}

/// Bounding rectangle of `ranges`, if they tile it exactly.
///
/// Distinct covered cells are counted against the bounding-box area, so
/// overlapping inputs are never double counted. Fewer than two ranges
/// have nothing to combine and yield `None`.
pub fn try_make_rectangle(ranges: &[CellRange]) -> Option<CellRange> {
    if ranges.len() < 2 {
        return None;
    }

    let mut min = ranges[0].boundary().min;
    let mut max = ranges[0].boundary().max;
    for range in &ranges[1..] {
        let b = range.boundary();
        min.row_index = min.row_index.min(b.min.row_index);
        min.column_index = min.column_index.min(b.min.column_index);
        max.row_index = max.row_index.max(b.max.row_index);
        max.column_index = max.column_index.max(b.max.column_index);
    }
    let bounding = CellRange::new(min, max);

    let covered: HashSet<CellCoordinates> =
        ranges.iter().flat_map(|range| range.coordinates()).collect();

    (covered.len() == bounding.area()).then_some(bounding)
}

/// `range` minus `extrude`, as up to four non-overlapping rectangles.
///
/// Top and bottom bands span the full width of `range`; left and right
/// bands only span the rows shared with `extrude`, so corners are never
/// emitted twice.
pub fn break_range_to_smaller_part(range: &CellRange, extrude: &CellRange) -> Vec<CellRange> {
    if !is_range_overlapping(range, extrude) {
        return vec![*range];
    }

    let r = range.boundary();
    let e = extrude.boundary();

    // Intersection of the two rectangles
    let top = r.min.row_index.max(e.min.row_index);
    let bottom = r.max.row_index.min(e.max.row_index);
    let left = r.min.column_index.max(e.min.column_index);
    let right = r.max.column_index.min(e.max.column_index);

    let mut parts = Vec::with_capacity(4);

    if r.min.row_index < top {
        parts.push(CellRange::from_bounds(
            (r.min.row_index, r.min.column_index),
            (top - 1, r.max.column_index),
        ));
    }
    if bottom < r.max.row_index {
        parts.push(CellRange::from_bounds(
            (bottom + 1, r.min.column_index),
            (r.max.row_index, r.max.column_index),
        ));
    }
    if r.min.column_index < left {
        parts.push(CellRange::from_bounds(
            (top, r.min.column_index),
            (bottom, left - 1),
        ));
    }
    if right < r.max.column_index {
        parts.push(CellRange::from_bounds(
            (top, right + 1),
            (bottom, r.max.column_index),
        ));
    }

    parts
}

/// Merge ranges into larger rectangles until nothing else merges.
///
/// Each pass takes the first remaining range, groups every remaining range
/// adjacent to or overlapping it, and replaces the whole group with its
/// bounding rectangle when the group tiles it exactly. Passes repeat while
/// they reduce the range count, so the loop always terminates.
pub fn try_combine_ranges(ranges: &[CellRange]) -> Vec<CellRange> {
    let mut current = ranges.to_vec();

    loop {
        let next = combine_pass(&current);
        if next.len() == current.len() {
            return next;
        }
        current = next;
    }
}

fn combine_pass(ranges: &[CellRange]) -> Vec<CellRange> {
    let mut remaining: Vec<CellRange> = ranges.to_vec();
    let mut result = Vec::with_capacity(ranges.len());

    while !remaining.is_empty() {
        let first = remaining.remove(0);

        let neighbours: Vec<usize> = remaining
            .iter()
            .enumerate()
            .filter(|(_, other)| {
                is_range_adjacent(&first, other) || is_range_overlapping(&first, other)
            })
            .map(|(index, _)| index)
            .collect();

        if neighbours.is_empty() {
            result.push(first);
            continue;
        }

        let mut group = vec![first];
        group.extend(neighbours.iter().map(|&index| remaining[index]));

        match try_make_rectangle(&group) {
            Some(merged) => {
                for &index in neighbours.iter().rev() {
                    remaining.remove(index);
                }
                result.push(merged);
            }
            None => result.push(first),
        }
    }

    result
}

/// Stable de-duplication by [`is_range_equal`]
pub fn try_remove_duplicates(ranges: &[CellRange]) -> Vec<CellRange> {
    let mut unique: Vec<CellRange> = Vec::with_capacity(ranges.len());
    for range in ranges {
        if !unique.iter().any(|kept| is_range_equal(kept, range)) {
            unique.push(*range);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn r(start: (usize, usize), end: (usize, usize)) -> CellRange {
        CellRange::from_bounds(start, end)
    }

    fn cell_set(ranges: &[CellRange]) -> HashSet<CellCoordinates> {
        ranges.iter().flat_map(|range| range.coordinates()).collect()
    }

    #[test]
    fn test_boundary_normalizes_corners() {
        let b = calculate_range_boundary(&r((4, 1), (2, 3)));
        assert_eq!(b.min, CellCoordinates::new(2, 1));
        assert_eq!(b.max, CellCoordinates::new(4, 3));
    }

    #[test]
    fn test_cells_in_range_edges() {
        let cells = get_cells_in_range(CellCoordinates::new(0, 0), CellCoordinates::new(1, 1));
        assert_eq!(cells.len(), 4);
        assert_eq!(
            cells[&create_cell_id(CellCoordinates::new(0, 0))].edges,
            vec![Edge::Top, Edge::Left]
        );
        assert_eq!(
            cells[&create_cell_id(CellCoordinates::new(1, 1))].edges,
            vec![Edge::Bottom, Edge::Right]
        );

        let single = get_cells_in_range(CellCoordinates::new(5, 5), CellCoordinates::new(5, 5));
        assert_eq!(single.values().next().unwrap().edges.len(), 4);
    }

    #[test]
    fn test_overlap_and_adjacency() {
        assert!(is_range_overlapping(&r((0, 0), (2, 2)), &r((2, 2), (3, 3))));
        assert!(!is_range_overlapping(&r((0, 0), (1, 1)), &r((2, 0), (2, 1))));

        assert!(is_range_adjacent(&r((0, 0), (1, 1)), &r((2, 0), (2, 1))));
        assert!(is_range_adjacent(&r((0, 0), (1, 1)), &r((1, 2), (4, 2))));
        // Diagonal corners do not share an edge
        assert!(!is_range_adjacent(&r((0, 0), (1, 1)), &r((2, 2), (3, 3))));
    }

    #[test]
    fn test_inside_others_returns_containers() {
        let others = [r((0, 0), (5, 5)), r((3, 3), (4, 4)), r((1, 1), (2, 2))];
        assert_eq!(is_range_inside_others(&r((1, 1), (2, 2)), &others), vec![0, 2]);
    }

    #[test]
    fn test_make_rectangle_requires_exact_area() {
        assert_eq!(
            try_make_rectangle(&[r((0, 0), (0, 1)), r((1, 0), (1, 1))]),
            Some(r((0, 0), (1, 1)))
        );
        // L-shape leaves a hole
        assert_eq!(try_make_rectangle(&[r((0, 0), (0, 1)), r((1, 0), (1, 0))]), None);
        // Overlap is not double counted
        assert_eq!(
            try_make_rectangle(&[r((0, 0), (1, 1)), r((1, 0), (2, 1)), r((2, 0), (2, 1))]),
            Some(r((0, 0), (2, 1)))
        );
        assert_eq!(try_make_rectangle(&[r((0, 0), (1, 1))]), None);
        assert_eq!(try_make_rectangle(&[]), None);
    }

    #[test]
    fn test_break_range_center_hole() {
        let parts = break_range_to_smaller_part(&r((0, 0), (4, 4)), &r((2, 2), (2, 2)));
        assert_eq!(parts.len(), 4);
        assert_eq!(
            parts,
            vec![
                r((0, 0), (1, 4)),
                r((3, 0), (4, 4)),
                r((2, 0), (2, 1)),
                r((2, 3), (2, 4)),
            ]
        );
    }

    #[test]
    fn test_break_range_edge_cases() {
        let range = r((0, 0), (2, 2));
        assert_eq!(break_range_to_smaller_part(&range, &r((5, 5), (6, 6))), vec![range]);
        assert!(break_range_to_smaller_part(&range, &r((0, 0), (3, 3))).is_empty());
    }

    #[test]
    fn test_combine_adjacent_below() {
        let combined = try_combine_ranges(&[r((0, 0), (1, 1)), r((2, 0), (2, 1))]);
        assert_eq!(combined, vec![r((0, 0), (2, 1))]);
    }

    #[test]
    fn test_combine_needs_second_pass() {
        // (0,2) only touches the (0,0)-(0,1) block once the first pass built it
        let combined = try_combine_ranges(&[
            r((0, 0), (0, 0)),
            r((0, 2), (0, 2)),
            r((0, 1), (0, 1)),
        ]);
        assert_eq!(combined, vec![r((0, 0), (0, 2))]);
    }

    #[test]
    fn test_combine_three_way_group() {
        let combined = try_combine_ranges(&[
            r((0, 0), (0, 0)),
            r((0, 1), (1, 1)),
            r((1, 0), (1, 0)),
        ]);
        assert_eq!(combined, vec![r((0, 0), (1, 1))]);
    }

    #[test]
    fn test_combine_keeps_disjoint_ranges() {
        let input = [r((0, 0), (0, 0)), r((5, 5), (6, 6))];
        assert_eq!(try_combine_ranges(&input), input.to_vec());
    }

    #[test]
    fn test_remove_duplicates_is_stable() {
        let deduped = try_remove_duplicates(&[
            r((1, 1), (0, 0)),
            r((3, 3), (3, 3)),
            r((0, 0), (1, 1)),
        ]);
        assert_eq!(deduped, vec![r((1, 1), (0, 0)), r((3, 3), (3, 3))]);
    }

    fn arb_range() -> impl Strategy<Value = CellRange> {
        (0usize..8, 0usize..8, 0usize..8, 0usize..8)
            .prop_map(|(a, b, c, d)| r((a, b), (c, d)))
    }

    proptest! {
        #[test]
        fn prop_boundary_is_symmetric(range in arb_range()) {
            let swapped = CellRange::new(range.end, range.start);
            prop_assert_eq!(calculate_range_boundary(&range), calculate_range_boundary(&swapped));
        }

        #[test]
        fn prop_combine_is_idempotent(ranges in prop::collection::vec(arb_range(), 0..6)) {
            let once = try_combine_ranges(&ranges);
            let twice = try_combine_ranges(&once);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_break_range_tiles_difference(range in arb_range(), extrude in arb_range()) {
            let parts = break_range_to_smaller_part(&range, &extrude);

            let expected: HashSet<CellCoordinates> = range
                .coordinates()
                .filter(|cell| !extrude.contains(*cell))
                .collect();
            prop_assert_eq!(cell_set(&parts), expected);

            let total: usize = parts.iter().map(CellRange::area).sum();
            prop_assert_eq!(total, cell_set(&parts).len());
        }
    }
}

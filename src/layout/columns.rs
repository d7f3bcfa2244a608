//! Running column heights for one layout pass.

use ordered_float::NotNan;

/// The per-pass record of how tall each column currently is.
///
/// Starts all-zero, grows monotonically as placements commit, and is
/// dropped with the pass. Only the commit step mutates it.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnHeights {
    heights: Vec<f64>,
}

impl ColumnHeights {
    pub fn new(columns: usize) -> Self {
        Self {
            heights: vec![0.; columns],
        }
    }

    pub fn len(&self) -> usize {
        self.heights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    /// Index of the shortest column, ties to the lowest index.
    pub fn shortest(&self) -> usize {
        self.heights
            .iter()
            .enumerate()
            .min_by_key(|(_, height)| NotNan::new(**height).unwrap())
            .map(|(idx, _)| idx)
            .unwrap_or(0)
    }

    pub fn get(&self, column: usize) -> f64 {
        self.heights[column]
    }

    /// Grows a column after a placement commit.
    pub fn add(&mut self, column: usize, amount: f64) {
        debug_assert!(amount >= 0., "column heights only grow within a pass");
        self.heights[column] += amount;
    }

    /// The container height: the tallest column.
    pub fn max(&self) -> f64 {
        self.heights.iter().copied().fold(0., f64::max)
    }

    pub fn heights(&self) -> &[f64] {
        &self.heights
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortest_prefers_lowest_index_on_ties() {
        let mut columns = ColumnHeights::new(3);
        assert_eq!(columns.shortest(), 0);

        columns.add(0, 100.);
        assert_eq!(columns.shortest(), 1);

        columns.add(1, 100.);
        assert_eq!(columns.shortest(), 2);

        columns.add(2, 100.);
        assert_eq!(columns.shortest(), 0);
    }

    #[test]
    fn max_is_tallest_column() {
        let mut columns = ColumnHeights::new(2);
        columns.add(0, 120.);
        columns.add(1, 300.);
        columns.add(0, 40.);
        assert_eq!(columns.max(), 300.);
    }

    #[test]
    fn empty_pass_has_zero_height() {
        assert_eq!(ColumnHeights::new(4).max(), 0.);
    }
}

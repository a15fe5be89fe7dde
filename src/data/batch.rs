use ndarray::{ArrayView1, ArrayView2, Axis};

use crate::{FactorErr, Result};

pub(crate) const USER_COL: usize = 0;
pub(crate) const ITEM_COL: usize = 1;
pub(crate) const RATING_COL: usize = 2;
pub(crate) const NUM_COLS: usize = 3;

/// Ids live in an `f32` column, which holds every integer below `2^24` exactly.
/// Ids must stay below this bound, so user and item counts can't exceed it.
pub const ID_LIMIT: usize = 1 << 24;

/// A single observed rating.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingRecord {
    pub user: usize,
    pub item: usize,
    pub rating: f32,
}

impl RatingRecord {
    pub fn new(user: usize, item: usize, rating: f32) -> Self {
        Self { user, item, rating }
    }
}

/// Borrowed view over a contiguous run of rating rows (zero-copy).
#[derive(Debug, Clone, Copy)]
pub struct RatingsBatch<'a> {
    rows: ArrayView2<'a, f32>,
}

impl<'a> RatingsBatch<'a> {
    pub(crate) fn new(rows: ArrayView2<'a, f32>) -> Self {
        Self { rows }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.nrows()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.nrows() == 0
    }

    /// The raw `[user, item, rating]` rows of this batch.
    #[inline]
    pub fn rows(&self) -> ArrayView2<'a, f32> {
        self.rows
    }

    /// Returns the user ids of this batch.
    ///
    /// # Returns
    /// An error if any value is not a non-negative integer.
    pub fn user_ids(&self) -> Result<Vec<usize>> {
        self.ids(USER_COL, "user")
    }

    /// Returns the item ids of this batch.
    ///
    /// # Returns
    /// An error if any value is not a non-negative integer.
    pub fn item_ids(&self) -> Result<Vec<usize>> {
        self.ids(ITEM_COL, "item")
    }

    #[inline]
    pub fn ratings(&self) -> ArrayView1<'a, f32> {
        self.rows.index_axis_move(Axis(1), RATING_COL)
    }

    fn ids(&self, col: usize, column: &'static str) -> Result<Vec<usize>> {
        self.rows
            .column(col)
            .iter()
            .map(|&value| to_id(value, column))
            .collect()
    }
}

fn to_id(value: f32, column: &'static str) -> Result<usize> {
    if value.is_finite() && value >= 0. && value.fract() == 0. && value < ID_LIMIT as f32 {
        Ok(value as usize)
    } else {
        Err(FactorErr::InvalidId {
            column,
            value: f64::from(value),
        })
    }
}

/// Converts an id into its column value, refusing ids the column can't hold exactly.
pub(crate) fn from_id(id: usize, column: &'static str) -> Result<f32> {
    if id < ID_LIMIT {
        Ok(id as f32)
    } else {
        Err(FactorErr::InvalidId {
            column,
            value: id as f64,
        })
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    #[test]
    fn columns_are_split() {
        let rows = array![[0., 1., 4.5], [2., 0., 3.0]];
        let batch = RatingsBatch::new(rows.view());

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.user_ids().unwrap(), [0, 2]);
        assert_eq!(batch.item_ids().unwrap(), [1, 0]);
        assert_eq!(batch.ratings().to_vec(), [4.5, 3.0]);
    }

    #[test]
    fn fractional_and_negative_ids_are_rejected() {
        let rows = array![[0.5, 1., 4.5]];
        let batch = RatingsBatch::new(rows.view());
        assert!(matches!(
            batch.user_ids(),
            Err(FactorErr::InvalidId { column: "user", .. })
        ));

        let rows = array![[0., -1., 4.5]];
        let batch = RatingsBatch::new(rows.view());
        assert!(matches!(
            batch.item_ids(),
            Err(FactorErr::InvalidId { column: "item", .. })
        ));

        let rows = array![[f32::NAN, 0., 4.5]];
        let batch = RatingsBatch::new(rows.view());
        assert!(batch.user_ids().is_err());
    }

    #[test]
    fn ids_past_the_exact_float_range_are_rejected() {
        let rows = array![[(ID_LIMIT - 1) as f32, ID_LIMIT as f32, 1.]];
        let batch = RatingsBatch::new(rows.view());

        assert_eq!(batch.user_ids().unwrap(), [ID_LIMIT - 1]);
        assert!(matches!(
            batch.item_ids(),
            Err(FactorErr::InvalidId { column: "item", .. })
        ));

        assert_eq!(from_id(ID_LIMIT - 1, "user").unwrap(), 16_777_215.);
        assert!(matches!(
            from_id(ID_LIMIT + 1, "user"),
            Err(FactorErr::InvalidId {
                column: "user",
                value
            }) if value == 16_777_217.
        ));
    }
}

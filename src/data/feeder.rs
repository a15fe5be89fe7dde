use std::num::NonZeroUsize;

use log::debug;
use ndarray::{Array2, ArrayView2, Axis, s};
use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

use super::batch::{NUM_COLS, RatingRecord, RatingsBatch, from_id};
use crate::{FactorErr, Result};

/// Feeds fixed-size batches of `[user, item, rating]` rows, optionally reshuffled
/// on every `reset_counter`.
///
/// The feeder owns its copy of the ratings, so shuffling never touches the caller's array.
#[derive(Debug, Clone)]
pub struct BatchFeeder {
    ratings: Array2<f32>,
    batch_size: NonZeroUsize,
    cursor: usize,
    shuffle: bool,
    rng: StdRng,
}

impl BatchFeeder {
    pub const DEFAULT_BATCH_SIZE: NonZeroUsize = NonZeroUsize::new(1000).unwrap();

    /// Creates a new `BatchFeeder`, shuffling the ratings once if `shuffle` is set.
    ///
    /// # Arguments
    /// * `ratings` - An `N x 3` array with columns user id, item id and rating.
    /// * `batch_size` - The maximum amount of rows per batch.
    /// * `shuffle` - Whether to permute the rows on every reset.
    ///
    /// # Returns
    /// An error if `ratings` is empty or doesn't have exactly 3 columns.
    pub fn new(ratings: Array2<f32>, batch_size: NonZeroUsize, shuffle: bool) -> Result<Self> {
        Self::with_rng(ratings, batch_size, shuffle, StdRng::from_os_rng())
    }

    /// Same as `new`, but with a seeded random source so shuffles are reproducible.
    pub fn with_seed(
        ratings: Array2<f32>,
        batch_size: NonZeroUsize,
        shuffle: bool,
        seed: u64,
    ) -> Result<Self> {
        Self::with_rng(ratings, batch_size, shuffle, StdRng::seed_from_u64(seed))
    }

    /// Creates a feeder with the default batch size and no shuffling.
    pub fn with_defaults(ratings: Array2<f32>) -> Result<Self> {
        Self::new(ratings, Self::DEFAULT_BATCH_SIZE, false)
    }

    /// Builds the ratings array out of typed records.
    ///
    /// # Returns
    /// `FactorErr::InvalidId` if an id is not below `ID_LIMIT`.
    pub fn from_records(
        records: &[RatingRecord],
        batch_size: NonZeroUsize,
        shuffle: bool,
    ) -> Result<Self> {
        let mut data = Vec::with_capacity(records.len() * NUM_COLS);
        for record in records {
            data.extend([
                from_id(record.user, "user")?,
                from_id(record.item, "item")?,
                record.rating,
            ]);
        }

        let ratings = Array2::from_shape_vec((records.len(), NUM_COLS), data)?;
        Self::new(ratings, batch_size, shuffle)
    }

    fn with_rng(
        ratings: Array2<f32>,
        batch_size: NonZeroUsize,
        shuffle: bool,
        rng: StdRng,
    ) -> Result<Self> {
        let (rows, cols) = ratings.dim();
        if rows == 0 || cols != NUM_COLS {
            return Err(FactorErr::InvalidRatingsShape { rows, cols });
        }

        let mut feeder = Self {
            ratings,
            batch_size,
            cursor: 0,
            shuffle,
            rng,
        };

        feeder.reset_counter(0);
        Ok(feeder)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ratings.nrows()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ratings.nrows() == 0
    }

    #[inline]
    pub fn batch_size(&self) -> usize {
        self.batch_size.get()
    }

    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[inline]
    pub fn shuffles(&self) -> bool {
        self.shuffle
    }

    /// The amount of batches a full pass from cursor 0 yields.
    #[inline]
    pub fn num_batches(&self) -> usize {
        self.len().div_ceil(self.batch_size.get())
    }

    /// The owned ratings in their current (possibly shuffled) order.
    #[inline]
    pub fn ratings(&self) -> ArrayView2<'_, f32> {
        self.ratings.view()
    }

    #[inline]
    pub fn has_next(&self) -> bool {
        self.cursor < self.len()
    }

    /// Rewinds the cursor to `start`, reshuffling the whole array first if enabled.
    ///
    /// A non-zero `start` after a shuffle points into the new order, not the previous one.
    pub fn reset_counter(&mut self, start: usize) {
        self.cursor = start;

        if self.shuffle {
            let mut order: Vec<usize> = (0..self.len()).collect();
            order.shuffle(&mut self.rng);
            self.ratings = self.ratings.select(Axis(0), &order);
        }

        debug!(cursor = start, shuffled = self.shuffle; "feeder reset");
    }

    /// Returns the next batch, or `None` once the ratings are exhausted.
    pub fn next_batch(&mut self) -> Option<RatingsBatch<'_>> {
        let len = self.len();
        if self.cursor >= len {
            return None;
        }

        let low = self.cursor;
        let high = low.saturating_add(self.batch_size.get()).min(len);
        self.cursor = self.cursor.saturating_add(self.batch_size.get());

        Some(RatingsBatch::new(self.ratings.slice(s![low..high, ..])))
    }
}

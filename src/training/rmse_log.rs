use std::collections::BTreeMap;

pub const TRAIN_RMSE: &str = "train_rmse";
pub const TEST_RMSE: &str = "test_rmse";

/// Per-epoch RMSE values keyed by run label.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingLog {
    runs: BTreeMap<&'static str, Vec<f32>>,
}

impl TrainingLog {
    /// Creates an empty log with a `train_rmse` run, and a `test_rmse` one if `with_test` is set.
    pub fn new(with_test: bool) -> Self {
        let mut runs = BTreeMap::new();
        runs.insert(TRAIN_RMSE, Vec::new());

        if with_test {
            runs.insert(TEST_RMSE, Vec::new());
        }

        Self { runs }
    }

    pub(crate) fn push(&mut self, label: &'static str, value: f32) {
        self.runs.entry(label).or_default().push(value);
    }

    pub fn get(&self, label: &str) -> Option<&[f32]> {
        self.runs.get(label).map(Vec::as_slice)
    }

    /// The training RMSE per epoch, empty before the first `fit`.
    pub fn train_rmse(&self) -> &[f32] {
        self.get(TRAIN_RMSE).unwrap_or_default()
    }

    pub fn test_rmse(&self) -> Option<&[f32]> {
        self.get(TEST_RMSE)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &[f32])> {
        self.runs.iter().map(|(&label, values)| (label, values.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.runs.values().all(Vec::is_empty)
    }
}

use log::{debug, info};

use super::{FactorView, ModelParameters, predict_raw};
use crate::{
    FactorErr, Result,
    config::FactorConfig,
    data::BatchFeeder,
    metrics::{clip_ratings, rmse},
    training::{TEST_RMSE, TRAIN_RMSE, TrainOp, TrainingLog, TrainingSession},
};

/// A biased matrix factorization model for explicit ratings.
///
/// `fit` trains from scratch every time and keeps the final parameters for `predict`.
#[derive(Debug, Clone)]
pub struct FactorModel {
    config: FactorConfig,
    params: Option<ModelParameters>,
    log_rmse: TrainingLog,
}

impl FactorModel {
    /// Creates an untrained model.
    ///
    /// # Returns
    /// An error if `config` doesn't validate.
    pub fn new(config: FactorConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            config,
            params: None,
            log_rmse: TrainingLog::default(),
        })
    }

    #[inline]
    pub fn config(&self) -> &FactorConfig {
        &self.config
    }

    /// The parameters of the last successful `fit`, if any.
    #[inline]
    pub fn params(&self) -> Option<&ModelParameters> {
        self.params.as_ref()
    }

    /// The RMSE history of the last successful `fit`.
    #[inline]
    pub fn log_rmse(&self) -> &TrainingLog {
        &self.log_rmse
    }

    /// Installs a parameter snapshot, for instance one trained elsewhere.
    ///
    /// # Returns
    /// An error if its shapes don't agree with this model's configuration.
    pub fn set_params(&mut self, params: ModelParameters) -> Result<()> {
        let FactorConfig {
            num_user,
            num_item,
            num_dim,
            ..
        } = self.config;

        let checks = [
            ("num_user", params.num_user(), num_user),
            ("num_item", params.num_item(), num_item),
            ("num_dim", params.num_dim(), num_dim),
        ];

        for (field, got, expected) in checks {
            if got != expected {
                return Err(FactorErr::SizeMismatch {
                    a: "params",
                    b: field,
                    got,
                    expected,
                });
            }
        }

        self.params = Some(params);
        Ok(())
    }

    /// Trains the model for `num_epoch` epochs, one optimizer step per batch of `train_data`.
    ///
    /// After every epoch the clipped RMSE is measured on `train_data` (and on `test_data` if
    /// given). The parameters and the log are only replaced if every epoch succeeds.
    ///
    /// # Arguments
    /// * `train_data` - The ratings to optimize against.
    /// * `test_data` - Optional held-out ratings, only ever evaluated.
    pub fn fit(
        &mut self,
        train_data: &mut BatchFeeder,
        mut test_data: Option<&mut BatchFeeder>,
    ) -> Result<()> {
        let mut session = TrainingSession::open(&self.config)?;
        session.get_or_create_global_step();
        let mut train_op = TrainOp::new(&session, &self.config)?;
        let mut log = TrainingLog::new(test_data.is_some());

        if let Some(device) = &self.config.device {
            debug!(device = device.as_str(); "device hint ignored, training on the host");
        }

        info!(
            epochs = self.config.num_epoch,
            records = train_data.len(),
            batches = train_data.num_batches();
            "training started"
        );

        for epoch in 0..self.config.num_epoch {
            train_data.reset_counter(0);

            let mut loss = 0.;
            let mut batches = 0usize;
            while let Some(batch) = train_data.next_batch() {
                loss += train_op.run(&mut session, &batch)?.total;
                batches += 1;
            }

            let params = session.params()?;
            let train_rmse = self.evaluate(&params, train_data)?;
            log.push(TRAIN_RMSE, train_rmse);

            let mean_loss = loss / batches.max(1) as f32;
            match test_data.as_deref_mut() {
                Some(test_data) => {
                    let test_rmse = self.evaluate(&params, test_data)?;
                    log.push(TEST_RMSE, test_rmse);
                    info!(
                        epoch = epoch,
                        loss = mean_loss,
                        train_rmse = train_rmse,
                        test_rmse = test_rmse;
                        "epoch finished"
                    );
                }
                None => {
                    info!(epoch = epoch, loss = mean_loss, train_rmse = train_rmse; "epoch finished")
                }
            }
        }

        self.params = Some(session.snapshot()?);
        self.log_rmse = log;
        Ok(())
    }

    /// Predicts every rating of `data` with the trained parameters, clipped to the rating range.
    ///
    /// # Returns
    /// The predictions and the true ratings in feeding order, or `FactorErr::NotTrained` if there
    /// are no parameters yet.
    pub fn predict(&self, data: &mut BatchFeeder) -> Result<(Vec<f32>, Vec<f32>)> {
        let params = self.params.as_ref().ok_or(FactorErr::NotTrained)?;
        self.collect(&params.view(), data)
    }

    fn evaluate(&self, params: &FactorView<'_>, data: &mut BatchFeeder) -> Result<f32> {
        let (pred, truth) = self.collect(params, data)?;
        rmse(&pred, &truth)
    }

    fn collect(
        &self,
        params: &FactorView<'_>,
        data: &mut BatchFeeder,
    ) -> Result<(Vec<f32>, Vec<f32>)> {
        let mut pred = Vec::with_capacity(data.len());
        let mut truth = Vec::with_capacity(data.len());

        data.reset_counter(0);
        while let Some(batch) = data.next_batch() {
            let users = batch.user_ids()?;
            let items = batch.item_ids()?;

            pred.extend(predict_raw(params, &users, &items)?);
            truth.extend(batch.ratings());
        }

        clip_ratings(&mut pred, self.config.rating_min, self.config.rating_max);
        Ok((pred, truth))
    }
}

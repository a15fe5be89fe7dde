use log::trace;

use super::TrainingSession;
use crate::{
    FactorErr, Result,
    config::FactorConfig,
    data::RatingsBatch,
    model::{BatchLoss, loss_and_grad},
    optimization::{Optimizer, build_optimizer},
};

/// One optimization step over a batch: regularized loss, closed-form gradient, optimizer update.
pub struct TrainOp {
    optimizer: Box<dyn Optimizer>,
    grad: Vec<f32>,
    reg: f32,
}

impl TrainOp {
    /// Builds the train op for `session`.
    ///
    /// # Returns
    /// `FactorErr::MissingGlobalStep` if the session has no global step yet.
    pub fn new(session: &TrainingSession, config: &FactorConfig) -> Result<Self> {
        if session.global_step().is_none() {
            return Err(FactorErr::MissingGlobalStep);
        }

        let len = session.layout().len();

        Ok(Self {
            optimizer: build_optimizer(config.optimizer, len, config.learning_rate),
            grad: vec![0.; len],
            reg: config.reg,
        })
    }

    /// Runs a single step on `batch`, updating every parameter tensor and bumping the global step.
    ///
    /// # Returns
    /// The batch's loss, measured before the update.
    pub fn run(&mut self, session: &mut TrainingSession, batch: &RatingsBatch<'_>) -> Result<BatchLoss> {
        let TrainingSession {
            layout,
            params,
            global_step,
        } = session;

        let global_step = global_step.as_mut().ok_or(FactorErr::MissingGlobalStep)?;

        let users = batch.user_ids()?;
        let items = batch.item_ids()?;

        self.grad.fill(0.);
        let loss = {
            let view = layout.view(params)?;
            let mut grad = layout.view_mut(&mut self.grad)?;
            loss_and_grad(&view, &users, &items, batch.ratings(), self.reg, &mut grad)?
        };

        self.optimizer.update_params(&self.grad, params)?;
        global_step.0 += 1;

        trace!(step = global_step.0, loss = loss.total; "train step");
        Ok(loss)
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use ndarray::array;

    use super::*;
    use crate::{
        config::{InitializerConfig, OptimizerConfig},
        data::BatchFeeder,
        model::batch_loss,
    };

    fn config() -> FactorConfig {
        let mut config = FactorConfig::new(InitializerConfig::Const { value: 0.1 }, 3, 2);
        config.num_dim = 2;
        config.learning_rate = 0.01;
        config
    }

    fn feeder() -> BatchFeeder {
        let ratings = array![[0., 0., 5.], [1., 1., 1.], [2., 0., 3.]];
        BatchFeeder::new(ratings, NonZeroUsize::new(3).unwrap(), false).unwrap()
    }

    #[test]
    fn requires_a_global_step() {
        let session = TrainingSession::open(&config()).unwrap();
        assert!(matches!(
            TrainOp::new(&session, &config()),
            Err(FactorErr::MissingGlobalStep)
        ));
    }

    #[test]
    fn steps_reduce_the_loss_and_count() {
        let config = config();
        let mut session = TrainingSession::open(&config).unwrap();
        session.get_or_create_global_step();
        let mut train_op = TrainOp::new(&session, &config).unwrap();
        let mut feeder = feeder();

        let batch = feeder.next_batch().unwrap();
        let first = train_op.run(&mut session, &batch).unwrap();
        for _ in 0..50 {
            train_op.run(&mut session, &batch).unwrap();
        }

        let users = batch.user_ids().unwrap();
        let items = batch.item_ids().unwrap();
        let last = batch_loss(
            &session.params().unwrap(),
            &users,
            &items,
            batch.ratings(),
            config.reg,
        )
        .unwrap();

        assert!(last.total < first.total);
        assert_eq!(session.global_step().unwrap().get(), 51);
    }

    #[test]
    fn untouched_rows_keep_their_value_under_gradient_descent() {
        let mut config = config();
        config.num_user = 4;
        config.optimizer = OptimizerConfig::GradientDescent;

        let mut session = TrainingSession::open(&config).unwrap();
        session.get_or_create_global_step();
        let mut train_op = TrainOp::new(&session, &config).unwrap();
        let mut feeder = feeder();

        train_op
            .run(&mut session, &feeder.next_batch().unwrap())
            .unwrap();

        let params = session.params().unwrap();
        assert_eq!(params.bias_user[3], 0.1);
        assert!(params.embd_user.row(3).iter().all(|&x| x == 0.1));
        assert_ne!(params.bias_user[0], 0.1);
    }

    #[test]
    fn out_of_range_ids_fail_the_step() {
        let mut config = config();
        config.num_user = 2;

        let mut session = TrainingSession::open(&config).unwrap();
        session.get_or_create_global_step();
        let mut train_op = TrainOp::new(&session, &config).unwrap();
        let mut feeder = feeder();

        let err = train_op.run(&mut session, &feeder.next_batch().unwrap());
        assert!(matches!(
            err,
            Err(FactorErr::IdOutOfRange {
                kind: "user",
                id: 2,
                ..
            })
        ));
        assert_eq!(session.global_step().unwrap().get(), 0);
    }
}

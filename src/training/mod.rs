mod rmse_log;
mod session;
mod train_op;

pub use rmse_log::{TEST_RMSE, TRAIN_RMSE, TrainingLog};
pub use session::{GlobalStep, TrainingSession};
pub use train_op::TrainOp;

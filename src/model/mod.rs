mod factor_model;
mod layout;
mod loss;
mod params;
mod scoring;

pub use factor_model::FactorModel;
pub use layout::{FactorView, FactorViewMut, ParameterLayout};
pub use loss::{BatchLoss, batch_loss, loss_and_grad};
pub use params::{ModelParameters, PARAM_NAMES};
pub use scoring::{predict_raw, score};

use log::debug;

use crate::{
    Result,
    config::FactorConfig,
    initialization::build_param_gen,
    model::{FactorView, ModelParameters, ParameterLayout},
};

/// Monotonically increasing count of applied training steps.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GlobalStep(pub(super) u64);

impl GlobalStep {
    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

/// The computation context of a single `fit` call.
///
/// Owns the flat parameter buffer the train op mutates. Everything it holds is released when
/// the session is dropped, whether training finished or bailed out early.
#[derive(Debug)]
pub struct TrainingSession {
    pub(super) layout: ParameterLayout,
    pub(super) params: Vec<f32>,
    pub(super) global_step: Option<GlobalStep>,
}

impl TrainingSession {
    /// Opens a session with freshly initialized parameters.
    ///
    /// # Returns
    /// An error if the config is invalid or its initializer can't produce every parameter.
    pub fn open(config: &FactorConfig) -> Result<Self> {
        config.validate()?;

        let layout = ParameterLayout::new(config.num_user, config.num_item, config.num_dim);
        let len = layout.len();

        let mut params = vec![0.; len];
        build_param_gen(config.weight_initializer, len, config.seed)?.fill(&mut params)?;

        debug!(params = len; "training session opened");

        Ok(Self {
            layout,
            params,
            global_step: None,
        })
    }

    #[inline]
    pub fn layout(&self) -> &ParameterLayout {
        &self.layout
    }

    /// Returns the global step, creating it at zero if the session has none yet.
    pub fn get_or_create_global_step(&mut self) -> GlobalStep {
        *self.global_step.get_or_insert_default()
    }

    #[inline]
    pub fn global_step(&self) -> Option<GlobalStep> {
        self.global_step
    }

    /// Borrows the current parameters.
    pub fn params(&self) -> Result<FactorView<'_>> {
        self.layout.view(&self.params)
    }

    /// Copies the current parameters out of the session.
    pub fn snapshot(&self) -> Result<ModelParameters> {
        Ok(ModelParameters::from_view(self.params()?))
    }
}

impl Drop for TrainingSession {
    fn drop(&mut self) {
        let steps = self.global_step.map(GlobalStep::get).unwrap_or_default();
        debug!(global_step = steps; "training session closed");
    }
}

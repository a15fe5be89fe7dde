use super::{ParamGen, param_gen::consume};
use crate::Result;

/// Seeds every parameter with the same value.
#[derive(Debug, Clone)]
pub struct ConstParamGen {
    value: f32,
    remaining: usize,
}

impl ConstParamGen {
    pub fn new(value: f32, limit: usize) -> Self {
        Self {
            value,
            remaining: limit,
        }
    }
}

impl ParamGen for ConstParamGen {
    fn fill(&mut self, buf: &mut [f32]) -> Result<()> {
        consume(&mut self.remaining, buf.len())?;
        buf.fill(self.value);
        Ok(())
    }

    fn remaining(&self) -> usize {
        self.remaining
    }
}

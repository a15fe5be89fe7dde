use crate::{FactorErr, Result};

/// Source of initial values for the flat parameter buffer.
///
/// Every generator has a budget of values it may still hand out, so a generator built for
/// one layout can't silently seed a bigger one.
pub trait ParamGen {
    /// Overwrites every slot of `buf` with fresh values, consuming `buf.len()` of the budget.
    ///
    /// # Returns
    /// `FactorErr::Initializer` if the budget left is smaller than `buf`; nothing is written then.
    fn fill(&mut self, buf: &mut [f32]) -> Result<()>;

    /// How many values can still be generated.
    fn remaining(&self) -> usize;
}

/// Takes `n` values out of `remaining`, or fails leaving it untouched.
pub(super) fn consume(remaining: &mut usize, n: usize) -> Result<()> {
    let left = *remaining;
    *remaining = left.checked_sub(n).ok_or_else(|| {
        FactorErr::Initializer(format!("asked for {n} initial values but only {left} are left"))
    })?;

    Ok(())
}

//! Linear superposition of elementary sources at a receiver.

use std::mem::discriminant;

use crate::errors::{EmResult, NumericalWarning};
use crate::kernel::{project, HankelKernelEvaluator};
use crate::layers::LayerStack;
use crate::math::{CScalar, Scalar, C3, R3};
use crate::sources::Contribution;

/// Sums kernel evaluations of [`Contribution`]s.
#[derive(Debug, Clone)]
pub struct FieldSuperposer<'a> {
    evaluator: HankelKernelEvaluator<'a>,
}

impl<'a> FieldSuperposer<'a> {
    /// Wraps an evaluator bound to one frequency.
    #[must_use]
    pub fn new(evaluator: HankelKernelEvaluator<'a>) -> Self {
        Self { evaluator }
    }

    /// Underlying kernel evaluator.
    #[must_use]
    pub fn evaluator(&self) -> &HankelKernelEvaluator<'a> {
        &self.evaluator
    }

    /// Secondary field vector at `receiver`.
    ///
    /// Warnings are deduplicated by kind; the first occurrence is kept.
    pub fn field(
        &self,
        contributions: &[Contribution],
        receiver: &R3,
        warnings: &mut Vec<NumericalWarning>,
    ) -> EmResult<C3> {
        let mut total = C3::from_element(CScalar::new(0.0, 0.0));
        let mut raised = Vec::new();
        for contribution in contributions {
            total += self.evaluator.evaluate(contribution, receiver, &mut raised)?;
        }
        for warning in raised {
            if !warnings.iter().any(|w| discriminant(w) == discriminant(&warning)) {
                warnings.push(warning);
            }
        }
        Ok(total)
    }

    /// Secondary field at `receiver` projected on `axis`.
    pub fn combine(
        &self,
        contributions: &[Contribution],
        receiver: &R3,
        axis: &R3,
        warnings: &mut Vec<NumericalWarning>,
    ) -> EmResult<CScalar> {
        Ok(project(&self.field(contributions, receiver, warnings)?, axis))
    }
}

/// One-shot superposition at `hz` over `stack`; warnings are logged.
pub fn combine(
    contributions: &[Contribution],
    receiver: &R3,
    axis: &R3,
    hz: Scalar,
    stack: &LayerStack,
    zero_offset_tolerance: Scalar,
) -> EmResult<CScalar> {
    let response = stack.at_frequency(hz)?;
    let superposer = FieldSuperposer::new(HankelKernelEvaluator::new(&response, zero_offset_tolerance));
    let mut warnings = Vec::new();
    let value = superposer.combine(contributions, receiver, axis, &mut warnings)?;
    for warning in &warnings {
        log::warn!("{warning}");
    }
    Ok(value)
}

//! Hankel-transform evaluation of secondary fields above a layered earth.
//!
//! All elements share the same spectral building block: the TE reflection
//! coefficient times the upward decay `exp(−λ(z + h))`, sampled at the filter
//! wavenumbers `λᵢ = bᵢ / r`. The field components are then linear
//! combinations of a handful of J0/J1 transforms of that block weighted by
//! powers of λ:
//!
//! ```text
//! I(ν, p) = ∫ rTE(λ) e^{−λ(z+h)} λ^p J_ν(λr) dλ
//! ```
//!
//! Current elements use the horizontal-loop (TE) part of the bipole field
//! only, which is exact once the elements close a circuit.

use std::f64::consts::PI;

use crate::errors::{GeometryError, NumericalWarning};
use crate::filters::{FilterTable, HankelOrder};
use crate::layers::FrequencyResponse;
use crate::math::{CScalar, Scalar, C3, R3};
use crate::sources::{Contribution, ElementKind};

/// Offsets beyond this many skin depths trigger a warning.
pub const MAX_OFFSET_SKIN_DEPTHS: Scalar = 30.0;
/// Heights beyond this multiple of the offset trigger a warning.
pub const MAX_HEIGHT_OFFSET_RATIO: Scalar = 100.0;

/// Reflected spectrum for one source/receiver pair.
struct Spectrum<'f> {
    filter: &'f FilterTable,
    offset: Scalar,
    reflected: Vec<CScalar>,
}

impl Spectrum<'_> {
    /// `∫ rTE e^{−λ(z+h)} λ^power J_order(λr) dλ`.
    fn integral(&self, order: HankelOrder, power: i32) -> CScalar {
        let samples: Vec<CScalar> = self
            .reflected
            .iter()
            .zip(self.filter.wavenumbers(self.offset))
            .map(|(k, lambda)| *k * lambda.powi(power))
            .collect();
        self.filter.apply(order, self.offset, &samples)
    }
}

/// Evaluates elementary sources against one frozen [`FrequencyResponse`].
#[derive(Debug, Clone)]
pub struct HankelKernelEvaluator<'a> {
    response: &'a FrequencyResponse<'a>,
    filter: &'a FilterTable,
    zero_offset_tolerance: Scalar,
}

impl<'a> HankelKernelEvaluator<'a> {
    /// Evaluator using the standard filter.
    #[must_use]
    pub fn new(response: &'a FrequencyResponse<'a>, zero_offset_tolerance: Scalar) -> Self {
        Self {
            response,
            filter: FilterTable::standard(),
            zero_offset_tolerance,
        }
    }

    /// Replaces the bundled filter with `filter`.
    #[must_use]
    pub fn with_filter(mut self, filter: &'a FilterTable) -> Self {
        self.filter = filter;
        self
    }

    /// Filter used for every transform.
    #[must_use]
    pub fn filter(&self) -> &FilterTable {
        self.filter
    }

    /// Layered earth at the evaluated frequency.
    #[must_use]
    pub fn response(&self) -> &FrequencyResponse<'a> {
        self.response
    }

    fn spectrum(&self, offset: Scalar, height: Scalar) -> Spectrum<'a> {
        let reflected = self
            .filter
            .wavenumbers(offset)
            .map(|lambda| self.response.reflection(lambda) * (-lambda * height).exp())
            .collect();
        Spectrum { filter: self.filter, offset, reflected }
    }

    fn height_sum(&self, source: &R3, receiver: &R3) -> Scalar {
        let stack = self.response.stack();
        stack.height_of(source.z) + stack.height_of(receiver.z)
    }

    /// Accuracy warnings for an element at horizontal `offset` and summed height `height`.
    #[must_use]
    pub fn range_warnings(&self, offset: Scalar, height: Scalar) -> Vec<NumericalWarning> {
        let mut warnings = Vec::new();
        let skin_depth = self.response.min_skin_depth();
        if offset / skin_depth > MAX_OFFSET_SKIN_DEPTHS {
            warnings.push(NumericalWarning::OffsetBeyondSkinDepths {
                offset,
                skin_depth,
                frequency: self.response.frequency(),
            });
        }
        if height / offset > MAX_HEIGHT_OFFSET_RATIO {
            warnings.push(NumericalWarning::HeightBeyondOffset { offset, height });
        }
        warnings
    }

    fn checked_offset(&self, source: &R3, receiver: &R3) -> Result<(Scalar, Scalar, Scalar), GeometryError> {
        let (dx, dy) = (receiver.x - source.x, receiver.y - source.y);
        let offset = dx.hypot(dy);
        if offset < self.zero_offset_tolerance {
            return Err(GeometryError::ZeroOffset { offset });
        }
        Ok((dx, dy, offset))
    }

    /// Secondary field of a magnetic dipole with moment vector `moment` at `source`.
    ///
    /// The moment splits into a vertical dipole and two horizontal dipoles.
    pub fn dipole_field(&self, source: &R3, moment: &R3, receiver: &R3) -> Result<C3, GeometryError> {
        let (dx, dy, r) = self.checked_offset(source, receiver)?;
        let spectrum = self.spectrum(r, self.height_sum(source, receiver));
        let i0_2 = spectrum.integral(HankelOrder::Zero, 2);
        let i1_2 = spectrum.integral(HankelOrder::One, 2);
        let i1_1 = spectrum.integral(HankelOrder::One, 1);

        let (cx, cy) = (dx / r, dy / r);
        let scale = 1.0 / (4.0 * PI);

        // Vertical dipole.
        let h_rho = i1_2 * (moment.z * scale);
        let mut h = C3::new(h_rho * cx, h_rho * cy, i0_2 * (moment.z * scale));

        // Horizontal dipole along unit vector (px, py).
        let mut horizontal = |px: Scalar, py: Scalar, strength: Scalar| {
            if strength == 0.0 {
                return;
            }
            let along = px * cx + py * cy;
            let k = strength * scale;
            h.z -= i1_2 * (k * along);
            h.x += (i1_1 * (px / r - 2.0 * along * cx / r) + i0_2 * (along * cx)) * k;
            h.y += (i1_1 * (py / r - 2.0 * along * cy / r) + i0_2 * (along * cy)) * k;
        };
        horizontal(1.0, 0.0, moment.x);
        horizontal(0.0, 1.0, moment.y);
        Ok(h)
    }

    /// Secondary field of a horizontal current element at `location` with unit
    /// `tangent` and strength `weight` (current × length).
    pub fn current_element_field(
        &self,
        location: &R3,
        tangent: &R3,
        weight: Scalar,
        receiver: &R3,
    ) -> Result<C3, GeometryError> {
        let (dx, dy, r) = self.checked_offset(location, receiver)?;
        let spectrum = self.spectrum(r, self.height_sum(location, receiver));
        let g1 = spectrum.integral(HankelOrder::One, 0);
        let g0 = spectrum.integral(HankelOrder::Zero, 1);
        let i1_1 = spectrum.integral(HankelOrder::One, 1);

        let k = weight / (4.0 * PI);
        let (tx, ty) = (tangent.x, tangent.y);
        let normal = tx * dy - ty * dx;
        let radial = g0 / r - g1 * (2.0 / (r * r));

        Ok(C3::new(
            -(g1 * (-ty / r) + radial * (normal * dx / r)) * k,
            -(g1 * (tx / r) + radial * (normal * dy / r)) * k,
            i1_1 * (k * normal / r),
        ))
    }

    /// Secondary field on the axis of a horizontal ring of `radius` carrying
    /// `weight` ampere-turns. Only the vertical component survives there.
    pub fn ring_axis_field(&self, centre: &R3, radius: Scalar, weight: Scalar, receiver: &R3) -> Result<C3, GeometryError> {
        let offset = (receiver.x - centre.x).hypot(receiver.y - centre.y);
        if offset > self.zero_offset_tolerance {
            return Err(GeometryError::OffAxisRing { offset });
        }
        let spectrum = self.spectrum(radius, self.height_sum(centre, receiver));
        let hz = spectrum.integral(HankelOrder::One, 1) * (0.5 * weight * radius);
        Ok(C3::new(CScalar::new(0.0, 0.0), CScalar::new(0.0, 0.0), hz))
    }

    /// Secondary field of one elementary contribution; range warnings are appended to `warnings`.
    pub fn evaluate(
        &self,
        contribution: &Contribution,
        receiver: &R3,
        warnings: &mut Vec<NumericalWarning>,
    ) -> Result<C3, GeometryError> {
        let height = self.height_sum(&contribution.location, receiver);
        let field = match contribution.kind {
            ElementKind::MagneticDipole => {
                let moment = contribution.orientation * contribution.weight;
                self.dipole_field(&contribution.location, &moment, receiver)?
            }
            ElementKind::CurrentElement => self.current_element_field(
                &contribution.location,
                &contribution.orientation,
                contribution.weight,
                receiver,
            )?,
            ElementKind::Ring { radius } => {
                let field = self.ring_axis_field(&contribution.location, radius, contribution.weight, receiver)?;
                warnings.extend(self.range_warnings(radius, height));
                return Ok(field);
            }
        };
        warnings.extend(self.range_warnings(contribution.offset_to(receiver), height));
        Ok(field)
    }

    /// Single secondary-field component along `direction` at `receiver`,
    /// for a unit dipole at `source` oriented along `orientation`.
    pub fn field_component(
        &self,
        direction: &R3,
        source: &R3,
        orientation: &R3,
        receiver: &R3,
    ) -> Result<CScalar, GeometryError> {
        let h = self.dipole_field(source, &orientation.normalize(), receiver)?;
        Ok(project(&h, direction))
    }
}

/// Projects a complex field vector onto a real direction.
#[must_use]
pub fn project(field: &C3, direction: &R3) -> CScalar {
    field.x * direction.x + field.y * direction.y + field.z * direction.z
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::constants::{angular_frequency, VACUUM_PERMEABILITY};
    use crate::layers::LayerStack;
    use crate::math::J;

    /// Secondary Hz of a surface VMD over a half-space, from the closed-form total field.
    fn half_space_vmd(sigma: Scalar, hz: Scalar, r: Scalar) -> CScalar {
        let k = (-J * angular_frequency(hz) * VACUUM_PERMEABILITY * sigma).sqrt();
        let ikr = J * k * r;
        let total = (9.0 - (9.0 + 9.0 * ikr - 4.0 * k * k * r * r - J * k * k * k * r * r * r) * (-ikr).exp())
            / (2.0 * PI * k * k * r.powi(5));
        total + 1.0 / (4.0 * PI * r.powi(3))
    }

    #[test]
    fn vertical_dipole_matches_half_space_closed_form() {
        // |kr| stays above 0.1 so the closed form does not cancel.
        let stack = LayerStack::half_space(1.0).unwrap();
        for hz in [100.0, 1.0e3, 1.0e4] {
            let response = stack.at_frequency(hz).unwrap();
            let evaluator = HankelKernelEvaluator::new(&response, 1.0e-8);
            let h = evaluator.dipole_field(&R3::zeros(), &R3::z(), &R3::new(10.0, 0.0, 0.0)).unwrap();
            let expected = half_space_vmd(1.0, hz, 10.0);
            assert_relative_eq!((h.z - expected).norm() / expected.norm(), 0.0, epsilon = 1.0e-5);
        }
    }

    #[test]
    fn horizontal_dipole_reciprocity() {
        let stack = LayerStack::from_conductivities(vec![20.0], &[0.1, 1.0]).unwrap();
        let response = stack.at_frequency(500.0).unwrap();
        let evaluator = HankelKernelEvaluator::new(&response, 1.0e-8);
        let rx = R3::new(12.0, 0.0, 1.0);
        let vmd = evaluator.dipole_field(&R3::new(0.0, 0.0, 2.0), &R3::z(), &rx).unwrap();
        let hmd = evaluator.dipole_field(&R3::new(0.0, 0.0, 2.0), &R3::x(), &rx).unwrap();
        assert_relative_eq!((hmd.z + vmd.x).norm(), 0.0, epsilon = 1.0e-14 * vmd.x.norm());
    }

    #[test]
    fn rotated_horizontal_dipole_is_consistent() {
        // A y-dipole seen along y equals an x-dipole seen along x.
        let stack = LayerStack::half_space(0.3).unwrap();
        let response = stack.at_frequency(50.0).unwrap();
        let evaluator = HankelKernelEvaluator::new(&response, 1.0e-8);
        let hx = evaluator.dipole_field(&R3::zeros(), &R3::x(), &R3::new(8.0, 0.0, 0.5)).unwrap();
        let hy = evaluator.dipole_field(&R3::zeros(), &R3::y(), &R3::new(0.0, 8.0, 0.5)).unwrap();
        assert_relative_eq!((hx.x - hy.y).norm(), 0.0, epsilon = 1.0e-14 * hx.x.norm());
        assert_relative_eq!((hx.z - hy.z).norm(), 0.0, epsilon = 1.0e-14 * hx.z.norm());
    }

    #[test]
    fn zero_offset_is_rejected_on_generic_path() {
        let stack = LayerStack::half_space(0.1).unwrap();
        let response = stack.at_frequency(10.0).unwrap();
        let evaluator = HankelKernelEvaluator::new(&response, 1.0e-8);
        let err = evaluator.dipole_field(&R3::zeros(), &R3::z(), &R3::new(0.0, 0.0, 5.0)).unwrap_err();
        assert_eq!(err, GeometryError::ZeroOffset { offset: 0.0 });
        assert!(evaluator.ring_axis_field(&R3::zeros(), 5.0, 1.0, &R3::new(1.0, 0.0, 0.0)).is_err());
    }

    #[test]
    fn far_offsets_warn() {
        let stack = LayerStack::half_space(1.0).unwrap();
        let response = stack.at_frequency(1.0e5).unwrap();
        let evaluator = HankelKernelEvaluator::new(&response, 1.0e-8);
        let warnings = evaluator.range_warnings(500.0, 0.0);
        assert!(matches!(warnings[..], [NumericalWarning::OffsetBeyondSkinDepths { .. }]));
        let warnings = evaluator.range_warnings(0.01, 5.0);
        assert!(matches!(warnings[..], [NumericalWarning::HeightBeyondOffset { .. }]));
    }
}

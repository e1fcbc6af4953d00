//! Transmitter geometries and their decomposition into elementary sources.
//!
//! Every transmitter reduces to a list of [`Contribution`]s that the kernel
//! evaluates independently and the superposer sums:
//!
//! - a magnetic dipole is a single dipole element;
//! - a circular loop is one ring element when the receiver sits on its axis,
//!   otherwise a closed chain of horizontal current elements along the circle;
//! - a wire polygon is split into sides, each sampled with Gauss-Legendre
//!   quadrature into horizontal current elements.

use std::f64::consts::PI;
use std::str::FromStr;

use crate::errors::{ConfigurationError, EmError, GeometryError};
use crate::fields::{dipole_field, polygon_field, ring_field};
use crate::math::{gauss_legendre, Scalar, R3};

/// Axis of a dipole moment or receiver.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Orientation {
    /// Easting.
    X,
    /// Northing.
    Y,
    /// Vertical, positive up.
    Z,
    /// Arbitrary direction; normalised on use.
    Vector(R3),
}

impl Orientation {
    /// Orientation along `direction`, rejecting zero and non-finite vectors.
    pub fn along(direction: R3) -> Result<Self, ConfigurationError> {
        let orientation = Self::Vector(direction);
        orientation.validate()?;
        Ok(orientation)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigurationError> {
        match self {
            Self::Vector(v) if !(v.norm() > 0.0 && v.iter().all(|c| c.is_finite())) => {
                Err(ConfigurationError::ZeroOrientation)
            }
            _ => Ok(()),
        }
    }

    /// Unit vector of this orientation.
    #[must_use]
    pub fn unit(&self) -> R3 {
        match self {
            Self::X => R3::x(),
            Self::Y => R3::y(),
            Self::Z => R3::z(),
            Self::Vector(v) => v.normalize(),
        }
    }
}

impl FromStr for Orientation {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "x" => Ok(Self::X),
            "y" => Ok(Self::Y),
            "z" => Ok(Self::Z),
            _ => Err(ConfigurationError::UnsupportedOrientation(s.to_owned())),
        }
    }
}

/// Discretisation settings shared by the finite sources.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Discretisation {
    /// Gauss-Legendre points per wire side or ring arc.
    pub quadrature_points: usize,
    /// Arcs used for a ring seen off its axis.
    pub ring_arcs: usize,
    /// Horizontal distance below which a receiver counts as on the ring axis.
    pub zero_offset_tolerance: Scalar,
    /// Evaluate mirror-image wire sides once with doubled strength.
    pub fold_mirror_symmetry: bool,
}

impl Default for Discretisation {
    fn default() -> Self {
        Self {
            quadrature_points: 3,
            ring_arcs: 36,
            zero_offset_tolerance: 1.0e-8,
            fold_mirror_symmetry: false,
        }
    }
}

/// Kind of elementary source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ElementKind {
    /// Point magnetic dipole; `weight` is the moment in A·m².
    MagneticDipole,
    /// Horizontal current element of a closed circuit; `weight` is current × length in A·m.
    CurrentElement,
    /// Whole horizontal ring evaluated on its axis; `weight` is current × turns in A.
    Ring {
        /// Ring radius in meters.
        radius: Scalar,
    },
}

/// Elementary source produced by [`SourceGeometry`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contribution {
    /// Element kind.
    pub kind: ElementKind,
    /// Position in meters.
    pub location: R3,
    /// Unit moment direction (dipole), tangent (current element) or axis (ring).
    pub orientation: R3,
    /// Element strength; see [`ElementKind`] for units.
    pub weight: Scalar,
}

impl Contribution {
    /// Horizontal distance to `point`.
    #[must_use]
    pub fn offset_to(&self, point: &R3) -> Scalar {
        (point.x - self.location.x).hypot(point.y - self.location.y)
    }
}

/// Closed horizontal wire polygon.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct WirePolygon {
    vertices: Vec<R3>,
    current: Scalar,
}

impl WirePolygon {
    /// Builds a validated polygon. A final vertex repeating the first is dropped.
    pub fn new(mut vertices: Vec<R3>, current: Scalar) -> Result<Self, EmError> {
        let scale = vertices.iter().map(|v| v.xy().norm()).fold(1.0, Scalar::max);
        if vertices.len() > 1 {
            let closing = vertices[vertices.len() - 1] - vertices[0];
            if closing.norm() <= 1.0e-12 * scale {
                vertices.pop();
            }
        }
        if vertices.len() < 3 {
            return Err(ConfigurationError::TooFewVertices(vertices.len()).into());
        }
        if !current.is_finite() {
            return Err(ConfigurationError::InvalidSourceParameter { parameter: "current", value: current }.into());
        }
        if vertices.iter().any(|v| !v.iter().all(|c| c.is_finite())) {
            return Err(ConfigurationError::InvalidSetting("wire loop vertex is not finite".into()).into());
        }
        let z0 = vertices[0].z;
        if vertices.iter().any(|v| (v.z - z0).abs() > 1.0e-9 * scale) {
            return Err(ConfigurationError::NonHorizontalLoop.into());
        }

        let polygon = Self { vertices, current };
        for (index, (a, b)) in polygon.sides().enumerate() {
            if (b - a).norm() <= 1.0e-12 * scale {
                return Err(GeometryError::DegenerateSide { index }.into());
            }
        }
        if polygon.signed_area().abs() <= 1.0e-12 * scale * scale {
            return Err(GeometryError::ZeroArea.into());
        }
        if let Some((first, second)) = polygon.first_crossing() {
            return Err(GeometryError::SelfIntersecting { first, second }.into());
        }
        Ok(polygon)
    }

    /// Distinct vertices in traversal order.
    #[must_use]
    pub fn vertices(&self) -> &[R3] {
        &self.vertices
    }

    /// Loop current in amperes.
    #[must_use]
    pub fn current(&self) -> Scalar {
        self.current
    }

    /// Elevation of the polygon plane.
    #[must_use]
    pub fn elevation(&self) -> Scalar {
        self.vertices[0].z
    }

    /// Sides as `(start, end)`, closing back to the first vertex.
    pub fn sides(&self) -> impl Iterator<Item = (R3, R3)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// Shoelace area; positive for counter-clockwise traversal seen from above.
    #[must_use]
    pub fn signed_area(&self) -> Scalar {
        0.5 * self.sides().map(|(a, b)| a.x * b.y - b.x * a.y).sum::<Scalar>()
    }

    fn first_crossing(&self) -> Option<(usize, usize)> {
        let sides: Vec<(R3, R3)> = self.sides().collect();
        let n = sides.len();
        for i in 0..n {
            for j in i + 1..n {
                let adjacent = j == i + 1 || (i == 0 && j == n - 1);
                if !adjacent && segments_touch(sides[i], sides[j]) {
                    return Some((i, j));
                }
            }
        }
        None
    }

    /// Per-side strength multipliers for a receiver at `receiver` measuring along `axis`.
    ///
    /// When a vertical plane through the receiver maps the polygon onto itself,
    /// each pair of mirror sides keeps its lower-indexed member with strength 2
    /// and drops the other (strength 0); sides lying across the plane keep
    /// strength 1. Folding only holds for field components within that plane,
    /// so an `axis` with a component along the plane normal gets all ones.
    #[must_use]
    pub fn side_strengths(&self, receiver: &R3, axis: &R3) -> Vec<Scalar> {
        let n = self.vertices.len();
        let unfolded = vec![1.0; n];
        let Some((normal, partner)) = self.mirror_plane(receiver) else {
            return unfolded;
        };
        if axis.dot(&normal).abs() > 1.0e-9 * axis.norm() {
            return unfolded;
        }
        partner
            .iter()
            .enumerate()
            .map(|(i, &j)| match i.cmp(&j) {
                std::cmp::Ordering::Equal => 1.0,
                std::cmp::Ordering::Less => 2.0,
                std::cmp::Ordering::Greater => 0.0,
            })
            .collect()
    }

    /// Finds a vertical mirror plane through `receiver`; returns its unit
    /// normal and, for every side, the index of its mirror image.
    fn mirror_plane(&self, receiver: &R3) -> Option<(R3, Vec<usize>)> {
        let scale = self.vertices.iter().map(|v| (v - receiver).xy().norm()).fold(0.0, Scalar::max);
        let tol = 1.0e-9 * scale.max(1.0);
        let sides: Vec<(R3, R3)> = self.sides().collect();
        let n = self.vertices.len();

        for i in 0..n {
            for j in i + 1..n {
                let span = self.vertices[j] - self.vertices[i];
                let normal = R3::new(span.x, span.y, 0.0);
                if normal.norm() <= tol {
                    continue;
                }
                let normal = normal.normalize();
                let midpoint = 0.5 * (self.vertices[i] + self.vertices[j]);
                if (midpoint - receiver).xy().dot(&normal.xy()).abs() > tol {
                    continue;
                }
                let reflect = |p: R3| p - 2.0 * (p - receiver).xy().dot(&normal.xy()) * normal;
                let partner: Option<Vec<usize>> = sides
                    .iter()
                    .map(|&(a, b)| {
                        let (ra, rb) = (reflect(a), reflect(b));
                        sides
                            .iter()
                            .position(|&(c, d)| (c - rb).norm() <= tol && (d - ra).norm() <= tol)
                    })
                    .collect();
                if let Some(partner) = partner {
                    return Some((normal, partner));
                }
            }
        }
        None
    }
}

fn cross2(o: &R3, a: &R3, b: &R3) -> Scalar {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

fn within_box(p: &R3, a: &R3, b: &R3) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

fn segments_touch((p1, p2): (R3, R3), (q1, q2): (R3, R3)) -> bool {
    let d1 = cross2(&q1, &q2, &p1);
    let d2 = cross2(&q1, &q2, &p2);
    let d3 = cross2(&p1, &p2, &q1);
    let d4 = cross2(&p1, &p2, &q2);
    if d1 * d2 < 0.0 && d3 * d4 < 0.0 {
        return true;
    }
    (d1 == 0.0 && within_box(&p1, &q1, &q2))
        || (d2 == 0.0 && within_box(&p2, &q1, &q2))
        || (d3 == 0.0 && within_box(&q1, &p1, &p2))
        || (d4 == 0.0 && within_box(&q2, &p1, &p2))
}

/// Transmitter shape.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum SourceGeometry {
    /// Point magnetic dipole.
    MagneticDipole {
        /// Position in meters.
        location: R3,
        /// Moment direction.
        orientation: Orientation,
        /// Moment in A·m².
        moment: Scalar,
    },
    /// Horizontal circular loop.
    CircularLoop {
        /// Centre in meters.
        location: R3,
        /// Radius in meters.
        radius: Scalar,
        /// Number of turns.
        turns: Scalar,
        /// Current in amperes, counter-clockwise seen from above.
        current: Scalar,
    },
    /// Closed horizontal wire polygon.
    PiecewiseWireLoop(WirePolygon),
}

impl SourceGeometry {
    /// Unit-moment dipole.
    pub fn magnetic_dipole(location: R3, orientation: Orientation) -> Result<Self, EmError> {
        let source = Self::MagneticDipole { location, orientation, moment: 1.0 };
        source.validate()?;
        Ok(source)
    }

    /// Single-turn, unit-current circular loop.
    pub fn circular_loop(location: R3, radius: Scalar) -> Result<Self, EmError> {
        let source = Self::CircularLoop { location, radius, turns: 1.0, current: 1.0 };
        source.validate()?;
        Ok(source)
    }

    /// Unit-current wire polygon.
    pub fn wire_loop(vertices: Vec<R3>) -> Result<Self, EmError> {
        Ok(Self::PiecewiseWireLoop(WirePolygon::new(vertices, 1.0)?))
    }

    /// Checks parameters of variants built directly.
    pub fn validate(&self) -> Result<(), EmError> {
        let positive = |parameter, value: Scalar| {
            if value > 0.0 && value.is_finite() {
                Ok(())
            } else {
                Err(ConfigurationError::InvalidSourceParameter { parameter, value })
            }
        };
        let finite = |parameter, value: Scalar| {
            if value.is_finite() {
                Ok(())
            } else {
                Err(ConfigurationError::InvalidSourceParameter { parameter, value })
            }
        };
        match self {
            Self::MagneticDipole { location, orientation, moment } => {
                orientation.validate()?;
                finite("moment", *moment)?;
                finite("elevation", location.z)?;
            }
            Self::CircularLoop { location, radius, turns, current } => {
                positive("radius", *radius)?;
                positive("turns", *turns)?;
                finite("current", *current)?;
                finite("elevation", location.z)?;
            }
            Self::PiecewiseWireLoop(polygon) => {
                WirePolygon::new(polygon.vertices.clone(), polygon.current)?;
            }
        }
        Ok(())
    }

    /// Lowest elevation reached by the transmitter.
    #[must_use]
    pub fn elevation(&self) -> Scalar {
        match self {
            Self::MagneticDipole { location, .. } | Self::CircularLoop { location, .. } => location.z,
            Self::PiecewiseWireLoop(polygon) => polygon.elevation(),
        }
    }

    /// Receiver-independent decomposition: rings stay whole, wire sides are
    /// sampled at full strength.
    #[must_use]
    pub fn elementary_contributions(&self, discretisation: &Discretisation) -> Vec<Contribution> {
        match self {
            Self::MagneticDipole { location, orientation, moment } => vec![Contribution {
                kind: ElementKind::MagneticDipole,
                location: *location,
                orientation: orientation.unit(),
                weight: *moment,
            }],
            Self::CircularLoop { location, radius, turns, current } => vec![Contribution {
                kind: ElementKind::Ring { radius: *radius },
                location: *location,
                orientation: R3::z(),
                weight: current * turns,
            }],
            Self::PiecewiseWireLoop(polygon) => {
                let strengths = vec![1.0; polygon.vertices.len()];
                wire_elements(polygon, &strengths, discretisation.quadrature_points)
            }
        }
    }

    /// Decomposition tailored to one receiver at `receiver` measuring along `axis`.
    ///
    /// Off-axis receivers see a ring as current elements on the circle, and
    /// wire polygons are folded across a mirror plane when enabled.
    #[must_use]
    pub fn contributions_for(&self, receiver: &R3, axis: &R3, discretisation: &Discretisation) -> Vec<Contribution> {
        match self {
            Self::CircularLoop { location, radius, turns, current } => {
                let offset = (receiver.x - location.x).hypot(receiver.y - location.y);
                if offset <= discretisation.zero_offset_tolerance {
                    self.elementary_contributions(discretisation)
                } else {
                    ring_elements(location, *radius, current * turns, discretisation)
                }
            }
            Self::PiecewiseWireLoop(polygon) if discretisation.fold_mirror_symmetry => {
                let strengths = polygon.side_strengths(receiver, axis);
                wire_elements(polygon, &strengths, discretisation.quadrature_points)
            }
            _ => self.elementary_contributions(discretisation),
        }
    }

    /// Free-space (primary) magnetic field at `point`, in A/m.
    #[must_use]
    pub fn primary_field(&self, point: &R3) -> R3 {
        match self {
            Self::MagneticDipole { location, orientation, moment } => {
                dipole_field(location, &(orientation.unit() * *moment), point)
            }
            Self::CircularLoop { location, radius, turns, current } => {
                ring_field(location, *radius, current * turns, point)
            }
            Self::PiecewiseWireLoop(polygon) => polygon_field(&polygon.vertices, polygon.current, point),
        }
    }
}

fn wire_elements(polygon: &WirePolygon, strengths: &[Scalar], points: usize) -> Vec<Contribution> {
    let rule = gauss_legendre(points);
    polygon
        .sides()
        .zip(strengths)
        .filter(|(_, s)| **s != 0.0)
        .flat_map(|((a, b), &strength)| {
            let half = 0.5 * (b - a);
            let centre = 0.5 * (a + b);
            let length = 2.0 * half.norm();
            let tangent = half.normalize();
            let current = polygon.current;
            rule.iter().map(move |&(x, w)| Contribution {
                kind: ElementKind::CurrentElement,
                location: centre + half * x,
                orientation: tangent,
                weight: current * strength * 0.5 * w * length,
            })
        })
        .collect()
}

fn ring_elements(centre: &R3, radius: Scalar, current: Scalar, discretisation: &Discretisation) -> Vec<Contribution> {
    let rule = gauss_legendre(discretisation.quadrature_points);
    let arcs = discretisation.ring_arcs.max(1);
    let span = 2.0 * PI / arcs as Scalar;
    (0..arcs)
        .flat_map(|k| {
            let mid = span * (k as Scalar + 0.5);
            rule.iter().map(move |&(x, w)| {
                let theta = mid + 0.5 * span * x;
                let (sin, cos) = theta.sin_cos();
                Contribution {
                    kind: ElementKind::CurrentElement,
                    location: centre + R3::new(radius * cos, radius * sin, 0.0),
                    orientation: R3::new(-sin, cos, 0.0),
                    weight: current * radius * 0.5 * w * span,
                }
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn rectangle() -> WirePolygon {
        let v = [(-2.0, -1.0), (-2.0, 1.0), (2.0, 1.0), (2.0, -1.0)];
        WirePolygon::new(v.iter().map(|&(x, y)| R3::new(x, y, 0.5)).collect(), 1.0).unwrap()
    }

    #[test]
    fn orientation_tokens() {
        assert_eq!("x".parse::<Orientation>().unwrap(), Orientation::X);
        assert_eq!(" Z ".parse::<Orientation>().unwrap(), Orientation::Z);
        assert_eq!(
            "north".parse::<Orientation>().unwrap_err(),
            ConfigurationError::UnsupportedOrientation("north".into())
        );
        assert!(Orientation::along(R3::zeros()).is_err());
        assert_relative_eq!(Orientation::Vector(R3::new(0.0, 3.0, 4.0)).unit().norm(), 1.0);
    }

    #[test]
    fn polygon_drops_closing_vertex() {
        let closed = vec![
            R3::new(0.0, 0.0, 0.0),
            R3::new(1.0, 0.0, 0.0),
            R3::new(1.0, 1.0, 0.0),
            R3::new(0.0, 0.0, 0.0),
        ];
        let polygon = WirePolygon::new(closed, 1.0).unwrap();
        assert_eq!(polygon.vertices().len(), 3);
        assert_relative_eq!(polygon.signed_area(), 0.5);
    }

    #[test]
    fn polygon_validation() {
        let two = vec![R3::zeros(), R3::x()];
        assert_eq!(WirePolygon::new(two, 1.0).unwrap_err(), EmError::from(ConfigurationError::TooFewVertices(2)));

        let tilted = vec![R3::zeros(), R3::x(), R3::new(0.0, 1.0, 0.3)];
        assert_eq!(WirePolygon::new(tilted, 1.0).unwrap_err(), EmError::from(ConfigurationError::NonHorizontalLoop));

        let line = vec![R3::zeros(), R3::x(), R3::new(2.0, 0.0, 0.0)];
        assert!(matches!(
            WirePolygon::new(line, 1.0).unwrap_err(),
            EmError::Geometry(GeometryError::ZeroArea | GeometryError::SelfIntersecting { .. })
        ));

        let bowtie = vec![R3::zeros(), R3::new(2.0, 2.0, 0.0), R3::new(2.0, 0.0, 0.0), R3::new(0.0, 1.0, 0.0)];
        assert_eq!(
            WirePolygon::new(bowtie, 1.0).unwrap_err(),
            EmError::from(GeometryError::SelfIntersecting { first: 0, second: 2 })
        );
    }

    #[test]
    fn wire_quadrature_preserves_moment() {
        // Σ I dl × r over a closed loop is twice the area vector.
        let polygon = rectangle();
        let elements = wire_elements(&polygon, &[1.0; 4], 3);
        assert_eq!(elements.len(), 12);
        let moment: Scalar = elements
            .iter()
            .map(|c| 0.5 * c.weight * (c.location.x * c.orientation.y - c.location.y * c.orientation.x))
            .sum();
        assert_relative_eq!(moment, polygon.signed_area(), max_relative = 1.0e-12);
        assert_relative_eq!(moment, -8.0, max_relative = 1.0e-12);
    }

    #[test]
    fn ring_arcs_enclose_the_circle() {
        let source = SourceGeometry::circular_loop(R3::zeros(), 5.0).unwrap();
        let elements = source.contributions_for(&R3::new(20.0, 0.0, 0.0), &R3::z(), &Discretisation::default());
        assert_eq!(elements.len(), 36 * 3);
        let length: Scalar = elements.iter().map(|c| c.weight).sum();
        assert_relative_eq!(length, 2.0 * PI * 5.0, max_relative = 1.0e-12);
        let centred = source.contributions_for(&R3::new(0.0, 0.0, 1.0), &R3::z(), &Discretisation::default());
        assert_eq!(centred.len(), 1);
        assert_eq!(centred[0].kind, ElementKind::Ring { radius: 5.0 });
    }

    #[test]
    fn mirror_strengths_follow_receiver_plane() {
        let polygon = rectangle();
        let receiver = R3::new(9.28, 0.0, 0.45);
        assert_eq!(polygon.side_strengths(&receiver, &R3::z()), vec![1.0, 2.0, 1.0, 0.0]);
        assert_eq!(polygon.side_strengths(&receiver, &R3::x()), vec![1.0, 2.0, 1.0, 0.0]);
        // Hy is odd under the y-mirror; folding would be wrong.
        assert_eq!(polygon.side_strengths(&receiver, &R3::y()), vec![1.0; 4]);
        // No mirror plane through an off-axis receiver.
        assert_eq!(polygon.side_strengths(&R3::new(9.28, 0.3, 0.45), &R3::z()), vec![1.0; 4]);
    }

    #[test]
    fn rejects_bad_loop_parameters() {
        assert!(SourceGeometry::circular_loop(R3::zeros(), 0.0).is_err());
        let bad = SourceGeometry::CircularLoop { location: R3::zeros(), radius: 1.0, turns: -1.0, current: 1.0 };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn far_from_a_wire_loop_the_primary_field_is_a_dipole() {
        let source = SourceGeometry::PiecewiseWireLoop(rectangle());
        let point = R3::new(150.0, -90.0, 60.0);
        let moment = R3::new(0.0, 0.0, rectangle().signed_area());
        let expected = dipole_field(&R3::new(0.0, 0.0, 0.5), &moment, &point);
        let err = (source.primary_field(&point) - expected).norm() / expected.norm();
        assert!(err < 1.0e-3, "relative error {err:.3e}");
    }
}

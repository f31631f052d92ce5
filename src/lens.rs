//! Magnifier lens transforms.
//!
//! A lens maps plot-space positions near its centre outward so that the region under the
//! lens is enlarged while points on the rim stay put. Inside the lens a normalised
//! distance `r` from the centre maps to `r * p / (1 + (p - 1) * r)` for power `p`, giving a
//! magnification of `p` at the centre that falls to `1 / p` at the rim.
//!
//! Radius and power are checked when the lens is built, so a lens that exists is valid.

use crate::error::{Error, Result};

/// A transformed position plus the local magnification at that point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LensPoint {
    pub x: f64,
    pub y: f64,
    pub magnification: f64,
}

fn check(radius: f64, power: f64) -> Result<()> {
    if !radius.is_finite() || radius <= 0.0 {
        return Err(Error::InvalidLensRadius(radius));
    }
    if !power.is_finite() || power < 1.0 {
        return Err(Error::InvalidLensPower(power));
    }
    Ok(())
}

/// Normalised distance in, normalised distance and local magnification out.
fn distort(r: f64, power: f64) -> (f64, f64) {
    let denom = 1.0 + (power - 1.0) * r;
    (r * power / denom, power / (denom * denom))
}

/// Circular lens around a centre point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialMagnifier {
    center: (f64, f64),
    radius: f64,
    power: f64,
}

impl RadialMagnifier {
    pub fn new(center: (f64, f64), radius: f64, power: f64) -> Result<Self> {
        check(radius, power)?;
        Ok(Self {
            center,
            radius,
            power,
        })
    }

    pub fn center(&self) -> (f64, f64) {
        self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn power(&self) -> f64 {
        self.power
    }

    /// Move the lens, e.g. to follow the pointer.
    #[must_use]
    pub fn centered_at(&self, x: f64, y: f64) -> Self {
        Self {
            center: (x, y),
            ..*self
        }
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        (x - self.center.0).hypot(y - self.center.1) < self.radius
    }

    pub fn magnify(&self, x: f64, y: f64) -> LensPoint {
        let dx = x - self.center.0;
        let dy = y - self.center.1;
        let d = dx.hypot(dy);
        if d >= self.radius {
            return LensPoint { x, y, magnification: 1.0 };
        }
        if d == 0.0 {
            return LensPoint { x, y, magnification: self.power };
        }
        let (r, magnification) = distort(d / self.radius, self.power);
        let k = r * self.radius / d;
        LensPoint {
            x: self.center.0 + dx * k,
            y: self.center.1 + dy * k,
            magnification,
        }
    }
}

/// Vertical bar lens: only the x coordinate within `axis_radius` of the centre is
/// distorted. Used on raster plots where y is a category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarMagnifier {
    center: f64,
    axis_radius: f64,
    power: f64,
}

impl BarMagnifier {
    pub fn new(center: f64, axis_radius: f64, power: f64) -> Result<Self> {
        check(axis_radius, power)?;
        Ok(Self {
            center,
            axis_radius,
            power,
        })
    }

    pub fn center(&self) -> f64 {
        self.center
    }

    pub fn axis_radius(&self) -> f64 {
        self.axis_radius
    }

    #[must_use]
    pub fn centered_at(&self, x: f64) -> Self {
        Self { center: x, ..*self }
    }

    pub fn contains(&self, x: f64) -> bool {
        (x - self.center).abs() < self.axis_radius
    }

    pub fn magnify(&self, x: f64, y: f64) -> LensPoint {
        let dx = x - self.center;
        if dx.abs() >= self.axis_radius {
            return LensPoint { x, y, magnification: 1.0 };
        }
        let (r, magnification) = distort(dx.abs() / self.axis_radius, self.power);
        LensPoint {
            x: self.center + dx.signum() * r * self.axis_radius,
            y,
            magnification,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rejects_bad_parameters() {
        assert!(matches!(
            RadialMagnifier::new((0.0, 0.0), 0.0, 2.0),
            Err(Error::InvalidLensRadius(_))
        ));
        assert!(matches!(
            RadialMagnifier::new((0.0, 0.0), 10.0, 0.5),
            Err(Error::InvalidLensPower(_))
        ));
        assert!(BarMagnifier::new(0.0, -1.0, 2.0).is_err());
        assert!(BarMagnifier::new(0.0, 1.0, f64::NAN).is_err());
    }

    #[test]
    fn radial_pushes_points_outward_inside_lens() {
        let lens = RadialMagnifier::new((0.0, 0.0), 10.0, 3.0).unwrap();
        let p = lens.magnify(2.0, 0.0);
        // r = 0.2 -> 0.2 * 3 / 1.4
        assert_relative_eq!(p.x, 10.0 * 0.6 / 1.4);
        assert_relative_eq!(p.y, 0.0);
        assert!(p.magnification > 1.0);

        let centre = lens.magnify(0.0, 0.0);
        assert_relative_eq!(centre.magnification, 3.0);
    }

    #[test]
    fn points_outside_are_untouched() {
        let lens = RadialMagnifier::new((0.0, 0.0), 10.0, 3.0).unwrap();
        let p = lens.magnify(20.0, 5.0);
        assert_eq!((p.x, p.y, p.magnification), (20.0, 5.0, 1.0));
        assert!(!lens.centered_at(100.0, 100.0).contains(0.0, 0.0));
    }

    #[test]
    fn bar_only_moves_x() {
        let lens = BarMagnifier::new(50.0, 10.0, 2.0).unwrap();
        let p = lens.magnify(45.0, 7.0);
        assert_relative_eq!(p.x, 50.0 - 10.0 * (0.5 * 2.0 / 1.5));
        assert_eq!(p.y, 7.0);
        let rim = lens.magnify(60.0, 1.0);
        assert_eq!(rim.x, 60.0);
    }
}

//! Second-order section (biquad cascade) filtering.
//!
//! Each section runs in transposed direct form II. [`SosFilter::filtfilt`]
//! runs the cascade forward and then backward over the signal, which cancels
//! the phase response and squares the magnitude response.

use nalgebra::{Matrix2, Vector2};
use num_complex::Complex64;
use std::f64::consts::PI;

use crate::error::{PreprocessError, Result};

/// One second-order section, `a[0]` normalized to 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Biquad {
    /// Numerator coefficients.
    pub b: [f64; 3],
    /// Denominator coefficients.
    pub a: [f64; 3],
}

impl Biquad {
    /// Steady-state filter delays for a unit step input.
    ///
    /// Solves `(I - A^T) zi = b[1..] - a[1..] * b[0]` where `A` is the
    /// companion matrix of the denominator.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if the section has a pole at `z = 1`.
    pub fn step_state(&self) -> Result<[f64; 2]> {
        let [b0, b1, b2] = self.b;
        let [_, a1, a2] = self.a;
        let lhs = Matrix2::new(1.0 + a1, -1.0, a2, 1.0);
        let rhs = Vector2::new(b1 - a1 * b0, b2 - a2 * b0);
        let zi = lhs.lu().solve(&rhs).ok_or_else(|| {
            PreprocessError::invalid_parameter("filter section has no steady state")
        })?;
        Ok([zi[0], zi[1]])
    }

    /// Gain for a constant input.
    #[must_use]
    pub fn dc_gain(&self) -> f64 {
        self.b.iter().sum::<f64>() / self.a.iter().sum::<f64>()
    }

    fn response(&self, z_inv: Complex64) -> Complex64 {
        let z_inv2 = z_inv * z_inv;
        let num = self.b[0] + z_inv * self.b[1] + z_inv2 * self.b[2];
        let den = self.a[0] + z_inv * self.a[1] + z_inv2 * self.a[2];
        num / den
    }
}

/// A cascade of second-order sections.
#[derive(Debug, Clone, PartialEq)]
pub struct SosFilter {
    sections: Vec<Biquad>,
}

impl SosFilter {
    #[must_use]
    pub fn new(sections: Vec<Biquad>) -> Self {
        Self { sections }
    }

    #[must_use]
    pub fn sections(&self) -> &[Biquad] {
        &self.sections
    }

    /// Complex frequency response at normalized frequency `w` (1 = Nyquist).
    #[must_use]
    pub fn frequency_response(&self, w: f64) -> Complex64 {
        let z_inv = Complex64::from_polar(1.0, -PI * w);
        self.sections
            .iter()
            .fold(Complex64::new(1.0, 0.0), |acc, s| acc * s.response(z_inv))
    }

    /// Magnitude response at normalized frequency `w`.
    #[must_use]
    pub fn magnitude(&self, w: f64) -> f64 {
        self.frequency_response(w).norm()
    }

    /// Run the cascade once over `x`, updating `state` (one pair of delays
    /// per section).
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if `state` does not hold exactly one pair
    /// of delays per section.
    pub fn filter(&self, x: &[f64], state: &mut [[f64; 2]]) -> Result<Vec<f64>> {
        if state.len() != self.sections.len() {
            return Err(PreprocessError::invalid_parameter(format!(
                "filter state has {} delay pairs for {} sections",
                state.len(),
                self.sections.len()
            )));
        }
        let y = x
            .iter()
            .map(|&sample| {
                let mut v = sample;
                for (s, z) in self.sections.iter().zip(state.iter_mut()) {
                    let y = s.b[0] * v + z[0];
                    z[0] = s.b[1] * v - s.a[1] * y + z[1];
                    z[1] = s.b[2] * v - s.a[2] * y;
                    v = y;
                }
                v
            })
            .collect();
        Ok(y)
    }

    /// Initial delays of every section for a unit step response steady
    /// state. Scale by the first input sample to start without a transient.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if a section has no steady state.
    pub fn step_state(&self) -> Result<Vec<[f64; 2]>> {
        let mut scale = 1.0;
        let mut zi = Vec::with_capacity(self.sections.len());
        for section in &self.sections {
            let [z0, z1] = section.step_state()?;
            zi.push([scale * z0, scale * z1]);
            scale *= section.dc_gain();
        }
        Ok(zi)
    }

    /// Zero-phase forward-backward filtering without edge padding.
    ///
    /// Each pass starts from the step steady state scaled by the first
    /// sample it sees. The output has the length of the input.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if a section has no steady state.
    pub fn filtfilt(&self, x: &[f64]) -> Result<Vec<f64>> {
        let Some(&first) = x.first() else {
            return Ok(Vec::new());
        };
        let zi = self.step_state()?;
        let scaled = |v: f64| -> Vec<[f64; 2]> { zi.iter().map(|z| [z[0] * v, z[1] * v]).collect() };

        let mut state = scaled(first);
        let mut y = self.filter(x, &mut state)?;
        y.reverse();

        let mut state = scaled(y[0]);
        let mut out = self.filter(&y, &mut state)?;
        out.reverse();
        Ok(out)
    }
}

//! Butterworth filter design.
//!
//! The design follows the classic analog-prototype route:
//!
//! 1. Analog lowpass prototype with poles on the unit circle
//! 2. Frequency pre-warping so the digital cutoff lands exactly on `wn`
//! 3. Lowpass / highpass / bandpass / bandstop transformation (zpk form)
//! 4. Bilinear transform (sampling frequency 2, so Nyquist is 1)
//! 5. Grouping of zeros and poles into second-order sections
//!
//! Working in zero-pole-gain form and emitting second-order sections keeps
//! high orders numerically stable.

use std::f64::consts::PI;

use num_complex::Complex64;

use crate::config::{CriticalFrequency, FilterParams, FilterType};
use crate::error::{PreprocessError, Result};
use crate::math::sos::{Biquad, SosFilter};

/// Sampling frequency used by the bilinear transform; Nyquist is 1.
const FS: f64 = 2.0;

/// Zeros, poles and gain of a transfer function.
#[derive(Debug, Clone, PartialEq)]
pub struct Zpk {
    pub zeros: Vec<Complex64>,
    pub poles: Vec<Complex64>,
    pub gain: f64,
}

impl Zpk {
    /// Excess of poles over zeros.
    fn degree(&self) -> usize {
        self.poles.len().saturating_sub(self.zeros.len())
    }
}

/// Design a digital Butterworth filter as second-order sections.
///
/// # Errors
///
/// Returns `InvalidParameter` if the parameters fail
/// [`FilterParams::validate`].
///
/// # Example
///
/// ```
/// use sensor_preprocess::math::butter;
/// use sensor_preprocess::{FilterParams, FilterType};
///
/// let sos = butter(&FilterParams::new(2, 0.5, FilterType::Lowpass))?;
/// let b = sos.sections()[0].b;
/// assert!((b[1] - 0.585_786_437_6).abs() < 1e-9);
/// # Ok::<(), sensor_preprocess::PreprocessError>(())
/// ```
pub fn butter(params: &FilterParams) -> Result<SosFilter> {
    params.validate()?;

    let prototype = analog_prototype(params.order);
    let analog = match (params.filter_type, params.wn) {
        (FilterType::Lowpass, CriticalFrequency::Single(wn)) => lp_to_lp(prototype, prewarp(wn)),
        (FilterType::Highpass, CriticalFrequency::Single(wn)) => lp_to_hp(prototype, prewarp(wn)),
        (FilterType::Bandpass, CriticalFrequency::Band([low, high])) => {
            let (wl, wh) = (prewarp(low), prewarp(high));
            lp_to_bp(prototype, (wl * wh).sqrt(), wh - wl)
        }
        (FilterType::Bandstop, CriticalFrequency::Band([low, high])) => {
            let (wl, wh) = (prewarp(low), prewarp(high));
            lp_to_bs(prototype, (wl * wh).sqrt(), wh - wl)
        }
        (filter_type, wn) => {
            return Err(PreprocessError::invalid_parameter(format!(
                "{filter_type:?} filter cannot use critical frequency {wn:?}"
            )))
        }
    };

    let digital = bilinear(analog);
    Ok(SosFilter::new(zpk_to_sos(&digital)))
}

/// Analog lowpass prototype of the given order, cutoff 1 rad/s.
#[must_use]
pub fn analog_prototype(order: usize) -> Zpk {
    let n = order as f64;
    let poles = (0..order)
        .map(|i| {
            let m = -n + 1.0 + 2.0 * i as f64;
            -Complex64::from_polar(1.0, PI * m / (2.0 * n))
        })
        .collect();
    Zpk {
        zeros: Vec::new(),
        poles,
        gain: 1.0,
    }
}

/// Map a normalized digital frequency to the analog frequency the bilinear
/// transform sends back onto it.
fn prewarp(wn: f64) -> f64 {
    2.0 * FS * (PI * wn / FS).tan()
}

fn product(roots: &[Complex64], f: impl Fn(Complex64) -> Complex64) -> Complex64 {
    roots.iter().fold(Complex64::new(1.0, 0.0), |acc, &r| acc * f(r))
}

fn lp_to_lp(zpk: Zpk, wo: f64) -> Zpk {
    let degree = zpk.degree();
    Zpk {
        zeros: zpk.zeros.iter().map(|&z| z * wo).collect(),
        poles: zpk.poles.iter().map(|&p| p * wo).collect(),
        gain: zpk.gain * wo.powi(degree as i32),
    }
}

fn lp_to_hp(zpk: Zpk, wo: f64) -> Zpk {
    let degree = zpk.degree();
    let mut zeros: Vec<Complex64> = zpk.zeros.iter().map(|&z| wo / z).collect();
    zeros.extend(std::iter::repeat(Complex64::new(0.0, 0.0)).take(degree));
    let gain = zpk.gain * (product(&zpk.zeros, |z| -z) / product(&zpk.poles, |p| -p)).re;
    Zpk {
        zeros,
        poles: zpk.poles.iter().map(|&p| wo / p).collect(),
        gain,
    }
}

/// Split each root `r` into `r ± sqrt(r² - wo²)`, all `+` roots first.
fn split_band(roots: &[Complex64], wo: f64) -> Vec<Complex64> {
    let discriminants: Vec<Complex64> = roots.iter().map(|&r| (r * r - wo * wo).sqrt()).collect();
    let plus = roots.iter().zip(&discriminants).map(|(&r, &d)| r + d);
    let minus = roots.iter().zip(&discriminants).map(|(&r, &d)| r - d);
    plus.chain(minus).collect()
}

fn lp_to_bp(zpk: Zpk, wo: f64, bw: f64) -> Zpk {
    let degree = zpk.degree();
    let half = bw / 2.0;
    let z_lp: Vec<Complex64> = zpk.zeros.iter().map(|&z| z * half).collect();
    let p_lp: Vec<Complex64> = zpk.poles.iter().map(|&p| p * half).collect();

    let mut zeros = split_band(&z_lp, wo);
    zeros.extend(std::iter::repeat(Complex64::new(0.0, 0.0)).take(degree));
    Zpk {
        zeros,
        poles: split_band(&p_lp, wo),
        gain: zpk.gain * bw.powi(degree as i32),
    }
}

fn lp_to_bs(zpk: Zpk, wo: f64, bw: f64) -> Zpk {
    let degree = zpk.degree();
    let half = bw / 2.0;
    let z_hs: Vec<Complex64> = zpk.zeros.iter().map(|&z| half / z).collect();
    let p_hs: Vec<Complex64> = zpk.poles.iter().map(|&p| half / p).collect();

    let mut zeros = split_band(&z_hs, wo);
    zeros.extend(std::iter::repeat(Complex64::new(0.0, wo)).take(degree));
    zeros.extend(std::iter::repeat(Complex64::new(0.0, -wo)).take(degree));
    let gain = zpk.gain * (product(&zpk.zeros, |z| -z) / product(&zpk.poles, |p| -p)).re;
    Zpk {
        zeros,
        poles: split_band(&p_hs, wo),
        gain,
    }
}

/// Bilinear transform from the s-plane to the z-plane.
#[must_use]
pub fn bilinear(zpk: Zpk) -> Zpk {
    let degree = zpk.degree();
    let fs2 = 2.0 * FS;
    let map = |&r: &Complex64| (fs2 + r) / (fs2 - r);

    let mut zeros: Vec<Complex64> = zpk.zeros.iter().map(map).collect();
    // Zeros at infinity land on Nyquist
    zeros.extend(std::iter::repeat(Complex64::new(-1.0, 0.0)).take(degree));
    let gain =
        zpk.gain * (product(&zpk.zeros, |z| fs2 - z) / product(&zpk.poles, |p| fs2 - p)).re;
    Zpk {
        zeros,
        poles: zpk.poles.iter().map(map).collect(),
        gain,
    }
}

fn is_real(r: Complex64) -> bool {
    r.im.abs() <= 1e-10 * r.norm().max(1.0)
}

/// Group roots into pairs: conjugate pairs, then real roots two by two
/// (sorted), padding an odd real root with one at the origin.
fn pair_roots(roots: &[Complex64]) -> Vec<[Complex64; 2]> {
    let mut real: Vec<f64> = roots.iter().filter(|r| is_real(**r)).map(|r| r.re).collect();
    real.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mut pairs: Vec<[Complex64; 2]> = roots
        .iter()
        .filter(|r| !is_real(**r) && r.im > 0.0)
        .map(|&r| [r, r.conj()])
        .collect();
    pairs.extend(real.chunks(2).map(|chunk| {
        [
            Complex64::new(chunk[0], 0.0),
            Complex64::new(chunk.get(1).copied().unwrap_or(0.0), 0.0),
        ]
    }));
    pairs
}

/// Coefficients of `(x - r0)(x - r1)`.
fn quadratic(pair: &[Complex64; 2]) -> [f64; 3] {
    [1.0, -(pair[0] + pair[1]).re, (pair[0] * pair[1]).re]
}

/// Convert a digital zpk into second-order sections.
///
/// Sections are ordered so the poles closest to the unit circle come last;
/// each pole pair takes the nearest remaining zero pair. The overall gain
/// goes into the first section.
#[must_use]
pub fn zpk_to_sos(zpk: &Zpk) -> Vec<Biquad> {
    let mut pole_pairs = pair_roots(&zpk.poles);
    let mut zero_pairs = pair_roots(&zpk.zeros);

    let distance_to_circle = |pair: &[Complex64; 2]| {
        pair.iter()
            .map(|p| (1.0 - p.norm()).abs())
            .fold(f64::INFINITY, f64::min)
    };
    pole_pairs.sort_by(|a, b| {
        distance_to_circle(b)
            .partial_cmp(&distance_to_circle(a))
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut sections = Vec::with_capacity(pole_pairs.len());
    for poles in &pole_pairs {
        let zeros = if zero_pairs.is_empty() {
            [Complex64::new(0.0, 0.0); 2]
        } else {
            let nearest = zero_pairs
                .iter()
                .enumerate()
                .map(|(i, z)| (i, (z[0] - poles[0]).norm().min((z[1] - poles[0]).norm())))
                .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
                .map_or(0, |(i, _)| i);
            zero_pairs.remove(nearest)
        };
        sections.push(Biquad {
            b: quadratic(&zeros),
            a: quadratic(poles),
        });
    }

    if let Some(first) = sections.first_mut() {
        for b in &mut first.b {
            *b *= zpk.gain;
        }
    }
    sections
}

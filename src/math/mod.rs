//! Numerical building blocks for filtering.
//!
//! This module provides:
//! - [`butterworth`]: Butterworth design from analog prototype to sections
//! - [`sos`]: second-order section cascades and zero-phase filtering

pub mod butterworth;
pub mod sos;

pub use butterworth::{analog_prototype, bilinear, butter, zpk_to_sos, Zpk};
pub use sos::{Biquad, SosFilter};

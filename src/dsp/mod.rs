//! Signal-analysis building blocks. Everything here is pure and operates on
//! borrowed sample slices.

pub mod bands;
pub mod clipping;
pub mod energy;
pub mod framing;
pub mod pitch;
pub mod spectral;

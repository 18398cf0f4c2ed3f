use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::DiagnoseError;

/// Bit depth reported by the decoder, if it knows one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BitDepth {
    Bits(u32),
    Unknown,
}

impl fmt::Display for BitDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BitDepth::Bits(bits) => write!(f, "{bits}"),
            BitDepth::Unknown => f.write_str("Unknown"),
        }
    }
}

impl Serialize for BitDepth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl From<Option<u32>> for BitDepth {
    fn from(bits: Option<u32>) -> Self {
        bits.map_or(BitDepth::Unknown, BitDepth::Bits)
    }
}

/// A decoded mono clip, normalized to roughly [-1.0, 1.0].
#[derive(Clone, Debug, PartialEq)]
pub struct Signal {
    samples: Vec<f32>,
    sample_rate: u32,
    bit_depth: BitDepth,
}

impl Signal {
    pub fn new(samples: Vec<f32>, sample_rate: u32, bit_depth: BitDepth) -> Self {
        Self {
            samples,
            sample_rate,
            bit_depth,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn bit_depth(&self) -> BitDepth {
        self.bit_depth
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }

    pub fn validate(&self) -> Result<(), DiagnoseError> {
        if self.samples.is_empty() {
            return Err(DiagnoseError::invalid_input("the clip contains no samples"));
        }
        if self.sample_rate == 0 {
            return Err(DiagnoseError::invalid_input("the sample rate is zero"));
        }
        if let Some(pos) = self.samples.iter().position(|s| !s.is_finite()) {
            return Err(DiagnoseError::invalid_input(format!(
                "sample {pos} is not a finite number"
            )));
        }
        Ok(())
    }
}

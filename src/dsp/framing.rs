use serde::{Deserialize, Serialize};

use crate::error::DiagnoseError;

/// Frame length and hop, both in samples.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Framing {
    #[serde(default = "default_frame_length")]
    pub frame_length: usize,
    #[serde(default = "default_hop_length")]
    pub hop_length: usize,
}

fn default_frame_length() -> usize { 2048 }
fn default_hop_length() -> usize { 512 }

impl Default for Framing {
    fn default() -> Self {
        Self::new(default_frame_length(), default_hop_length())
    }
}

/// A fixed-length window over a signal. Only `data` is backed by real samples;
/// positions past `data.len()` read as zero.
#[derive(Clone, Copy, Debug)]
pub struct Frame<'a> {
    pub start: usize,
    pub data: &'a [f32],
    pub length: usize,
}

impl Framing {
    pub const fn new(frame_length: usize, hop_length: usize) -> Self {
        Self {
            frame_length,
            hop_length,
        }
    }

    pub fn validate(&self, name: &str) -> Result<(), DiagnoseError> {
        if self.frame_length == 0 || self.hop_length == 0 {
            return Err(DiagnoseError::InvalidConfig {
                reason: format!("{name}: frame and hop length must be positive"),
            });
        }
        if self.hop_length > self.frame_length {
            return Err(DiagnoseError::InvalidConfig {
                reason: format!(
                    "{name}: hop length {} exceeds frame length {}",
                    self.hop_length, self.frame_length
                ),
            });
        }
        Ok(())
    }

    /// Number of frames needed to cover `num_samples`, the last one zero-padded.
    pub fn frame_count(&self, num_samples: usize) -> usize {
        if num_samples == 0 {
            0
        } else if num_samples <= self.frame_length {
            1
        } else {
            1 + (num_samples - self.frame_length).div_ceil(self.hop_length)
        }
    }

    pub fn frames<'a>(&self, samples: &'a [f32]) -> Vec<Frame<'a>> {
        (0..self.frame_count(samples.len()))
            .map(|i| {
                let start = i * self.hop_length;
                let end = (start + self.frame_length).min(samples.len());
                Frame {
                    start,
                    data: &samples[start..end],
                    length: self.frame_length,
                }
            })
            .collect()
    }
}

impl Frame<'_> {
    pub fn is_padded(&self) -> bool {
        self.data.len() < self.length
    }

    /// All `length` samples, padding included.
    pub fn samples(&self) -> impl Iterator<Item = f32> + '_ {
        self.data
            .iter()
            .copied()
            .chain(std::iter::repeat(0.0))
            .take(self.length)
    }

    pub fn to_padded(&self) -> Vec<f32> {
        self.samples().collect()
    }
}

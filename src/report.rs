use anyhow::{Context, Result};
use image::RgbImage;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::audio::features::Metrics;
use crate::render::series::WaveformSeries;

/// One rendered image, or why there isn't one.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Artifact {
    Rendered {
        width: u32,
        height: u32,
        #[serde(skip)]
        image: RgbImage,
    },
    Saved {
        path: PathBuf,
    },
    Missing {
        reason: String,
    },
}

impl Artifact {
    pub fn rendered(image: RgbImage) -> Self {
        let (width, height) = image.dimensions();
        Artifact::Rendered {
            width,
            height,
            image,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Artifact::Missing { .. })
    }

    pub fn image(&self) -> Option<&RgbImage> {
        match self {
            Artifact::Rendered { image, .. } => Some(image),
            _ => None,
        }
    }

    /// Write a rendered image to `path` as PNG. Other states pass through.
    pub fn persist(self, path: &Path) -> Result<Artifact> {
        match self {
            Artifact::Rendered { image, .. } => {
                image
                    .save(path)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                Ok(Artifact::Saved {
                    path: path.to_path_buf(),
                })
            }
            other => Ok(other),
        }
    }
}

/// Everything one analysis produces. Built once and never mutated.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DiagnosticReport {
    #[serde(flatten)]
    pub metrics: Metrics,
    pub waveform: Artifact,
    pub spectrogram: Artifact,
    pub waveform_series: WaveformSeries,
}

impl DiagnosticReport {
    /// Names of the artifacts that could not be rendered.
    pub fn missing_artifacts(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.waveform.is_missing() {
            missing.push("waveform");
        }
        if self.spectrogram.is_missing() {
            missing.push("spectrogram");
        }
        missing
    }

    /// Write rendered images into `dir` as `<stem>_waveform.png` and
    /// `<stem>_spectrogram.png`, returning a report that points at the files.
    /// Either both images are written or neither is left behind.
    pub fn persist_artifacts(self, dir: &Path, stem: &str) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

        let waveform_path = dir.join(format!("{stem}_waveform.png"));
        let wrote_waveform = self.waveform.image().is_some();
        let waveform = self.waveform.persist(&waveform_path)?;

        let spectrogram = match self
            .spectrogram
            .persist(&dir.join(format!("{stem}_spectrogram.png")))
        {
            Ok(spectrogram) => spectrogram,
            Err(err) => {
                if wrote_waveform {
                    if let Err(cleanup) = std::fs::remove_file(&waveform_path) {
                        log::warn!(
                            "Could not remove {}: {}",
                            waveform_path.display(),
                            cleanup
                        );
                    }
                }
                return Err(err);
            }
        };

        Ok(Self {
            metrics: self.metrics,
            waveform,
            spectrogram,
            waveform_series: self.waveform_series,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::signal::BitDepth;
    use crate::dsp::bands::BandEnergy;
    use crate::dsp::pitch::PitchEstimate;
    use image::Rgb;

    fn report(waveform: Artifact, spectrogram: Artifact) -> DiagnosticReport {
        DiagnosticReport {
            metrics: Metrics {
                duration_secs: 1.5,
                sample_rate: 44100,
                bit_depth: BitDepth::Bits(16),
                average_rms: 0.1,
                average_pitch: PitchEstimate::Undefined,
                silence_percent: 10.0,
                clipping_percent: 0.0,
                bands: BandEnergy::default(),
            },
            waveform,
            spectrogram,
            waveform_series: WaveformSeries {
                stride: 1,
                points: vec![(0.0, 0.1)],
            },
        }
    }

    #[test]
    fn test_persist_writes_png_files() {
        let dir = tempfile::tempdir().unwrap();
        let image = RgbImage::from_pixel(4, 2, Rgb([10, 20, 30]));
        let saved = report(
            Artifact::rendered(image.clone()),
            Artifact::Missing {
                reason: "rendering disabled".into(),
            },
        )
        .persist_artifacts(dir.path(), "clip")
        .unwrap();

        let path = dir.path().join("clip_waveform.png");
        assert_eq!(saved.waveform, Artifact::Saved { path: path.clone() });
        assert!(saved.spectrogram.is_missing());
        assert_eq!(saved.missing_artifacts(), vec!["spectrogram"]);

        let reloaded = image::open(&path).unwrap().to_rgb8();
        assert_eq!(reloaded, image);
    }

    #[test]
    fn test_failed_spectrogram_write_leaves_no_waveform() {
        let dir = tempfile::tempdir().unwrap();
        // a directory in the way makes the spectrogram write fail
        std::fs::create_dir(dir.path().join("clip_spectrogram.png")).unwrap();

        let result = report(
            Artifact::rendered(RgbImage::new(4, 2)),
            Artifact::rendered(RgbImage::new(4, 2)),
        )
        .persist_artifacts(dir.path(), "clip");

        let err = result.unwrap_err();
        assert!(err.to_string().contains("clip_spectrogram.png"));
        assert!(!dir.path().join("clip_waveform.png").exists());
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(report(
            Artifact::rendered(RgbImage::new(3, 2)),
            Artifact::Missing {
                reason: "backend failed".into(),
            },
        ))
        .unwrap();

        assert_eq!(json["sample_rate"], 44100);
        assert_eq!(json["bit_depth"], "16");
        assert_eq!(json["average_pitch"]["status"], "undefined");
        assert_eq!(json["waveform"]["status"], "rendered");
        assert_eq!(json["waveform"]["width"], 3);
        assert!(json["waveform"].get("image").is_none());
        assert_eq!(json["spectrogram"]["reason"], "backend failed");
        assert_eq!(json["bands"]["low"], 0.0);
    }
}

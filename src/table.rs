//! Human-facing view of a report: rounding, unit scaling and status flags.
//! None of this feeds back into the metrics.

use std::fmt;

use crate::report::{Artifact, DiagnosticReport};

/// RMS is shown multiplied by this so typical speech lands in the tens to hundreds.
pub const RMS_DISPLAY_SCALE: f32 = 1000.0;
const RMS_LOW: f32 = 10.0;
const RMS_HIGH: f32 = 300.0;
const BAR_WIDTH: usize = 30;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowFlag {
    None,
    Ok,
    Low,
    High,
    Alert,
}

impl RowFlag {
    fn marker(&self) -> &'static str {
        match self {
            RowFlag::None => "",
            RowFlag::Ok => "ok",
            RowFlag::Low => "too quiet",
            RowFlag::High => "too loud",
            RowFlag::Alert => "clipping",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TableRow {
    pub label: &'static str,
    pub value: String,
    pub flag: RowFlag,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReportTable {
    pub rows: Vec<TableRow>,
    pub bands: [(&'static str, f32); 3],
    pub artifacts: Vec<(&'static str, String)>,
}

/// Whole seconds as `m:ss`.
pub fn format_duration(secs: f32) -> String {
    let total = secs.max(0.0) as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

pub fn round_to(value: f32, decimals: i32) -> f32 {
    let factor = 10f32.powi(decimals);
    (value * factor).round() / factor
}

fn rms_flag(scaled: f32) -> RowFlag {
    if scaled < RMS_LOW {
        RowFlag::Low
    } else if scaled > RMS_HIGH {
        RowFlag::High
    } else {
        RowFlag::Ok
    }
}

fn describe(artifact: &Artifact) -> String {
    match artifact {
        Artifact::Rendered { width, height, .. } => format!("rendered {width}x{height} (not saved)"),
        Artifact::Saved { path } => path.display().to_string(),
        Artifact::Missing { reason } => format!("missing: {reason}"),
    }
}

impl From<&DiagnosticReport> for ReportTable {
    fn from(report: &DiagnosticReport) -> Self {
        let m = &report.metrics;
        let rms_scaled = (m.average_rms * RMS_DISPLAY_SCALE).round();

        let row = |label, value: String, flag| TableRow { label, value, flag };
        let rows = vec![
            row("Duration", format_duration(m.duration_secs), RowFlag::None),
            row("Sample Rate (Hz)", m.sample_rate.to_string(), RowFlag::None),
            row("Bit Depth", m.bit_depth.to_string(), RowFlag::None),
            row("Average Volume (RMS)", format!("{rms_scaled:.0}"), rms_flag(rms_scaled)),
            row(
                "Average Pitch (Hz)",
                m.average_pitch
                    .hz()
                    .map_or_else(|| "N/A".to_string(), |hz| format!("{:.0}", hz.round())),
                RowFlag::None,
            ),
            row("Silence (%)", format!("{:.1}", round_to(m.silence_percent, 1)), RowFlag::None),
            row(
                "Clipping (%)",
                format!("{:.1}", round_to(m.clipping_percent, 1)),
                if m.clipping_percent > 0.0 { RowFlag::Alert } else { RowFlag::Ok },
            ),
        ];

        ReportTable {
            rows,
            bands: [
                ("Low", round_to(m.bands.low, 3)),
                ("Mid", round_to(m.bands.mid, 3)),
                ("High", round_to(m.bands.high, 3)),
            ],
            artifacts: vec![
                ("Waveform", describe(&report.waveform)),
                ("Spectrogram", describe(&report.spectrogram)),
            ],
        }
    }
}

impl fmt::Display for ReportTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            let marker = row.flag.marker();
            if marker.is_empty() {
                writeln!(f, "  {:<22} {}", row.label, row.value)?;
            } else {
                writeln!(f, "  {:<22} {:<10} [{}]", row.label, row.value, marker)?;
            }
        }

        writeln!(f, "  Frequency balance")?;
        let max = self.bands.iter().map(|(_, v)| *v).fold(0.0f32, f32::max);
        for (label, value) in &self.bands {
            let filled = if max > 0.0 {
                ((value / max) * BAR_WIDTH as f32).round() as usize
            } else {
                0
            };
            writeln!(f, "    {:<5} {:<width$} {:.3}", label, "#".repeat(filled), value, width = BAR_WIDTH)?;
        }

        for (label, description) in &self.artifacts {
            writeln!(f, "  {:<22} {}", label, description)?;
        }
        Ok(())
    }
}

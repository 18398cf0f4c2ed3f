use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "audiodiag", about = "Diagnostic report for recorded audio clips")]
pub struct Cli {
    /// Input audio files (WAV, MP3, FLAC, OGG)
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Directory for waveform and spectrogram images
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Report format printed to stdout
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Skip image rendering and report metrics only
    #[arg(long)]
    pub no_render: bool,

    /// Config file (defaults to audiodiag.toml or the user config dir)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Frames with RMS below this count as silent
    #[arg(long, default_value_t = 0.02)]
    pub silence_threshold: f32,

    /// Samples at or above this magnitude count as clipped
    #[arg(long, default_value_t = 0.98)]
    pub clipping_threshold: f32,

    /// Lowest pitch searched, in Hz
    #[arg(long, default_value_t = 50.0)]
    pub fmin: f32,

    /// Highest pitch searched, in Hz
    #[arg(long, default_value_t = 300.0)]
    pub fmax: f32,
}

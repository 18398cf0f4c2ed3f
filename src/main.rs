mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};

use audiodiag::config::{self, AnalysisConfig, Config};
use audiodiag::render::renderer_for;
use audiodiag::table::ReportTable;
use audiodiag::{decode_audio, DiagnosticReport, Diagnoser};
use cli::{Cli, OutputFormat};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let mut cli = Cli::parse();

    // Load config: explicit --config path, or auto-detect audiodiag.toml / global config
    let config_path = cli.config.clone().or_else(|| {
        let local = PathBuf::from("audiodiag.toml");
        if local.exists() {
            return Some(local);
        }
        if let Some(home) = dirs::home_dir() {
            let xdg = home.join(".config").join("audiodiag").join("config.toml");
            if xdg.exists() {
                return Some(xdg);
            }
        }
        if let Some(config_dir) = dirs::config_dir() {
            let platform = config_dir.join("audiodiag").join("config.toml");
            if platform.exists() {
                return Some(platform);
            }
        }
        None
    });

    let mut cfg = Config::default();
    if let Some(ref path) = config_path {
        if let Some(loaded) = config::load_config(path) {
            log::info!("Loaded config from {}", path.display());
            cfg = loaded;
        } else {
            log::warn!("Failed to load config from {}", path.display());
        }
    }

    // Merge: CLI values override the file only when moved off their defaults
    let mut analysis = cfg.analysis;
    if cli.silence_threshold != 0.02 { analysis.silence_threshold = cli.silence_threshold; }
    if cli.clipping_threshold != 0.98 { analysis.clipping_threshold = cli.clipping_threshold; }
    if cli.fmin != 50.0 { analysis.pitch.fmin = cli.fmin; }
    if cli.fmax != 300.0 { analysis.pitch.fmax = cli.fmax; }
    if cli.output == Path::new(".") {
        if let Some(dir) = cfg.output.dir.take() {
            cli.output = dir;
        }
    }
    if cli.format == OutputFormat::Table && cfg.output.format.as_deref() == Some("json") {
        cli.format = OutputFormat::Json;
    }
    let mut render = cfg.render;
    if cli.no_render {
        render.enabled = false;
    }

    let diagnoser = Diagnoser::new(analysis)?.with_renderer(renderer_for(&render));
    log_config(diagnoser.config());

    let pb = ProgressBar::new(cli.inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} files {msg}")
            .context("Invalid progress bar template")?
            .progress_chars("=>-"),
    );

    let mut failures = 0usize;
    for input in &cli.inputs {
        pb.set_message(input.display().to_string());
        match diagnose_file(&diagnoser, input, &cli.output) {
            Ok(report) => pb.suspend(|| print_report(input, &report, cli.format))?,
            Err(err) => {
                failures += 1;
                pb.suspend(|| eprintln!("Error analyzing {}: {:#}", input.display(), err));
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    if failures > 0 {
        anyhow::bail!("{} of {} files could not be analyzed", failures, cli.inputs.len());
    }
    Ok(())
}

fn diagnose_file(diagnoser: &Diagnoser, input: &Path, output_dir: &Path) -> Result<DiagnosticReport> {
    log::info!("Decoding {}...", input.display());
    let signal = decode_audio(input)?;

    let report = diagnoser
        .diagnose(&signal)
        .with_context(|| format!("Cannot diagnose {}", input.display()))?;

    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("audio");
    report.persist_artifacts(output_dir, stem)
}

fn print_report(input: &Path, report: &DiagnosticReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            println!("{}", input.display());
            print!("{}", ReportTable::from(report));
        }
        OutputFormat::Json => {
            let value = serde_json::json!({
                "file": input,
                "report": report,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }
    Ok(())
}

fn log_config(config: &AnalysisConfig) {
    log::info!(
        "Thresholds: silence<{}, clipping>={}, pitch {}-{} Hz",
        config.silence_threshold,
        config.clipping_threshold,
        config.pitch.fmin,
        config.pitch.fmax
    );
    log::info!(
        "Framing (frame/hop): rms {}/{}, spectral {}/{}, pitch {}/{}",
        config.rms_framing.frame_length,
        config.rms_framing.hop_length,
        config.spectral_framing.frame_length,
        config.spectral_framing.hop_length,
        config.pitch.framing.frame_length,
        config.pitch.framing.hop_length
    );
}

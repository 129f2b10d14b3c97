use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};

use mixref::audio::{decode_audio, resample, AudioBuffer};
use mixref::cli::Cli;
use mixref::config;
use mixref::probe;
use mixref::report::FileInfo;
use mixref::run_comparison;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let mut cli = Cli::parse();

    // Load config: explicit --config path, or auto-detect mixref.toml / global config
    let config_path = cli.config.clone().or_else(|| {
        let local = PathBuf::from("mixref.toml");
        if local.exists() {
            return Some(local);
        }
        if let Some(home) = dirs::home_dir() {
            let xdg = home.join(".config").join("mixref").join("config.toml");
            if xdg.exists() {
                return Some(xdg);
            }
        }
        if let Some(config_dir) = dirs::config_dir() {
            let platform = config_dir.join("mixref").join("config.toml");
            if platform.exists() {
                return Some(platform);
            }
        }
        None
    });
    if let Some(ref path) = config_path {
        if let Some(cfg) = config::load_config(path) {
            log::info!("Loaded config from {}", path.display());
            // Merge: config values apply only when CLI is at its default
            if cli.sample_rate == 22050 {
                cli.sample_rate = cfg.analysis.sample_rate;
            }
            if cli.spectrum_points == 200 {
                cli.spectrum_points = cfg.analysis.spectrum_points;
            }
        } else {
            log::warn!("Failed to load config from {}", path.display());
        }
    }

    if !cli.your_mix.exists() {
        anyhow::bail!("Mix file not found: {}", cli.your_mix.display());
    }
    if !cli.reference.exists() {
        anyhow::bail!("Reference file not found: {}", cli.reference.display());
    }
    if cli.sample_rate == 0 {
        anyhow::bail!("Analysis sample rate must be greater than zero");
    }

    log::info!("mixref - mix vs reference comparison");
    log::info!("Your mix: {}", cli.your_mix.display());
    log::info!("Reference: {}", cli.reference.display());
    log::info!("Analysis rate: {}Hz", cli.sample_rate);

    let (mix_buffer, mix_info) = load_track(
        &cli.your_mix,
        cli.sample_rate,
        cli.mix_start,
        cli.mix_end,
    )?;
    let (reference_buffer, reference_info) = load_track(
        &cli.reference,
        cli.sample_rate,
        cli.ref_start,
        cli.ref_end,
    )?;

    let result = run_comparison(
        &mix_buffer,
        mix_info,
        &reference_buffer,
        reference_info,
        cli.spectrum_points,
    );

    let json = if cli.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    match &cli.output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            log::info!("Report written to {}", path.display());
        }
        None => println!("{}", json),
    }

    for line in &result.suggestions.summary {
        log::info!("{}", line);
    }

    Ok(())
}

/// Decode, resample to the analysis rate, apply the trim region, and
/// gather the file metadata for the report.
fn load_track(
    path: &Path,
    target_rate: u32,
    start_seconds: Option<f64>,
    end_seconds: Option<f64>,
) -> Result<(AudioBuffer, FileInfo)> {
    let decoded = decode_audio(path)?;

    let channels = resample(
        decoded.buffer.channels(),
        decoded.buffer.sample_rate(),
        target_rate,
    )
    .with_context(|| format!("Failed to resample {}", path.display()))?;
    let buffer = AudioBuffer::new(channels, target_rate)?;

    let buffer = if start_seconds.is_some() || end_seconds.is_some() {
        buffer.trimmed(start_seconds, end_seconds)?
    } else {
        buffer
    };

    // Container probing is best-effort; a miss only costs metadata.
    let container = probe::probe(path);
    if container.is_none() {
        log::debug!("ffprobe unavailable or failed for {}", path.display());
    }

    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let info = FileInfo {
        filename,
        duration_seconds: (buffer.duration_seconds() * 10.0).round() / 10.0,
        format: decoded.format_label,
        sample_rate: decoded.source_sample_rate,
        channels: decoded.source_channels,
        codec: container.as_ref().and_then(|c| c.codec.clone()),
        bit_rate: container.as_ref().and_then(|c| c.bit_rate),
    };

    Ok((buffer, info))
}

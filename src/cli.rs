use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "mixref", about = "Compare a mix against a reference track and get mixing advice")]
pub struct Cli {
    /// Your mix (WAV, MP3, FLAC, OGG, AAC)
    pub your_mix: PathBuf,

    /// Reference track to compare against
    pub reference: PathBuf,

    /// Write the JSON report to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Analysis sample rate; both tracks are resampled to this before analysis
    #[arg(long, default_value_t = 22050)]
    pub sample_rate: u32,

    /// Maximum number of points in each spectrum curve
    #[arg(long, default_value_t = 200)]
    pub spectrum_points: usize,

    /// Analyze your mix starting at this time (seconds)
    #[arg(long)]
    pub mix_start: Option<f64>,

    /// Analyze your mix up to this time (seconds)
    #[arg(long)]
    pub mix_end: Option<f64>,

    /// Analyze the reference starting at this time (seconds)
    #[arg(long)]
    pub ref_start: Option<f64>,

    /// Analyze the reference up to this time (seconds)
    #[arg(long)]
    pub ref_end: Option<f64>,

    /// Pretty-print the JSON report
    #[arg(long)]
    pub pretty: bool,

    /// Config file path (default: mixref.toml, then the user config dir)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

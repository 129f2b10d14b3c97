use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Deserialize)]
pub struct AnalysisConfig {
    /// Both tracks are resampled to this rate; 22050 trades a little
    /// accuracy above 11 kHz for a large speed win.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    #[serde(default = "default_spectrum_points")]
    pub spectrum_points: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            spectrum_points: default_spectrum_points(),
        }
    }
}

fn default_sample_rate() -> u32 { 22050 }
fn default_spectrum_points() -> usize { 200 }

pub fn load_config(path: &PathBuf) -> Option<Config> {
    let content = std::fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}

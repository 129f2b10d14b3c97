use anyhow::{Context, Result};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

/// Resample planar audio from `from_rate` to `to_rate` using rubato.
/// The whole buffer is converted in a single pass.
pub fn resample(channels: &[Vec<f32>], from_rate: u32, to_rate: u32) -> Result<Vec<Vec<f32>>> {
    if from_rate == to_rate || channels.is_empty() || channels[0].is_empty() {
        return Ok(channels.to_vec());
    }

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let ratio = to_rate as f64 / from_rate as f64;
    let mut resampler = SincFixedIn::<f32>::new(
        ratio,
        2.0, // max relative ratio
        params,
        channels[0].len(),
        channels.len(),
    )
    .context("Failed to create resampler")?;

    let input: Vec<Vec<f32>> = channels.to_vec();
    let output = resampler
        .process(&input, None)
        .context("Resampling failed")?;

    Ok(output)
}

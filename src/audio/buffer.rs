use thiserror::Error;

/// Input validation failures. These fail fast, before any analyzer runs;
/// everything past buffer construction resolves degeneracy with
/// deterministic fallbacks instead of errors.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("audio buffer is empty")]
    EmptyBuffer,
    #[error("sample rate must be greater than zero")]
    ZeroSampleRate,
    #[error("unsupported channel layout: {0} channels (expected 1 or 2)")]
    UnsupportedChannels(usize),
    #[error("trim region {start:.2}s..{end:.2}s selects no audio")]
    EmptyTrimRegion { start: f64, end: f64 },
}

/// Decoded audio, planar: one `Vec<f32>` per channel. Analyzers borrow it
/// read-only; nothing mutates a buffer after construction.
#[derive(Clone, Debug)]
pub struct AudioBuffer {
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
}

impl AudioBuffer {
    pub fn new(mut channels: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self, InputError> {
        if sample_rate == 0 {
            return Err(InputError::ZeroSampleRate);
        }
        if channels.is_empty() || channels.len() > 2 {
            return Err(InputError::UnsupportedChannels(channels.len()));
        }
        // Resamplers can emit off-by-a-few channel lengths; align on the
        // shortest so frames stay paired.
        let min_len = channels.iter().map(Vec::len).min().unwrap_or(0);
        if min_len == 0 {
            return Err(InputError::EmptyBuffer);
        }
        for channel in channels.iter_mut() {
            channel.truncate(min_len);
        }
        Ok(Self {
            channels,
            sample_rate,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Samples per channel.
    pub fn len(&self) -> usize {
        self.channels[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_mono(&self) -> bool {
        self.channels.len() == 1
    }

    pub fn duration_seconds(&self) -> f64 {
        self.len() as f64 / self.sample_rate as f64
    }

    /// Channel mean, used by the single-channel analyzers.
    pub fn to_mono(&self) -> Vec<f32> {
        match self.channels.as_slice() {
            [mono] => mono.clone(),
            [left, right] => left
                .iter()
                .zip(right)
                .map(|(&l, &r)| (l + r) * 0.5)
                .collect(),
            _ => unreachable!("validated at construction"),
        }
    }

    /// Returns a copy restricted to `[start_seconds, end_seconds)`. An
    /// open end runs to the end of the buffer.
    pub fn trimmed(
        &self,
        start_seconds: Option<f64>,
        end_seconds: Option<f64>,
    ) -> Result<Self, InputError> {
        let start = start_seconds.unwrap_or(0.0).max(0.0);
        let start_sample = ((start * self.sample_rate as f64) as usize).min(self.len());
        let end_sample = match end_seconds {
            Some(end) => ((end * self.sample_rate as f64) as usize).min(self.len()),
            None => self.len(),
        };
        if start_sample >= end_sample {
            return Err(InputError::EmptyTrimRegion {
                start,
                end: end_seconds.unwrap_or(self.duration_seconds()),
            });
        }
        let channels = self
            .channels
            .iter()
            .map(|ch| ch[start_sample..end_sample].to_vec())
            .collect();
        Self::new(channels, self.sample_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_input() {
        assert!(matches!(
            AudioBuffer::new(vec![vec![0.0]], 0),
            Err(InputError::ZeroSampleRate)
        ));
        assert!(matches!(
            AudioBuffer::new(vec![], 44100),
            Err(InputError::UnsupportedChannels(0))
        ));
        assert!(matches!(
            AudioBuffer::new(vec![vec![]; 3], 44100),
            Err(InputError::UnsupportedChannels(3))
        ));
        assert!(matches!(
            AudioBuffer::new(vec![vec![]], 44100),
            Err(InputError::EmptyBuffer)
        ));
    }

    #[test]
    fn mono_fold_averages_channels() {
        let buffer = AudioBuffer::new(vec![vec![1.0, 0.0], vec![0.0, 1.0]], 44100).unwrap();
        assert_eq!(buffer.to_mono(), vec![0.5, 0.5]);
    }

    #[test]
    fn trim_selects_the_requested_region() {
        let samples: Vec<f32> = (0..1000).map(|i| i as f32).collect();
        let buffer = AudioBuffer::new(vec![samples], 1000).unwrap();
        let trimmed = buffer.trimmed(Some(0.25), Some(0.75)).unwrap();
        assert_eq!(trimmed.len(), 500);
        assert_eq!(trimmed.channels()[0][0], 250.0);
    }

    #[test]
    fn empty_trim_region_fails_fast() {
        let buffer = AudioBuffer::new(vec![vec![0.0; 100]], 100).unwrap();
        assert!(buffer.trimmed(Some(2.0), None).is_err());
        assert!(buffer.trimmed(Some(0.8), Some(0.2)).is_err());
    }
}

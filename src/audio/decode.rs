use anyhow::{Context, Result};
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::buffer::AudioBuffer;

/// A decoded track at its source sample rate, plus the metadata the report
/// carries for the file.
pub struct DecodedTrack {
    pub buffer: AudioBuffer,
    pub source_sample_rate: u32,
    pub source_channels: usize,
    pub format_label: String,
}

pub fn decode_audio(path: &Path) -> Result<DecodedTrack> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open audio file: {}", path.display()))?;

    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .context("Failed to probe audio format")?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != symphonia::core::codecs::CODEC_TYPE_NULL)
        .context("No audio tracks found")?;

    let track_id = track.id;
    let channels = track.codec_params.channels.map_or(1, |c| c.count());
    let sample_rate = track.codec_params.sample_rate.context("Unknown sample rate")?;

    let codec_name = symphonia::default::get_codecs()
        .get_codec(track.codec_params.codec)
        .map(|descriptor| descriptor.short_name);
    let format_label = match (path.extension().and_then(|e| e.to_str()), codec_name) {
        (Some(ext), Some(codec)) => format!("{} ({})", ext.to_uppercase(), codec),
        (Some(ext), None) => ext.to_uppercase(),
        (None, Some(codec)) => codec.to_string(),
        (None, None) => "UNKNOWN".to_string(),
    };

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .context("Failed to create audio decoder")?;

    // Keep up to two channels planar; anything beyond stereo is dropped so
    // the engine only ever sees a mono or stereo buffer.
    let keep = channels.min(2);
    let mut planar: Vec<Vec<f32>> = vec![Vec::new(); keep];

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => return Err(e.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(symphonia::core::errors::Error::DecodeError(_)) => continue,
            Err(e) => return Err(e.into()),
        };

        let spec = *decoded.spec();
        let num_frames = decoded.frames();

        let mut sample_buf = SampleBuffer::<f32>::new(num_frames as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);

        for frame in sample_buf.samples().chunks_exact(channels) {
            for (ch, out) in planar.iter_mut().enumerate() {
                out.push(frame[ch]);
            }
        }
    }

    let buffer = AudioBuffer::new(planar, sample_rate)
        .with_context(|| format!("Decoded no usable audio from {}", path.display()))?;

    log::info!(
        "Decoded {}: {} samples x {} ch, {}Hz, {:.1}s",
        path.display(),
        buffer.len(),
        buffer.channel_count(),
        sample_rate,
        buffer.duration_seconds()
    );

    Ok(DecodedTrack {
        buffer,
        source_sample_rate: sample_rate,
        source_channels: channels,
        format_label,
    })
}

use std::io::Cursor;

use claxon::FlacReader;
use hound::{SampleFormat, WavReader};
use rubato::{FastFixedIn, PolynomialDegree, Resampler};

use crate::error::AssessmentError;
use crate::types::Waveform;

/// Decodes an in-memory WAV or FLAC file into interleaved `f32` samples in `[-1, 1]`.
pub fn decode(bytes: &[u8]) -> Result<Waveform, AssessmentError> {
    if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WAVE" {
        decode_wav(bytes)
    } else if bytes.starts_with(b"fLaC") {
        decode_flac(bytes)
    } else {
        Err(AssessmentError::audio_format(
            "unrecognized container (expected WAV or FLAC)",
        ))
    }
}

fn decode_wav(bytes: &[u8]) -> Result<Waveform, AssessmentError> {
    let reader = WavReader::new(Cursor::new(bytes))
        .map_err(|e| AssessmentError::audio_format(format!("failed to read WAV header: {e}")))?;
    let spec = reader.spec();

    let samples = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AssessmentError::audio_format(format!("failed reading WAV sample: {e}")))?,
        SampleFormat::Int => {
            let scale = int_scale(u32::from(spec.bits_per_sample));
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| {
                    AssessmentError::audio_format(format!("failed reading WAV sample: {e}"))
                })?
        }
    };

    Ok(Waveform {
        samples,
        sample_rate_hz: spec.sample_rate,
        channels: spec.channels,
    })
}

fn decode_flac(bytes: &[u8]) -> Result<Waveform, AssessmentError> {
    let mut reader = FlacReader::new(Cursor::new(bytes))
        .map_err(|e| AssessmentError::audio_format(format!("failed to decode FLAC: {e}")))?;
    let streaminfo = reader.streaminfo();
    let scale = int_scale(streaminfo.bits_per_sample);
    let channels = u16::try_from(streaminfo.channels)
        .map_err(|_| AssessmentError::audio_format("FLAC channel count out of range"))?;

    let mut samples = Vec::new();
    for sample in reader.samples() {
        let sample = sample.map_err(|e| {
            AssessmentError::audio_format(format!("failed reading FLAC sample: {e}"))
        })?;
        samples.push(sample as f32 / scale);
    }

    Ok(Waveform {
        samples,
        sample_rate_hz: streaminfo.sample_rate,
        channels,
    })
}

fn int_scale(bits_per_sample: u32) -> f32 {
    if bits_per_sample > 1 {
        ((1_i64 << (bits_per_sample - 1)) - 1) as f32
    } else {
        1.0
    }
}

/// Mono samples at `target_rate_hz`, ready for the recognizer.
///
/// An empty waveform passes through as an empty buffer.
pub fn prepare(waveform: &Waveform, target_rate_hz: u32) -> Result<Vec<f32>, AssessmentError> {
    if waveform.sample_rate_hz == 0 || target_rate_hz == 0 {
        return Err(AssessmentError::audio_format("sample rate must be non-zero"));
    }
    if waveform.channels == 0 {
        return Err(AssessmentError::audio_format("waveform has zero channels"));
    }
    let channels = usize::from(waveform.channels);
    if waveform.samples.len() % channels != 0 {
        return Err(AssessmentError::audio_format(format!(
            "{} samples do not divide into {channels} channels",
            waveform.samples.len()
        )));
    }
    if waveform.samples.iter().any(|s| !s.is_finite()) {
        return Err(AssessmentError::audio_format("waveform contains non-finite samples"));
    }
    if waveform.samples.is_empty() {
        return Ok(Vec::new());
    }

    let mono = downmix(&waveform.samples, channels);
    if waveform.sample_rate_hz == target_rate_hz {
        return Ok(mono);
    }

    tracing::warn!(
        from_hz = waveform.sample_rate_hz,
        to_hz = target_rate_hz,
        frames = mono.len(),
        "audio: resampling recording"
    );
    resample(mono, waveform.sample_rate_hz, target_rate_hz)
}

fn downmix(samples: &[f32], channels: usize) -> Vec<f32> {
    if channels == 1 {
        return samples.to_vec();
    }
    samples
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

fn resample(mono: Vec<f32>, from_hz: u32, to_hz: u32) -> Result<Vec<f32>, AssessmentError> {
    let input_frames = mono.len();
    let mut resampler = FastFixedIn::<f32>::new(
        f64::from(to_hz) / f64::from(from_hz),
        1.0,
        PolynomialDegree::Septic,
        input_frames,
        1,
    )
    .map_err(|e| AssessmentError::audio_format(format!("failed to create resampler: {e}")))?;

    let mut output = resampler
        .process(&[mono], None)
        .map_err(|e| AssessmentError::audio_format(format!("resampling failed: {e}")))?;
    let resampled = output.pop().unwrap_or_default();

    tracing::debug!(
        input_frames,
        output_frames = resampled.len(),
        "audio: resampled"
    );
    Ok(resampled)
}

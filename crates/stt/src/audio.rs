//! Audio inspection and loading
//!
//! Checks that an uploaded file is readable audio before any recognizer
//! sees it, and decodes it into the 16kHz mono f32 samples whisper.cpp expects

use speechcheck_common::{Result, SpeechCheckError};
use std::fs::File;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CodecParameters, Decoder, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, info, warn};

/// Sample rate required by Whisper
pub const WHISPER_SAMPLE_RATE: u32 = 16_000;

/// Decoded audio (interleaved f32 samples)
pub struct AudioBuffer {
    /// Audio samples normalized to [-1.0, 1.0]
    pub samples: Vec<f32>,

    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Number of channels
    pub channels: u16,
}

impl AudioBuffer {
    /// Create a new audio buffer
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        Self {
            samples,
            sample_rate,
            channels,
        }
    }

    /// Duration in seconds
    pub fn duration(&self) -> f32 {
        let frames = self.samples.len() / self.channels.max(1) as usize;
        frames as f32 / self.sample_rate as f32
    }

    /// Downmix to mono by averaging channels
    pub fn to_mono(mut self) -> Self {
        if self.channels <= 1 {
            return self;
        }

        let channels = self.channels as usize;
        self.samples = self
            .samples
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect();
        self.channels = 1;
        self
    }

    /// Linear-interpolation resample of mono audio
    pub fn resample(mut self, target_rate: u32) -> Self {
        if self.sample_rate == target_rate || self.samples.is_empty() {
            return self;
        }

        debug!("Resampling from {}Hz to {}Hz", self.sample_rate, target_rate);

        let ratio = self.sample_rate as f64 / target_rate as f64;
        let new_length = (self.samples.len() as f64 / ratio) as usize;
        let last = self.samples.len() - 1;

        self.samples = (0..new_length)
            .map(|i| {
                let src = i as f64 * ratio;
                let floor = (src.floor() as usize).min(last);
                let ceil = (floor + 1).min(last);
                let fraction = (src - floor as f64) as f32;
                self.samples[floor] * (1.0 - fraction) + self.samples[ceil] * fraction
            })
            .collect();
        self.sample_rate = target_rate;
        self
    }
}

/// Decode an audio file into 16kHz mono samples
pub fn load_for_whisper(path: &Path) -> Result<Vec<f32>> {
    let buffer = decode_file(path)?;
    info!(
        "Decoded {}: {:.1}s, {}Hz, {} channel(s)",
        path.display(),
        buffer.duration(),
        buffer.sample_rate,
        buffer.channels
    );

    Ok(buffer.to_mono().resample(WHISPER_SAMPLE_RATE).samples)
}

/// Opened container plus a decoder for its default track
struct OpenedTrack {
    format: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    sample_rate: u32,
    channels: u16,
}

fn open_track(path: &Path) -> Result<OpenedTrack> {
    let file = File::open(path).map_err(|e| {
        SpeechCheckError::file_system(format!("Failed to open {}: {}", path.display(), e))
    })?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| SpeechCheckError::audio_decode(format!("probe: {}", e)))?;
    let format = probed.format;

    let track = format
        .default_track()
        .ok_or_else(|| SpeechCheckError::audio_decode("no audio track found"))?;
    let track_id = track.id;
    let codec_params: CodecParameters = track.codec_params.clone();

    let sample_rate = codec_params
        .sample_rate
        .ok_or_else(|| SpeechCheckError::audio_decode("unknown sample rate"))?;
    let channels = codec_params.channels.map(|c| c.count()).unwrap_or(1) as u16;

    let decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| SpeechCheckError::audio_decode(format!("codec: {}", e)))?;

    Ok(OpenedTrack {
        format,
        decoder,
        track_id,
        sample_rate,
        channels,
    })
}

/// Check that a file is audio we can read, without decoding the samples
///
/// Fails with `AudioDecode` for unrecognized containers or codecs and with
/// `FileSystem` when the file cannot be opened.
pub fn validate_file(path: &Path) -> Result<()> {
    let track = open_track(path)?;
    debug!(
        "Audio accepted: {} ({}Hz, {} channel(s))",
        path.display(),
        track.sample_rate,
        track.channels
    );
    Ok(())
}

/// Decode the first audio track of a file
pub fn decode_file(path: &Path) -> Result<AudioBuffer> {
    let OpenedTrack {
        mut format,
        mut decoder,
        track_id,
        sample_rate,
        channels,
    } = open_track(path)?;

    let mut samples = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(ref e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(e) => return Err(SpeechCheckError::audio_decode(format!("packet: {}", e))),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(e)) => {
                warn!("Skipping corrupt audio frame: {}", e);
                continue;
            }
            Err(e) => return Err(SpeechCheckError::audio_decode(format!("decode: {}", e))),
        };

        if decoded.frames() == 0 {
            continue;
        }

        let mut sample_buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, *decoded.spec());
        sample_buf.copy_interleaved_ref(decoded);
        samples.extend_from_slice(sample_buf.samples());
    }

    Ok(AudioBuffer::new(samples, sample_rate, channels))
}

/// 16-bit PCM WAV bytes for tests in this crate
#[cfg(test)]
pub(crate) fn wav_bytes(samples: &[i16], sample_rate: u32, channels: u16) -> Vec<u8> {
    let data_len = (samples.len() * 2) as u32;
    let byte_rate = sample_rate * channels as u32 * 2;

    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
    bytes.extend_from_slice(b"WAVEfmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&channels.to_le_bytes());
    bytes.extend_from_slice(&sample_rate.to_le_bytes());
    bytes.extend_from_slice(&byte_rate.to_le_bytes());
    bytes.extend_from_slice(&(channels * 2).to_le_bytes());
    bytes.extend_from_slice(&16u16.to_le_bytes());
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_len.to_le_bytes());
    for s in samples {
        bytes.extend_from_slice(&s.to_le_bytes());
    }
    bytes
}

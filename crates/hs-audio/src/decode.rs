use std::io::Cursor;
use std::path::Path;

use hs_core::signal::AudioSignal;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSourceStream, MediaSourceStreamOptions};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::AudioError;

/// Read a WAV file from disk and decode it to a mono signal.
///
/// # Errors
/// Returns `AudioError::Decode` if the file cannot be read or is not a valid WAV.
///
/// # Example
/// ```no_run
/// use hs_audio::decode::decode_file;
/// let signal = decode_file("a0001.wav").unwrap();
/// println!("{} samples @ {} Hz", signal.len(), signal.sample_rate());
/// ```
pub fn decode_file(path: impl AsRef<Path>) -> Result<AudioSignal, AudioError> {
    let path = path.as_ref();
    let name = path.display();
    let bytes = std::fs::read(path)
        .map_err(|e| AudioError::Decode(format!("Cannot open {name}: {e}")))?;
    let signal = decode_wav(&bytes)?;
    log::debug!(
        "Decoded {} samples @ {}Hz from {}",
        signal.len(),
        signal.sample_rate(),
        path.display()
    );
    Ok(signal)
}

/// Decode WAV bytes into a mono f64 signal.
///
/// 16-bit PCM is divided by 32768, 32-bit PCM by 2147483648, float PCM is
/// passed through. Multi-channel input keeps channel 0 only (no downmix).
///
/// # Errors
/// Returns `AudioError::Decode` if the bytes are not a well-formed WAV
/// container or hold no samples.
pub fn decode_wav(bytes: &[u8]) -> Result<AudioSignal, AudioError> {
    let mss = MediaSourceStream::new(
        Box::new(Cursor::new(bytes.to_vec())),
        MediaSourceStreamOptions::default(),
    );

    let mut hint = Hint::new();
    hint.with_extension("wav");

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| AudioError::Decode(format!("Not a WAV container: {e}")))?;

    let mut format = probed.format;
    let track = format
        .default_track()
        .ok_or_else(|| AudioError::Decode("No audio track found".into()))?;

    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| AudioError::Decode("Missing sample rate".into()))?;
    let channels = track
        .codec_params
        .channels
        .map_or(1, symphonia::core::audio::Channels::count)
        .max(1);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| AudioError::Decode(format!("Unsupported codec: {e}")))?;

    let track_id = track.id;
    let mut samples: Vec<f64> = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f64>> = None;
    let mut max_sample_frames: usize = 0;

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(SymphoniaError::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(AudioError::Decode(format!("Corrupted WAV data: {e}"))),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(e) => {
                log::warn!("WAV decode frame error: {e}");
                continue;
            }
        };

        let spec = *decoded.spec();
        let num_frames = decoded.capacity();
        // Reuse SampleBuffer: only reallocate if this packet is bigger than current capacity
        if sample_buf.is_none() || num_frames > max_sample_frames {
            sample_buf = Some(SampleBuffer::<f64>::new(num_frames as u64, spec));
            max_sample_frames = num_frames;
        }
        let Some(buf) = sample_buf.as_mut() else {
            continue;
        };
        buf.copy_interleaved_ref(decoded);

        // Canal 0 uniquement
        let frames = buf.samples().chunks(channels);
        samples.extend(frames.map(|frame| frame[0]));
    }

    let signal = AudioSignal::new(samples, sample_rate);
    signal.map_err(|e| AudioError::Decode(e.to_string()))
}

// In-memory WAV fixtures for unit tests.

use std::io::Cursor;

fn write<S: hound::Sample + Copy>(
    samples: &[S],
    channels: u16,
    sample_rate: u32,
    bits_per_sample: u16,
    sample_format: hound::SampleFormat,
) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample,
        sample_format,
    };
    let mut bytes = Vec::new();
    {
        let cursor = Cursor::new(&mut bytes);
        let mut writer = hound::WavWriter::new(cursor, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }
    bytes
}

pub(crate) fn wav_i16(samples: &[i16], channels: u16, sample_rate: u32) -> Vec<u8> {
    write(samples, channels, sample_rate, 16, hound::SampleFormat::Int)
}

pub(crate) fn wav_i32(samples: &[i32], channels: u16, sample_rate: u32) -> Vec<u8> {
    write(samples, channels, sample_rate, 32, hound::SampleFormat::Int)
}

pub(crate) fn wav_f32(samples: &[f32], channels: u16, sample_rate: u32) -> Vec<u8> {
    let format = hound::SampleFormat::Float;
    write(samples, channels, sample_rate, 32, format)
}

/// Mono 16-bit WAV of a 150 Hz tone with a 40 Hz component, `secs` long.
pub(crate) fn tone_i16(sample_rate: u32, secs: f64) -> Vec<u8> {
    let n = (f64::from(sample_rate) * secs).round() as usize;
    let samples: Vec<i16> = (0..n)
        .map(|i| {
            let t = i as f64 / f64::from(sample_rate);
            let v = 0.5 * (2.0 * std::f64::consts::PI * 150.0 * t).sin()
                + 0.2 * (2.0 * std::f64::consts::PI * 40.0 * t).sin();
            (v * 32767.0) as i16
        })
        .collect();
    wav_i16(&samples, 1, sample_rate)
}

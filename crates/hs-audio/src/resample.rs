use hs_core::signal::AudioSignal;
use realfft::RealFftPlanner;
use realfft::num_complex::Complex;

use crate::error::AudioError;

/// Output length for a rate change: `round(len * target / source)`.
///
/// # Example
/// ```
/// use hs_audio::resample::resampled_len;
/// assert_eq!(resampled_len(40_000, 8000, 1000), 5000);
/// assert_eq!(resampled_len(4410, 44_100, 1000), 100);
/// ```
#[must_use]
pub fn resampled_len(len: usize, source_rate: u32, target_rate: u32) -> usize {
    (len as f64 * f64::from(target_rate) / f64::from(source_rate)).round() as usize
}

/// Band-limited resampling in the Fourier domain.
///
/// The signal's real spectrum is truncated (downsampling) or zero-extended
/// (upsampling) to the new length, then inverted. Content below the new
/// Nyquist frequency is kept; the result is deterministic.
///
/// Identical rates return the signal unchanged.
///
/// # Errors
/// Returns `AudioError::FeatureExtraction` if the target length rounds to zero
/// or the FFT rejects its buffers.
///
/// # Example
/// ```
/// use hs_core::signal::AudioSignal;
/// use hs_audio::resample::resample;
/// let signal = AudioSignal::new(vec![0.1; 8000], 4000).unwrap();
/// let out = resample(&signal, 1000).unwrap();
/// assert_eq!(out.len(), 2000);
/// assert_eq!(out.sample_rate(), 1000);
/// ```
pub fn resample(signal: &AudioSignal, target_rate: u32) -> Result<AudioSignal, AudioError> {
    if target_rate == 0 {
        return Err(AudioError::extraction(
            "resample",
            "target rate must be > 0",
        ));
    }
    if signal.sample_rate() == target_rate {
        return Ok(signal.clone());
    }

    let nx = signal.len();
    let num = resampled_len(nx, signal.sample_rate(), target_rate);
    if num == 0 {
        return Err(AudioError::extraction(
            "resample",
            &format!(
                "{nx} samples @ {}Hz round to zero samples @ {target_rate}Hz",
                signal.sample_rate()
            ),
        ));
    }

    let samples = fourier_resample(signal.samples(), num)?;
    log::debug!(
        "Resampled {nx} samples @ {}Hz -> {num} samples @ {target_rate}Hz",
        signal.sample_rate()
    );
    AudioSignal::new(samples, target_rate)
        .map_err(|e| AudioError::extraction("resample", &e))
}

fn fourier_resample(x: &[f64], num: usize) -> Result<Vec<f64>, AudioError> {
    let nx = x.len();
    let mut planner = RealFftPlanner::<f64>::new();

    let forward = planner.plan_fft_forward(nx);
    let mut input = forward.make_input_vec();
    input.copy_from_slice(x);
    let mut spectrum = forward.make_output_vec();
    forward
        .process(&mut input, &mut spectrum)
        .map_err(|e| AudioError::extraction("resample", &e))?;

    let inverse = planner.plan_fft_inverse(num);
    let mut resized = inverse.make_input_vec();

    // Copie des bins communs [0, N/2]
    let n = num.min(nx);
    let nyq = n / 2 + 1;
    resized[..nyq].copy_from_slice(&spectrum[..nyq]);

    // Even common length: the N/2 bin is shared by +/- frequencies
    if n.is_multiple_of(2) {
        if num < nx {
            resized[n / 2] *= 2.0;
        } else if nx < num {
            resized[n / 2] *= 0.5;
        }
    }

    // A real inverse needs real DC and (even length) Nyquist bins
    resized[0].im = 0.0;
    if num.is_multiple_of(2) {
        let last = resized.len() - 1;
        resized[last] = Complex::new(resized[last].re, 0.0);
    }

    let mut output = inverse.make_output_vec();
    inverse
        .process(&mut resized, &mut output)
        .map_err(|e| AudioError::extraction("resample", &e))?;

    // realfft is unnormalized: 1/num for the inverse, times num/nx for the rate change
    let scale = 1.0 / nx as f64;
    for v in &mut output {
        *v *= scale;
    }
    Ok(output)
}

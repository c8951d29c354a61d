use realfft::num_complex::Complex;

use crate::error::AudioError;

/// Butterworth high-pass filter in transfer-function form, applied zero-phase.
///
/// Design: analog prototype poles → high-pass transform → bilinear transform
/// → polynomial expansion. `critical` is the cutoff normalized against Nyquist.
///
/// # Example
/// ```
/// use hs_audio::filter::ButterworthHighpass;
/// let hp = ButterworthHighpass::new(4, 20.0 / 500.0).unwrap();
/// assert_eq!(hp.b().len(), 5);
/// assert!((hp.a()[0] - 1.0).abs() < f64::EPSILON);
/// ```
#[derive(Clone, Debug)]
pub struct ButterworthHighpass {
    b: Vec<f64>,
    a: Vec<f64>,
    zi: Vec<f64>,
}

impl ButterworthHighpass {
    /// Design an `order`-th order high-pass filter.
    ///
    /// # Errors
    /// Returns `AudioError::FeatureExtraction` if `order` is 0 or `critical` is
    /// outside (0, 1).
    pub fn new(order: usize, critical: f64) -> Result<Self, AudioError> {
        if order == 0 {
            return Err(AudioError::extraction(
                "highpass",
                "filter order must be > 0",
            ));
        }
        if !(critical > 0.0 && critical < 1.0) {
            return Err(AudioError::extraction(
                "highpass",
                &format!("critical frequency {critical} outside (0, 1)"),
            ));
        }

        // Pôles du prototype analogique, gain 1
        let poles: Vec<Complex<f64>> = (0..order)
            .map(|i| {
                let m = 2.0 * i as f64 - order as f64 + 1.0;
                -Complex::from_polar(1.0, std::f64::consts::PI * m / (2.0 * order as f64))
            })
            .collect();

        // Pre-warp for the bilinear transform (fs = 2)
        let fs2 = 4.0;
        let warped = fs2 * (std::f64::consts::PI * critical / 2.0).tan();

        // lowpass → highpass: zeros at the origin, poles inverted
        let hp_poles: Vec<Complex<f64>> = poles.iter().map(|&p| warped / p).collect();
        let hp_zeros = vec![Complex::new(0.0, 0.0); order];
        let prod_neg_p: Complex<f64> = poles.iter().map(|&p| -p).product();
        let k_hp = (Complex::new(1.0, 0.0) / prod_neg_p).re;

        // bilinear
        let z_zeros: Vec<Complex<f64>> = hp_zeros.iter().map(|&z| (fs2 + z) / (fs2 - z)).collect();
        let z_poles: Vec<Complex<f64>> = hp_poles.iter().map(|&p| (fs2 + p) / (fs2 - p)).collect();
        let num: Complex<f64> = hp_zeros.iter().map(|&z| fs2 - z).product();
        let den: Complex<f64> = hp_poles.iter().map(|&p| fs2 - p).product();
        let k = k_hp * (num / den).re;

        let b: Vec<f64> = poly(&z_zeros).iter().map(|c| k * c.re).collect();
        let a: Vec<f64> = poly(&z_poles).iter().map(|c| c.re).collect();
        let zi = steady_state(&b, &a);

        log::debug!("HP order={order} Wn={critical}: b={b:?} a={a:?}");
        Ok(Self { b, a, zi })
    }

    /// Numerator coefficients.
    #[must_use]
    pub fn b(&self) -> &[f64] {
        &self.b
    }

    /// Denominator coefficients (`a[0] == 1`).
    #[must_use]
    pub fn a(&self) -> &[f64] {
        &self.a
    }

    /// Samples added at each end by odd reflection before filtering.
    #[must_use]
    pub fn pad_len(&self) -> usize {
        3 * self.a.len().max(self.b.len())
    }

    /// Magnitude response at a normalized frequency (1.0 = Nyquist).
    #[must_use]
    pub fn gain_at(&self, normalized: f64) -> f64 {
        let w = std::f64::consts::PI * normalized;
        let eval = |coeffs: &[f64]| -> Complex<f64> {
            coeffs
                .iter()
                .enumerate()
                .map(|(n, &c)| c * Complex::from_polar(1.0, -w * n as f64))
                .sum()
        };
        (eval(&self.b) / eval(&self.a)).norm()
    }

    /// Single forward pass (direct form II transposed) from state `zi`.
    fn lfilter(&self, x: &[f64], zi_scale: f64) -> Vec<f64> {
        let n = self.b.len();
        let mut z: Vec<f64> = self.zi.iter().map(|v| v * zi_scale).collect();
        x.iter()
            .map(|&xi| {
                let yi = self.b[0] * xi + z[0];
                for k in 1..n - 1 {
                    z[k - 1] = self.b[k] * xi + z[k] - self.a[k] * yi;
                }
                z[n - 2] = self.b[n - 1] * xi - self.a[n - 1] * yi;
                yi
            })
            .collect()
    }

    /// Forward-backward filtering: zero phase, squared magnitude response.
    ///
    /// Both ends are extended by an odd reflection of [`pad_len`](Self::pad_len)
    /// samples and each pass starts from the steady state for its first sample.
    ///
    /// # Errors
    /// Returns `AudioError::FeatureExtraction` if `x` is not longer than the pad.
    pub fn filtfilt(&self, x: &[f64]) -> Result<Vec<f64>, AudioError> {
        let pad = self.pad_len();
        if x.len() <= pad {
            return Err(AudioError::extraction(
                "highpass",
                &format!("signal of {} samples too short (needs > {pad})", x.len()),
            ));
        }

        let first = x[0];
        let end = x.len() - 1;
        let last = x[end];
        let mut ext = Vec::with_capacity(x.len() + 2 * pad);
        ext.extend((1..=pad).rev().map(|i| 2.0 * first - x[i]));
        ext.extend_from_slice(x);
        ext.extend((1..=pad).map(|i| 2.0 * last - x[end - i]));

        let mut y = self.lfilter(&ext, ext[0]);
        y.reverse();
        let mut y = self.lfilter(&y, y[0]);
        y.reverse();

        Ok(y[pad..y.len() - pad].to_vec())
    }
}

/// Expand monic polynomial coefficients from its roots.
fn poly(roots: &[Complex<f64>]) -> Vec<Complex<f64>> {
    let mut coeffs = vec![Complex::new(1.0, 0.0)];
    for &r in roots {
        let mut next = vec![Complex::new(0.0, 0.0); coeffs.len() + 1];
        for (i, &c) in coeffs.iter().enumerate() {
            next[i] += c;
            next[i + 1] -= r * c;
        }
        coeffs = next;
    }
    coeffs
}

/// Initial state for which a unit step input gives a constant output.
fn steady_state(b: &[f64], a: &[f64]) -> Vec<f64> {
    let n = a.len();
    let a_sum: f64 = a.iter().sum();
    let b_sum: f64 = (1..n).map(|i| b[i] - a[i] * b[0]).sum();

    let mut zi = vec![0.0; n - 1];
    zi[0] = b_sum / a_sum;
    let mut asum = 1.0;
    let mut csum = 0.0;
    for k in 1..n - 1 {
        asum += a[k];
        csum += b[k] - a[k] * b[0];
        zi[k] = asum * zi[0] - csum;
    }
    zi
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_1_SQRT_2, TAU};

    fn design() -> ButterworthHighpass {
        ButterworthHighpass::new(4, 0.04).unwrap()
    }

    fn sine(freq: f64, len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| (TAU * freq * i as f64 / 1000.0).sin())
            .collect()
    }

    #[test]
    fn fourth_order_coefficients() {
        let hp = design();
        let b = hp.b();
        let a = hp.a();
        // b = k * [1, -4, 6, -4, 1]
        assert!((b[0] - 0.848_475_295_524_359).abs() < 1e-9);
        assert!((b[1] + 4.0 * b[0]).abs() < 1e-9);
        assert!((b[2] - 6.0 * b[0]).abs() < 1e-9);
        assert!((a[1] + 3.671_729_089_161_935_6).abs() < 1e-9);
        assert!((a[4] - 0.719_910_327_291_871_5).abs() < 1e-9);
    }

    #[test]
    fn response_shape() {
        let hp = design();
        assert!(hp.gain_at(0.0) < 1e-9, "DC must be blocked");
        assert!((hp.gain_at(1.0) - 1.0).abs() < 1e-9, "unity at Nyquist");
        assert!((hp.gain_at(0.04) - FRAC_1_SQRT_2).abs() < 1e-6);
    }

    #[test]
    fn constant_input_is_removed() {
        let y = design().filtfilt(&[0.7; 500]).unwrap();
        assert!(y.iter().all(|v| v.abs() < 1e-9));
    }

    #[test]
    fn passband_tone_keeps_phase() {
        let x = sine(100.0, 3000);
        let y = design().filtfilt(&x).unwrap();
        assert_eq!(y.len(), x.len());
        for i in 500..2500 {
            assert!((y[i] - x[i]).abs() < 1e-4, "sample {i}");
        }
    }

    #[test]
    fn stopband_tone_is_suppressed() {
        let y = design().filtfilt(&sine(2.0, 3000)).unwrap();
        assert!(y[1000..2000].iter().all(|v| v.abs() < 1e-4));
    }

    #[test]
    fn short_signal_is_rejected() {
        let hp = design();
        assert_eq!(hp.pad_len(), 15);
        assert!(hp.filtfilt(&[0.0; 15]).is_err());
        assert!(hp.filtfilt(&[0.0; 16]).is_ok());
    }

    #[test]
    fn invalid_design_is_rejected() {
        assert!(ButterworthHighpass::new(0, 0.04).is_err());
        assert!(ButterworthHighpass::new(4, 1.0).is_err());
        assert!(ButterworthHighpass::new(4, 0.0).is_err());
    }
}

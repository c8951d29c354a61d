use hs_core::config::{WaveletBasis, WaveletConfig};

use crate::error::AudioError;

/// Coiflet 5 decomposition low-pass, 30 taps.
const COIF5_DEC_LO: [f64; 30] = [
    -9.517_657_273_819_165e-8,
    -1.674_428_857_682_301_7e-7,
    2.063_761_851_364_681_4e-6,
    3.734_655_175_141_404_7e-6,
    -2.131_502_680_995_578_7e-5,
    -4.134_043_227_251_251e-5,
    0.000_140_541_149_702_034_37,
    0.000_302_259_581_813_063_15,
    -0.000_638_131_343_045_111_4,
    -0.001_662_863_702_013_083_8,
    0.002_433_373_212_657_672_2,
    0.006_764_185_448_053_083,
    -0.009_164_231_162_481_846,
    -0.019_761_778_942_572_64,
    0.032_683_574_267_111_83,
    0.041_289_208_750_181_7,
    -0.105_574_208_703_338_93,
    -0.062_035_963_962_903_57,
    0.437_991_626_171_837_1,
    0.774_289_603_652_956_2,
    0.421_566_206_690_851_5,
    -0.052_043_163_176_243_77,
    -0.091_920_010_559_696_24,
    0.028_168_028_970_936_35,
    0.023_408_156_785_839_195,
    -0.010_131_117_519_849_788,
    -0.004_159_358_781_386_048,
    0.002_178_236_358_109_017_8,
    0.000_358_589_687_895_737_85,
    -0.000_212_080_839_803_798_27,
];

/// Daubechies 4 decomposition low-pass, 8 taps.
const DB4_DEC_LO: [f64; 8] = [
    -0.010_597_401_784_997_278,
    0.032_883_011_666_982_945,
    0.030_841_381_835_986_965,
    -0.187_034_811_718_881_14,
    -0.027_983_769_416_983_85,
    0.630_880_767_929_590_4,
    0.714_846_570_552_541_5,
    0.230_377_813_308_855_23,
];

/// Daubechies 8 decomposition low-pass, 16 taps.
const DB8_DEC_LO: [f64; 16] = [
    -0.000_117_476_784_002_281_92,
    0.000_675_449_405_998_556_8,
    -0.000_391_740_372_995_977_1,
    -0.004_870_352_993_010_662,
    0.008_746_094_047_015_655,
    0.013_981_027_917_015_516,
    -0.044_088_253_931_064_72,
    -0.017_369_301_002_022_11,
    0.128_747_426_620_186,
    0.000_472_484_573_997_972_54,
    -0.284_015_542_962_428_1,
    -0.015_829_105_256_023_893,
    0.585_354_683_654_869_1,
    0.675_630_736_298_012_8,
    0.312_871_590_914_465_9,
    0.054_415_842_243_081_61,
];

/// Orthogonal wavelet filter bank (decomposition side only).
#[derive(Clone, Debug)]
pub struct Wavelet {
    dec_lo: &'static [f64],
    dec_hi: Vec<f64>,
}

impl Wavelet {
    /// Filter bank for a supported basis. The high-pass is the quadrature
    /// mirror of the low-pass: `hi[k] = (-1)^(k+1) * lo[F-1-k]`.
    #[must_use]
    pub fn new(basis: WaveletBasis) -> Self {
        let dec_lo: &'static [f64] = match basis {
            WaveletBasis::Coif5 => &COIF5_DEC_LO,
            WaveletBasis::Db4 => &DB4_DEC_LO,
            WaveletBasis::Db8 => &DB8_DEC_LO,
        };
        let dec_hi = dec_lo
            .iter()
            .rev()
            .enumerate()
            .map(|(k, &c)| if k.is_multiple_of(2) { -c } else { c })
            .collect();
        Self { dec_lo, dec_hi }
    }

    /// Number of taps.
    #[must_use]
    pub fn filter_len(&self) -> usize {
        self.dec_lo.len()
    }

    #[must_use]
    pub fn dec_lo(&self) -> &[f64] {
        self.dec_lo
    }

    #[must_use]
    pub fn dec_hi(&self) -> &[f64] {
        &self.dec_hi
    }

    /// Deepest useful level for a signal of `len` samples.
    #[must_use]
    pub fn max_level(&self, len: usize) -> usize {
        let f = self.filter_len();
        if len < f - 1 {
            return 0;
        }
        (len / (f - 1)).ilog2() as usize
    }

    /// One analysis step: `(approximation, detail)`, each of length
    /// `(len + F - 1) / 2`.
    ///
    /// The signal is extended by half-sample symmetric reflection
    /// (`… x1 x0 | x0 x1 … xn-1 | xn-1 xn-2 …`), convolved, and every
    /// second output kept starting at index 1.
    #[must_use]
    pub fn dwt(&self, x: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let n = x.len();
        if n == 0 {
            return (Vec::new(), Vec::new());
        }
        let f = self.filter_len();
        let out_len = (n + f - 1) / 2;
        let period = 2 * n as isize;

        let at = |k: isize| -> f64 {
            let m = k.rem_euclid(period) as usize;
            if m < n { x[m] } else { x[2 * n - 1 - m] }
        };

        let mut approx = Vec::with_capacity(out_len);
        let mut detail = Vec::with_capacity(out_len);
        for i in 0..out_len {
            let o = (2 * i + 1) as isize;
            let mut lo = 0.0;
            let mut hi = 0.0;
            for j in 0..f {
                let v = at(o - j as isize);
                lo += self.dec_lo[j] * v;
                hi += self.dec_hi[j] * v;
            }
            approx.push(lo);
            detail.push(hi);
        }
        (approx, detail)
    }
}

/// Result of a multilevel decomposition.
#[derive(Clone, Debug, PartialEq)]
pub struct Decomposition {
    /// Approximation at the deepest level.
    pub approximation: Vec<f64>,
    /// Detail bands, coarsest (deepest) first.
    pub details: Vec<Vec<f64>>,
}

impl Decomposition {
    /// Detail bands concatenated in order, approximation excluded.
    #[must_use]
    pub fn concat_details(&self) -> Vec<f64> {
        let total = self.details.iter().map(Vec::len).sum();
        let mut out = Vec::with_capacity(total);
        for band in &self.details {
            out.extend_from_slice(band);
        }
        out
    }
}

/// Multilevel decomposition.
///
/// # Errors
/// Returns `AudioError::FeatureExtraction` for an empty signal or level 0.
///
/// # Example
/// ```
/// use hs_core::config::WaveletConfig;
/// use hs_audio::wavelet::wavedec;
///
/// let d = wavedec(&vec![0.0; 3000], &WaveletConfig::default()).unwrap();
/// let lengths: Vec<usize> = d.details.iter().map(Vec::len).collect();
/// assert_eq!(lengths, vec![121, 214, 400, 771, 1514]);
/// assert_eq!(d.concat_details().len(), 3020);
/// ```
pub fn wavedec(x: &[f64], config: &WaveletConfig) -> Result<Decomposition, AudioError> {
    if x.is_empty() {
        return Err(AudioError::extraction("wavelet", "empty signal"));
    }
    if config.level == 0 {
        return Err(AudioError::extraction("wavelet", "level must be >= 1"));
    }

    let wavelet = Wavelet::new(config.basis);
    let max = wavelet.max_level(x.len());
    if config.level > max {
        log::warn!(
            "Level {} too deep for {} samples with {} (max {max}), boundary effects dominate",
            config.level,
            x.len(),
            config.basis
        );
    }

    let mut approximation = x.to_vec();
    let mut details = Vec::with_capacity(config.level);
    for _ in 0..config.level {
        let (a, d) = wavelet.dwt(&approximation);
        details.push(d);
        approximation = a;
    }
    details.reverse();

    Ok(Decomposition {
        approximation,
        details,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [WaveletBasis; 3] = [WaveletBasis::Coif5, WaveletBasis::Db4, WaveletBasis::Db8];

    fn config(basis: WaveletBasis) -> WaveletConfig {
        WaveletConfig { basis, level: 5 }
    }

    #[test]
    fn filters_are_orthonormal() {
        for basis in ALL {
            let w = Wavelet::new(basis);
            let lo_sum: f64 = w.dec_lo().iter().sum();
            let hi_sum: f64 = w.dec_hi().iter().sum();
            let lo_energy: f64 = w.dec_lo().iter().map(|c| c * c).sum();
            let cross: f64 = w.dec_lo().iter().zip(w.dec_hi()).map(|(a, b)| a * b).sum();
            assert!((lo_sum - std::f64::consts::SQRT_2).abs() < 1e-8, "{basis}");
            assert!(hi_sum.abs() < 1e-8, "{basis}");
            assert!((lo_energy - 1.0).abs() < 1e-8, "{basis}");
            assert!(cross.abs() < 1e-8, "{basis}");
        }
    }

    #[test]
    fn quadrature_mirror_layout() {
        let w = Wavelet::new(WaveletBasis::Db4);
        let lo = w.dec_lo();
        let hi = w.dec_hi();
        assert!((hi[0] + lo[7]).abs() < f64::EPSILON);
        assert!((hi[1] - lo[6]).abs() < f64::EPSILON);
        assert!((hi[7] - lo[0]).abs() < f64::EPSILON);
    }

    #[test]
    fn detail_lengths_per_basis() {
        let x = vec![0.0; 3000];
        let cases = [
            (WaveletBasis::Coif5, vec![121, 214, 400, 771, 1514], 3020),
            (WaveletBasis::Db4, vec![100, 194, 381, 755, 1503], 2933),
            (WaveletBasis::Db8, vec![108, 201, 388, 761, 1507], 2965),
        ];
        for (basis, lengths, total) in cases {
            let d = wavedec(&x, &config(basis)).unwrap();
            let got: Vec<usize> = d.details.iter().map(Vec::len).collect();
            assert_eq!(got, lengths, "{basis}");
            assert_eq!(d.concat_details().len(), total);
            assert_eq!(d.approximation.len(), lengths[0]);
        }
    }

    #[test]
    fn zeros_decompose_to_zeros() {
        let d = wavedec(&[0.0; 3000], &WaveletConfig::default()).unwrap();
        assert!(d.concat_details().iter().all(|&v| v == 0.0));
        assert!(d.approximation.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn constant_has_no_detail() {
        // Symmetric extension keeps a constant constant: details vanish,
        // approximation scales by sqrt(2) per level.
        let d = wavedec(&[1.0; 1024], &config(WaveletBasis::Db4)).unwrap();
        assert!(d.concat_details().iter().all(|v| v.abs() < 1e-8));
        let expected = 2f64.powf(2.5);
        assert!(d.approximation.iter().all(|v| (v - expected).abs() < 1e-7));
    }

    #[test]
    fn single_level_boundary_reflection() {
        // Half-sample symmetric: the first output sees x1 x0 | x0 x1 ...
        let w = Wavelet::new(WaveletBasis::Db4);
        let x: Vec<f64> = (0..16).map(f64::from).collect();
        let (a, _) = w.dwt(&x);
        let ext = |k: isize| -> f64 {
            let m = if k < 0 { -k - 1 } else { k };
            x[m as usize]
        };
        let first: f64 = (0..8).map(|j| w.dec_lo()[j] * ext(1 - j as isize)).sum();
        assert!((a[0] - first).abs() < 1e-12);
        assert_eq!(a.len(), (16 + 8 - 1) / 2);
    }

    #[test]
    fn short_signal_still_decomposes() {
        let x: Vec<f64> = (0..10).map(|i| f64::from(i).sin()).collect();
        let d = wavedec(&x, &WaveletConfig::default()).unwrap();
        assert_eq!(d.details.len(), 5);
        assert!(d.concat_details().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn rejects_empty_and_level_zero() {
        assert!(wavedec(&[], &WaveletConfig::default()).is_err());
        let zero = WaveletConfig {
            basis: WaveletBasis::Coif5,
            level: 0,
        };
        assert!(wavedec(&[1.0; 64], &zero).is_err());
    }
}

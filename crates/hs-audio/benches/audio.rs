use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use hs_audio::features::FeatureExtractor;
use hs_audio::preprocess::Preprocessor;
use hs_audio::resample::resample;
use hs_core::config::PipelineConfig;
use hs_core::signal::AudioSignal;

fn recording(rate: u32, secs: f64) -> AudioSignal {
    let n = (f64::from(rate) * secs) as usize;
    let samples = (0..n)
        .map(|i| {
            let t = i as f64 / f64::from(rate);
            0.4 * (2.0 * std::f64::consts::PI * 60.0 * t).sin()
                + 0.1 * (2.0 * std::f64::consts::PI * 180.0 * t).sin()
        })
        .collect();
    AudioSignal::new(samples, rate).unwrap()
}

fn bench_resample(c: &mut Criterion) {
    let mut group = c.benchmark_group("resample_to_1k");
    for rate in [2000u32, 4000, 44_100] {
        let signal = recording(rate, 5.0);
        group.bench_with_input(BenchmarkId::from_parameter(rate), &signal, |b, s| {
            b.iter(|| resample(black_box(s), 1000).unwrap());
        });
    }
    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let config = PipelineConfig::default();
    let pre = Preprocessor::new(&config).unwrap();
    let extractor = FeatureExtractor::new(config.wavelet, config.default_feature_length);
    let signal = recording(4000, 5.0);

    c.bench_function("prepare_4k_5s", |b| {
        b.iter(|| pre.prepare(black_box(&signal)).unwrap());
    });

    let prepared = pre.prepare(&signal).unwrap();
    c.bench_function("coif5_features", |b| {
        b.iter(|| extractor.extract(black_box(&prepared)).unwrap());
    });
}

criterion_group!(benches, bench_resample, bench_pipeline);
criterion_main!(benches);

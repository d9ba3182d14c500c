//! Criterion benchmarks for the engine hot paths.
//!
//! Benchmarks:
//! 1. Moving averages (SMA, EMA) over long close series
//! 2. Full strategy run (validation, DMA lines, bar loop)

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use dmatd_core::indicators::{ema_of_series, simple_moving_average};
use dmatd_core::{run_strategy, Candle, DmaTdParams};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_candles(n: usize) -> Vec<Candle> {
    (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.1).sin() * 10.0;
            Candle {
                timestamp: 1_600_000_000 + i as i64 * 14_400,
                open: close - 0.3,
                high: close + 1.5,
                low: close - 1.5,
                close,
                volume: 1_000_000.0 + (i % 500_000) as f64,
            }
        })
        .collect()
}

// ── Benchmarks ───────────────────────────────────────────────────────

fn bench_moving_averages(c: &mut Criterion) {
    let closes: Vec<f64> = make_candles(5_000).iter().map(|c| c.close).collect();
    let mut group = c.benchmark_group("moving_averages");
    for period in [5usize, 20, 200] {
        group.bench_with_input(BenchmarkId::new("sma", period), &period, |b, &p| {
            b.iter(|| simple_moving_average(black_box(&closes), p))
        });
        group.bench_with_input(BenchmarkId::new("ema", period), &period, |b, &p| {
            b.iter(|| ema_of_series(black_box(&closes), p))
        });
    }
    group.finish();
}

fn bench_strategy_run(c: &mut Criterion) {
    let params = DmaTdParams::default();
    let mut group = c.benchmark_group("strategy_run");
    for n in [100usize, 1_000, 10_000] {
        let candles = make_candles(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &candles, |b, candles| {
            b.iter(|| run_strategy(black_box(candles), &params))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_moving_averages, bench_strategy_run);
criterion_main!(benches);

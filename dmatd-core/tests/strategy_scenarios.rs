//! End-to-end scenarios for the DMA+TD strategy runner.
//!
//! Expected trigger bars for the oscillating series were computed independently.
//! Every comparison they hinge on clears floating-point noise by a wide margin.

use dmatd_core::{run_strategy, Candle, DmaTdParams, DmaTdStrategy, ParamOverrides};

fn make_candles(closes: &[f64]) -> Vec<Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Candle {
            timestamp: 1_704_067_200 + i as i64 * 14_400,
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 500.0,
        })
        .collect()
}

/// Drifting sine wave: a pullback every ~21 bars inside an uptrend.
fn oscillating_uptrend(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 100.0 + (i as f64 * 0.3).sin() * 8.0 + i as f64 * 0.2)
        .collect()
}

#[test]
fn setup_counter_on_falling_closes() {
    let candles = make_candles(&[10.0, 8.0, 6.0, 4.0, 2.0]);
    let results = run_strategy(&candles, &DmaTdParams::default()).unwrap();

    let counts: Vec<u8> = results.iter().map(|r| r.setup_count).collect();
    assert_eq!(counts, vec![0, 0, 0, 0, 1]);
}

#[test]
fn four_candles_never_reach_a_lookback() {
    let candles = make_candles(&[10.0, 8.0, 6.0, 4.0]);
    let results = run_strategy(&candles, &DmaTdParams::default()).unwrap();
    assert!(results.iter().all(|r| r.setup_count == 0));
}

#[test]
fn undefined_lines_never_trigger() {
    // 15 bars: the slow EMA (20) never seeds, so the DMA line stays absent.
    let closes: Vec<f64> = (0..15).map(|i| 100.0 - i as f64).collect();
    let results = run_strategy(&make_candles(&closes), &DmaTdParams::default()).unwrap();

    assert!(results.iter().any(|r| r.setup_count > 0));
    for r in &results {
        assert!(r.dma_line.is_none());
        assert!(r.dma_signal.is_none());
        assert!(r.bullish_trend.is_none());
        assert!(!r.entry_signal);
        assert!(!r.trigger);
    }
}

#[test]
fn trend_defined_from_warmup_bar() {
    let params = DmaTdParams::default();
    let results = run_strategy(&make_candles(&oscillating_uptrend(60)), &params).unwrap();
    let warmup = params.warmup_bars();

    assert!(results[..warmup].iter().all(|r| r.bullish_trend.is_none()));
    assert!(results[warmup..].iter().all(|r| r.bullish_trend.is_some()));
    assert!(results[19].dma_line.is_some());
    assert!(results[18].dma_line.is_none());
}

#[test]
fn signal_line_seeds_with_the_dma_line() {
    let results =
        run_strategy(&make_candles(&oscillating_uptrend(27)), &DmaTdParams::default()).unwrap();

    assert!(results[18].dma_signal.is_none());
    let first = &results[19];
    let dma = first.dma_line.unwrap();
    // Eight earlier slots are empty, so the seed is the DMA value over 9.
    assert!((first.dma_signal.unwrap() - dma / 9.0).abs() < 1e-12);
    assert!((first.dma_signal.unwrap() - -0.478_081_405_673).abs() < 1e-9);
    assert_eq!(first.bullish_trend, Some(false));
    assert!(results[20..22].iter().all(|r| r.bullish_trend == Some(false)));
    assert!(results[22..27].iter().all(|r| r.bullish_trend == Some(true)));
}

#[test]
fn pullbacks_in_uptrend_trigger() {
    let results =
        run_strategy(&make_candles(&oscillating_uptrend(120)), &DmaTdParams::default()).unwrap();

    let triggers: Vec<usize> = results
        .iter()
        .enumerate()
        .filter(|(_, r)| r.trigger)
        .map(|(i, _)| i)
        .collect();
    assert_eq!(triggers, vec![29, 50, 71, 92, 113]);

    let first = &results[29];
    assert_eq!(first.setup_count, 1);
    assert!(first.entry_signal);
    assert_eq!(first.bullish_trend, Some(true));
    // The count keeps climbing after the edge without re-firing.
    assert_eq!(results[30].setup_count, 2);
    assert!(!results[30].entry_signal);
}

#[test]
fn higher_entry_count_moves_the_trigger() {
    let params = DmaTdParams::with_overrides(ParamOverrides {
        entry_count: Some(2),
        ..Default::default()
    })
    .unwrap();
    let results = run_strategy(&make_candles(&oscillating_uptrend(120)), &params).unwrap();

    for (i, r) in results.iter().enumerate() {
        if r.entry_signal {
            assert_eq!(r.setup_count, 2, "entry at bar {i} with wrong count");
            assert_eq!(results[i - 1].setup_count, 1);
        }
    }
    assert!(results[30].entry_signal);
}

#[test]
fn latest_record_reflects_last_candle() {
    let candles = make_candles(&oscillating_uptrend(114));
    let run = DmaTdStrategy::default().run(&candles).unwrap();
    let latest = run.latest().unwrap();
    assert_eq!(latest.timestamp, candles[113].timestamp);
    assert!(latest.trigger);
}

//! Per-category evaluation.
//!
//! Every function reads the latest bar of an ascending series. A NaN
//! reading (not enough history, zero base) fails its comparison, so
//! insufficient history is a plain no-pass.

use super::benchmark::BenchmarkTable;
use super::EvaluationResult;
use crate::condition::criterion::{
    BreakoutDirection, Channel, Criterion, LogicalOp, Oscillator, PatternDirection, Reference,
    Screener, Timeframe, VolatilityMeasure,
};
use crate::condition::{compare, ConditionError, Operator, Threshold};
use crate::domain::Bar;
use crate::indicators::bollinger::{self, Bollinger};
use crate::indicators::keltner::{self, Keltner};
use crate::indicators::rolling::{pct_change, rolling_max, rolling_mean, rolling_min};
use crate::indicators::{
    closes, latest, Adx, Atr, CandlePattern, Donchian, Indicator, MaType, MovingAverage, UlcerIndex,
};

/// Keltner multiplier used by breakouts and channel width.
const KELTNER_MULTIPLIER: f64 = 2.0;
/// Keltner multiplier the squeeze compares Bollinger bands against.
const SQUEEZE_KELTNER_MULTIPLIER: f64 = 1.5;
/// ADX reading above which a trend counts as strong.
const ADX_TREND_THRESHOLD: f64 = 25.0;
/// Largest run-up over the window a base breakout may show.
const BASE_MAX_RUN_UP: f64 = 0.03;

pub(crate) fn dispatch(
    criterion: &Criterion,
    bars: &[Bar],
    benchmarks: &BenchmarkTable,
) -> Result<EvaluationResult, ConditionError> {
    let result = match criterion {
        Criterion::IndicatorThreshold {
            oscillator,
            window,
            op,
            value,
        } => indicator_threshold(*oscillator, *window, op, value, bars),
        Criterion::MovingAverage {
            ma_type,
            window,
            op,
            value,
        } => moving_average(*ma_type, *window, op, value.as_ref(), bars),
        Criterion::RelativeStrength {
            benchmark,
            window,
            op,
            value,
        } => relative_strength(benchmark, *window, op, value, bars, benchmarks)?,
        Criterion::PriceReference {
            reference,
            op,
            value,
        } => price_reference(*reference, op, value, bars),
        Criterion::VolumeVolatility {
            measure,
            window,
            op,
            value,
        } => volume_volatility(*measure, *window, op, value, bars),
        Criterion::CandlePattern {
            pattern,
            direction,
            label,
        } => candle_pattern(*pattern, direction, label, bars),
        Criterion::Breakout {
            channel,
            window,
            direction,
        } => breakout(*channel, *window, direction, bars),
        Criterion::Composite { operator, children } => {
            composite(operator, children, bars, benchmarks)?
        }
        Criterion::Screener { screener, window } => screener_signal(*screener, *window, bars),
        Criterion::PeriodReturn {
            timeframe,
            op,
            value,
        } => period_return(timeframe, op, value, bars),
        Criterion::Fallback => EvaluationResult::new(false, 0.0, "fallback", None),
    };
    Ok(result)
}

fn last_close(bars: &[Bar]) -> f64 {
    bars.last().map_or(f64::NAN, |b| b.close)
}

/// `(previous, latest)` of a series; NaN where absent.
fn last_two(series: &[f64]) -> (f64, f64) {
    match series {
        [.., prev, cur] => (*prev, *cur),
        [cur] => (f64::NAN, *cur),
        [] => (f64::NAN, f64::NAN),
    }
}

/// Strict sign change of `a - b` between the previous bar and the latest.
fn crossed(op: &Operator, (a_prev, a_cur): (f64, f64), (b_prev, b_cur): (f64, f64)) -> bool {
    match op {
        Operator::CrossedAbove => a_prev < b_prev && a_cur > b_cur,
        Operator::CrossedBelow => a_prev > b_prev && a_cur < b_cur,
        _ => false,
    }
}

// ─── 1. Indicator threshold ──────────────────────────────────────────

fn indicator_threshold(
    oscillator: Oscillator,
    window: usize,
    op: &Operator,
    value: &Threshold,
    bars: &[Bar],
) -> EvaluationResult {
    let series = oscillator.indicator(window).compute(bars);
    let (prev, cur) = last_two(&series);
    let pass = if op.is_crossover() {
        value
            .scalar()
            .is_some_and(|level| crossed(op, (prev, cur), (level, level)))
    } else {
        compare(cur, op, value)
    };
    EvaluationResult::new(pass, cur, oscillator.as_str(), Some(window))
}

// ─── 2. Price vs moving average ──────────────────────────────────────

fn moving_average(
    ma_type: MaType,
    window: usize,
    op: &Operator,
    value: Option<&Threshold>,
    bars: &[Bar],
) -> EvaluationResult {
    let closes = closes(bars);
    let average = MovingAverage::new(ma_type, window);
    let ma = average.compute(bars);
    let price = latest(&closes);
    let ma_now = latest(&ma);

    let pass = match op {
        Operator::CrossedAbove | Operator::CrossedBelow => {
            crossed(op, last_two(&closes), last_two(&ma))
        }
        Operator::ProximityWithin => match value.and_then(Threshold::scalar) {
            Some(tolerance) if ma_now != 0.0 => (price - ma_now).abs() / ma_now <= tolerance,
            _ => false,
        },
        Operator::Compare(c) => c.holds(price, &Threshold::Scalar(ma_now)),
        Operator::Unrecognized(_) => false,
    };
    EvaluationResult::new(pass, price, average.name(), Some(window))
}

// ─── 3. Relative strength ────────────────────────────────────────────

fn relative_strength(
    benchmark: &str,
    window: usize,
    op: &Operator,
    value: &Threshold,
    bars: &[Bar],
    benchmarks: &BenchmarkTable,
) -> Result<EvaluationResult, ConditionError> {
    let reference = benchmarks.resolve(benchmark)?;
    let ratio: Vec<f64> = bars
        .iter()
        .map(|b| {
            let base = reference.at(b.date);
            if base == 0.0 {
                f64::NAN
            } else {
                b.close / base
            }
        })
        .collect();
    let rs = latest(&rolling_mean(&ratio, window));
    Ok(EvaluationResult::new(
        compare(rs, op, value),
        rs,
        format!("rs_vs_{benchmark}"),
        Some(window),
    ))
}

// ─── 4. Percent change from reference ────────────────────────────────

fn price_reference(
    reference: Reference,
    op: &Operator,
    value: &Threshold,
    bars: &[Bar],
) -> EvaluationResult {
    let closes = closes(bars);
    let extreme = if reference.is_high() {
        rolling_max(&closes, reference.bars())
    } else {
        rolling_min(&closes, reference.bars())
    };
    let base = latest(&extreme);
    let pct = if base == 0.0 {
        f64::NAN
    } else {
        (latest(&closes) - base) / base
    };
    EvaluationResult::new(compare(pct, op, value), pct, reference.as_str(), None)
}

// ─── 5. Volume / volatility ──────────────────────────────────────────

fn volume_volatility(
    measure: VolatilityMeasure,
    window: usize,
    op: &Operator,
    value: &Threshold,
    bars: &[Bar],
) -> EvaluationResult {
    let reading = match measure {
        VolatilityMeasure::Volume => bars.last().map_or(f64::NAN, |b| b.volume),
        VolatilityMeasure::VolumeSma => {
            let volumes: Vec<f64> = bars.iter().map(|b| b.volume).collect();
            let avg = latest(&rolling_mean(&volumes, window));
            if avg == 0.0 {
                f64::NAN
            } else {
                latest(&volumes) / avg
            }
        }
        VolatilityMeasure::Atr => latest(&Atr::new(window).compute(bars)) / last_close(bars),
        VolatilityMeasure::BollingerWidth => {
            latest(&bollinger::bandwidth(bars, window, bollinger::DEFAULT_MULTIPLIER))
        }
        VolatilityMeasure::KeltnerWidth => {
            latest(&keltner::channel_width(bars, window, window, KELTNER_MULTIPLIER))
        }
        VolatilityMeasure::UlcerIndex => latest(&UlcerIndex::new(window).compute(bars)),
    };
    EvaluationResult::new(
        compare(reading, op, value),
        reading,
        measure.as_str(),
        Some(window),
    )
}

// ─── 6. Candle patterns ──────────────────────────────────────────────

fn candle_pattern(
    pattern: CandlePattern,
    direction: &PatternDirection,
    label: &str,
    bars: &[Bar],
) -> EvaluationResult {
    let code = pattern.codes(bars).last().copied().unwrap_or(0);
    EvaluationResult::new(direction.matches(code), f64::from(code), label, None)
}

// ─── 7. Breakouts ────────────────────────────────────────────────────

fn breakout(
    channel: Channel,
    window: usize,
    direction: &BreakoutDirection,
    bars: &[Bar],
) -> EvaluationResult {
    let close = last_close(bars);
    let (upper, lower) = match channel {
        Channel::Bollinger => (
            latest(&Bollinger::upper(window, bollinger::DEFAULT_MULTIPLIER).compute(bars)),
            latest(&Bollinger::lower(window, bollinger::DEFAULT_MULTIPLIER).compute(bars)),
        ),
        Channel::Keltner => (
            latest(&Keltner::upper(window, window, KELTNER_MULTIPLIER).compute(bars)),
            latest(&Keltner::lower(window, window, KELTNER_MULTIPLIER).compute(bars)),
        ),
        Channel::Donchian => {
            let (hi, lo) = (
                latest(&Donchian::upper(window).compute(bars)),
                latest(&Donchian::lower(window).compute(bars)),
            );
            // The rolling extreme includes today, so a breakout sits on the band.
            let pass = match direction {
                BreakoutDirection::Up => close == hi,
                BreakoutDirection::Down => close == lo,
                BreakoutDirection::Unrecognized(_) => false,
            };
            return EvaluationResult::new(pass, close, channel.as_str(), Some(window));
        }
        Channel::Pivot => {
            return EvaluationResult::new(false, 0.0, channel.as_str(), Some(window));
        }
    };
    let pass = match direction {
        BreakoutDirection::Up => close > upper,
        BreakoutDirection::Down => close < lower,
        BreakoutDirection::Unrecognized(_) => false,
    };
    EvaluationResult::new(pass, close, channel.as_str(), Some(window))
}

// ─── 8. Composite ────────────────────────────────────────────────────

/// Pass/fail combines every child; the diagnostic triple is the first child's.
fn composite(
    operator: &LogicalOp,
    children: &[Criterion],
    bars: &[Bar],
    benchmarks: &BenchmarkTable,
) -> Result<EvaluationResult, ConditionError> {
    let results = children
        .iter()
        .map(|c| dispatch(c, bars, benchmarks))
        .collect::<Result<Vec<_>, _>>()?;
    let passes: Vec<bool> = results.iter().map(|r| r.pass).collect();
    let pass = operator.combine(&passes).unwrap_or(false);

    let mut first = results
        .into_iter()
        .next()
        .ok_or(ConditionError::EmptyComposite)?;
    first.pass = pass;
    Ok(first)
}

// ─── 9. Special screeners ────────────────────────────────────────────

fn screener_signal(screener: Screener, window: usize, bars: &[Bar]) -> EvaluationResult {
    let closes = closes(bars);
    let close = latest(&closes);
    let (pass, value) = match screener {
        Screener::BaseBreakout => {
            let high = latest(&Donchian::upper(window).compute(bars));
            let run_up = latest(&pct_change(&closes, window));
            (close == high && run_up <= BASE_MAX_RUN_UP, run_up)
        }
        Screener::AdxTrend => {
            let adx = latest(&Adx::new(window).compute(bars));
            (adx > ADX_TREND_THRESHOLD, adx)
        }
        Screener::TurtleSignal => {
            let high = latest(&Donchian::upper(window).compute(bars));
            (close == high, close)
        }
        Screener::SqueezePro => {
            let mult = bollinger::DEFAULT_MULTIPLIER;
            let bb_up = latest(&Bollinger::upper(window, mult).compute(bars));
            let bb_lo = latest(&Bollinger::lower(window, mult).compute(bars));
            let kc_up =
                latest(&Keltner::upper(window, window, SQUEEZE_KELTNER_MULTIPLIER).compute(bars));
            let kc_lo =
                latest(&Keltner::lower(window, window, SQUEEZE_KELTNER_MULTIPLIER).compute(bars));
            let kc_width = kc_up - kc_lo;
            let ratio = if kc_width > 0.0 {
                (bb_up - bb_lo) / kc_width
            } else {
                f64::NAN
            };
            (bb_up < kc_up && bb_lo > kc_lo, ratio)
        }
    };
    EvaluationResult::new(pass, value, screener.as_str(), Some(window))
}

// ─── 10. Time-based returns ──────────────────────────────────────────

fn period_return(
    timeframe: &Timeframe,
    op: &Operator,
    value: &Threshold,
    bars: &[Bar],
) -> EvaluationResult {
    let label = format!("return_{}", timeframe.as_str());
    let Some(days) = timeframe.days(bars.len()) else {
        return EvaluationResult::new(false, f64::NAN, label, None);
    };
    let pct = latest(&pct_change(&closes(bars), days));
    EvaluationResult::new(compare(pct, op, value), pct, label, Some(days))
}

//! Resolved conditions.
//!
//! Resolution is where a loose [`ConditionNode`] meets the per-category
//! table of required fields. Identifiers are mapped to typed enums, windows
//! are defaulted, and anything missing or unknown becomes a
//! [`ConditionError`] before a single bar is read.
//!
//! Enumerated fields that are merely unrecognized (an odd operator, a
//! breakout direction of "sideways") resolve to a variant that never
//! passes rather than an error.

use super::defaults::{default_window, RELATIVE_STRENGTH};
use super::{Category, ConditionError, ConditionNode, Operator, Threshold};
use crate::indicators::{
    AwesomeOscillator, Cci, ChandeMomentum, FisherTransform, Indicator, Kdj, MaType,
    MoneyFlowIndex, PercentagePriceOscillator, Roc, Rsi, SchaffTrendCycle, StochRsi, Stochastic,
    TrueStrengthIndex, UltimateOscillator, WilliamsR,
};
use crate::indicators::{patterns, CandlePattern};

// ─── Identifier enums ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Oscillator {
    Rsi,
    Stoch,
    StochRsi,
    Cci,
    WilliamsR,
    AwesomeOsc,
    Kdj,
    UltimateOsc,
    ChandeMomentum,
    Roc,
    MoneyFlowIdx,
    PercentagePriceOsc,
    FisherTransform,
    Tsi,
    SchaffTrendCycle,
}

impl Oscillator {
    pub const ALL: [Oscillator; 15] = [
        Oscillator::Rsi,
        Oscillator::Stoch,
        Oscillator::StochRsi,
        Oscillator::Cci,
        Oscillator::WilliamsR,
        Oscillator::AwesomeOsc,
        Oscillator::Kdj,
        Oscillator::UltimateOsc,
        Oscillator::ChandeMomentum,
        Oscillator::Roc,
        Oscillator::MoneyFlowIdx,
        Oscillator::PercentagePriceOsc,
        Oscillator::FisherTransform,
        Oscillator::Tsi,
        Oscillator::SchaffTrendCycle,
    ];

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|o| o.as_str() == id)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Oscillator::Rsi => "rsi",
            Oscillator::Stoch => "stoch",
            Oscillator::StochRsi => "stochrsi",
            Oscillator::Cci => "cci",
            Oscillator::WilliamsR => "williams_r",
            Oscillator::AwesomeOsc => "awesome_osc",
            Oscillator::Kdj => "kdj",
            Oscillator::UltimateOsc => "ultimate_osc",
            Oscillator::ChandeMomentum => "chande_momentum",
            Oscillator::Roc => "roc",
            Oscillator::MoneyFlowIdx => "money_flow_idx",
            Oscillator::PercentagePriceOsc => "percentage_price_osc",
            Oscillator::FisherTransform => "fisher_transform",
            Oscillator::Tsi => "tsi",
            Oscillator::SchaffTrendCycle => "schaff_trend_cycle",
        }
    }

    /// Build the indicator for a single window.
    ///
    /// Multi-leg oscillators treat the window as their slowest leg and
    /// scale the others in proportion to their standard settings.
    pub fn indicator(&self, window: usize) -> Box<dyn Indicator> {
        let scaled = |num: usize, den: usize| (window * num / den).max(1);
        match self {
            Oscillator::Rsi => Box::new(Rsi::new(window)),
            Oscillator::Stoch => Box::new(Stochastic::new(window)),
            Oscillator::StochRsi => Box::new(StochRsi::new(window)),
            Oscillator::Cci => Box::new(Cci::new(window)),
            Oscillator::WilliamsR => Box::new(WilliamsR::new(window)),
            Oscillator::AwesomeOsc => Box::new(AwesomeOscillator::new(scaled(5, 34), window)),
            Oscillator::Kdj => Box::new(Kdj::new(window)),
            Oscillator::UltimateOsc => Box::new(UltimateOscillator::new(
                scaled(1, 4),
                scaled(1, 2),
                window,
            )),
            Oscillator::ChandeMomentum => Box::new(ChandeMomentum::new(window)),
            Oscillator::Roc => Box::new(Roc::new(window)),
            Oscillator::MoneyFlowIdx => Box::new(MoneyFlowIndex::new(window)),
            Oscillator::PercentagePriceOsc => {
                Box::new(PercentagePriceOscillator::new(scaled(12, 26), window))
            }
            Oscillator::FisherTransform => Box::new(FisherTransform::new(window)),
            Oscillator::Tsi => Box::new(TrueStrengthIndex::new(window, scaled(13, 25))),
            Oscillator::SchaffTrendCycle => Box::new(SchaffTrendCycle::new(
                crate::indicators::stc::FAST,
                crate::indicators::stc::SLOW,
                window,
            )),
        }
    }
}

/// Recent extreme that category 4 measures distance from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reference {
    DayLow,
    WeekLow,
    MonthLow,
    YearLow,
    YearHigh,
}

impl Reference {
    pub const ALL: [Reference; 5] = [
        Reference::DayLow,
        Reference::WeekLow,
        Reference::MonthLow,
        Reference::YearLow,
        Reference::YearHigh,
    ];

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.as_str() == id)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Reference::DayLow => "1d_low",
            Reference::WeekLow => "1w_low",
            Reference::MonthLow => "1m_low",
            Reference::YearLow => "52w_low",
            Reference::YearHigh => "52w_high",
        }
    }

    /// Trading days in the reference window.
    pub fn bars(&self) -> usize {
        match self {
            Reference::DayLow => 1,
            Reference::WeekLow => 5,
            Reference::MonthLow => 21,
            Reference::YearLow | Reference::YearHigh => 252,
        }
    }

    pub fn is_high(&self) -> bool {
        matches!(self, Reference::YearHigh)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VolatilityMeasure {
    Volume,
    VolumeSma,
    Atr,
    BollingerWidth,
    KeltnerWidth,
    UlcerIndex,
}

impl VolatilityMeasure {
    pub const ALL: [VolatilityMeasure; 6] = [
        VolatilityMeasure::Volume,
        VolatilityMeasure::VolumeSma,
        VolatilityMeasure::Atr,
        VolatilityMeasure::BollingerWidth,
        VolatilityMeasure::KeltnerWidth,
        VolatilityMeasure::UlcerIndex,
    ];

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == id)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VolatilityMeasure::Volume => "volume",
            VolatilityMeasure::VolumeSma => "volume_sma",
            VolatilityMeasure::Atr => "atr",
            VolatilityMeasure::BollingerWidth => "bb_width",
            VolatilityMeasure::KeltnerWidth => "kc_width",
            VolatilityMeasure::UlcerIndex => "ui",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Bollinger,
    Keltner,
    Donchian,
    Pivot,
}

impl Channel {
    pub const ALL: [Channel; 4] = [
        Channel::Bollinger,
        Channel::Keltner,
        Channel::Donchian,
        Channel::Pivot,
    ];

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == id)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Bollinger => "bb_breakout",
            Channel::Keltner => "kc_breakout",
            Channel::Donchian => "donchian_breakout",
            Channel::Pivot => "pivot_break",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BreakoutDirection {
    Up,
    Down,
    Unrecognized(String),
}

impl BreakoutDirection {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => BreakoutDirection::Up,
            "down" => BreakoutDirection::Down,
            _ => BreakoutDirection::Unrecognized(s.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screener {
    BaseBreakout,
    AdxTrend,
    TurtleSignal,
    SqueezePro,
}

impl Screener {
    pub const ALL: [Screener; 4] = [
        Screener::BaseBreakout,
        Screener::AdxTrend,
        Screener::TurtleSignal,
        Screener::SqueezePro,
    ];

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == id)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Screener::BaseBreakout => "base_breakout",
            Screener::AdxTrend => "adx_trend",
            Screener::TurtleSignal => "turtle_signal",
            Screener::SqueezePro => "squeeze_pro",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Timeframe {
    Day,
    Week,
    Month,
    Quarter,
    HalfYear,
    Year,
    YearToDate,
    Unrecognized(String),
}

impl Timeframe {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "1d" => Timeframe::Day,
            "1w" => Timeframe::Week,
            "1m" => Timeframe::Month,
            "3m" => Timeframe::Quarter,
            "6m" => Timeframe::HalfYear,
            "1y" => Timeframe::Year,
            "ytd" => Timeframe::YearToDate,
            _ => Timeframe::Unrecognized(s.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Timeframe::Day => "1d",
            Timeframe::Week => "1w",
            Timeframe::Month => "1m",
            Timeframe::Quarter => "3m",
            Timeframe::HalfYear => "6m",
            Timeframe::Year => "1y",
            Timeframe::YearToDate => "ytd",
            Timeframe::Unrecognized(s) => s,
        }
    }

    /// Look-back in bars; year-to-date spans all available history minus one.
    pub fn days(&self, available: usize) -> Option<usize> {
        match self {
            Timeframe::Day => Some(1),
            Timeframe::Week => Some(5),
            Timeframe::Month => Some(21),
            Timeframe::Quarter => Some(63),
            Timeframe::HalfYear => Some(126),
            Timeframe::Year => Some(252),
            Timeframe::YearToDate => Some(available.saturating_sub(1)),
            Timeframe::Unrecognized(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
    Unrecognized(String),
}

impl LogicalOp {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "and" => LogicalOp::And,
            "or" => LogicalOp::Or,
            _ => LogicalOp::Unrecognized(s.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            LogicalOp::And => "and",
            LogicalOp::Or => "or",
            LogicalOp::Unrecognized(s) => s,
        }
    }

    /// `None` for an unrecognized operator.
    pub fn combine(&self, passes: &[bool]) -> Option<bool> {
        match self {
            LogicalOp::And => Some(passes.iter().all(|p| *p)),
            LogicalOp::Or => Some(passes.iter().any(|p| *p)),
            LogicalOp::Unrecognized(_) => None,
        }
    }
}

/// Which pattern codes count as a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternDirection {
    Bullish,
    Bearish,
    Any,
    Unrecognized(String),
}

impl PatternDirection {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "bullish" => PatternDirection::Bullish,
            "bearish" => PatternDirection::Bearish,
            "any" | "" => PatternDirection::Any,
            _ => PatternDirection::Unrecognized(s.to_string()),
        }
    }

    pub fn matches(&self, code: i32) -> bool {
        match self {
            PatternDirection::Bullish => code == patterns::BULLISH,
            PatternDirection::Bearish => code == patterns::BEARISH,
            PatternDirection::Any => code != 0,
            PatternDirection::Unrecognized(_) => false,
        }
    }
}

// ─── Criterion ──────────────────────────────────────────────────────

/// A condition with every field its category needs, typed and defaulted.
#[derive(Debug, Clone, PartialEq)]
pub enum Criterion {
    IndicatorThreshold {
        oscillator: Oscillator,
        window: usize,
        op: Operator,
        value: Threshold,
    },
    MovingAverage {
        ma_type: MaType,
        window: usize,
        op: Operator,
        /// Only read by `proximity_within`; other operators compare price to the MA.
        value: Option<Threshold>,
    },
    RelativeStrength {
        benchmark: String,
        window: usize,
        op: Operator,
        value: Threshold,
    },
    PriceReference {
        reference: Reference,
        op: Operator,
        value: Threshold,
    },
    VolumeVolatility {
        measure: VolatilityMeasure,
        window: usize,
        op: Operator,
        value: Threshold,
    },
    CandlePattern {
        pattern: CandlePattern,
        direction: PatternDirection,
        /// The pattern id as written, e.g. `bullish_engulfing`.
        label: String,
    },
    Breakout {
        channel: Channel,
        window: usize,
        direction: BreakoutDirection,
    },
    Composite {
        operator: LogicalOp,
        children: Vec<Criterion>,
    },
    Screener {
        screener: Screener,
        window: usize,
    },
    PeriodReturn {
        timeframe: Timeframe,
        op: Operator,
        value: Threshold,
    },
    Fallback,
}

impl Criterion {
    pub fn category(&self) -> Category {
        match self {
            Criterion::IndicatorThreshold { .. } => Category::IndicatorThreshold,
            Criterion::MovingAverage { .. } => Category::MovingAverage,
            Criterion::RelativeStrength { .. } => Category::RelativeStrength,
            Criterion::PriceReference { .. } => Category::PriceReference,
            Criterion::VolumeVolatility { .. } => Category::VolumeVolatility,
            Criterion::CandlePattern { .. } => Category::CandlePattern,
            Criterion::Breakout { .. } => Category::Breakout,
            Criterion::Composite { .. } => Category::Composite,
            Criterion::Screener { .. } => Category::Screener,
            Criterion::PeriodReturn { .. } => Category::PeriodReturn,
            Criterion::Fallback => Category::Fallback,
        }
    }
}

// ─── Resolution ─────────────────────────────────────────────────────

/// Field accessors that turn an absent field into a `MissingField` error.
struct Fields<'a> {
    node: &'a ConditionNode,
    category: Category,
}

impl<'a> Fields<'a> {
    fn missing(&self, field: &'static str) -> ConditionError {
        ConditionError::MissingField {
            category: self.category.code(),
            field,
        }
    }

    fn text(&self, field: &'static str, value: &'a Option<String>) -> Result<&'a str, ConditionError> {
        value
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| self.missing(field))
    }

    fn op(&self) -> Result<Operator, ConditionError> {
        self.text("op", &self.node.op).map(Operator::parse)
    }

    fn value(&self) -> Result<Threshold, ConditionError> {
        self.node.value.ok_or_else(|| self.missing("value"))
    }

    /// Explicit window, or the table default for `id`.
    fn window(&self, id: &str) -> Result<usize, ConditionError> {
        match self.node.window {
            Some(0) => Err(ConditionError::InvalidWindow {
                category: self.category.code(),
                window: 0,
            }),
            Some(w) => Ok(w),
            None => Ok(default_window(id)),
        }
    }

    fn required_window(&self) -> Result<usize, ConditionError> {
        let w = self.node.window.ok_or_else(|| self.missing("window"))?;
        if w == 0 {
            return Err(ConditionError::InvalidWindow {
                category: self.category.code(),
                window: w,
            });
        }
        Ok(w)
    }

    fn unknown(&self, kind: &'static str, id: &str) -> ConditionError {
        ConditionError::UnknownIdentifier {
            category: self.category.code(),
            kind,
            id: id.to_string(),
        }
    }
}

/// Split `bullish_engulfing` into the direction prefix and the base pattern.
fn split_pattern_id(id: &str) -> (Option<PatternDirection>, &str) {
    if let Some(rest) = id.strip_prefix("bullish_") {
        (Some(PatternDirection::Bullish), rest)
    } else if let Some(rest) = id.strip_prefix("bearish_") {
        (Some(PatternDirection::Bearish), rest)
    } else {
        (None, id)
    }
}

impl ConditionNode {
    /// Resolve this node (through [`ConditionNode::primary`]) to a criterion.
    pub fn resolve(&self) -> Result<Criterion, ConditionError> {
        let node = self.primary();
        let category = node.category()?;
        let f = Fields { node, category };

        match category {
            Category::IndicatorThreshold => {
                let id = f.text("indicator", &node.indicator)?;
                let oscillator =
                    Oscillator::from_id(id).ok_or_else(|| f.unknown("indicator", id))?;
                Ok(Criterion::IndicatorThreshold {
                    oscillator,
                    window: f.window(id)?,
                    op: f.op()?,
                    value: f.value()?,
                })
            }
            Category::MovingAverage => {
                let id = f.text("ma_type", &node.ma_type)?;
                let ma_type = MaType::from_id(id).ok_or_else(|| f.unknown("moving average", id))?;
                let op = f.op()?;
                let value = if op == Operator::ProximityWithin {
                    Some(f.value()?)
                } else {
                    node.value
                };
                Ok(Criterion::MovingAverage {
                    ma_type,
                    window: f.required_window()?,
                    op,
                    value,
                })
            }
            Category::RelativeStrength => Ok(Criterion::RelativeStrength {
                benchmark: f.text("benchmark", &node.benchmark)?.to_string(),
                window: f.window(RELATIVE_STRENGTH)?,
                op: f.op()?,
                value: f.value()?,
            }),
            Category::PriceReference => {
                let id = f.text("reference", &node.reference)?;
                let reference = Reference::from_id(id).ok_or_else(|| f.unknown("reference", id))?;
                Ok(Criterion::PriceReference {
                    reference,
                    op: f.op()?,
                    value: f.value()?,
                })
            }
            Category::VolumeVolatility => {
                let id = f.text("indicator", &node.indicator)?;
                let measure =
                    VolatilityMeasure::from_id(id).ok_or_else(|| f.unknown("indicator", id))?;
                Ok(Criterion::VolumeVolatility {
                    measure,
                    window: f.window(id)?,
                    op: f.op()?,
                    value: f.value()?,
                })
            }
            Category::CandlePattern => {
                let label = f.text("pattern_type", &node.pattern_type)?;
                let (implied, base) = split_pattern_id(label);
                let pattern =
                    CandlePattern::from_id(base).ok_or_else(|| f.unknown("pattern", label))?;
                let direction = match node.direction.as_deref() {
                    Some(d) => PatternDirection::parse(d),
                    None => implied.unwrap_or(PatternDirection::Any),
                };
                Ok(Criterion::CandlePattern {
                    pattern,
                    direction,
                    label: label.to_string(),
                })
            }
            Category::Breakout => {
                let id = f.text("indicator", &node.indicator)?;
                let channel = Channel::from_id(id).ok_or_else(|| f.unknown("breakout", id))?;
                let direction = BreakoutDirection::parse(f.text("direction", &node.direction)?);
                Ok(Criterion::Breakout {
                    channel,
                    window: f.window(id)?,
                    direction,
                })
            }
            Category::Composite => {
                let operator = LogicalOp::parse(f.text("operator", &node.operator)?);
                if node.sub_conditions.is_empty() {
                    return Err(ConditionError::EmptyComposite);
                }
                let children = node
                    .sub_conditions
                    .iter()
                    .map(ConditionNode::resolve)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Criterion::Composite { operator, children })
            }
            Category::Screener => {
                let id = f.text("screener", &node.screener)?;
                let screener = Screener::from_id(id).ok_or_else(|| f.unknown("screener", id))?;
                Ok(Criterion::Screener {
                    screener,
                    window: f.window(id)?,
                })
            }
            Category::PeriodReturn => Ok(Criterion::PeriodReturn {
                timeframe: Timeframe::parse(f.text("timeframe", &node.timeframe)?),
                op: f.op()?,
                value: f.value()?,
            }),
            Category::Fallback => Ok(Criterion::Fallback),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(json: &str) -> ConditionNode {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn oscillator_ids_round_trip() {
        for o in Oscillator::ALL {
            assert_eq!(Oscillator::from_id(o.as_str()), Some(o));
        }
    }

    #[test]
    fn every_oscillator_builds_at_window_one() {
        for o in Oscillator::ALL {
            let ind = o.indicator(1);
            assert!(!ind.name().is_empty());
        }
    }

    #[test]
    fn rsi_window_defaults_to_fourteen() {
        let c = node(r#"{"category":1,"indicator":"rsi","op":">","value":70}"#)
            .resolve()
            .unwrap();
        assert_eq!(
            c,
            Criterion::IndicatorThreshold {
                oscillator: Oscillator::Rsi,
                window: 14,
                op: Operator::parse(">"),
                value: Threshold::Scalar(70.0),
            }
        );
    }

    #[test]
    fn fisher_window_defaults_to_nine() {
        let c = node(r#"{"category":1,"indicator":"fisher_transform","op":">","value":0}"#)
            .resolve()
            .unwrap();
        assert!(matches!(c, Criterion::IndicatorThreshold { window: 9, .. }));
    }

    #[test]
    fn unknown_indicator_is_an_error() {
        let err = node(r#"{"category":1,"indicator":"macd","op":">","value":0}"#)
            .resolve()
            .unwrap_err();
        assert_eq!(
            err,
            ConditionError::UnknownIdentifier {
                category: 1,
                kind: "indicator",
                id: "macd".into()
            }
        );
    }

    #[test]
    fn missing_value_is_an_error() {
        let err = node(r#"{"category":1,"indicator":"rsi","op":">"}"#)
            .resolve()
            .unwrap_err();
        assert_eq!(
            err,
            ConditionError::MissingField {
                category: 1,
                field: "value"
            }
        );
    }

    #[test]
    fn unknown_operator_resolves() {
        let c = node(r#"{"category":1,"indicator":"rsi","op":"about","value":50}"#)
            .resolve()
            .unwrap();
        assert!(matches!(
            c,
            Criterion::IndicatorThreshold {
                op: Operator::Unrecognized(_),
                ..
            }
        ));
    }

    #[test]
    fn ma_crossover_needs_no_value_but_needs_window() {
        let c = node(r#"{"category":2,"ma_type":"ema","window":50,"op":"crossed_above"}"#)
            .resolve()
            .unwrap();
        assert!(matches!(c, Criterion::MovingAverage { value: None, .. }));

        let err = node(r#"{"category":2,"ma_type":"ema","op":"crossed_above"}"#)
            .resolve()
            .unwrap_err();
        assert_eq!(
            err,
            ConditionError::MissingField {
                category: 2,
                field: "window"
            }
        );
    }

    #[test]
    fn ma_proximity_needs_value() {
        let err = node(r#"{"category":2,"ma_type":"sma","window":50,"op":"proximity_within"}"#)
            .resolve()
            .unwrap_err();
        assert!(matches!(err, ConditionError::MissingField { field: "value", .. }));

        let ok = node(r#"{"category":2,"ma_type":"sma","window":200,"op":">"}"#).resolve();
        assert!(ok.is_ok());
    }

    #[test]
    fn zero_window_is_rejected() {
        let err = node(r#"{"category":1,"indicator":"rsi","window":0,"op":">","value":70}"#)
            .resolve()
            .unwrap_err();
        assert_eq!(
            err,
            ConditionError::InvalidWindow {
                category: 1,
                window: 0
            }
        );
    }

    #[test]
    fn relative_strength_window_defaults_to_sixty() {
        let c = node(r#"{"category":3,"benchmark":"SPY","op":">","value":1.1}"#)
            .resolve()
            .unwrap();
        assert!(matches!(c, Criterion::RelativeStrength { window: 60, .. }));
    }

    #[test]
    fn pattern_direction_comes_from_prefix() {
        let c = node(r#"{"category":6,"pattern_type":"bearish_engulfing"}"#)
            .resolve()
            .unwrap();
        assert_eq!(
            c,
            Criterion::CandlePattern {
                pattern: CandlePattern::Engulfing,
                direction: PatternDirection::Bearish,
                label: "bearish_engulfing".into(),
            }
        );
    }

    #[test]
    fn explicit_pattern_direction_wins() {
        let c = node(r#"{"category":6,"pattern_type":"hammer","direction":"bullish"}"#)
            .resolve()
            .unwrap();
        assert!(matches!(
            c,
            Criterion::CandlePattern {
                direction: PatternDirection::Bullish,
                ..
            }
        ));
    }

    #[test]
    fn breakout_requires_direction() {
        let err = node(r#"{"category":7,"indicator":"bb_breakout"}"#)
            .resolve()
            .unwrap_err();
        assert!(matches!(err, ConditionError::MissingField { field: "direction", .. }));
    }

    #[test]
    fn composite_requires_children() {
        let err = node(r#"{"category":8,"operator":"and","subConditions":[]}"#)
            .resolve()
            .unwrap_err();
        assert_eq!(err, ConditionError::EmptyComposite);
    }

    #[test]
    fn composite_resolves_wrapped_children() {
        let c = node(
            r#"{"category":8,"operator":"and","subConditions":[
                {"category":4,"conditions":[{"category":4,"reference":"1d_low","op":">=","value":0.05}]},
                {"category":10,"timeframe":"1w","op":">","value":0}
            ]}"#,
        )
        .resolve()
        .unwrap();
        match c {
            Criterion::Composite { operator, children } => {
                assert_eq!(operator, LogicalOp::And);
                assert_eq!(children.len(), 2);
                assert_eq!(children[0].category(), Category::PriceReference);
                assert_eq!(children[1].category(), Category::PeriodReturn);
            }
            other => panic!("expected composite, got {other:?}"),
        }
    }

    #[test]
    fn composite_child_error_propagates() {
        let err = node(
            r#"{"category":8,"operator":"or","subConditions":[{"category":99}]}"#,
        )
        .resolve()
        .unwrap_err();
        assert_eq!(err, ConditionError::UnknownCategory(99));
    }

    #[test]
    fn ytd_spans_all_history() {
        assert_eq!(Timeframe::YearToDate.days(100), Some(99));
        assert_eq!(Timeframe::parse("6m").days(100), Some(126));
        assert_eq!(Timeframe::parse("2y").days(100), None);
    }

    #[test]
    fn fallback_needs_nothing() {
        assert_eq!(node(r#"{"category":11}"#).resolve().unwrap(), Criterion::Fallback);
    }

    #[test]
    fn logical_combination() {
        assert_eq!(LogicalOp::And.combine(&[true, false]), Some(false));
        assert_eq!(LogicalOp::Or.combine(&[true, false]), Some(true));
        assert_eq!(LogicalOp::parse("xor").combine(&[true]), None);
    }
}

//! Condition trees: the structured form a screening query compiles to.
//!
//! A [`ConditionNode`] is the wire record exchanged with the model and
//! written by `--condition` files. It is deliberately loose (every field
//! optional) so that any reply can be parsed. [`ConditionNode::resolve`]
//! turns it into a [`Criterion`], checking the fields its category needs.

pub mod criterion;
pub mod defaults;
pub mod error;
pub mod operator;

pub use criterion::{
    BreakoutDirection, Channel, Criterion, LogicalOp, Oscillator, PatternDirection, Reference,
    Screener, Timeframe, VolatilityMeasure,
};
pub use error::ConditionError;
pub use operator::{compare, Comparison, Operator};

use crate::domain::QueryHash;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

// ─── Category ───────────────────────────────────────────────────────

/// The eleven condition categories, numbered as on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    IndicatorThreshold = 1,
    MovingAverage = 2,
    RelativeStrength = 3,
    PriceReference = 4,
    VolumeVolatility = 5,
    CandlePattern = 6,
    Breakout = 7,
    Composite = 8,
    Screener = 9,
    PeriodReturn = 10,
    Fallback = 11,
}

impl Category {
    pub const ALL: [Category; 11] = [
        Category::IndicatorThreshold,
        Category::MovingAverage,
        Category::RelativeStrength,
        Category::PriceReference,
        Category::VolumeVolatility,
        Category::CandlePattern,
        Category::Breakout,
        Category::Composite,
        Category::Screener,
        Category::PeriodReturn,
        Category::Fallback,
    ];

    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() as i64 == code)
    }

    pub fn code(&self) -> u8 {
        *self as u8
    }

    pub fn name(&self) -> &'static str {
        match self {
            Category::IndicatorThreshold => "indicator threshold",
            Category::MovingAverage => "moving average",
            Category::RelativeStrength => "relative strength",
            Category::PriceReference => "price reference",
            Category::VolumeVolatility => "volume / volatility",
            Category::CandlePattern => "candle pattern",
            Category::Breakout => "breakout",
            Category::Composite => "composite",
            Category::Screener => "screener",
            Category::PeriodReturn => "period return",
            Category::Fallback => "fallback",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code(), self.name())
    }
}

/// Accept `1`, `1.0` or `"1"`. Range checking happens at resolution.
fn de_category<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Float(f64),
        Text(String),
    }

    match Raw::deserialize(d)? {
        Raw::Int(n) => Ok(n),
        Raw::Float(f) if f.fract() == 0.0 => Ok(f as i64),
        Raw::Float(f) => Err(D::Error::custom(format!("category {f} is not an integer"))),
        Raw::Text(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| D::Error::custom(format!("category `{s}` is not a number"))),
    }
}

/// Accept `14`, `14.0` or `"14"`. Zero is rejected at resolution.
fn de_window<'de, D: Deserializer<'de>>(d: D) -> Result<Option<usize>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(u64),
        Float(f64),
        Text(String),
    }

    match Option::<Raw>::deserialize(d)? {
        None => Ok(None),
        Some(Raw::Int(n)) => usize::try_from(n)
            .map(Some)
            .map_err(|_| D::Error::custom(format!("window {n} is too large"))),
        Some(Raw::Float(f)) if f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64 => {
            Ok(Some(f as usize))
        }
        Some(Raw::Float(f)) => Err(D::Error::custom(format!(
            "window {f} is not a whole number"
        ))),
        Some(Raw::Text(s)) => s
            .trim()
            .parse::<usize>()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("window `{s}` is not a number"))),
    }
}

// ─── Threshold ──────────────────────────────────────────────────────

/// Comparison target: a single number, or an inclusive `[low, high]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Threshold {
    Scalar(f64),
    Range([f64; 2]),
}

impl Threshold {
    pub fn scalar(&self) -> Option<f64> {
        match self {
            Threshold::Scalar(v) => Some(*v),
            Threshold::Range(_) => None,
        }
    }
}

// ─── Condition node ─────────────────────────────────────────────────

/// One node of a condition tree, exactly as serialized.
///
/// Composite nodes carry `operator` and `subConditions`. A wrapper node
/// (as the model tends to emit) carries its real condition in
/// `conditions[0]`; see [`ConditionNode::primary`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConditionNode {
    #[serde(deserialize_with = "de_category")]
    pub category: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indicator: Option<String>,
    #[serde(
        default,
        deserialize_with = "de_window",
        skip_serializing_if = "Option::is_none"
    )]
    pub window: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub op: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Threshold>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ma_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub benchmark: Option<String>,
    #[serde(alias = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screener: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeframe: Option<String>,

    /// Logical operator of a composite node (`and` / `or`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    #[serde(
        rename = "subConditions",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub sub_conditions: Vec<ConditionNode>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<ConditionNode>,
}

impl ConditionNode {
    pub fn new(category: Category) -> Self {
        Self {
            category: category.code() as i64,
            ..Self::default()
        }
    }

    /// Composite of already-built children.
    pub fn composite(operator: LogicalOp, children: Vec<ConditionNode>) -> Self {
        Self {
            operator: Some(operator.as_str().to_string()),
            sub_conditions: children,
            ..Self::new(Category::Composite)
        }
    }

    /// Wrap a single condition the way replies carry it: `{category, conditions: [c]}`.
    pub fn wrap(inner: ConditionNode) -> Self {
        Self {
            category: inner.category,
            conditions: vec![inner],
            ..Self::default()
        }
    }

    pub fn category(&self) -> Result<Category, ConditionError> {
        Category::from_code(self.category).ok_or(ConditionError::UnknownCategory(self.category))
    }

    /// The node a wrapper stands for: the first entry of `conditions`,
    /// followed down, or the node itself when it has none.
    pub fn primary(&self) -> &ConditionNode {
        let mut node = self;
        while let Some(first) = node.conditions.first() {
            node = first;
        }
        node
    }
}

// ─── Compiled query ─────────────────────────────────────────────────

/// Reply confidence. Parsed case-insensitively, written lowercase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Confidence {
    High,
    #[default]
    Medium,
    Low,
}

impl TryFrom<String> for Confidence {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Confidence::High),
            "medium" => Ok(Confidence::Medium),
            "low" => Ok(Confidence::Low),
            _ => Err(format!("unknown confidence `{s}`")),
        }
    }
}

/// Which stage produced a compiled query. `regex` and `llm` are read as
/// `rule` and `model`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Provenance {
    #[default]
    Rule,
    Model,
}

impl TryFrom<String> for Provenance {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rule" | "regex" => Ok(Provenance::Rule),
            "model" | "llm" => Ok(Provenance::Model),
            _ => Err(format!("unknown parser `{s}`")),
        }
    }
}

/// Compiler output: the condition tree plus metadata about how it was made.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledQuery {
    #[serde(flatten)]
    pub condition: ConditionNode,
    #[serde(default)]
    pub confidence: Confidence,
    #[serde(rename = "parser", default)]
    pub provenance: Provenance,
    /// Set when the model could not produce a usable condition.
    #[serde(rename = "llmFallback", default, skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
}

impl CompiledQuery {
    pub fn from_rule(condition: ConditionNode) -> Self {
        Self {
            condition,
            confidence: Confidence::High,
            provenance: Provenance::Rule,
            diagnostic: None,
        }
    }

    /// Category 11 placeholder carrying why the model stage failed.
    pub fn fallback(diagnostic: impl Into<String>) -> Self {
        Self {
            condition: ConditionNode::new(Category::Fallback),
            confidence: Confidence::Low,
            provenance: Provenance::Model,
            diagnostic: Some(diagnostic.into()),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.condition.primary().category == Category::Fallback.code() as i64
    }

    /// Content hash of the condition tree; metadata is excluded.
    pub fn fingerprint(&self) -> QueryHash {
        // Plain data with string keys: serialization cannot fail.
        let json = serde_json::to_vec(&self.condition).unwrap_or_default();
        QueryHash::from_bytes(&json)
    }
}

//! Comparison operators and the threshold primitive.

use super::Threshold;

/// Scalar comparison shared by every category that compares a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Gt,
    Ge,
    Lt,
    Le,
    Eq,
    /// Inclusive on both ends.
    Between,
}

/// Operator as it appears on a condition node.
///
/// Strings outside the known set are kept as `Unrecognized`; they never
/// pass, but they are not an error either.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operator {
    Compare(Comparison),
    CrossedAbove,
    CrossedBelow,
    ProximityWithin,
    Unrecognized(String),
}

impl Operator {
    pub fn parse(op: &str) -> Self {
        match op.trim() {
            ">" => Operator::Compare(Comparison::Gt),
            ">=" => Operator::Compare(Comparison::Ge),
            "<" => Operator::Compare(Comparison::Lt),
            "<=" => Operator::Compare(Comparison::Le),
            "==" => Operator::Compare(Comparison::Eq),
            "between" => Operator::Compare(Comparison::Between),
            "crossed_above" => Operator::CrossedAbove,
            "crossed_below" => Operator::CrossedBelow,
            "proximity_within" => Operator::ProximityWithin,
            other => Operator::Unrecognized(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Operator::Compare(c) => c.as_str(),
            Operator::CrossedAbove => "crossed_above",
            Operator::CrossedBelow => "crossed_below",
            Operator::ProximityWithin => "proximity_within",
            Operator::Unrecognized(s) => s,
        }
    }

    pub fn is_crossover(&self) -> bool {
        matches!(self, Operator::CrossedAbove | Operator::CrossedBelow)
    }
}

impl Comparison {
    pub fn as_str(&self) -> &'static str {
        match self {
            Comparison::Gt => ">",
            Comparison::Ge => ">=",
            Comparison::Lt => "<",
            Comparison::Le => "<=",
            Comparison::Eq => "==",
            Comparison::Between => "between",
        }
    }

    /// Apply to `actual`. A scalar operator with a range threshold, or
    /// `Between` with a scalar, is false. NaN never passes.
    pub fn holds(&self, actual: f64, threshold: &Threshold) -> bool {
        match (self, threshold) {
            (Comparison::Gt, Threshold::Scalar(v)) => actual > *v,
            (Comparison::Ge, Threshold::Scalar(v)) => actual >= *v,
            (Comparison::Lt, Threshold::Scalar(v)) => actual < *v,
            (Comparison::Le, Threshold::Scalar(v)) => actual <= *v,
            (Comparison::Eq, Threshold::Scalar(v)) => actual == *v,
            (Comparison::Between, Threshold::Range([lo, hi])) => actual >= *lo && actual <= *hi,
            _ => false,
        }
    }
}

/// Plain comparison of a single value. Non-comparison operators never pass.
pub fn compare(actual: f64, op: &Operator, threshold: &Threshold) -> bool {
    match op {
        Operator::Compare(c) => c.holds(actual, threshold),
        _ => false,
    }
}

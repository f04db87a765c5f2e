use thiserror::Error;

/// A condition tree that cannot be evaluated as written.
///
/// These are configuration errors: the tree names something that does not
/// exist or omits a field its category requires. A well-formed tree whose
/// indicator has too little history is not an error; it simply fails.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConditionError {
    #[error("Unknown condition category: {0}")]
    UnknownCategory(i64),

    #[error("Category {category} condition is missing required field `{field}`")]
    MissingField { category: u8, field: &'static str },

    #[error("Category {category} has no {kind} named `{id}`")]
    UnknownIdentifier {
        category: u8,
        kind: &'static str,
        id: String,
    },

    #[error("Benchmark `{0}` is neither a loaded symbol nor a number")]
    UnknownBenchmark(String),

    #[error("Composite condition has no sub-conditions")]
    EmptyComposite,

    #[error("Category {category} window must be at least 1, got {window}")]
    InvalidWindow { category: u8, window: usize },
}

//! ScreenLab Core: bar domain, indicator library, query compiler, condition evaluator.
//!
//! This crate turns a natural-language screening query into a condition tree
//! and evaluates that tree against one symbol's daily bars:
//! - Domain types (bars, content hashes)
//! - Indicator library (oscillators, moving averages, channels, candle patterns)
//! - Condition schema in wire form and resolved form
//! - Two-stage query compiler (ordered pattern rules, language-model fallback)
//! - Category dispatcher and evaluator

pub mod compiler;
pub mod condition;
pub mod domain;
pub mod eval;
pub mod indicators;

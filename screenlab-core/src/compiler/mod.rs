//! Natural-language query → condition tree.
//!
//! Two stages: the ordered [`PatternRuleSet`], then the [`FallbackResolver`]
//! for anything the rules miss. Compilation never fails; the worst outcome
//! is a category-11 placeholder carrying a diagnostic.

pub mod error;
pub mod fallback;
pub mod llm;
pub mod normalize;
pub mod prompt;
pub mod rules;

pub use error::OracleError;
pub use fallback::{FallbackResolver, LanguageModel};
pub use llm::{ModelConfig, OpenAiCompatibleClient};
pub use rules::{PatternRuleSet, Rule, RuleMatch};

use crate::condition::{CompiledQuery, ConditionNode};
use tracing::{debug, info};

#[derive(Debug, Default)]
pub struct QueryCompiler {
    rules: PatternRuleSet,
    fallback: FallbackResolver,
}

impl QueryCompiler {
    /// Standard rules, no model: misses become placeholders.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(model: impl LanguageModel + 'static) -> Self {
        Self {
            rules: PatternRuleSet::standard(),
            fallback: FallbackResolver::new(model),
        }
    }

    pub fn from_parts(rules: PatternRuleSet, fallback: FallbackResolver) -> Self {
        Self { rules, fallback }
    }

    pub fn rules(&self) -> &PatternRuleSet {
        &self.rules
    }

    pub fn compile(&self, text: &str) -> CompiledQuery {
        if let Some(RuleMatch { rule, node }) = self.rules.match_text(text) {
            debug!(rule, "rule matched");
            let condition = if node.sub_conditions.is_empty() {
                ConditionNode::wrap(node)
            } else {
                node
            };
            let query = CompiledQuery::from_rule(condition);
            info!(
                category = query.condition.category,
                provenance = "rule",
                "compiled query"
            );
            return query;
        }

        let query = self.fallback.resolve(text);
        info!(
            category = query.condition.category,
            provenance = "model",
            fallback = query.is_fallback(),
            "compiled query"
        );
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::{Category, Confidence, Provenance};

    struct Canned(&'static str);

    impl LanguageModel for Canned {
        fn complete(&self, _system: &str, _user: &str) -> Result<String, OracleError> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn rule_hit_is_wrapped_with_high_confidence() {
        let q = QueryCompiler::new().compile("RSI above 70");
        assert_eq!(q.provenance, Provenance::Rule);
        assert_eq!(q.confidence, Confidence::High);
        assert_eq!(q.condition.category, 1);
        assert_eq!(q.condition.conditions.len(), 1);
        assert_eq!(q.condition.primary().indicator.as_deref(), Some("rsi"));
    }

    #[test]
    fn composite_is_not_wrapped() {
        let q = QueryCompiler::new().compile("rsi above 70 and hammer");
        assert_eq!(q.condition.category, Category::Composite.code() as i64);
        assert!(q.condition.conditions.is_empty());
        assert_eq!(q.condition.sub_conditions.len(), 2);
    }

    #[test]
    fn miss_without_model_is_placeholder() {
        let q = QueryCompiler::new().compile("Oversold sentiment");
        assert!(q.is_fallback());
        assert_eq!(q.provenance, Provenance::Model);
        assert_eq!(q.confidence, Confidence::Low);
    }

    #[test]
    fn miss_goes_to_model() {
        let compiler = QueryCompiler::with_model(Canned(
            r#"{"category": 2, "conditions": [{"category": 2, "ma_type": "tema", "window": 20, "op": "crossed_below"}], "confidence": "medium"}"#,
        ));
        let q = compiler.compile("TEMA 20 crossed below SMA 50");
        assert_eq!(q.provenance, Provenance::Model);
        assert_eq!(q.confidence, Confidence::Medium);
        assert_eq!(q.condition.primary().ma_type.as_deref(), Some("tema"));
    }

    #[test]
    fn rules_run_before_model() {
        let compiler = QueryCompiler::with_model(Canned("not consulted"));
        let q = compiler.compile("Weekly return above 5 %");
        assert_eq!(q.provenance, Provenance::Rule);
    }
}

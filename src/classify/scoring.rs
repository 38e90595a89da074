use serde::{Deserialize, Serialize};

use crate::rules::KeywordRuleSet;
use crate::types::identifiers::CategoryCode;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub code: CategoryCode,
    pub score: usize,
}

/// Per-category scores, in the rule set's precedence order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreCard {
    pub scores: Vec<CategoryScore>,
}

impl ScoreCard {
    pub fn score_of(&self, code: &CategoryCode) -> Option<usize> {
        self.scores.iter().find(|s| &s.code == code).map(|s| s.score)
    }
}

pub trait Scorer {
    /// Scores must come back in the order of `rules.rules()`.
    fn score(&self, tags: &[String], rules: &KeywordRuleSet) -> ScoreCard;
}

/// v0: one point per tag per category when any of the category's keywords
/// is a substring of the lower-cased tag.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordHitScorer;

impl Scorer for KeywordHitScorer {
    fn score(&self, tags: &[String], rules: &KeywordRuleSet) -> ScoreCard {
        let mut scores: Vec<CategoryScore> = rules
            .rules()
            .iter()
            .map(|rule| CategoryScore {
                code: rule.code.clone(),
                score: 0,
            })
            .collect();

        for tag in tags {
            let tag_lower = tag.to_lowercase();
            for (rule, entry) in rules.rules().iter().zip(scores.iter_mut()) {
                // Keywords are lower-cased when the rule set is built.
                if rule.keywords.iter().any(|kw| tag_lower.contains(kw.as_str())) {
                    entry.score += 1;
                }
            }
        }

        ScoreCard { scores }
    }
}

pub mod scoring;

use serde::{Deserialize, Serialize};

use crate::record::Assignment;
use crate::rules::{builtin, CategoryGroup, KeywordRuleSet, RuleSetError};
use crate::types::identifiers::CategoryCode;
pub use scoring::{CategoryScore, KeywordHitScorer, ScoreCard, Scorer};

/// Why a code was chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// The record had no tags at all.
    NoTags,
    /// Tags were present but no keyword matched.
    NoMatch,
    /// Won on score; `tied` lists every category that shared the top score,
    /// winner first.
    Matched { score: usize, tied: Vec<CategoryCode> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub code: CategoryCode,
    pub outcome: Outcome,
}

/// Pick one code of `group` for `tags` using the default scorer.
pub fn classify(tags: &[String], rules: &KeywordRuleSet, group: &CategoryGroup) -> CategoryCode {
    classify_with(&KeywordHitScorer, tags, rules, group).code
}

pub fn classify_with<S: Scorer + ?Sized>(
    scorer: &S,
    tags: &[String],
    rules: &KeywordRuleSet,
    group: &CategoryGroup,
) -> Classification {
    if tags.is_empty() {
        return Classification {
            code: group.cannot_place_code().clone(),
            outcome: Outcome::NoTags,
        };
    }

    let card = scorer.score(tags, rules);
    // Only codes the group can actually assign take part.
    let mut leaders: Vec<&CategoryScore> = card
        .scores
        .iter()
        .filter(|s| s.score > 0 && group.contains(&s.code) && !group.is_reserved(&s.code))
        .collect();
    let max_score = leaders.iter().map(|s| s.score).max().unwrap_or(0);
    leaders.retain(|s| s.score == max_score);
    leaders.sort_by_key(|s| group.position(&s.code));

    let tied: Vec<CategoryCode> = leaders.into_iter().map(|s| s.code.clone()).collect();
    let Some(code) = tied.first().cloned() else {
        return Classification {
            code: group.default_code().clone(),
            outcome: Outcome::NoMatch,
        };
    };
    Classification {
        code,
        outcome: Outcome::Matched {
            score: max_score,
            tied,
        },
    }
}

/// A group paired with a rule set built for it.
#[derive(Debug, Clone)]
pub struct GroupRules {
    group: CategoryGroup,
    rules: KeywordRuleSet,
}

impl GroupRules {
    pub fn new(group: CategoryGroup, rules: KeywordRuleSet) -> Result<Self, RuleSetError> {
        if rules.group_id() != group.id() {
            return Err(RuleSetError::GroupMismatch {
                expected: group.id().clone(),
                found: rules.group_id().clone(),
            });
        }

        // Same id is not enough: the rule set must have been built against
        // this vocabulary, in this order.
        let mut last_position = None;
        for rule in rules.rules() {
            let position = group.position(&rule.code).ok_or_else(|| RuleSetError::UnknownCategory {
                group: group.id().clone(),
                code: rule.code.clone(),
            })?;
            if group.is_reserved(&rule.code) {
                return Err(RuleSetError::ReservedCategory {
                    group: group.id().clone(),
                    code: rule.code.clone(),
                });
            }
            if last_position.is_some_and(|last| position <= last) {
                return Err(RuleSetError::InvalidGroup {
                    group: group.id().clone(),
                    reason: format!("rule for {} is out of the group's declared order", rule.code),
                });
            }
            last_position = Some(position);
        }
        Ok(Self { group, rules })
    }

    pub fn group(&self) -> &CategoryGroup {
        &self.group
    }

    pub fn rules(&self) -> &KeywordRuleSet {
        &self.rules
    }
}

/// Assigns the main and personality codes of a record in two independent passes.
#[derive(Debug, Clone)]
pub struct Classifier<S = KeywordHitScorer> {
    scorer: S,
    main: GroupRules,
    personality: GroupRules,
}

impl Classifier<KeywordHitScorer> {
    pub fn new(main: GroupRules, personality: GroupRules) -> Self {
        Self::with_scorer(KeywordHitScorer, main, personality)
    }

    /// The stock groups with the default keyword catalogue.
    pub fn builtin() -> Result<Self, RuleSetError> {
        let main_group = builtin::main_group()?;
        let main_rules = builtin::main_rules(&main_group)?;
        let personality_group = builtin::personality_group()?;
        let personality_rules = builtin::personality_rules(&personality_group)?;
        Ok(Self::new(
            GroupRules::new(main_group, main_rules)?,
            GroupRules::new(personality_group, personality_rules)?,
        ))
    }
}

impl<S: Scorer> Classifier<S> {
    pub fn with_scorer(scorer: S, main: GroupRules, personality: GroupRules) -> Self {
        Self {
            scorer,
            main,
            personality,
        }
    }

    pub fn main(&self) -> &GroupRules {
        &self.main
    }

    pub fn personality(&self) -> &GroupRules {
        &self.personality
    }

    pub fn explain_main(&self, tags: &[String]) -> Classification {
        classify_with(&self.scorer, tags, &self.main.rules, &self.main.group)
    }

    pub fn explain_personality(&self, tags: &[String]) -> Classification {
        classify_with(&self.scorer, tags, &self.personality.rules, &self.personality.group)
    }

    pub fn assign(&self, tags: &[String]) -> Assignment {
        Assignment {
            main: self.explain_main(tags).code,
            personality: self.explain_personality(tags).code,
        }
    }
}

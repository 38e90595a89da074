use std::collections::HashSet;

use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::group::CategoryGroup;
use crate::types::identifiers::{CategoryCode, GroupId};

/// Every way a rule definition can be rejected before a run uses it.
#[derive(Debug, Error)]
pub enum RuleSetError {
    #[error("unknown category group {0}")]
    UnknownGroup(GroupId),
    #[error("invalid category group {group}: {reason}")]
    InvalidGroup { group: GroupId, reason: String },
    #[error("category {code} is not in the vocabulary of group {group}")]
    UnknownCategory { group: GroupId, code: CategoryCode },
    #[error("category {code} of group {group} is a fallback code and cannot carry keywords")]
    ReservedCategory { group: GroupId, code: CategoryCode },
    #[error("category {code} of group {group} is declared more than once")]
    DuplicateCategory { group: GroupId, code: CategoryCode },
    #[error("category {code} of group {group} has an empty keyword")]
    EmptyKeyword { group: GroupId, code: CategoryCode },
    #[error("rule set for group {found} used with group {expected}")]
    GroupMismatch { expected: GroupId, found: GroupId },
    #[error("rule definition parse error: {0}")]
    Parse(String),
    #[error("rule definition JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Keywords of one category. Keywords are stored trimmed and lower-cased.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordRule {
    pub code: CategoryCode,
    pub keywords: Vec<String>,
}

/// Category -> keywords mapping for a single group.
///
/// Rules are kept in the group's declared order, which is the order the
/// classifier scores and breaks ties in. Immutable once built; replacing
/// rules means building a new set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordRuleSet {
    group: GroupId,
    rules: Vec<KeywordRule>,
    fingerprint: String,
}

impl KeywordRuleSet {
    /// Validate `entries` against `group` and build the rule set.
    ///
    /// Every keyword is trimmed and lower-cased here, whatever its source, so
    /// surrounding whitespace never takes part in matching: `" ai "` is stored
    /// as `"ai"` and matches `"email"`. Exact duplicates after that are dropped.
    /// A category listed with no keywords is kept; it always scores 0.
    pub fn new<I, K>(group: &CategoryGroup, entries: I) -> Result<Self, RuleSetError>
    where
        I: IntoIterator<Item = (CategoryCode, K)>,
        K: IntoIterator,
        K::Item: AsRef<str>,
    {
        let mut ranked = Vec::new();
        let mut seen_codes = HashSet::new();

        for (code, keywords) in entries {
            let position = group.position(&code).ok_or_else(|| RuleSetError::UnknownCategory {
                group: group.id().clone(),
                code: code.clone(),
            })?;
            if group.is_reserved(&code) {
                return Err(RuleSetError::ReservedCategory {
                    group: group.id().clone(),
                    code,
                });
            }
            if !seen_codes.insert(code.clone()) {
                return Err(RuleSetError::DuplicateCategory {
                    group: group.id().clone(),
                    code,
                });
            }

            let mut seen_keywords = HashSet::new();
            let mut normalized = Vec::new();
            for keyword in keywords {
                let keyword = keyword.as_ref().trim().to_lowercase();
                // An empty keyword is a substring of every tag.
                if keyword.is_empty() {
                    return Err(RuleSetError::EmptyKeyword {
                        group: group.id().clone(),
                        code,
                    });
                }
                if seen_keywords.insert(keyword.clone()) {
                    normalized.push(keyword);
                }
            }

            ranked.push((
                position,
                KeywordRule {
                    code,
                    keywords: normalized,
                },
            ));
        }

        ranked.sort_by_key(|(position, _)| *position);
        let rules: Vec<KeywordRule> = ranked.into_iter().map(|(_, rule)| rule).collect();
        let fingerprint = fingerprint(group.id(), &rules);

        Ok(KeywordRuleSet {
            group: group.id().clone(),
            rules,
            fingerprint,
        })
    }

    /// A rule set with no categories; every tagged record falls back to DEFAULT.
    pub fn empty(group: &CategoryGroup) -> Self {
        let rules = Vec::new();
        let fingerprint = fingerprint(group.id(), &rules);
        KeywordRuleSet {
            group: group.id().clone(),
            rules,
            fingerprint,
        }
    }

    pub fn group_id(&self) -> &GroupId {
        &self.group
    }

    /// Rules in precedence order.
    pub fn rules(&self) -> &[KeywordRule] {
        &self.rules
    }

    pub fn keywords_for(&self, code: &CategoryCode) -> Option<&[String]> {
        self.rules
            .iter()
            .find(|rule| &rule.code == code)
            .map(|rule| rule.keywords.as_slice())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// `sha256:<hex>` over the group id and every (code, keyword) pair in order.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

fn fingerprint(group: &GroupId, rules: &[KeywordRule]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(group.as_str().as_bytes());
    hasher.update(b"\n");
    for rule in rules {
        hasher.update(rule.code.as_str().as_bytes());
        hasher.update(b"\n");
        for keyword in &rule.keywords {
            hasher.update(b"\t");
            hasher.update(keyword.as_bytes());
            hasher.update(b"\n");
        }
    }
    format!("sha256:{}", hex::encode(hasher.finalize()))
}

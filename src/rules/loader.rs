use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::group::CategoryGroup;
use super::rule_set::{KeywordRuleSet, RuleSetError};
use crate::types::identifiers::{CategoryCode, GroupId};

/// One keyword mapped to one category inside one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleRow {
    pub group: GroupId,
    pub category: CategoryCode,
    pub keyword: String,
}

/// Validated rule sets for a fixed list of groups.
#[derive(Debug, Clone)]
pub struct RuleBook {
    sets: BTreeMap<GroupId, KeywordRuleSet>,
}

impl RuleBook {
    /// Group rows by (group, category) and validate each group's rule set.
    ///
    /// Every group in `groups` gets a rule set, empty if no row names it.
    pub fn from_rows<I>(groups: &[&CategoryGroup], rows: I) -> Result<Self, RuleSetError>
    where
        I: IntoIterator<Item = RuleRow>,
    {
        let mut pending: BTreeMap<GroupId, Vec<(CategoryCode, Vec<String>)>> = groups
            .iter()
            .map(|g| (g.id().clone(), Vec::new()))
            .collect();

        for row in rows {
            let entries = pending
                .get_mut(&row.group)
                .ok_or_else(|| RuleSetError::UnknownGroup(row.group.clone()))?;
            match entries.iter_mut().find(|(code, _)| code == &row.category) {
                Some((_, keywords)) => keywords.push(row.keyword),
                None => entries.push((row.category, vec![row.keyword])),
            }
        }

        let mut sets = BTreeMap::new();
        for group in groups {
            let entries = pending.remove(group.id()).unwrap_or_default();
            sets.insert(group.id().clone(), KeywordRuleSet::new(group, entries)?);
        }
        Ok(RuleBook { sets })
    }

    pub fn get(&self, group: &GroupId) -> Option<&KeywordRuleSet> {
        self.sets.get(group)
    }

    /// Remove and return the rule set of `group`.
    pub fn take(&mut self, group: &GroupId) -> Result<KeywordRuleSet, RuleSetError> {
        self.sets
            .remove(group)
            .ok_or_else(|| RuleSetError::UnknownGroup(group.clone()))
    }
}

/// Parse a JSON array of `{"group", "category", "keyword"}` objects.
pub fn load_json_str(groups: &[&CategoryGroup], json: &str) -> Result<RuleBook, RuleSetError> {
    let rows: Vec<RuleRow> = serde_json::from_str(json)?;
    RuleBook::from_rows(groups, rows)
}

pub fn load_json_file(groups: &[&CategoryGroup], path: &Path) -> Result<RuleBook, RuleSetError> {
    let f = fs::File::open(path)?;
    let rows: Vec<RuleRow> = serde_json::from_reader(f)?;
    RuleBook::from_rows(groups, rows)
}

/// Parse `group,category,keyword` lines.
///
/// Blank lines and lines starting with `#` are skipped. Everything after the
/// second comma is the keyword, so keywords may themselves contain commas.
pub fn load_delimited_str(groups: &[&CategoryGroup], text: &str) -> Result<RuleBook, RuleSetError> {
    let mut rows = Vec::new();
    for (n, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut fields = line.splitn(3, ',').map(str::trim);
        match (fields.next(), fields.next(), fields.next()) {
            (Some(group), Some(category), Some(keyword))
                if !group.is_empty() && !category.is_empty() =>
            {
                rows.push(RuleRow {
                    group: GroupId::new(group),
                    category: CategoryCode::new(category),
                    keyword: keyword.to_string(),
                });
            }
            _ => {
                return Err(RuleSetError::Parse(format!(
                    "line {}: expected `group,category,keyword`",
                    n + 1
                )))
            }
        }
    }
    RuleBook::from_rows(groups, rows)
}

pub fn load_delimited_file(groups: &[&CategoryGroup], path: &Path) -> Result<RuleBook, RuleSetError> {
    let text = fs::read_to_string(path)?;
    load_delimited_str(groups, &text)
}

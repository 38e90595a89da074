use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::rule_set::RuleSetError;
use crate::types::identifiers::{CategoryCode, GroupId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDef {
    pub code: CategoryCode,
    pub label: String,
}

impl CategoryDef {
    pub fn new(code: impl Into<String>, label: impl Into<String>) -> Self {
        CategoryDef {
            code: CategoryCode::new(code),
            label: label.into(),
        }
    }
}

/// Wire shape of a group definition; validated into a [`CategoryGroup`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupDefinition {
    pub id: GroupId,
    pub categories: Vec<CategoryDef>,
    pub default: CategoryCode,
    pub cannot_place: CategoryCode,
}

/// One classification axis: an ordered vocabulary plus its two fallback codes.
///
/// Declaration order of `categories` is the tie-break precedence used when
/// several categories reach the same top score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GroupDefinition", into = "GroupDefinition")]
pub struct CategoryGroup {
    id: GroupId,
    categories: Vec<CategoryDef>,
    default_code: CategoryCode,
    cannot_place_code: CategoryCode,
}

impl CategoryGroup {
    pub fn new(
        id: GroupId,
        categories: Vec<CategoryDef>,
        default_code: CategoryCode,
        cannot_place_code: CategoryCode,
    ) -> Result<Self, RuleSetError> {
        let invalid = |reason: String| RuleSetError::InvalidGroup {
            group: id.clone(),
            reason,
        };

        let mut seen = HashSet::with_capacity(categories.len());
        for def in &categories {
            if !seen.insert(&def.code) {
                return Err(invalid(format!("duplicate category code {}", def.code)));
            }
        }
        if !seen.contains(&default_code) {
            return Err(invalid(format!("default code {default_code} is not declared")));
        }
        if !seen.contains(&cannot_place_code) {
            return Err(invalid(format!(
                "cannot-place code {cannot_place_code} is not declared"
            )));
        }
        if default_code == cannot_place_code {
            return Err(invalid("default and cannot-place codes must differ".into()));
        }

        Ok(CategoryGroup {
            id,
            categories,
            default_code,
            cannot_place_code,
        })
    }

    pub fn id(&self) -> &GroupId {
        &self.id
    }

    pub fn categories(&self) -> &[CategoryDef] {
        &self.categories
    }

    pub fn codes(&self) -> impl Iterator<Item = &CategoryCode> {
        self.categories.iter().map(|def| &def.code)
    }

    pub fn default_code(&self) -> &CategoryCode {
        &self.default_code
    }

    pub fn cannot_place_code(&self) -> &CategoryCode {
        &self.cannot_place_code
    }

    pub fn contains(&self, code: &CategoryCode) -> bool {
        self.position(code).is_some()
    }

    /// Precedence rank of `code`; lower wins ties.
    pub fn position(&self, code: &CategoryCode) -> Option<usize> {
        self.categories.iter().position(|def| &def.code == code)
    }

    pub fn label(&self, code: &CategoryCode) -> Option<&str> {
        self.categories
            .iter()
            .find(|def| &def.code == code)
            .map(|def| def.label.as_str())
    }

    /// Fallback codes are only ever assigned, never matched by keyword.
    pub fn is_reserved(&self, code: &CategoryCode) -> bool {
        code == &self.default_code || code == &self.cannot_place_code
    }
}

impl TryFrom<GroupDefinition> for CategoryGroup {
    type Error = RuleSetError;

    fn try_from(def: GroupDefinition) -> Result<Self, Self::Error> {
        CategoryGroup::new(def.id, def.categories, def.default, def.cannot_place)
    }
}

impl From<CategoryGroup> for GroupDefinition {
    fn from(group: CategoryGroup) -> Self {
        GroupDefinition {
            id: group.id,
            categories: group.categories,
            default: group.default_code,
            cannot_place: group.cannot_place_code,
        }
    }
}

use serde::{Deserialize, Serialize};

use crate::types::identifiers::{CategoryCode, RecordId};

/// A record as seen by the classifier.
///
/// Only `tags` is read; the two category fields are written by batch runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub main_category: Option<CategoryCode>,
    #[serde(default)]
    pub personality_category: Option<CategoryCode>,
}

impl Record {
    pub fn new(id: RecordId, tags: Vec<String>) -> Self {
        Record {
            id,
            tags,
            main_category: None,
            personality_category: None,
        }
    }

    pub fn apply(&mut self, assignment: Assignment) {
        self.main_category = Some(assignment.main);
        self.personality_category = Some(assignment.personality);
    }

    pub fn is_assigned(&self) -> bool {
        self.main_category.is_some() && self.personality_category.is_some()
    }
}

/// The pair of codes chosen for one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub main: CategoryCode,
    pub personality: CategoryCode,
}

pub mod builtin;
pub mod group;
pub mod loader;
pub mod rule_set;

pub use group::{CategoryDef, CategoryGroup, GroupDefinition};
pub use loader::{
    load_delimited_file, load_delimited_str, load_json_file, load_json_str, RuleBook, RuleRow,
};
pub use rule_set::{KeywordRule, KeywordRuleSet, RuleSetError};

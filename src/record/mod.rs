pub mod memory;
pub mod record;
pub mod store;
pub mod tags;

pub use crate::types::identifiers::RecordId;
pub use memory::InMemoryRecordStore;
pub use record::{Assignment, Record};
pub use store::{RecordStore, StoreError};
pub use tags::{normalize_tags, split_tag_list};

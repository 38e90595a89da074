pub mod identifiers;
pub mod progress;

pub use identifiers::{CategoryCode, GroupId, RecordId, RunId};
pub use progress::{CategorySummary, RunProgress, RunStatus};

//! CLI command implementations.

mod call;
mod locks;
mod records;
mod report;
mod review;

pub use call::call;
pub use locks::{locks_clear, locks_set};
pub use records::{records_count, records_delete, records_list, records_show, records_submit, SubmitArgs};
pub use report::report;
pub use review::{review_approve, review_deny};

//! Persistence for identity-document requests.
//!
//! - [`RecordStore`]: keyed CRUD over [`PersonRecord`]s grouped by owner,
//!   with a JSON file backend ([`JsonRecordStore`]) and an in-memory one
//!   ([`MemoryRecordStore`]).
//! - [`CooldownLocks`]: per-owner submission bans with an expiry.
//! - [`FormSchema`]: the declarative submission form and its validation.

mod error;
mod forms;
mod fs;
mod json_store;
mod locks;
mod record;
mod traits;

pub use error::{StoreError, StoreResult};
pub use forms::{
    FieldError, FieldProblem, FieldSpec, FormSchema, ValidatedForm, KEY_BIRTH_DATE,
    KEY_BIRTH_PLACE, KEY_FULL_NAME, KEY_GENDER, KEY_HEIGHT,
};
pub use json_store::{JsonRecordStore, MemoryRecordStore};
pub use locks::CooldownLocks;
pub use record::{DocumentKind, PersonDetails, PersonRecord, Status, TIME_FORMAT};
pub use traits::{ensure_capacity, RecordStore, MAX_RECORDS_PER_OWNER};

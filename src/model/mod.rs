//! Table schema model

mod builder;
mod elements;
mod table_snapshot;

pub use builder::{
    build_snapshot, fetch_attributes, fetch_checks, fetch_dependent_views, fetch_exclusions,
    fetch_foreign_keys, fetch_indexes, fetch_owned_sequences, fetch_referencing_keys,
    fetch_security_labels, fetch_triggers, fetch_unique,
};
pub use elements::*;
pub use table_snapshot::TableSnapshot;

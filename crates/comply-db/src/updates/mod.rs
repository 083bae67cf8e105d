//! Update builder types for entity mutations.
//!
//! Each builder produces an update struct with `Option` fields. Only `Some`
//! fields generate SET clauses in the dynamic UPDATE SQL, so every patch is
//! whitelisted per entity. The update struct is also serialized as the audit
//! `detail` payload (changed fields only).

pub mod document;
pub mod framework;
pub mod task;

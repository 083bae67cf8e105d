//! # comply-core
//!
//! Core types, ID prefixes, and error types for the compliance engine.
//!
//! This crate provides the foundational types shared across all comply crates:
//! - Entity structs for all domain objects (frameworks, progress, tasks, documents, etc.)
//! - Status and priority enums
//! - ID prefix constants
//! - Version-string arithmetic for the document version engine
//! - Progress percentage arithmetic for the aggregator
//! - Cross-cutting error types
//! - Audit detail sub-types and dashboard response types
//! - The built-in framework catalog and the content-generation seam

pub mod audit_detail;
pub mod catalog;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod generation;
pub mod identity;
pub mod ids;
pub mod progress;
pub mod responses;
pub mod versioning;

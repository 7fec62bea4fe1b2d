//! Starmodel - tabular semantic model engine
//!
//! An in-memory star-schema model: tables, fields, relationships and measures kept
//! referentially consistent under editing, with canvas layout and on-demand structural
//! validation (orphan tables, relationship cycles).

pub mod core;

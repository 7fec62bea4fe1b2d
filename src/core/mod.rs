//! Semantic model core: entity graph, editing operations, layout and validation

pub mod catalog;
pub mod config;
mod demo;
mod error;
mod ids;
mod layout;
mod measures;
mod mutator;
mod naming;
mod schema;
pub mod snapshot;
mod store;
mod validation;

pub use demo::create_demo_model;
pub use error::*;
pub use ids::*;
pub use layout::*;
pub use measures::*;
pub use mutator::*;
pub use naming::*;
pub use schema::*;
pub use snapshot::{ModelSnapshot, SnapshotCodec, SnapshotError};
pub use store::*;
pub use validation::*;

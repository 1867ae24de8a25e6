//! Schema, units and machine catalog for fuzzing pool configuration.
//!
//! This crate holds everything needed to check a single document in
//! isolation: the field tables for pool and map documents, the parsers for
//! human readable sizes and durations, the provider/architecture vocabulary,
//! and the catalog of machine types pools are matched against.

pub mod cloud;
pub mod error;
pub mod machines;
pub mod schema;
pub mod units;
pub mod values;

pub use cloud::{Architecture, Provider};
pub use error::{Error, Result};
pub use machines::{MachineCatalog, MachineSpec, MachineType};
pub use schema::{Document, DocumentKind, FieldSpec, FieldType};
pub use units::{parse_duration, parse_size, GIGABYTE};
pub use values::{Artifact, ArtifactKind, Container};

//! Recursive schema expansion engine for schemagen.
//!
//! A schema is a tree of array, object and leaf nodes. Expansion walks the
//! tree in declaration order, draws array lengths from their cardinality,
//! invokes leaf generators and returns a plain [`Value`] tree with the same
//! shape. Cross-field correlation goes through the session [`Store`];
//! per-array uniqueness goes through [`generators::Unique`].

pub mod description;
pub mod engine;
pub mod errors;
pub mod generators;
pub mod model;
pub mod output;
pub mod params;
pub mod routine;
pub mod samples;
pub mod schema;
pub mod store;

pub use description::compile_description;
pub use engine::{
    GenerationEngine, GenerationResult, PREVIEW_LIMIT, Session, generate, generate_preview,
};
pub use errors::GenerationError;
pub use generators::{Generator, GeneratorContext, GeneratorRegistry};
pub use model::{DatasetReport, ExpansionStats, GenerateOptions, GenerationMode, GenerationReport};
pub use routine::{Dataset, DescriptionRoutine, Routine};
pub use schema::{ArrayNode, Cardinality, DEFAULT_CARDINALITY, ObjectNode, SchemaNode};
pub use schemagen_core::Value;
pub use store::Store;

use std::fmt;

use indexmap::IndexMap;

use schemagen_core::Value;

use crate::errors::GenerationError;
use crate::generators::{Generator, GeneratorContext, from_fn};

/// Bounds used when an array node declares no cardinality.
pub const DEFAULT_CARDINALITY: (usize, usize) = (0, 10);

/// How many elements an array node produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cardinality {
    /// Inclusive `[0, 10]`.
    #[default]
    Default,
    Exact(usize),
    /// Inclusive `[min, max]`.
    Range(usize, usize),
}

impl Cardinality {
    /// Inclusive `(min, max)` bounds for the length draw.
    pub fn bounds(self) -> Result<(usize, usize), GenerationError> {
        match self {
            Cardinality::Default => Ok(DEFAULT_CARDINALITY),
            Cardinality::Exact(count) => Ok((count, count)),
            Cardinality::Range(min, max) if min <= max => Ok((min, max)),
            Cardinality::Range(min, max) => Err(GenerationError::InvalidSchema(format!(
                "array cardinality min {min} must be <= max {max}"
            ))),
        }
    }
}

impl From<usize> for Cardinality {
    fn from(count: usize) -> Self {
        Cardinality::Exact(count)
    }
}

impl From<(usize, usize)> for Cardinality {
    fn from((min, max): (usize, usize)) -> Self {
        Cardinality::Range(min, max)
    }
}

impl From<Option<usize>> for Cardinality {
    fn from(count: Option<usize>) -> Self {
        count.map(Cardinality::Exact).unwrap_or_default()
    }
}

/// Declarative description of one part of the output tree.
pub enum SchemaNode {
    Array(ArrayNode),
    Object(ObjectNode),
    /// The generator's result is used as is, composite or not.
    Leaf(Box<dyn Generator>),
}

pub struct ArrayNode {
    pub element: Box<SchemaNode>,
    pub cardinality: Cardinality,
}

/// Named fields expanded in declaration order.
#[derive(Default)]
pub struct ObjectNode {
    fields: IndexMap<String, SchemaNode>,
}

impl SchemaNode {
    pub fn array(element: SchemaNode, cardinality: impl Into<Cardinality>) -> Self {
        SchemaNode::Array(ArrayNode {
            element: Box::new(element),
            cardinality: cardinality.into(),
        })
    }

    pub fn object(object: ObjectNode) -> Self {
        SchemaNode::Object(object)
    }

    pub fn leaf(generator: impl Generator + 'static) -> Self {
        SchemaNode::Leaf(Box::new(generator))
    }

    pub fn from_fn<F>(f: F) -> Self
    where
        F: FnMut(&mut GeneratorContext<'_>) -> Result<Value, GenerationError> + 'static,
    {
        Self::leaf(from_fn(f))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SchemaNode::Array(_) => "array",
            SchemaNode::Object(_) => "object",
            SchemaNode::Leaf(_) => "leaf",
        }
    }

    /// Reset the generators scoped to an array built from this node: the
    /// node itself when it is a leaf, or each direct leaf field when it is
    /// an object. Nested arrays and objects reset at their own boundaries.
    pub(crate) fn reset_scope(&mut self) {
        match self {
            SchemaNode::Leaf(generator) => generator.reset(),
            SchemaNode::Object(object) => {
                for field in object.fields.values_mut() {
                    if let SchemaNode::Leaf(generator) = field {
                        generator.reset();
                    }
                }
            }
            SchemaNode::Array(_) => {}
        }
    }
}

impl From<ObjectNode> for SchemaNode {
    fn from(object: ObjectNode) -> Self {
        SchemaNode::Object(object)
    }
}

impl fmt::Debug for SchemaNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaNode::Array(array) => f
                .debug_struct("Array")
                .field("element", &array.element)
                .field("cardinality", &array.cardinality)
                .finish(),
            SchemaNode::Object(object) => f.debug_map().entries(object.fields.iter()).finish(),
            SchemaNode::Leaf(generator) => f.debug_tuple("Leaf").field(&generator.id()).finish(),
        }
    }
}

impl ObjectNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field. Re-declaring a name replaces the node in place.
    pub fn field(mut self, name: impl Into<String>, node: SchemaNode) -> Self {
        self.insert(name, node);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, node: SchemaNode) {
        self.fields.insert(name.into(), node);
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub(crate) fn fields_mut(&mut self) -> impl Iterator<Item = (&String, &mut SchemaNode)> {
        self.fields.iter_mut()
    }
}

use std::borrow::Cow;

use rand::RngCore;

use schemagen_core::Value;

use crate::errors::GenerationError;
use crate::model::{ExpansionStats, GenerationMode};
use crate::schema::SchemaNode;
use crate::store::Store;

pub mod faker;
pub mod identity;
pub mod primitives;
pub mod registry;
pub mod unique;

pub use identity::{IdSequence, id_fn};
pub use registry::GeneratorRegistry;
pub use unique::{Unique, unique};

/// State threaded through one expansion: the session store, its RNG, the
/// generation mode and the expansion counters.
pub struct GeneratorContext<'a> {
    pub store: &'a mut Store,
    pub rng: &'a mut dyn RngCore,
    pub mode: GenerationMode,
    pub stats: &'a mut ExpansionStats,
}

impl GeneratorContext<'_> {
    /// Expand a nested schema in the current mode, for leaves that build
    /// composite values themselves.
    pub fn expand(&mut self, node: &mut SchemaNode) -> Result<Value, GenerationError> {
        crate::engine::expand(node, self)
    }
}

/// A value source for a leaf node.
///
/// `reset` marks the end of an enclosing array: the engine calls it once
/// after the array built from this generator (directly, or as a field of the
/// element object) is complete. Stateless generators keep the no-op default.
pub trait Generator {
    fn id(&self) -> &str;

    fn draw(&mut self, ctx: &mut GeneratorContext<'_>) -> Result<Value, GenerationError>;

    fn reset(&mut self) {}
}

impl<G: Generator + ?Sized> Generator for Box<G> {
    fn id(&self) -> &str {
        (**self).id()
    }

    fn draw(&mut self, ctx: &mut GeneratorContext<'_>) -> Result<Value, GenerationError> {
        (**self).draw(ctx)
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}

/// Generator backed by a closure.
pub struct FnGenerator<F> {
    id: Cow<'static, str>,
    f: F,
}

impl<F> Generator for FnGenerator<F>
where
    F: FnMut(&mut GeneratorContext<'_>) -> Result<Value, GenerationError>,
{
    fn id(&self) -> &str {
        &self.id
    }

    fn draw(&mut self, ctx: &mut GeneratorContext<'_>) -> Result<Value, GenerationError> {
        (self.f)(ctx)
    }
}

/// Wrap a closure as a generator. Whatever it returns is used as is; the
/// engine never expands a leaf's result further.
pub fn from_fn<F>(f: F) -> FnGenerator<F>
where
    F: FnMut(&mut GeneratorContext<'_>) -> Result<Value, GenerationError>,
{
    from_fn_named("fn", f)
}

pub fn from_fn_named<F>(id: impl Into<Cow<'static, str>>, f: F) -> FnGenerator<F>
where
    F: FnMut(&mut GeneratorContext<'_>) -> Result<Value, GenerationError>,
{
    FnGenerator { id: id.into(), f }
}

/// Publishes every drawn value to the store under `key`.
pub struct Stored<G> {
    key: String,
    inner: G,
}

pub fn stored<G: Generator>(key: impl Into<String>, inner: G) -> Stored<G> {
    Stored {
        key: key.into(),
        inner,
    }
}

impl<G: Generator> Generator for Stored<G> {
    fn id(&self) -> &str {
        self.inner.id()
    }

    fn draw(&mut self, ctx: &mut GeneratorContext<'_>) -> Result<Value, GenerationError> {
        let value = self.inner.draw(ctx)?;
        Ok(ctx.store.set(self.key.clone(), value))
    }

    fn reset(&mut self) {
        self.inner.reset();
    }
}

/// Reads the value last stored under `key`, `Null` when unset.
pub struct StoreGet {
    key: String,
}

pub fn store_get(key: impl Into<String>) -> StoreGet {
    StoreGet { key: key.into() }
}

impl Generator for StoreGet {
    fn id(&self) -> &str {
        "store.get"
    }

    fn draw(&mut self, ctx: &mut GeneratorContext<'_>) -> Result<Value, GenerationError> {
        Ok(ctx.store.get(&self.key).cloned().unwrap_or_default())
    }
}

/// Always returns the same value.
pub struct Const {
    value: Value,
}

pub fn constant(value: impl Into<Value>) -> Const {
    Const {
        value: value.into(),
    }
}

impl Generator for Const {
    fn id(&self) -> &str {
        "const"
    }

    fn draw(&mut self, _ctx: &mut GeneratorContext<'_>) -> Result<Value, GenerationError> {
        Ok(self.value.clone())
    }
}

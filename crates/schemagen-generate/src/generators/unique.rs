use std::collections::HashSet;

use tracing::warn;

use schemagen_core::Value;

use crate::errors::GenerationError;
use crate::generators::{Generator, GeneratorContext};

const RETRY_WARN_ATTEMPTS: u64 = 10_000;

/// Uniqueness wrapper: never yields a value it already yielded since the
/// last [`Generator::reset`].
///
/// Draws retry the wrapped generator until an unseen value comes up. With
/// the default configuration there is no retry bound, so a wrapped
/// generator whose value space is smaller than the number of draws between
/// two resets never returns. Callers that cannot guarantee a large enough
/// value space can opt into [`Unique::with_max_attempts`].
pub struct Unique<G> {
    inner: G,
    seen: HashSet<String>,
    max_attempts: Option<u64>,
}

/// Wrap `inner` so repeated draws within one array are distinct.
pub fn unique<G: Generator>(inner: G) -> Unique<G> {
    Unique::new(inner)
}

impl<G: Generator> Unique<G> {
    pub fn new(inner: G) -> Self {
        Self {
            inner,
            seen: HashSet::new(),
            max_attempts: None,
        }
    }

    /// Fail with [`GenerationError::UniqueExhausted`] after `attempts`
    /// consecutive draws that produced only already seen values.
    pub fn with_max_attempts(mut self, attempts: u64) -> Self {
        self.max_attempts = Some(attempts.max(1));
        self
    }
}

impl<G: Generator> Generator for Unique<G> {
    fn id(&self) -> &str {
        self.inner.id()
    }

    fn draw(&mut self, ctx: &mut GeneratorContext<'_>) -> Result<Value, GenerationError> {
        let mut attempts: u64 = 0;
        loop {
            let value = self.inner.draw(ctx)?;
            attempts += 1;
            if self.seen.insert(value.unique_key()) {
                return Ok(value);
            }

            if let Some(max_attempts) = self.max_attempts
                && attempts >= max_attempts
            {
                return Err(GenerationError::UniqueExhausted {
                    generator: self.inner.id().to_string(),
                    attempts,
                });
            }

            if attempts == RETRY_WARN_ATTEMPTS {
                warn!(
                    generator = %self.inner.id(),
                    attempts,
                    seen = self.seen.len(),
                    "unique generator keeps drawing duplicates"
                );
            }
        }
    }

    /// Forget every seen value. The wrapped generator keeps its own state.
    fn reset(&mut self) {
        self.seen.clear();
    }
}

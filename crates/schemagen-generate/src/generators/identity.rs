use schemagen_core::Value;

use crate::errors::GenerationError;
use crate::generators::{Generator, GeneratorContext};

/// Strictly increasing counter: the first draw yields 1.
///
/// Array boundaries do not reset it; each call to [`id_fn`] creates an
/// independent counter.
#[derive(Debug, Default)]
pub struct IdSequence {
    last: i64,
}

pub fn id_fn() -> IdSequence {
    IdSequence::default()
}

impl IdSequence {
    pub fn next_id(&mut self) -> i64 {
        self.last += 1;
        self.last
    }
}

impl Generator for IdSequence {
    fn id(&self) -> &str {
        "id.sequence"
    }

    fn draw(&mut self, _ctx: &mut GeneratorContext<'_>) -> Result<Value, GenerationError> {
        Ok(Value::Int(self.next_id()))
    }
}

use fake::Fake;
use fake::faker::company::en::CompanyName;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;

use schemagen_core::Value;

use crate::errors::GenerationError;
use crate::generators::{Generator, GeneratorContext, GeneratorRegistry};

pub fn register(registry: &mut GeneratorRegistry) {
    registry.register("faker.person.name", &[], "full person name", |_| {
        Ok(Box::new(person_name()))
    });
    registry.register("faker.company.name", &[], "company name", |_| {
        Ok(Box::new(company_name()))
    });
    registry.register("faker.internet.email", &[], "safe example email", |_| {
        Ok(Box::new(email()))
    });
}

#[derive(Debug, Clone, Copy)]
enum FakerKind {
    PersonName,
    CompanyName,
    Email,
}

/// Text produced by the `fake` crate with the session RNG.
pub struct Faker {
    kind: FakerKind,
}

pub fn person_name() -> Faker {
    Faker {
        kind: FakerKind::PersonName,
    }
}

pub fn company_name() -> Faker {
    Faker {
        kind: FakerKind::CompanyName,
    }
}

pub fn email() -> Faker {
    Faker {
        kind: FakerKind::Email,
    }
}

impl Generator for Faker {
    fn id(&self) -> &str {
        match self.kind {
            FakerKind::PersonName => "faker.person.name",
            FakerKind::CompanyName => "faker.company.name",
            FakerKind::Email => "faker.internet.email",
        }
    }

    fn draw(&mut self, ctx: &mut GeneratorContext<'_>) -> Result<Value, GenerationError> {
        let rng = &mut *ctx.rng;
        let value: String = match self.kind {
            FakerKind::PersonName => Name().fake_with_rng(rng),
            FakerKind::CompanyName => CompanyName().fake_with_rng(rng),
            FakerKind::Email => SafeEmail().fake_with_rng(rng),
        };
        Ok(Value::Text(value))
    }
}

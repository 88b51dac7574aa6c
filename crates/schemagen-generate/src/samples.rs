//! Built-in sample routines showing cross-field correlation through the
//! store.

use rand::Rng;

use schemagen_core::Value;

use crate::engine::Session;
use crate::errors::GenerationError;
use crate::generators::faker::{company_name, email, person_name};
use crate::generators::primitives::{
    element, int_range, pick_one, pick_subset, random_boolean, random_int,
};
use crate::generators::{from_fn_named, id_fn, stored, unique};
use crate::routine::{Dataset, Routine};
use crate::schema::{Cardinality, ObjectNode, SchemaNode};

const TEAMS_KEY: &str = "teams";
const DRIVER_KEY: &str = "driver";
const CAR_MODELS: [&str; 4] = ["Audi", "BMW", "Mercedes", "Porsche"];

/// Every built-in sample routine.
pub fn all() -> Vec<Box<dyn Routine>> {
    vec![Box::new(TeamsUsers), Box::new(DriversCars)]
}

pub fn find(name: &str) -> Option<Box<dyn Routine>> {
    all().into_iter().find(|routine| routine.name() == name)
}

/// `Teams` (10) and `Users` (100). Each user's `teamIds` publishes the
/// picked teams to the store and `teamNames` reads them back.
pub struct TeamsUsers;

impl Routine for TeamsUsers {
    fn name(&self) -> &str {
        "teams-users"
    }

    fn description(&self) -> &str {
        "10 teams and 100 users whose teamNames match their teamIds"
    }

    fn run(&self, session: &mut Session) -> Result<Vec<Dataset>, GenerationError> {
        let mut teams_schema = SchemaNode::array(
            ObjectNode::new()
                .field("id", SchemaNode::leaf(id_fn()))
                .field("name", SchemaNode::leaf(company_name()))
                .into(),
            Cardinality::Exact(10),
        );
        let teams = session.generate(&mut teams_schema)?;
        let team_list = teams.as_array().map(<[Value]>::to_vec).unwrap_or_default();

        let mut users_schema = SchemaNode::array(
            ObjectNode::new()
                .field("id", SchemaNode::leaf(unique(random_int())))
                .field("email", SchemaNode::leaf(email()))
                .field("isAdmin", SchemaNode::leaf(random_boolean()))
                .field(
                    "teamIds",
                    SchemaNode::from_fn(move |ctx| {
                        let picked = pick_subset(&team_list, ctx.rng);
                        let ids = picked
                            .iter()
                            .filter_map(|team| team.get("id").cloned())
                            .collect();
                        ctx.store.set(TEAMS_KEY, Value::Array(picked));
                        Ok(Value::Array(ids))
                    }),
                )
                .field(
                    "teamNames",
                    SchemaNode::from_fn(|ctx| {
                        let teams = ctx
                            .store
                            .get(TEAMS_KEY)
                            .and_then(Value::as_array)
                            .ok_or_else(|| GenerationError::Generator {
                                generator: "teamNames".to_string(),
                                message: format!("store key '{TEAMS_KEY}' holds no team list"),
                            })?;
                        Ok(Value::Array(
                            teams
                                .iter()
                                .filter_map(|team| team.get("name").cloned())
                                .collect(),
                        ))
                    }),
                )
                .into(),
            Cardinality::Exact(100),
        );
        let users = session.generate(&mut users_schema)?;

        Ok(vec![Dataset::new("Teams", teams), Dataset::new("Users", users)])
    }
}

/// `Drivers` (100) and `Cars` (10 to 20). A car's `driver` publishes the
/// chosen driver id or null; its `price` is null whenever a driver was
/// stored.
pub struct DriversCars;

impl Routine for DriversCars {
    fn name(&self) -> &str {
        "drivers-cars"
    }

    fn description(&self) -> &str {
        "100 drivers and 10 to 20 cars, priced only when no driver is assigned"
    }

    fn run(&self, session: &mut Session) -> Result<Vec<Dataset>, GenerationError> {
        let mut drivers_schema = SchemaNode::array(
            ObjectNode::new()
                .field("id", SchemaNode::leaf(id_fn()))
                .field("name", SchemaNode::leaf(person_name()))
                .into(),
            Cardinality::Exact(100),
        );
        let drivers = session.generate(&mut drivers_schema)?;
        let driver_ids: Vec<Value> = drivers
            .as_array()
            .map(|drivers| {
                drivers
                    .iter()
                    .filter_map(|driver| driver.get("id").cloned())
                    .collect()
            })
            .unwrap_or_default();

        let price = int_range(100_000, 10_000_000);
        let mut cars_schema = SchemaNode::array(
            ObjectNode::new()
                .field("id", SchemaNode::leaf(id_fn()))
                .field("model", SchemaNode::leaf(element(CAR_MODELS)))
                .field(
                    "driver",
                    SchemaNode::leaf(stored(
                        DRIVER_KEY,
                        from_fn_named("driver", move |ctx| {
                            if ctx.rng.random_bool(0.5) {
                                Ok(pick_one(&driver_ids, ctx.rng).cloned().unwrap_or_default())
                            } else {
                                Ok(Value::Null)
                            }
                        }),
                    )),
                )
                .field(
                    "price",
                    SchemaNode::from_fn(move |ctx| {
                        let has_driver = ctx
                            .store
                            .get(DRIVER_KEY)
                            .is_some_and(|driver| !driver.is_null());
                        if has_driver {
                            return Ok(Value::Null);
                        }
                        let cents = price.sample(ctx.rng)?;
                        Ok(Value::Float(cents as f64 / 100.0))
                    }),
                )
                .into(),
            Cardinality::Range(10, 20),
        );
        let cars = session.generate(&mut cars_schema)?;

        Ok(vec![Dataset::new("Drivers", drivers), Dataset::new("Cars", cars)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_are_listed_by_name() {
        let names: Vec<String> = all().iter().map(|routine| routine.name().to_string()).collect();
        assert_eq!(names, ["teams-users", "drivers-cars"]);
        assert!(find("drivers-cars").is_some());
        assert!(find("nope").is_none());
    }
}

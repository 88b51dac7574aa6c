use chrono::{DateTime, TimeDelta, Utc};
use rand::{Rng, RngCore};
use rand_regex::Regex as RandRegex;

use schemagen_core::{Value, parse_date};

use crate::errors::GenerationError;
use crate::generators::{Generator, GeneratorContext, GeneratorRegistry};
use crate::params::{ParamKind, ParamMap, ParamSpec};

const RANDOM_STRING_LEN: usize = 22;
const RANDOM_STRING_CHARSET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const RANDOM_NUMBER_LIMIT: i64 = 1_000_000;
const RANDOM_DATE_WINDOW_DAYS: i64 = 120;
const DEFAULT_MAX_REPEAT: u32 = 32;

const INT_RANGE_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("min", ParamKind::Int, true),
    ParamSpec::new("max", ParamKind::Int, true),
];
const FLOAT_RANGE_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("min", ParamKind::Float, true),
    ParamSpec::new("max", ParamKind::Float, true),
];
const DATE_RANGE_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("min", ParamKind::Date, true),
    ParamSpec::new("max", ParamKind::Date, true),
];
const VALUES_PARAMS: &[ParamSpec] = &[ParamSpec::new("values", ParamKind::Array, true)];
const PATTERN_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("pattern", ParamKind::String, true),
    ParamSpec::new("max_repeat", ParamKind::Int, false),
];

pub fn register(registry: &mut GeneratorRegistry) {
    registry.register(
        "primitive.string",
        &[],
        "22 random base-36 characters",
        |_| Ok(Box::new(random_string())),
    );
    registry.register(
        "primitive.int",
        &[],
        "integer in [0, 1000000)",
        |_| Ok(Box::new(random_int())),
    );
    registry.register(
        "primitive.int.range",
        INT_RANGE_PARAMS,
        "integer in [min, max]",
        build_int_range,
    );
    registry.register(
        "primitive.float",
        &[],
        "float in [0, 1000000)",
        |_| Ok(Box::new(random_float())),
    );
    registry.register(
        "primitive.float.range",
        FLOAT_RANGE_PARAMS,
        "float in [min, max)",
        build_float_range,
    );
    registry.register(
        "primitive.bool",
        &[],
        "true or false with equal probability",
        |_| Ok(Box::new(random_boolean())),
    );
    registry.register(
        "primitive.date",
        &[],
        "date within 120 days of now",
        |_| Ok(Box::new(random_date())),
    );
    registry.register(
        "primitive.date.range",
        DATE_RANGE_PARAMS,
        "date in [min, max)",
        build_date_range,
    );
    registry.register(
        "primitive.element",
        VALUES_PARAMS,
        "one of the given values",
        build_element,
    );
    registry.register(
        "primitive.elements",
        VALUES_PARAMS,
        "random-sized shuffled subset of the given values",
        build_elements,
    );
    registry.register(
        "primitive.text.pattern",
        PATTERN_PARAMS,
        "text matching a regular expression",
        build_pattern,
    );
}

fn build_int_range(params: &ParamMap<'_>) -> Result<Box<dyn Generator>, GenerationError> {
    let min = params.require_i64("min", "primitive.int.range")?;
    let max = params.require_i64("max", "primitive.int.range")?;
    Ok(Box::new(int_range(min, max)))
}

fn build_float_range(params: &ParamMap<'_>) -> Result<Box<dyn Generator>, GenerationError> {
    let min = params.require_f64("min", "primitive.float.range")?;
    let max = params.require_f64("max", "primitive.float.range")?;
    Ok(Box::new(float_range(min, max)))
}

fn build_date_range(params: &ParamMap<'_>) -> Result<Box<dyn Generator>, GenerationError> {
    let min = parse_date(params.require_str("min", "primitive.date.range")?)?;
    let max = parse_date(params.require_str("max", "primitive.date.range")?)?;
    Ok(Box::new(date_range(min, max)))
}

fn build_element(params: &ParamMap<'_>) -> Result<Box<dyn Generator>, GenerationError> {
    let values = params.require_array("values", "primitive.element")?;
    Ok(Box::new(element(values.iter().cloned().map(Value::from))))
}

fn build_elements(params: &ParamMap<'_>) -> Result<Box<dyn Generator>, GenerationError> {
    let values = params.require_array("values", "primitive.elements")?;
    Ok(Box::new(elements(values.iter().cloned().map(Value::from))))
}

fn build_pattern(params: &ParamMap<'_>) -> Result<Box<dyn Generator>, GenerationError> {
    let source = params.require_str("pattern", "primitive.text.pattern")?;
    let max_repeat = match params.get_i64("max_repeat") {
        Some(value) if value <= 0 => {
            return Err(GenerationError::InvalidSchema(
                "primitive.text.pattern: max_repeat must be > 0".to_string(),
            ));
        }
        Some(_) => params.get_u32("max_repeat").ok_or_else(|| {
            GenerationError::InvalidSchema(
                "primitive.text.pattern: max_repeat must fit u32".to_string(),
            )
        })?,
        None => DEFAULT_MAX_REPEAT,
    };
    Ok(Box::new(pattern_with_max_repeat(source, max_repeat)?))
}

/// In-place Fisher-Yates shuffle. Returns the same slice.
pub fn shuffle<'a, T>(values: &'a mut [T], rng: &mut dyn RngCore) -> &'a mut [T] {
    for idx in (1..values.len()).rev() {
        let other = rng.random_range(0..=idx);
        values.swap(idx, other);
    }
    values
}

/// Random subset of `values`: a shuffled copy cut to a length drawn
/// uniformly from `0..=values.len()`.
pub fn pick_subset<T: Clone>(values: &[T], rng: &mut dyn RngCore) -> Vec<T> {
    let mut picked = values.to_vec();
    shuffle(&mut picked, rng);
    let len = rng.random_range(0..=picked.len());
    picked.truncate(len);
    picked
}

/// Uniform pick, `None` for an empty slice.
pub fn pick_one<'a, T>(values: &'a [T], rng: &mut dyn RngCore) -> Option<&'a T> {
    if values.is_empty() {
        None
    } else {
        values.get(rng.random_range(0..values.len()))
    }
}

pub struct RandomString;

pub fn random_string() -> RandomString {
    RandomString
}

impl Generator for RandomString {
    fn id(&self) -> &str {
        "primitive.string"
    }

    fn draw(&mut self, ctx: &mut GeneratorContext<'_>) -> Result<Value, GenerationError> {
        let mut value = String::with_capacity(RANDOM_STRING_LEN);
        for _ in 0..RANDOM_STRING_LEN {
            let idx = ctx.rng.random_range(0..RANDOM_STRING_CHARSET.len());
            value.push(char::from(RANDOM_STRING_CHARSET[idx]));
        }
        Ok(Value::Text(value))
    }
}

pub struct RandomInt;

pub fn random_int() -> RandomInt {
    RandomInt
}

impl Generator for RandomInt {
    fn id(&self) -> &str {
        "primitive.int"
    }

    fn draw(&mut self, ctx: &mut GeneratorContext<'_>) -> Result<Value, GenerationError> {
        Ok(Value::Int(ctx.rng.random_range(0..RANDOM_NUMBER_LIMIT)))
    }
}

pub struct RandomFloat;

pub fn random_float() -> RandomFloat {
    RandomFloat
}

impl Generator for RandomFloat {
    fn id(&self) -> &str {
        "primitive.float"
    }

    fn draw(&mut self, ctx: &mut GeneratorContext<'_>) -> Result<Value, GenerationError> {
        let unit: f64 = ctx.rng.random();
        Ok(Value::Float(unit * RANDOM_NUMBER_LIMIT as f64))
    }
}

pub struct RandomBool;

pub fn random_boolean() -> RandomBool {
    RandomBool
}

impl Generator for RandomBool {
    fn id(&self) -> &str {
        "primitive.bool"
    }

    fn draw(&mut self, ctx: &mut GeneratorContext<'_>) -> Result<Value, GenerationError> {
        Ok(Value::Bool(ctx.rng.random_bool(0.5)))
    }
}

/// Inclusive integer range.
pub struct IntRange {
    min: i64,
    max: i64,
}

pub fn int_range(min: i64, max: i64) -> IntRange {
    IntRange { min, max }
}

impl IntRange {
    pub fn sample(&self, rng: &mut dyn RngCore) -> Result<i64, GenerationError> {
        if self.min > self.max {
            return Err(GenerationError::InvalidSchema(format!(
                "primitive.int.range min {} must be <= max {}",
                self.min, self.max
            )));
        }
        Ok(rng.random_range(self.min..=self.max))
    }
}

impl Generator for IntRange {
    fn id(&self) -> &str {
        "primitive.int.range"
    }

    fn draw(&mut self, ctx: &mut GeneratorContext<'_>) -> Result<Value, GenerationError> {
        self.sample(ctx.rng).map(Value::Int)
    }
}

/// Half-open float range `[min, max)`.
pub struct FloatRange {
    min: f64,
    max: f64,
}

pub fn float_range(min: f64, max: f64) -> FloatRange {
    FloatRange { min, max }
}

impl Generator for FloatRange {
    fn id(&self) -> &str {
        "primitive.float.range"
    }

    fn draw(&mut self, ctx: &mut GeneratorContext<'_>) -> Result<Value, GenerationError> {
        if !(self.min <= self.max) {
            return Err(GenerationError::InvalidSchema(format!(
                "primitive.float.range min {} must be <= max {}",
                self.min, self.max
            )));
        }
        let unit: f64 = ctx.rng.random();
        Ok(Value::Float(unit * (self.max - self.min) + self.min))
    }
}

/// Half-open date range `[min, max)` with millisecond resolution.
pub struct DateRange {
    min: DateTime<Utc>,
    max: DateTime<Utc>,
}

pub fn date_range(min: DateTime<Utc>, max: DateTime<Utc>) -> DateRange {
    DateRange { min, max }
}

impl Generator for DateRange {
    fn id(&self) -> &str {
        "primitive.date.range"
    }

    fn draw(&mut self, ctx: &mut GeneratorContext<'_>) -> Result<Value, GenerationError> {
        if self.min > self.max {
            return Err(GenerationError::InvalidSchema(format!(
                "primitive.date.range min {} must be <= max {}",
                self.min, self.max
            )));
        }
        Ok(Value::Date(date_between(self.min, self.max, ctx.rng)))
    }
}

/// Date within 120 days either side of the moment of the draw.
pub struct RandomDate;

pub fn random_date() -> RandomDate {
    RandomDate
}

impl Generator for RandomDate {
    fn id(&self) -> &str {
        "primitive.date"
    }

    fn draw(&mut self, ctx: &mut GeneratorContext<'_>) -> Result<Value, GenerationError> {
        let now = Utc::now();
        let window = TimeDelta::days(RANDOM_DATE_WINDOW_DAYS);
        Ok(Value::Date(date_between(now - window, now + window, ctx.rng)))
    }
}

fn date_between(
    min: DateTime<Utc>,
    max: DateTime<Utc>,
    rng: &mut dyn RngCore,
) -> DateTime<Utc> {
    let span = (max - min).num_milliseconds();
    if span <= 0 {
        return min;
    }
    min + TimeDelta::milliseconds(rng.random_range(0..span))
}

/// Uniform pick from a fixed candidate list; `Null` when the list is empty.
pub struct Element {
    values: Vec<Value>,
}

pub fn element<I, V>(values: I) -> Element
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    Element {
        values: values.into_iter().map(Into::into).collect(),
    }
}

impl Generator for Element {
    fn id(&self) -> &str {
        "primitive.element"
    }

    fn draw(&mut self, ctx: &mut GeneratorContext<'_>) -> Result<Value, GenerationError> {
        Ok(pick_one(&self.values, ctx.rng).cloned().unwrap_or_default())
    }
}

/// Random unordered subset of a fixed candidate list.
pub struct Elements {
    values: Vec<Value>,
}

pub fn elements<I, V>(values: I) -> Elements
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    Elements {
        values: values.into_iter().map(Into::into).collect(),
    }
}

impl Generator for Elements {
    fn id(&self) -> &str {
        "primitive.elements"
    }

    fn draw(&mut self, ctx: &mut GeneratorContext<'_>) -> Result<Value, GenerationError> {
        Ok(Value::Array(pick_subset(&self.values, ctx.rng)))
    }
}

/// Text sampled from a regular expression.
pub struct Pattern {
    regex: RandRegex,
}

pub fn pattern(source: &str) -> Result<Pattern, GenerationError> {
    pattern_with_max_repeat(source, DEFAULT_MAX_REPEAT)
}

pub fn pattern_with_max_repeat(source: &str, max_repeat: u32) -> Result<Pattern, GenerationError> {
    let regex = RandRegex::compile(source, max_repeat).map_err(|err| {
        GenerationError::InvalidSchema(format!(
            "invalid regex pattern for primitive.text.pattern: {err}"
        ))
    })?;
    Ok(Pattern { regex })
}

impl Generator for Pattern {
    fn id(&self) -> &str {
        "primitive.text.pattern"
    }

    fn draw(&mut self, ctx: &mut GeneratorContext<'_>) -> Result<Value, GenerationError> {
        let value: String = ctx.rng.sample(&self.regex);
        Ok(Value::Text(value))
    }
}

/// Units accepted by [`add_time`]. Months count 30 days, years 365.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Millisecond,
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl TimeUnit {
    pub fn millis(self) -> i64 {
        match self {
            TimeUnit::Millisecond => 1,
            TimeUnit::Second => 1_000,
            TimeUnit::Minute => 60_000,
            TimeUnit::Hour => 3_600_000,
            TimeUnit::Day => 86_400_000,
            TimeUnit::Week => 7 * 86_400_000,
            TimeUnit::Month => 30 * 86_400_000,
            TimeUnit::Year => 365 * 86_400_000,
        }
    }
}

/// Shift `date` by `amount` units; `None` if the result is out of range.
pub fn add_time(date: DateTime<Utc>, amount: f64, unit: TimeUnit) -> Option<DateTime<Utc>> {
    let millis = (amount * unit.millis() as f64).round();
    if !millis.is_finite() || millis.abs() > i64::MAX as f64 {
        return None;
    }
    let delta = TimeDelta::try_milliseconds(millis as i64)?;
    date.checked_add_signed(delta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Session;
    use chrono::TimeZone;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn shuffle_keeps_every_element() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut values: Vec<u32> = (0..20).collect();
        let shuffled = shuffle(&mut values, &mut rng).to_vec();
        let mut sorted = shuffled.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..20).collect::<Vec<_>>());
        assert_eq!(values, shuffled);
    }

    #[test]
    fn subset_reaches_empty_and_full() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let values = [1, 2, 3];
        let mut lengths = [false; 4];
        for _ in 0..500 {
            let subset = pick_subset(&values, &mut rng);
            let mut unique = subset.clone();
            unique.sort_unstable();
            unique.dedup();
            assert_eq!(unique.len(), subset.len());
            lengths[subset.len()] = true;
        }
        assert!(lengths.iter().all(|seen| *seen));
    }

    #[test]
    fn add_time_uses_fixed_unit_lengths() {
        let start = Utc
            .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .single()
            .expect("valid date");
        let later = add_time(start, 1.0, TimeUnit::Month).expect("in range");
        assert_eq!(later, start + TimeDelta::days(30));
        let earlier = add_time(start, -2.0, TimeUnit::Hour).expect("in range");
        assert_eq!(earlier, start - TimeDelta::hours(2));
        assert!(add_time(start, f64::INFINITY, TimeUnit::Year).is_none());
    }

    #[test]
    fn random_numbers_stay_below_the_limit() {
        let mut session = Session::seeded(17);
        let mut ctx = session.context();
        let (mut ints, mut floats) = (random_int(), random_float());
        for _ in 0..1_000 {
            let int = ints.draw(&mut ctx).expect("int").as_i64().expect("int value");
            assert!((0..RANDOM_NUMBER_LIMIT).contains(&int), "{int}");
            let float = floats.draw(&mut ctx).expect("float").as_f64().expect("float value");
            assert!((0.0..RANDOM_NUMBER_LIMIT as f64).contains(&float), "{float}");
        }
    }

    #[test]
    fn random_date_stays_within_the_window() {
        let mut session = Session::seeded(19);
        let mut ctx = session.context();
        let mut dates = random_date();
        let window = TimeDelta::days(RANDOM_DATE_WINDOW_DAYS);
        for _ in 0..500 {
            let before = Utc::now();
            let date = dates.draw(&mut ctx).expect("date").as_date().expect("date value");
            let after = Utc::now();
            assert!(date >= before - window && date <= after + window, "{date}");
        }
    }

    #[test]
    fn element_of_nothing_is_null() {
        let mut session = Session::seeded(23);
        let mut empty = element(Vec::<i64>::new());
        assert_eq!(empty.draw(&mut session.context()).expect("draw"), Value::Null);
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        assert!(matches!(
            pattern("(unclosed"),
            Err(GenerationError::InvalidSchema(_))
        ));
    }
}

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use std::time::Instant;

use indexmap::IndexMap;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use schemagen_core::Value;

use crate::description::compile_description;
use crate::errors::GenerationError;
use crate::generators::{GeneratorContext, GeneratorRegistry};
use crate::model::{
    DatasetReport, ExpansionStats, GenerateOptions, GenerationMode, GenerationReport,
};
use crate::output::{ARCHIVE_FILE, write_dataset_json, write_datasets_zip, write_report_json};
use crate::routine::{Dataset, Routine};
use crate::schema::{ArrayNode, ObjectNode, SchemaNode};
use crate::store::Store;

/// Maximum array length produced in [`GenerationMode::Preview`].
pub const PREVIEW_LIMIT: usize = 10;

const REPORT_FILE: &str = "generation_report.json";

/// Upper bound on the elements reserved up front for one array.
const PREALLOCATE_LIMIT: usize = 1024;

/// Expand `node` into a concrete value tree.
///
/// Arrays draw their length from their cardinality, expand the element
/// schema once per element and then reset the generators scoped to that
/// array. Leaves are drawn once and their result is returned untouched.
/// Objects expand their fields in declaration order. The first error aborts
/// the whole expansion.
pub(crate) fn expand(
    node: &mut SchemaNode,
    ctx: &mut GeneratorContext<'_>,
) -> Result<Value, GenerationError> {
    match node {
        SchemaNode::Array(array) => expand_array(array, ctx),
        SchemaNode::Leaf(generator) => {
            ctx.stats.leaves_drawn += 1;
            generator.draw(ctx)
        }
        SchemaNode::Object(object) => expand_object(object, ctx),
    }
}

fn expand_array(
    array: &mut ArrayNode,
    ctx: &mut GeneratorContext<'_>,
) -> Result<Value, GenerationError> {
    let (min, max) = array.cardinality.bounds()?;
    let drawn = ctx.rng.random_range(min..=max);
    let count = ctx.mode.cap(drawn);
    ctx.stats.arrays_expanded += 1;
    ctx.stats.elements_capped += (drawn - count) as u64;
    debug!(
        min,
        max,
        drawn,
        count,
        element = array.element.kind(),
        "expanding array"
    );

    let mut values = Vec::with_capacity(count.min(PREALLOCATE_LIMIT));
    for _ in 0..count {
        values.push(expand(&mut array.element, ctx)?);
    }
    array.element.reset_scope();
    Ok(Value::Array(values))
}

fn expand_object(
    object: &mut ObjectNode,
    ctx: &mut GeneratorContext<'_>,
) -> Result<Value, GenerationError> {
    let mut fields = IndexMap::with_capacity(object.len());
    for (name, node) in object.fields_mut() {
        let value = expand(node, ctx)?;
        fields.insert(name.clone(), value);
    }
    Ok(Value::Object(fields))
}

/// Expand `node` once in a fresh session with a random seed. Use a
/// [`Session`] directly to share the store between several schemas.
pub fn generate(node: &mut SchemaNode) -> Result<Value, GenerationError> {
    Session::new(GenerationMode::Full, None).generate(node)
}

/// Like [`generate`], with every array capped at [`PREVIEW_LIMIT`].
pub fn generate_preview(node: &mut SchemaNode) -> Result<Value, GenerationError> {
    Session::new(GenerationMode::Preview, None).generate(node)
}

/// One generation pass: the store, RNG and mode shared by every schema
/// expanded through it.
///
/// Sessions are independent of each other; give concurrent generations
/// their own session.
pub struct Session {
    store: Store,
    rng: ChaCha8Rng,
    seed: u64,
    mode: GenerationMode,
    stats: ExpansionStats,
}

impl Session {
    /// New session. Without a seed one is drawn from the thread RNG.
    pub fn new(mode: GenerationMode, seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(|| rand::rng().random());
        Self {
            store: Store::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            mode,
            stats: ExpansionStats::default(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(GenerationMode::Full, Some(seed))
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn mode(&self) -> GenerationMode {
        self.mode
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    pub fn stats(&self) -> &ExpansionStats {
        &self.stats
    }

    pub fn context(&mut self) -> GeneratorContext<'_> {
        GeneratorContext {
            store: &mut self.store,
            rng: &mut self.rng,
            mode: self.mode,
            stats: &mut self.stats,
        }
    }

    pub fn generate(&mut self, node: &mut SchemaNode) -> Result<Value, GenerationError> {
        let mut ctx = self.context();
        expand(node, &mut ctx)
    }

    /// Compile a JSON schema description and expand it. Nothing is drawn
    /// when the description is invalid.
    pub fn generate_description(
        &mut self,
        description: &serde_json::Value,
        registry: &GeneratorRegistry,
    ) -> Result<Value, GenerationError> {
        let mut node = compile_description(description, registry)?;
        self.generate(&mut node)
    }
}

/// Result of a generation run.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub out_dir: PathBuf,
    pub datasets: Vec<Dataset>,
    pub report: GenerationReport,
}

/// Runs named routines in one session and exports their datasets.
#[derive(Debug, Clone)]
pub struct GenerationEngine {
    options: GenerateOptions,
}

impl GenerationEngine {
    pub fn new(options: GenerateOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    /// Run every routine in order against a single session, without
    /// writing anything.
    pub fn generate(
        &self,
        routines: &[&dyn Routine],
    ) -> Result<(Vec<Dataset>, Session), GenerationError> {
        let mut session = Session::new(self.options.mode(), self.options.seed);
        let mut datasets = Vec::new();
        let mut names = HashSet::new();

        for routine in routines {
            let routine_start = Instant::now();
            info!(routine = %routine.name(), mode = ?session.mode(), "running routine");
            let produced = routine.run(&mut session)?;
            for dataset in &produced {
                validate_dataset_name(&dataset.name)?;
                if !names.insert(dataset.name.clone()) {
                    return Err(GenerationError::InvalidDataset(format!(
                        "dataset '{}' produced twice",
                        dataset.name
                    )));
                }
            }
            info!(
                routine = %routine.name(),
                datasets = produced.len(),
                duration_ms = routine_start.elapsed().as_millis() as u64,
                "routine finished"
            );
            datasets.extend(produced);
        }

        Ok((datasets, session))
    }

    /// Run the routines, write one `<name>.json` per dataset into the output
    /// directory (or into a single `data.zip` there) and, unless disabled,
    /// the run report.
    pub fn run(&self, routines: &[&dyn Routine]) -> Result<GenerationResult, GenerationError> {
        let start = Instant::now();
        let run_id = uuid::Uuid::new_v4().to_string();
        let out_dir = self.options.out_dir.clone();

        info!(
            run_id = %run_id,
            routines = routines.len(),
            preview = self.options.preview,
            out_dir = %out_dir.display(),
            "generation started"
        );

        let (datasets, session) = match self.generate(routines) {
            Ok(result) => result,
            Err(err) => {
                warn!(run_id = %run_id, error = %err, "generation failed");
                return Err(err);
            }
        };

        std::fs::create_dir_all(&out_dir)?;
        let mut report = GenerationReport::new(run_id.clone(), session.mode(), session.seed());
        report.routines = routines.iter().map(|routine| routine.name().to_string()).collect();

        if self.options.zip {
            let path = out_dir.join(ARCHIVE_FILE);
            let sizes = write_datasets_zip(&path, &datasets, self.options.pretty)?;
            info!(path = %path.display(), datasets = datasets.len(), "archive written");
            for (dataset, bytes_written) in datasets.iter().zip(sizes) {
                report.record_dataset(dataset_report(dataset, bytes_written, path.clone()));
            }
        } else {
            for dataset in &datasets {
                let path = out_dir.join(format!("{}.json", dataset.name));
                let bytes_written =
                    write_dataset_json(&path, &dataset.data, self.options.pretty)?;
                info!(
                    dataset = %dataset.name,
                    path = %path.display(),
                    bytes_written,
                    "dataset written"
                );
                report.record_dataset(dataset_report(dataset, bytes_written, path));
            }
        }

        report.stats = session.stats().clone();
        report.duration_ms = start.elapsed().as_millis() as u64;

        if self.options.write_report {
            write_report_json(&out_dir.join(REPORT_FILE), &report)?;
        }

        info!(
            run_id = %run_id,
            datasets = report.datasets.len(),
            bytes_written = report.bytes_written,
            duration_ms = report.duration_ms,
            "generation completed"
        );

        Ok(GenerationResult {
            out_dir,
            datasets,
            report,
        })
    }
}

fn dataset_report(dataset: &Dataset, bytes_written: u64, path: PathBuf) -> DatasetReport {
    DatasetReport {
        name: dataset.name.clone(),
        elements: dataset.data.as_array().map(|values| values.len() as u64),
        bytes_written,
        path,
    }
}

/// Dataset names become file names, so they must be a single plain path
/// component.
fn validate_dataset_name(name: &str) -> Result<(), GenerationError> {
    let mut components = Path::new(name).components();
    let single_normal = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if name.is_empty() || !single_normal || name.contains(['/', '\\']) {
        return Err(GenerationError::InvalidDataset(format!(
            "dataset name '{name}' must be a plain file name"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Cardinality;

    #[test]
    fn dataset_names_must_be_plain() {
        assert!(validate_dataset_name("Users").is_ok());
        assert!(validate_dataset_name("teams-2024").is_ok());
        for name in ["", "..", "a/b", "/abs", "a\\b"] {
            assert!(
                matches!(
                    validate_dataset_name(name),
                    Err(GenerationError::InvalidDataset(_))
                ),
                "{name} should be rejected"
            );
        }
    }

    #[test]
    fn huge_counts_are_not_reserved_up_front() {
        let failing = SchemaNode::from_fn(|_| {
            Err(GenerationError::Generator {
                generator: "failing".to_string(),
                message: "stop".to_string(),
            })
        });
        let mut node = SchemaNode::array(failing, Cardinality::Exact(usize::MAX / 2));
        let result = Session::seeded(1).generate(&mut node);
        assert!(matches!(result, Err(GenerationError::Generator { .. })));
    }
}

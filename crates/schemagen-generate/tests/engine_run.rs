use std::fs;
use std::io::Read;
use std::path::PathBuf;

use serde_json::json;

use schemagen_generate::samples::{DriversCars, TeamsUsers};
use schemagen_generate::{
    DescriptionRoutine, GenerateOptions, GenerationEngine, GenerationError, GenerationMode,
    GenerationReport, GeneratorRegistry, Routine,
};

fn temp_dir(label: &str) -> PathBuf {
    std::env::temp_dir().join(format!("schemagen_{label}_{}", uuid::Uuid::new_v4()))
}

fn read_json(path: PathBuf) -> serde_json::Value {
    let raw = fs::read_to_string(&path)
        .unwrap_or_else(|err| panic!("read {}: {err}", path.display()));
    serde_json::from_str(&raw).expect("valid json")
}

#[test]
fn run_writes_datasets_and_report() {
    let out_dir = temp_dir("run");
    let options = GenerateOptions {
        out_dir: out_dir.clone(),
        seed: Some(41),
        ..GenerateOptions::default()
    };
    let engine = GenerationEngine::new(options);
    let routines: [&dyn Routine; 2] = [&TeamsUsers, &DriversCars];
    let result = engine.run(&routines).expect("run");

    for name in ["Teams", "Users", "Drivers", "Cars"] {
        assert!(out_dir.join(format!("{name}.json")).exists(), "missing {name}.json");
    }
    let users = read_json(out_dir.join("Users.json"));
    assert_eq!(users.as_array().map(Vec::len), Some(100));

    let report: GenerationReport =
        serde_json::from_value(read_json(out_dir.join("generation_report.json"))).expect("report");
    assert_eq!(report.run_id, result.report.run_id);
    assert_eq!(report.mode, GenerationMode::Full);
    assert_eq!(report.seed, 41);
    assert_eq!(report.routines, ["teams-users", "drivers-cars"]);
    assert_eq!(report.datasets.len(), 4);
    assert_eq!(report.datasets[1].elements, Some(100));
    let total: u64 = report.datasets.iter().map(|dataset| dataset.bytes_written).sum();
    assert_eq!(report.bytes_written, total);
    assert!(report.stats.leaves_drawn > 0);

    fs::remove_dir_all(&out_dir).ok();
}

#[test]
fn preview_run_caps_every_dataset() {
    let out_dir = temp_dir("preview");
    let options = GenerateOptions {
        out_dir: out_dir.clone(),
        preview: true,
        pretty: true,
        seed: Some(42),
        write_report: false,
        zip: false,
    };
    let result = GenerationEngine::new(options)
        .run(&[&TeamsUsers as &dyn Routine])
        .expect("run");

    assert_eq!(result.report.mode, GenerationMode::Preview);
    for dataset in &result.datasets {
        assert_eq!(dataset.data.as_array().map(<[_]>::len), Some(10));
    }
    assert!(result.report.stats.elements_capped >= 90);
    assert!(!out_dir.join("generation_report.json").exists());

    let raw = fs::read_to_string(out_dir.join("Users.json")).expect("read users");
    assert!(raw.starts_with("[\n  {\n    \"id\""));

    fs::remove_dir_all(&out_dir).ok();
}

#[test]
fn zip_run_bundles_datasets_into_one_archive() {
    let out_dir = temp_dir("zip");
    let options = GenerateOptions {
        out_dir: out_dir.clone(),
        seed: Some(46),
        zip: true,
        ..GenerateOptions::default()
    };
    let result = GenerationEngine::new(options)
        .run(&[&TeamsUsers as &dyn Routine])
        .expect("run");

    let archive_path = out_dir.join("data.zip");
    assert!(!out_dir.join("Teams.json").exists());
    assert!(!out_dir.join("Users.json").exists());
    assert!(out_dir.join("generation_report.json").exists());

    let mut archive =
        zip::ZipArchive::new(fs::File::open(&archive_path).expect("open archive")).expect("zip");
    let mut names: Vec<&str> = archive.file_names().collect();
    names.sort_unstable();
    assert_eq!(names, ["Teams.json", "Users.json"]);

    for dataset in &result.datasets {
        let mut raw = String::new();
        archive
            .by_name(&format!("{}.json", dataset.name))
            .expect("entry")
            .read_to_string(&mut raw)
            .expect("read entry");
        let parsed: serde_json::Value = serde_json::from_str(&raw).expect("valid json");
        assert_eq!(parsed, serde_json::Value::from(&dataset.data));
        assert!(!raw.trim_end().contains('\n'), "compact output expected");
    }

    let users = &result.report.datasets[1];
    assert_eq!(users.name, "Users");
    assert_eq!(users.path, archive_path);
    assert_eq!(users.elements, Some(100));

    fs::remove_dir_all(&out_dir).ok();
}

#[test]
fn description_files_become_datasets() {
    let out_dir = temp_dir("description");
    let schema_dir = temp_dir("schemas");
    fs::create_dir_all(&schema_dir).expect("create schema dir");
    let schema_path = schema_dir.join("orders.json");
    fs::write(
        &schema_path,
        json!([{"id": "id.sequence", "total": {"$generator": "primitive.float.range", "params": {"min": 1.0, "max": 2.0}}}, [3, 6]])
            .to_string(),
    )
    .expect("write schema");

    let registry = GeneratorRegistry::new();
    let routine = DescriptionRoutine::from_path(&schema_path, &registry).expect("load schema");
    assert_eq!(routine.name(), "orders");

    let options = GenerateOptions {
        out_dir: out_dir.clone(),
        seed: Some(43),
        ..GenerateOptions::default()
    };
    let result = GenerationEngine::new(options)
        .run(&[&routine as &dyn Routine])
        .expect("run");
    assert_eq!(result.datasets.len(), 1);
    let orders = read_json(out_dir.join("orders.json"));
    let len = orders.as_array().map(Vec::len).expect("array");
    assert!((3..=6).contains(&len));

    fs::remove_dir_all(&out_dir).ok();
    fs::remove_dir_all(&schema_dir).ok();
}

#[test]
fn duplicate_dataset_names_are_rejected_before_writing() {
    let out_dir = temp_dir("duplicate");
    let options = GenerateOptions {
        out_dir: out_dir.clone(),
        seed: Some(44),
        ..GenerateOptions::default()
    };
    let result = GenerationEngine::new(options).run(&[&TeamsUsers as &dyn Routine, &TeamsUsers]);
    assert!(matches!(result, Err(GenerationError::InvalidDataset(_))));
    assert!(!out_dir.exists());
}

#[test]
fn the_store_is_shared_across_routines_of_one_run() {
    struct Reader;

    impl Routine for Reader {
        fn name(&self) -> &str {
            "reader"
        }

        fn run(
            &self,
            session: &mut schemagen_generate::Session,
        ) -> Result<Vec<schemagen_generate::Dataset>, GenerationError> {
            let teams = session.store().get("teams").cloned().unwrap_or_default();
            Ok(vec![schemagen_generate::Dataset::new("LastTeams", teams)])
        }
    }

    let engine = GenerationEngine::new(GenerateOptions {
        seed: Some(45),
        ..GenerateOptions::default()
    });
    let (datasets, session) = engine
        .generate(&[&TeamsUsers as &dyn Routine, &Reader])
        .expect("generate");
    let last = datasets.last().expect("reader dataset");
    assert_eq!(last.name, "LastTeams");
    assert_eq!(Some(&last.data), session.store().get("teams"));
    assert!(last.data.as_array().is_some());
}

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use schemagen_generate::GenerateOptions;

use super::{RuntimeError, RuntimeResult};

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "schemagen.toml";

/// Settings read from `schemagen.toml`. Every field is optional; command
/// line flags take precedence over whatever is set here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub out_dir: Option<PathBuf>,
    pub preview: Option<bool>,
    pub pretty: Option<bool>,
    pub seed: Option<u64>,
    pub write_report: Option<bool>,
    pub zip: Option<bool>,
    pub log_file: Option<PathBuf>,
}

impl CliConfig {
    pub fn parse(content: &str) -> RuntimeResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Resolve generation options from this file and the given flags.
    pub fn generate_options(&self, flags: &GenerateFlags) -> GenerateOptions {
        let defaults = GenerateOptions::default();
        GenerateOptions {
            out_dir: flags
                .out_dir
                .clone()
                .or_else(|| self.out_dir.clone())
                .unwrap_or(defaults.out_dir),
            preview: flags.preview || self.preview.unwrap_or(defaults.preview),
            pretty: flags.pretty || self.pretty.unwrap_or(defaults.pretty),
            seed: flags.seed.or(self.seed),
            write_report: !flags.no_report && self.write_report.unwrap_or(defaults.write_report),
            zip: flags.zip || self.zip.unwrap_or(defaults.zip),
        }
    }
}

/// Command line values that override [`CliConfig`].
#[derive(Debug, Clone, Default)]
pub struct GenerateFlags {
    pub out_dir: Option<PathBuf>,
    pub preview: bool,
    pub pretty: bool,
    pub seed: Option<u64>,
    pub no_report: bool,
    pub zip: bool,
}

/// Load `explicit` (which must exist) or, without it, `schemagen.toml` when
/// present in the working directory.
pub fn load_config(explicit: Option<&Path>) -> RuntimeResult<CliConfig> {
    let path = match explicit {
        Some(path) if path.exists() => path.to_path_buf(),
        Some(path) => return Err(RuntimeError::MissingConfig(path.display().to_string())),
        None => {
            let path = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !path.exists() {
                return Ok(CliConfig::default());
            }
            path
        }
    };
    let content = std::fs::read_to_string(&path)?;
    CliConfig::parse(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_values_fill_unset_flags() {
        let config = CliConfig::parse(
            r#"
out_dir = "data"
pretty = true
seed = 7
write_report = false
zip = true
"#,
        )
        .expect("parse config");

        let options = config.generate_options(&GenerateFlags::default());
        assert_eq!(options.out_dir, PathBuf::from("data"));
        assert!(options.pretty);
        assert!(!options.preview);
        assert_eq!(options.seed, Some(7));
        assert!(!options.write_report);
        assert!(options.zip);
    }

    #[test]
    fn flags_override_file_values() {
        let config = CliConfig {
            out_dir: Some(PathBuf::from("data")),
            seed: Some(7),
            ..CliConfig::default()
        };
        let flags = GenerateFlags {
            out_dir: Some(PathBuf::from("elsewhere")),
            preview: true,
            seed: Some(9),
            no_report: true,
            ..GenerateFlags::default()
        };
        let options = config.generate_options(&flags);
        assert_eq!(options.out_dir, PathBuf::from("elsewhere"));
        assert!(!options.zip);
        assert!(options.preview);
        assert_eq!(options.seed, Some(9));
        assert!(!options.write_report);
    }

    #[test]
    fn zip_flag_and_default_output_directory() {
        let flags = GenerateFlags {
            zip: true,
            ..GenerateFlags::default()
        };
        let options = CliConfig::default().generate_options(&flags);
        assert!(options.zip);
        assert_eq!(options.out_dir, PathBuf::from("."));
    }

    #[test]
    fn unknown_keys_and_missing_files_are_errors() {
        assert!(matches!(
            CliConfig::parse("colour = \"red\""),
            Err(RuntimeError::Config(_))
        ));
        let missing = std::env::temp_dir().join("schemagen-no-such-config.toml");
        assert!(matches!(
            load_config(Some(&missing)),
            Err(RuntimeError::MissingConfig(_))
        ));
    }
}

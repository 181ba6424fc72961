use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use super::models::AppConfig;
use crate::cli::{AtlasArgs, ConfigArgs, CurationArgs};
use crate::error::{CliError, Result};
use capsidomics::core::models::annotation::ArchitectureClass;
use capsidomics::core::similarity::{ProbeMode, ScoreScale};
use capsidomics::engine::config::AtlasConfigBuilder;
use capsidomics::workflows::curate::CurationSettings;
use std::str::FromStr;
use std::time::Duration;

/// Merges every configuration source into the final settings.
///
/// Precedence, highest first: explicit CLI flags, `--set` values, the
/// config file, built-in defaults. `atlas` is `None` for subcommands that
/// only annotate; the atlas settings are then left at their defaults.
pub fn build_config(
    config_args: &ConfigArgs,
    curation: &CurationArgs,
    atlas: Option<&AtlasArgs>,
) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();
    let no_atlas_args = AtlasArgs::default();
    let atlas = atlas.unwrap_or(&no_atlas_args);

    let file_config = if let Some(config_path) = &config_args.config {
        FileConfig::from_file(config_path)?
    } else {
        FileConfig::default()
    };
    let mut file_config = apply_set_values(file_config, &config_args.set_values)?;

    let rules_path = config_args.rules.clone().or(file_config.rules.take());

    // --- Curation ---
    let curation_file = file_config.curation.take().unwrap_or_default();
    let curation_enabled = !curation.no_curation
        && curation_file.enabled.unwrap_or(defaults.curation_enabled);
    let curation_settings = curation_enabled.then(|| CurationSettings {
        min_length: curation
            .min_length
            .or(curation_file.min_length)
            .unwrap_or(defaults.min_length),
        max_length: curation
            .max_length
            .or(curation_file.max_length)
            .unwrap_or(defaults.max_length),
    });
    if let Some(settings) = &curation_settings {
        if settings.min_length > settings.max_length {
            return Err(CliError::Config(format!(
                "curation.min-length ({}) exceeds curation.max-length ({})",
                settings.min_length, settings.max_length
            )));
        }
    }

    // --- Similarity ---
    let similarity_file = file_config.similarity.take().unwrap_or_default();
    let mode_str = atlas
        .similarity_mode
        .clone()
        .or(similarity_file.mode)
        .unwrap_or(defaults.similarity_mode);
    let mode = ProbeMode::from_str(&mode_str).map_err(CliError::Config)?;
    let scale_str = atlas
        .score_scale
        .clone()
        .or(similarity_file.score_scale)
        .unwrap_or(defaults.score_scale);
    let scale = ScoreScale::from_str(&scale_str).map_err(CliError::Config)?;
    let aligner = atlas
        .aligner
        .clone()
        .or(similarity_file.aligner)
        .unwrap_or(defaults.aligner);
    let extension = atlas
        .structure_extension
        .clone()
        .or(similarity_file.structure_extension)
        .unwrap_or(defaults.structure_extension);
    let timeout = atlas
        .aligner_timeout
        .or(similarity_file.timeout_secs)
        .unwrap_or(defaults.aligner_timeout_secs);
    let max_structures = atlas
        .max_structures
        .or(similarity_file.max_structures)
        .unwrap_or(defaults.max_structures);
    let structure_dir = atlas
        .structure_dir
        .clone()
        .or(similarity_file.structure_dir);

    // --- Clustering ---
    let clustering_file = file_config.clustering.take().unwrap_or_default();
    let primary_cutoff = atlas
        .primary_cutoff
        .or(clustering_file.primary_cutoff)
        .unwrap_or(defaults.primary_cutoff);
    let extra_cutoffs = atlas
        .extra_cutoffs
        .clone()
        .or(clustering_file.extra_cutoffs)
        .unwrap_or(defaults.extra_cutoffs);

    // --- Transitions ---
    let transitions_file = file_config.transitions.take().unwrap_or_default();
    let min_support = atlas
        .min_support
        .or(transitions_file.min_support)
        .unwrap_or(defaults.min_support);
    let precedence = transitions_file
        .precedence
        .unwrap_or(defaults.precedence)
        .iter()
        .map(|name| ArchitectureClass::from_str(name))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| CliError::Config(format!("transitions.precedence: {}", e)))?;

    let mut builder = AtlasConfigBuilder::new()
        .similarity_mode(mode)
        .aligner_binary(&aligner)
        .structure_extension(&extension)
        .aligner_timeout(Duration::from_secs(timeout))
        .score_scale(scale)
        .max_structures(max_structures)
        .primary_cutoff(primary_cutoff)
        .extra_cutoffs(extra_cutoffs)
        .precedence(precedence)
        .min_support(min_support);
    if let Some(dir) = structure_dir {
        builder = builder.structure_dir(dir);
    }
    let atlas_config = builder
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    Ok(AppConfig {
        rules_path,
        curation: curation_settings,
        atlas: atlas_config,
    })
}

fn parse_value<T: FromStr>(key: &str, value: &str, kind: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value)))
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let Some((key, value_str)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };
        let key = key.trim();

        match key {
            "rules" => config.rules = Some(value_str.trim().into()),
            "curation.enabled" => {
                config.curation.get_or_insert_with(Default::default).enabled =
                    Some(parse_value(key, value_str, "boolean")?);
            }
            "curation.min-length" => {
                config.curation.get_or_insert_with(Default::default).min_length =
                    Some(parse_value(key, value_str, "integer")?);
            }
            "curation.max-length" => {
                config.curation.get_or_insert_with(Default::default).max_length =
                    Some(parse_value(key, value_str, "integer")?);
            }
            "similarity.mode" => {
                config.similarity.get_or_insert_with(Default::default).mode =
                    Some(value_str.trim().to_string());
            }
            "similarity.aligner" => {
                config.similarity.get_or_insert_with(Default::default).aligner =
                    Some(value_str.trim().to_string());
            }
            "similarity.structure-dir" => {
                config
                    .similarity
                    .get_or_insert_with(Default::default)
                    .structure_dir = Some(value_str.trim().into());
            }
            "similarity.structure-extension" => {
                config
                    .similarity
                    .get_or_insert_with(Default::default)
                    .structure_extension = Some(value_str.trim().to_string());
            }
            "similarity.timeout-secs" => {
                config
                    .similarity
                    .get_or_insert_with(Default::default)
                    .timeout_secs = Some(parse_value(key, value_str, "integer")?);
            }
            "similarity.score-scale" => {
                config
                    .similarity
                    .get_or_insert_with(Default::default)
                    .score_scale = Some(value_str.trim().to_string());
            }
            "similarity.max-structures" => {
                config
                    .similarity
                    .get_or_insert_with(Default::default)
                    .max_structures = Some(parse_value(key, value_str, "integer")?);
            }
            "clustering.primary-cutoff" => {
                config
                    .clustering
                    .get_or_insert_with(Default::default)
                    .primary_cutoff = Some(parse_value(key, value_str, "float")?);
            }
            "clustering.extra-cutoffs" => {
                let cutoffs = value_str
                    .split(',')
                    .filter(|s| !s.trim().is_empty())
                    .map(|s| parse_value(key, s, "float"))
                    .collect::<Result<Vec<f64>>>()?;
                config
                    .clustering
                    .get_or_insert_with(Default::default)
                    .extra_cutoffs = Some(cutoffs);
            }
            "transitions.min-support" => {
                config
                    .transitions
                    .get_or_insert_with(Default::default)
                    .min_support = Some(parse_value(key, value_str, "integer")?);
            }
            "transitions.precedence" => {
                config
                    .transitions
                    .get_or_insert_with(Default::default)
                    .precedence = Some(
                    value_str
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect(),
                );
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use capsidomics::engine::config::{DEFAULT_MIN_SUPPORT, DEFAULT_PRIMARY_CUTOFF};
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::tempdir;

    fn config_args(config: Option<&Path>, set_values: &[&str]) -> ConfigArgs {
        ConfigArgs {
            config: config.map(Path::to_path_buf),
            rules: None,
            set_values: set_values.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn write_config(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join("atlas.toml");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn defaults_apply_when_no_source_is_given() {
        let app = build_config(&config_args(None, &[]), &CurationArgs::default(), None).unwrap();

        assert!(app.rules_path.is_none());
        assert_eq!(app.curation, Some(CurationSettings::default()));
        assert_eq!(app.atlas.clustering.primary_cutoff, DEFAULT_PRIMARY_CUTOFF);
        assert_eq!(app.atlas.transitions.min_support, DEFAULT_MIN_SUPPORT);
        assert_eq!(app.atlas.similarity.mode, ProbeMode::Auto);
        assert!(app.atlas.similarity.aligner.structure_dir.is_none());
    }

    #[test]
    fn file_values_override_defaults_and_resolve_relative_paths() {
        let dir = tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"
            rules = "rules.toml"

            [curation]
            min-length = 150

            [similarity]
            mode = "simulated"
            structure-dir = "structures"
            timeout-secs = 5

            [clustering]
            primary-cutoff = 0.4
            extra-cutoffs = [0.2, 0.6]

            [transitions]
            min-support = 3
            precedence = ["DJR", "SJR", "tandem_JRF", "JRF_hybrid", "nucleoplasmin_like", "other"]
            "#,
        );
        let app = build_config(
            &config_args(Some(&path), &[]),
            &CurationArgs::default(),
            Some(&AtlasArgs::default()),
        )
        .unwrap();

        assert_eq!(app.rules_path, Some(dir.path().join("rules.toml")));
        assert_eq!(app.curation.unwrap().min_length, 150);
        assert_eq!(app.atlas.similarity.mode, ProbeMode::Simulated);
        assert_eq!(
            app.atlas.similarity.aligner.structure_dir,
            Some(dir.path().join("structures"))
        );
        assert_eq!(app.atlas.similarity.aligner.timeout, Duration::from_secs(5));
        assert_eq!(app.atlas.clustering.all_cutoffs(), vec![0.4, 0.2, 0.6]);
        assert_eq!(app.atlas.transitions.min_support, 3);
        assert_eq!(
            app.atlas.transitions.precedence.order()[0],
            ArchitectureClass::Djr
        );
    }

    #[test]
    fn set_values_override_file_and_cli_flags_override_both() {
        let dir = tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"
            [clustering]
            primary-cutoff = 0.4

            [transitions]
            min-support = 3
            "#,
        );

        let set_only = build_config(
            &config_args(Some(&path), &["clustering.primary-cutoff=0.35", "transitions.min-support=4"]),
            &CurationArgs::default(),
            Some(&AtlasArgs::default()),
        )
        .unwrap();
        assert_eq!(set_only.atlas.clustering.primary_cutoff, 0.35);
        assert_eq!(set_only.atlas.transitions.min_support, 4);

        let cli = AtlasArgs {
            primary_cutoff: Some(0.6),
            ..AtlasArgs::default()
        };
        let with_flag = build_config(
            &config_args(Some(&path), &["clustering.primary-cutoff=0.35"]),
            &CurationArgs::default(),
            Some(&cli),
        )
        .unwrap();
        assert_eq!(with_flag.atlas.clustering.primary_cutoff, 0.6);
        assert_eq!(with_flag.atlas.transitions.min_support, 3);
    }

    #[test]
    fn curation_can_be_disabled_from_either_source() {
        let by_flag = build_config(
            &config_args(None, &[]),
            &CurationArgs {
                no_curation: true,
                ..CurationArgs::default()
            },
            None,
        )
        .unwrap();
        assert!(by_flag.curation.is_none());

        let by_set = build_config(
            &config_args(None, &["curation.enabled=false"]),
            &CurationArgs::default(),
            None,
        )
        .unwrap();
        assert!(by_set.curation.is_none());
    }

    #[test]
    fn invalid_values_are_configuration_errors() {
        for set in [
            "clustering.primary-cutoff=-0.1",
            "transitions.min-support=0",
            "similarity.mode=telepathy",
            "transitions.precedence=SJR,DJR",
            "similarity.timeout-secs=0",
            "curation.min-length=500",
            "optimization.num-solutions=3",
            "no-equals-sign",
        ] {
            let curation = CurationArgs {
                max_length: Some(400),
                ..CurationArgs::default()
            };
            let result = build_config(&config_args(None, &[set]), &curation, None);
            assert!(matches!(result, Err(CliError::Config(_))), "{set}");
        }
    }

    #[test]
    fn unknown_file_keys_are_rejected() {
        let dir = tempdir().unwrap();
        let path = write_config(dir.path(), "[clustering]\nlinkage = \"single\"\n");
        let result = build_config(&config_args(Some(&path), &[]), &CurationArgs::default(), None);
        assert!(matches!(result, Err(CliError::FileParsing { .. })));
    }
}

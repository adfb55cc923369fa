//! File-based configuration for a coupled run.
//!
//! A [`RunConfig`] is read once, before the run starts, and never re-read.
//! Every table is optional; missing values fall back to the reference
//! conjugate-heat-transfer setup:
//!
//! ```toml
//! [policy]
//! end_time = 2.0
//! solid_time_step = 1e-4
//! save_interval = 0.1
//! fluid_iterations_per_phase = 25
//! subcycles_per_major_step = 2
//!
//! [continua]
//! fluid = "Free_Stream"
//! solids = ["S_Steel", "S_Alum", "S_Epox", "S_Tungsten", "S_Air_G"]
//!
//! [criteria]
//! step = "Maximum Steps"
//! time = "Maximum Physical Time"
//!
//! [checkpoint]
//! prefix = "CHT_partitioned"
//! # directory = "/scratch/cht"   # defaults to the engine's session directory
//!
//! [report]
//! reference_time_step = 2e-7
//! ```

use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;

use crate::{ConfigError, CouplingPolicy};

/// Errors that can occur when loading a configuration file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read `{path}`")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(#[from] ConfigError),
}

/// Complete configuration of a coupled run.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub policy: PolicySettings,
    pub continua: ContinuumNames,
    pub criteria: CriterionNames,
    pub checkpoint: CheckpointSettings,
    pub report: ReportSettings,
}

/// Raw time-advancement settings, validated into a [`CouplingPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicySettings {
    pub end_time: f64,
    pub solid_time_step: f64,
    pub save_interval: f64,
    pub fluid_iterations_per_phase: u64,
    pub subcycles_per_major_step: u32,
}

impl Default for PolicySettings {
    fn default() -> Self {
        let policy = CouplingPolicy::default();
        Self {
            end_time: policy.end_time(),
            solid_time_step: policy.solid_time_step(),
            save_interval: policy.save_interval(),
            fluid_iterations_per_phase: policy.fluid_iterations_per_phase(),
            subcycles_per_major_step: policy.subcycles_per_major_step(),
        }
    }
}

/// Names of the continua to resolve in the engine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContinuumNames {
    /// The single fluid continuum.
    pub fluid: String,

    /// The solid continua, in activation order.
    pub solids: Vec<String>,
}

impl Default for ContinuumNames {
    fn default() -> Self {
        Self {
            fluid: "Free_Stream".to_owned(),
            solids: ["S_Steel", "S_Alum", "S_Epox", "S_Tungsten", "S_Air_G"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
        }
    }
}

impl ContinuumNames {
    /// Checks that names are non-empty, unique, and include a solid.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.solids.is_empty() {
            return Err(ConfigError::NoSolids);
        }

        let mut seen = HashSet::new();
        for name in std::iter::once(&self.fluid).chain(&self.solids) {
            if name.trim().is_empty() {
                return Err(ConfigError::EmptyName);
            }
            if !seen.insert(name.as_str()) {
                return Err(ConfigError::DuplicateContinuum(name.clone()));
            }
        }

        Ok(())
    }
}

/// Names of the engine stopping criteria the scheduler drives.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CriterionNames {
    /// Criterion bounding the steady iteration count.
    pub step: String,

    /// Criterion bounding the physical time.
    pub time: String,
}

impl Default for CriterionNames {
    fn default() -> Self {
        Self {
            step: "Maximum Steps".to_owned(),
            time: "Maximum Physical Time".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CheckpointSettings {
    /// Directory for saved states; `None` uses the engine's session directory.
    pub directory: Option<PathBuf>,

    /// File name prefix; the time stamp and extension are appended.
    pub prefix: String,
}

impl Default for CheckpointSettings {
    fn default() -> Self {
        Self {
            directory: None,
            prefix: "CHT_partitioned".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportSettings {
    /// Time step a fully coupled solve would need, in seconds.
    pub reference_time_step: f64,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            reference_time_step: 2e-7,
        }
    }
}

impl RunConfig {
    /// Parses and validates a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Parse`] for malformed TOML or unknown keys, and
    /// [`LoadError::Invalid`] if the values fail validation.
    pub fn from_toml_str(text: &str) -> Result<Self, LoadError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses, and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Read`] if the file cannot be read, otherwise the
    /// same errors as [`RunConfig::from_toml_str`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Validates every section and returns the coupling policy.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<CouplingPolicy, ConfigError> {
        let policy = self.policy()?;
        self.continua.validate()?;

        let reference = self.report.reference_time_step;
        if !reference.is_finite() || reference <= 0.0 {
            return Err(ConfigError::ReferenceTimeStep);
        }

        Ok(policy)
    }

    /// Builds the coupling policy from the `[policy]` table.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any policy value is invalid.
    pub fn policy(&self) -> Result<CouplingPolicy, ConfigError> {
        let p = &self.policy;
        CouplingPolicy::new(
            p.solid_time_step,
            p.fluid_iterations_per_phase,
            p.subcycles_per_major_step,
            p.save_interval,
            p.end_time,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_reference_setup() {
        let config = RunConfig::from_toml_str("").expect("empty config is valid");

        assert_eq!(config, RunConfig::default());
        assert_eq!(config.continua.solids.len(), 5);
        assert_eq!(config.validate(), Ok(CouplingPolicy::default()));
    }

    #[test]
    fn partial_tables_keep_remaining_defaults() {
        let config = RunConfig::from_toml_str(
            r#"
            [policy]
            end_time = 0.5

            [continua]
            solids = ["Copper"]
            "#,
        )
        .expect("should parse");

        assert_eq!(config.policy.end_time, 0.5);
        assert_eq!(config.policy.fluid_iterations_per_phase, 25);
        assert_eq!(config.continua.fluid, "Free_Stream");
        assert_eq!(config.continua.solids, vec!["Copper".to_owned()]);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = RunConfig::from_toml_str("[policy]\nend_tme = 1.0\n").unwrap_err();

        assert!(matches!(err, LoadError::Parse(_)));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = RunConfig::from_toml_str("[policy]\nsubcycles_per_major_step = 0\n").unwrap_err();
        assert!(matches!(err, LoadError::Invalid(ConfigError::Subcycles)));

        let err = RunConfig::from_toml_str("[continua]\nsolids = []\n").unwrap_err();
        assert!(matches!(err, LoadError::Invalid(ConfigError::NoSolids)));

        let err = RunConfig::from_toml_str("[report]\nreference_time_step = 0.0\n").unwrap_err();
        assert!(matches!(
            err,
            LoadError::Invalid(ConfigError::ReferenceTimeStep)
        ));
    }

    #[test]
    fn duplicate_continuum_names_are_rejected() {
        let names = ContinuumNames {
            fluid: "Air".to_owned(),
            solids: vec!["Steel".to_owned(), "Air".to_owned()],
        };

        assert_eq!(
            names.validate(),
            Err(ConfigError::DuplicateContinuum("Air".to_owned()))
        );
    }

    #[test]
    fn blank_names_are_rejected() {
        let names = ContinuumNames {
            fluid: "  ".to_owned(),
            solids: vec!["Steel".to_owned()],
        };

        assert_eq!(names.validate(), Err(ConfigError::EmptyName));
    }
}

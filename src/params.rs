//! Run parameters: the movement-policy scalars, the disease description
//! loaded from JSON, and adjustable-variable sets read from CSV for scanning
//! over parameter values.

use serde::Deserialize;
use std::fs::File;
use std::path::Path;

use crate::error::MetapopError;

/// The disease model as loaded from a JSON disease file. Only the pieces the
/// movement engine needs: the stage list (whose length is the number of
/// infection classes) and the per-stage force-of-infection contributions.
#[derive(Clone, Debug, Deserialize)]
pub struct Disease {
    pub name: String,
    /// One entry per infection class, e.g. `["S", "E", "I", "R"]`.
    pub stage_names: Vec<String>,
    /// Per-stage contribution to the force of infection. Reset daily.
    #[serde(default)]
    pub contrib_foi: Vec<f64>,
}

impl Disease {
    /// Loads a disease description from a JSON file.
    pub fn load(path: &Path) -> Result<Self, MetapopError> {
        let file = File::open(path).map_err(|source| MetapopError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_reader(file).map_err(|e| MetapopError::Parse {
            path: path.to_path_buf(),
            context: e.to_string(),
        })
    }

    /// A minimal three-stage S/I/R disease, handy for tests and demos.
    pub fn sir() -> Self {
        Disease {
            name: "sir".to_string(),
            stage_names: vec!["S".to_string(), "I".to_string(), "R".to_string()],
            contrib_foi: Vec::new(),
        }
    }

    pub fn n_inf_classes(&self) -> usize {
        self.stage_names.len()
    }

    /// Restores the default force-of-infection contributions: every class
    /// contributes except the final (removed) one.
    pub fn reset_contrib_foi(&mut self) {
        let n = self.n_inf_classes();
        self.contrib_foi = vec![0.0; n];
        for entry in self.contrib_foi.iter_mut().take(n.saturating_sub(1)) {
            *entry = 1.0;
        }
    }
}

/// The parameters that drive the per-day movement passes.
#[derive(Clone, Debug)]
pub struct Parameters {
    /// Proportion of each work link's susceptibles moved into play daily.
    pub work_to_play: f64,
    /// Proportion of the saved play pool moved onto work links daily.
    pub play_to_work: f64,
    /// Stay-at-home policy scalar in `[0, 1]`.
    pub static_play_at_home: f64,
    /// Expected daily imported infections (consumed by the seeding step).
    pub daily_imports: f64,
    pub disease: Disease,
}

impl Parameters {
    pub fn new(disease: Disease) -> Self {
        Parameters {
            work_to_play: 0.0,
            play_to_work: 0.0,
            static_play_at_home: 0.0,
            daily_imports: 0.0,
            disease,
        }
    }

    /// Applies a set of adjustable-variable overrides by name.
    pub fn apply(&mut self, variables: &VariableSet) -> Result<(), MetapopError> {
        for (name, value) in variables.iter() {
            match name {
                "work_to_play" => self.work_to_play = value,
                "play_to_work" => self.play_to_work = value,
                "static_play_at_home" => self.static_play_at_home = value,
                "daily_imports" => self.daily_imports = value,
                _ => {
                    return Err(MetapopError::UnknownVariable {
                        name: name.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// One row of an adjustable-variable CSV file: a header of variable names
/// over rows of values, one row per candidate parameter set.
#[derive(Clone, Debug, Default)]
pub struct VariableSet {
    values: Vec<(String, f64)>,
}

impl VariableSet {
    /// Reads row `line` (0-based, not counting the header) from a variable
    /// CSV file.
    pub fn read(path: &Path, line: usize) -> Result<Self, MetapopError> {
        let parse = |context: String| MetapopError::Parse {
            path: path.to_path_buf(),
            context,
        };

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| parse(e.to_string()))?;

        let names: Vec<String> = reader
            .headers()
            .map_err(|e| parse(e.to_string()))?
            .iter()
            .map(str::to_string)
            .collect();

        let record = reader
            .records()
            .nth(line)
            .ok_or_else(|| parse(format!("no variable row {line}")))?
            .map_err(|e| parse(e.to_string()))?;

        let mut values = Vec::with_capacity(names.len());
        for (name, field) in names.into_iter().zip(record.iter()) {
            let value: f64 = field
                .parse()
                .map_err(|_| parse(format!("'{field}' is not a number for {name}")))?;
            values.push((name, value));
        }

        Ok(VariableSet { values })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

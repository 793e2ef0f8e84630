//! Class name list loading.
//!
//! The class list fixes the row axis of the distribution table and the range
//! of accepted source class ids. It is read from an Ultralytics-style
//! `data.yaml` (`names:` as a sequence or an index mapping) or, for any other
//! extension, from a `classes.txt` with one name per line.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::distribution::SAMPLES_ROW;
use crate::error::FedsplitError;

/// Ordered, non-empty list of unique class names.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassList {
    names: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct DataYaml {
    names: DataYamlNames,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DataYamlNames {
    Sequence(Vec<String>),
    Mapping(BTreeMap<usize, String>),
}

impl ClassList {
    /// Builds a class list from names, rejecting empty lists, blank or
    /// duplicate names, and the reserved `Samples` row name.
    pub fn new(names: Vec<String>) -> Result<Self, String> {
        if names.is_empty() {
            return Err("class list is empty".to_string());
        }

        let mut seen = HashSet::new();
        for (index, name) in names.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(format!("class {index} has an empty name"));
            }
            if name == SAMPLES_ROW {
                return Err(format!("'{SAMPLES_ROW}' is reserved and cannot be a class name"));
            }
            if !seen.insert(name.as_str()) {
                return Err(format!("duplicate class name '{name}'"));
            }
        }

        Ok(Self { names })
    }

    /// Loads a class list from `path`.
    ///
    /// `.yaml`/`.yml` files are parsed as `data.yaml`; anything else is read
    /// as `classes.txt`.
    pub fn load(path: &Path) -> Result<Self, FedsplitError> {
        if !path.is_file() {
            return Err(FedsplitError::ClassListNotFound {
                path: path.to_path_buf(),
            });
        }

        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
            .unwrap_or(false);

        let data = fs::read_to_string(path).map_err(FedsplitError::Io)?;
        let names = if is_yaml {
            parse_data_yaml_names(&data, path)?
        } else {
            parse_classes_txt(&data, path)?
        };

        Self::new(names).map_err(|message| FedsplitError::ClassListInvalid {
            path: path.to_path_buf(),
            message,
        })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Name of a 1-based source class id, if it is in range.
    pub fn name_for_source_id(&self, class_id: i64) -> Option<&str> {
        let index = usize::try_from(class_id).ok()?.checked_sub(1)?;
        self.names.get(index).map(String::as_str)
    }
}

fn parse_data_yaml_names(data: &str, path: &Path) -> Result<Vec<String>, FedsplitError> {
    let parsed: DataYaml =
        serde_yaml::from_str(data).map_err(|source| FedsplitError::ClassListParse {
            path: path.to_path_buf(),
            source,
        })?;

    match parsed.names {
        DataYamlNames::Sequence(names) => Ok(names),
        DataYamlNames::Mapping(mapping) => {
            // Indices must be contiguous from zero; a gap would shift every
            // later class onto the wrong source id.
            for (expected, index) in mapping.keys().enumerate() {
                if *index != expected {
                    return Err(FedsplitError::ClassListInvalid {
                        path: path.to_path_buf(),
                        message: format!("names mapping is missing index {expected}"),
                    });
                }
            }
            Ok(mapping.into_values().collect())
        }
    }
}

fn parse_classes_txt(data: &str, path: &Path) -> Result<Vec<String>, FedsplitError> {
    let mut names = Vec::new();

    for (line_idx, line) in data.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            // Trailing blank lines are common; blank lines in between are not.
            if data.lines().skip(line_idx).all(|rest| rest.trim().is_empty()) {
                break;
            }
            return Err(FedsplitError::ClassListInvalid {
                path: path.to_path_buf(),
                message: format!("line {} is empty", line_idx + 1),
            });
        }
        names.push(trimmed.to_string());
    }

    Ok(names)
}

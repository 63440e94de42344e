use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Stable, globally unique node identifier.
pub type NodeId = String;

/// Birth or death year as found in the source data: either a signed number
/// or free text such as `"c. -624"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum YearValue {
    Number(i32),
    Text(String),
}

impl YearValue {
    /// Resolve to a signed year; text uses its first signed integer.
    pub fn resolve(&self) -> Option<i32> {
        match self {
            YearValue::Number(year) => Some(*year),
            YearValue::Text(text) => first_signed_integer(text),
        }
    }
}

fn first_signed_integer(text: &str) -> Option<i32> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    let magnitude: i32 = digits.parse().ok()?;

    if text[..start].ends_with('-') {
        Some(-magnitude)
    } else {
        Some(magnitude)
    }
}

/// One record exactly as it appears in the dataset JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawNodeRecord {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    pub birth: YearValue,
    #[serde(default)]
    pub death: Option<YearValue>,
    #[serde(default)]
    pub influences: Vec<String>,
}

/// Dataset asset loaded through the JSON asset plugin.
#[derive(Asset, TypePath, Debug, Clone, Serialize, Deserialize)]
pub struct NodeDataset {
    pub entities: Vec<RawNodeRecord>,
}

/// Immutable, validated node. The visualization core only ever reads these.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeData {
    pub id: NodeId,
    pub display_name: String,
    pub category: Option<String>,
    pub birth_year: i32,
    pub death_year: Option<i32>,
    pub influenced_by: Vec<NodeId>,
}

/// Fatal configuration errors found while validating a dataset.
#[derive(Debug, Error, PartialEq)]
pub enum DatasetError {
    #[error("dataset contains no entities")]
    NoEntities,
    #[error("entity at index {index} has an empty id")]
    EmptyId { index: usize },
    #[error("duplicate entity id '{0}'")]
    DuplicateId(NodeId),
    #[error("entity '{0}' has no display name")]
    MissingName(NodeId),
    #[error("entity '{id}' has an unreadable {field} year: {value:?}")]
    InvalidYear {
        id: NodeId,
        field: &'static str,
        value: YearValue,
    },
}

/// Validated node set plus the number of influence references that pointed
/// outside the dataset and were dropped.
#[derive(Debug, Clone)]
pub struct ValidatedDataset {
    pub nodes: Vec<NodeData>,
    pub dangling_influences: usize,
}

impl NodeDataset {
    pub fn validate(&self) -> Result<ValidatedDataset, DatasetError> {
        if self.entities.is_empty() {
            return Err(DatasetError::NoEntities);
        }

        let mut seen: HashSet<&str> = HashSet::with_capacity(self.entities.len());
        for (index, record) in self.entities.iter().enumerate() {
            if record.id.trim().is_empty() {
                return Err(DatasetError::EmptyId { index });
            }
            if !seen.insert(record.id.as_str()) {
                return Err(DatasetError::DuplicateId(record.id.clone()));
            }
        }

        let mut dangling_influences = 0;
        let mut nodes = Vec::with_capacity(self.entities.len());

        for record in &self.entities {
            let display_name = match record.name.as_deref().map(str::trim) {
                Some(name) if !name.is_empty() => name.to_string(),
                _ => return Err(DatasetError::MissingName(record.id.clone())),
            };

            let birth_year = record
                .birth
                .resolve()
                .ok_or_else(|| DatasetError::InvalidYear {
                    id: record.id.clone(),
                    field: "birth",
                    value: record.birth.clone(),
                })?;

            let death_year = match &record.death {
                Some(value) => Some(value.resolve().ok_or_else(|| DatasetError::InvalidYear {
                    id: record.id.clone(),
                    field: "death",
                    value: value.clone(),
                })?),
                None => None,
            };

            let mut influenced_by = Vec::with_capacity(record.influences.len());
            for influence in &record.influences {
                if seen.contains(influence.as_str()) && influence != &record.id {
                    influenced_by.push(influence.clone());
                } else {
                    dangling_influences += 1;
                }
            }

            nodes.push(NodeData {
                id: record.id.clone(),
                display_name,
                category: record
                    .category
                    .as_ref()
                    .map(|c| c.trim().to_lowercase())
                    .filter(|c| !c.is_empty()),
                birth_year,
                death_year,
                influenced_by,
            });
        }

        Ok(ValidatedDataset {
            nodes,
            dangling_influences,
        })
    }
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ScivisError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Uint8,
    Uint16,
    Int16,
    Float32,
    Float64,
}

impl ElementType {
    pub fn bytes_per_element(self) -> u64 {
        match self {
            ElementType::Uint8 => 1,
            ElementType::Uint16 | ElementType::Int16 => 2,
            ElementType::Float32 => 4,
            ElementType::Float64 => 8,
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementType::Uint8 => write!(f, "uint8"),
            ElementType::Uint16 => write!(f, "uint16"),
            ElementType::Int16 => write!(f, "int16"),
            ElementType::Float32 => write!(f, "float32"),
            ElementType::Float64 => write!(f, "float64"),
        }
    }
}

impl FromStr for ElementType {
    type Err = ScivisError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "uint8" => Ok(ElementType::Uint8),
            "uint16" => Ok(ElementType::Uint16),
            "int16" => Ok(ElementType::Int16),
            "float32" => Ok(ElementType::Float32),
            "float64" => Ok(ElementType::Float64),
            _ => Err(ScivisError::UnknownType(value.to_string())),
        }
    }
}

/// One catalog entry. Fields this crate does not interpret are kept in
/// `extra` and written back out untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetRecord {
    pub name: String,
    pub size: [u64; 3],
    /// Raw element type tag. Validated only when a byte size is needed.
    #[serde(rename = "type")]
    pub element_type: String,
    pub url: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DatasetRecord {
    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }

    pub fn element_type(&self) -> Result<ElementType, ScivisError> {
        self.element_type.parse()
    }

    pub fn voxel_count(&self) -> Result<u64, ScivisError> {
        self.size
            .iter()
            .try_fold(1u64, |count, dim| count.checked_mul(*dim))
            .ok_or_else(|| self.size_overflow())
    }

    pub fn byte_size(&self) -> Result<u64, ScivisError> {
        let width = self.element_type()?.bytes_per_element();
        self.voxel_count()?
            .checked_mul(width)
            .ok_or_else(|| self.size_overflow())
    }

    /// Every dimension must be at least one voxel.
    pub fn validate(&self) -> Result<(), ScivisError> {
        if self.size.contains(&0) {
            return Err(ScivisError::Decode(format!(
                "{}: size {:?} has a zero dimension",
                self.name, self.size
            )));
        }
        Ok(())
    }

    fn size_overflow(&self) -> ScivisError {
        ScivisError::Decode(format!("{}: size {:?} overflows u64", self.name, self.size))
    }
}

pub fn normalize_name(name: &str) -> String {
    name.to_lowercase().replace(' ', "_")
}

/// Datasets keyed by the index's own identifiers, in the order the index
/// lists them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    entries: Vec<(String, DatasetRecord)>,
}

impl Catalog {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ScivisError> {
        let value: Value =
            serde_json::from_slice(bytes).map_err(|err| ScivisError::Decode(err.to_string()))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, ScivisError> {
        let Value::Object(map) = value else {
            return Err(ScivisError::Decode(
                "catalog must be a JSON object".to_string(),
            ));
        };

        let entries = map
            .into_iter()
            .map(|(key, value)| {
                let record = serde_json::from_value::<DatasetRecord>(value)
                    .map_err(|err| ScivisError::Decode(format!("catalog entry {key}: {err}")))?;
                record.validate()?;
                Ok((key, record))
            })
            .collect::<Result<Vec<_>, ScivisError>>()?;

        Ok(Self { entries })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DatasetRecord)> {
        self.entries
            .iter()
            .map(|(key, record)| (key.as_str(), record))
    }

    pub fn records(&self) -> impl Iterator<Item = &DatasetRecord> {
        self.entries.iter().map(|(_, record)| record)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, DatasetRecord)> for Catalog {
    fn from_iter<T: IntoIterator<Item = (String, DatasetRecord)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

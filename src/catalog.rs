use std::fmt;

use serde::Serialize;

use crate::domain::{Catalog, DatasetRecord};
use crate::error::ScivisError;

const BYTES_PER_MB: f64 = 1_048_576.0;
const MB_PER_GB: f64 = 1024.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListEntry {
    pub key: String,
    pub name: String,
    pub normalized_name: String,
    pub byte_size: u64,
    pub size_label: String,
}

impl fmt::Display for ListEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.normalized_name, self.size_label)
    }
}

/// Human-readable size estimate: `(<1 MB)`, whole megabytes up to and
/// including 1024 MB, whole gigabytes above that.
pub fn size_label(byte_size: u64) -> String {
    let mb = byte_size as f64 / BYTES_PER_MB;
    if mb < 1.0 {
        "(<1 MB)".to_string()
    } else if mb <= MB_PER_GB {
        format!("({mb:.0} MB)")
    } else {
        format!("({:.0} GB)", mb / MB_PER_GB)
    }
}

pub fn list_entry(key: &str, record: &DatasetRecord) -> Result<ListEntry, ScivisError> {
    let byte_size = record.byte_size()?;
    Ok(ListEntry {
        key: key.to_string(),
        name: record.name.clone(),
        normalized_name: record.normalized_name(),
        byte_size,
        size_label: size_label(byte_size),
    })
}

/// Lazily formats every catalog entry in index order. Callers that want the
/// all-or-nothing behaviour collect into a `Result<Vec<_>, _>`.
pub fn listing(catalog: &Catalog) -> impl Iterator<Item = Result<ListEntry, ScivisError>> + '_ {
    catalog
        .iter()
        .map(|(key, record)| list_entry(key, record))
}

/// First record whose normalized name equals `name` exactly.
pub fn resolve<'a>(catalog: &'a Catalog, name: &str) -> Result<&'a DatasetRecord, ScivisError> {
    catalog
        .records()
        .find(|record| record.normalized_name() == name)
        .ok_or_else(|| ScivisError::DatasetNotFound(name.to_string()))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::{Map, json};

    use super::*;

    fn record(name: &str, size: [u64; 3], element_type: &str) -> DatasetRecord {
        DatasetRecord {
            name: name.to_string(),
            size,
            element_type: element_type.to_string(),
            url: format!("https://example.org/{}.raw", name.to_lowercase()),
            extra: Map::new(),
        }
    }

    #[test]
    fn label_small_volume() {
        assert_eq!(size_label(0), "(<1 MB)");
        assert_eq!(size_label(64 * 64 * 64), "(<1 MB)");
        assert_eq!(size_label(1_048_575), "(<1 MB)");
    }

    #[test]
    fn label_megabytes() {
        let skull = record("Skull", [256, 256, 256], "uint8");
        assert_eq!(size_label(skull.byte_size().unwrap()), "(16 MB)");
        assert_eq!(size_label(1_048_576), "(1 MB)");
        assert_eq!(size_label(1024 * 1_048_576), "(1024 MB)");
    }

    #[test]
    fn label_gigabytes() {
        let rm = record("Richtmyer Meshkov", [2048, 2048, 1920], "float32");
        assert_eq!(size_label(rm.byte_size().unwrap()), "(30 GB)");
        assert_eq!(size_label(3 * 1024 * 1_048_576), "(3 GB)");
    }

    #[test]
    fn label_is_monotonic() {
        fn rank(label: &str) -> (u8, u64) {
            if label == "(<1 MB)" {
                return (0, 0);
            }
            let inner = label.trim_start_matches('(').trim_end_matches(')');
            let (value, unit) = inner.split_once(' ').unwrap();
            let unit_rank = if unit == "MB" { 1 } else { 2 };
            (unit_rank, value.parse().unwrap())
        }

        let sizes = [
            0u64,
            1_000,
            1_048_576,
            16_777_216,
            700 * 1_048_576,
            1024 * 1_048_576,
            1100 * 1_048_576,
            40 * 1024 * 1_048_576,
            1000 * 1024 * 1_048_576,
        ];
        let ranks = sizes
            .iter()
            .map(|size| rank(&size_label(*size)))
            .collect::<Vec<_>>();
        assert!(ranks.windows(2).all(|pair| pair[0] <= pair[1]), "{ranks:?}");
    }

    #[test]
    fn listing_renders_lines_in_order() {
        let catalog: Catalog = vec![
            ("skull".to_string(), record("Skull", [256, 256, 256], "uint8")),
            ("fuel".to_string(), record("Fuel", [64, 64, 64], "uint8")),
        ]
        .into_iter()
        .collect();

        let lines = listing(&catalog)
            .map(|entry| entry.map(|entry| entry.to_string()))
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(lines, vec!["skull (16 MB)", "fuel (<1 MB)"]);
    }

    #[test]
    fn listing_aborts_on_unknown_type() {
        let catalog: Catalog = vec![
            ("skull".to_string(), record("Skull", [256, 256, 256], "uint8")),
            ("odd".to_string(), record("Odd", [8, 8, 8], "bfloat16")),
        ]
        .into_iter()
        .collect();

        let result = listing(&catalog).collect::<Result<Vec<_>, _>>();
        assert_matches!(result, Err(ScivisError::UnknownType(tag)) if tag == "bfloat16");
    }

    #[test]
    fn resolve_exact_normalized_name() {
        let catalog: Catalog = vec![
            ("a".to_string(), record("Head MRT Angiography", [416, 512, 112], "uint16")),
            ("b".to_string(), record("Skull", [256, 256, 256], "uint8")),
        ]
        .into_iter()
        .collect();

        let found = resolve(&catalog, "head_mrt_angiography").unwrap();
        assert_eq!(found.name, "Head MRT Angiography");

        assert_matches!(
            resolve(&catalog, "Skull"),
            Err(ScivisError::DatasetNotFound(name)) if name == "Skull"
        );
    }

    #[test]
    fn resolve_first_match_wins() {
        let mut first = record("Skull", [256, 256, 256], "uint8");
        first.extra.insert("origin".to_string(), json!("first"));
        let mut second = record("skull", [128, 128, 128], "uint8");
        second.extra.insert("origin".to_string(), json!("second"));
        let catalog: Catalog = vec![
            ("skull_a".to_string(), first.clone()),
            ("skull_b".to_string(), second),
        ]
        .into_iter()
        .collect();

        assert_eq!(resolve(&catalog, "skull").unwrap(), &first);
        assert_eq!(
            resolve(&catalog, "skull").unwrap(),
            resolve(&catalog, "skull").unwrap()
        );
    }
}

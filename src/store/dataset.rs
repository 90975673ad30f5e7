//! Static dataset loading
//!
//! The catalog is seeded once at startup, either from the JSON document
//! bundled into the binary or from a JSON file named in the configuration.

use crate::core::error::{CatalogError, Result};
use crate::store::models::Cartoon;
use std::path::Path;

/// Dataset bundled with the service
pub const EMBEDDED_DATASET: &str = include_str!("../../data/cartoons.json");

/// Parse a JSON array of cartoons
pub fn parse(json: &str) -> Result<Vec<Cartoon>> {
    Ok(serde_json::from_str(json)?)
}

/// Load the bundled dataset
pub fn load_embedded() -> Result<Vec<Cartoon>> {
    parse(EMBEDDED_DATASET)
}

/// Load a dataset from a JSON file
pub fn load_from_file(path: &Path) -> Result<Vec<Cartoon>> {
    let json = std::fs::read_to_string(path).map_err(|e| {
        CatalogError::InvalidDataset(format!("cannot read {}: {}", path.display(), e))
    })?;

    parse(&json).map_err(|e| {
        CatalogError::InvalidDataset(format!("cannot parse {}: {}", path.display(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_embedded_dataset_parses() {
        let cartoons = load_embedded().unwrap();

        assert!(cartoons.len() > 9);
        assert_eq!(cartoons[0].id, 1);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id": 42, "title": "Fantasia", "director": "Ben Sharpsteen",
                "description": "Animated segments set to classical music.",
                "studio": "Walt Disney Productions", "genre": "musical",
                "releaseYear": 1940}}]"#
        )
        .unwrap();

        let cartoons = load_from_file(file.path()).unwrap();
        assert_eq!(cartoons.len(), 1);
        assert_eq!(cartoons[0].title, "Fantasia");
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_from_file(Path::new("/nonexistent/cartoons.json")).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidDataset(_)));
    }

    #[test]
    fn test_record_missing_required_field() {
        let err = parse(r#"[{"id": 1, "title": "No studio"}]"#).unwrap_err();
        assert!(matches!(err, CatalogError::JsonError(_)));
    }
}

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::mention::TrackedBrand;
use crate::ConfigError;

fn enabled_by_default() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandConfig {
    pub name: String,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BrandsFile {
    pub brands: Vec<BrandConfig>,
}

impl BrandsFile {
    /// Enabled brands, in file order.
    #[must_use]
    pub fn tracked(&self) -> Vec<TrackedBrand> {
        self.brands
            .iter()
            .filter(|b| b.enabled)
            .map(|b| TrackedBrand::new(b.name.as_str()))
            .collect()
    }
}

/// Load and validate the brands configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_brands(path: &Path) -> Result<BrandsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::BrandsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_brands(&content)
}

/// Parse and validate a brands document that is already in memory.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_brands(content: &str) -> Result<BrandsFile, ConfigError> {
    let brands_file: BrandsFile =
        serde_yaml::from_str(content).map_err(ConfigError::BrandsFileParse)?;

    validate_brands(&brands_file)?;

    Ok(brands_file)
}

fn validate_brands(brands_file: &BrandsFile) -> Result<(), ConfigError> {
    let mut seen_names = HashSet::new();

    for brand in &brands_file.brands {
        if brand.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "brand name must be non-empty".to_string(),
            ));
        }

        let lower_name = brand.name.trim().to_lowercase();
        if !seen_names.insert(lower_name) {
            return Err(ConfigError::Validation(format!(
                "duplicate brand name: '{}'",
                brand.name
            )));
        }
    }

    if !brands_file.brands.iter().any(|b| b.enabled) {
        return Err(ConfigError::Validation(
            "at least one brand must be enabled".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brand(name: &str, enabled: bool) -> BrandConfig {
        BrandConfig {
            name: name.to_string(),
            enabled,
            notes: None,
        }
    }

    #[test]
    fn enabled_defaults_to_true() {
        let file = parse_brands("brands:\n  - name: Tesla\n").unwrap();
        assert!(file.brands[0].enabled);
    }

    #[test]
    fn tracked_skips_disabled_brands() {
        let file = BrandsFile {
            brands: vec![brand("Tesla", true), brand("Nokia", false), brand("Apple", true)],
        };
        let names: Vec<String> = file.tracked().iter().map(ToString::to_string).collect();
        assert_eq!(names, vec!["Tesla", "Apple"]);
    }

    #[test]
    fn validate_rejects_empty_name() {
        let file = BrandsFile {
            brands: vec![brand("  ", true)],
        };
        let err = validate_brands(&file).unwrap_err();
        assert!(err.to_string().contains("non-empty"));
    }

    #[test]
    fn validate_rejects_duplicate_name_ignoring_case() {
        let file = BrandsFile {
            brands: vec![brand("Apple", true), brand("apple ", false)],
        };
        let err = validate_brands(&file).unwrap_err();
        assert!(err.to_string().contains("duplicate brand name"));
    }

    #[test]
    fn validate_rejects_all_disabled() {
        let file = BrandsFile {
            brands: vec![brand("Tesla", false)],
        };
        let err = validate_brands(&file).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn validate_rejects_empty_list() {
        let err = parse_brands("brands: []\n").unwrap_err();
        assert!(err.to_string().contains("at least one brand"));
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let err = parse_brands("brands: {name: [").unwrap_err();
        assert!(matches!(err, ConfigError::BrandsFileParse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_brands(Path::new("/definitely/not/here/brands.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::BrandsFileIo { .. }));
    }

    #[test]
    fn load_brands_from_real_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("config")
            .join("brands.yaml");
        assert!(path.exists(), "brands.yaml missing at {path:?}");
        let brands_file = load_brands(&path).expect("bundled brands.yaml should load");
        let tracked = brands_file.tracked();
        assert!(tracked.contains(&TrackedBrand::new("tesla")));
    }
}

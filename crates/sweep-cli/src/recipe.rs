//! Recipe files: ordered cleaning steps plus export settings.
//!
//! ```toml
//! [[steps]]
//! op = "dedup"
//!
//! [[steps]]
//! op = "fill-numeric"
//! strategy = "median"
//!
//! [export]
//! format = "csv"
//! compression = "gzip"
//! columns = ["region", "price"]
//! filter = "price > 0"
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sweep_core::ExportRequest;
use sweep_model::{Compression, ExportFormat};
use sweep_transform::Transform;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Recipe {
    pub steps: Vec<Transform>,
    pub export: ExportRequest,
}

impl Recipe {
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("parse recipe")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read recipe {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("recipe {}", path.display()))
    }
}

/// Export settings given on the command line. Set values win over the
/// recipe's `[export]` table.
#[derive(Debug, Clone, Default)]
pub struct ExportOverrides {
    pub format: Option<ExportFormat>,
    pub compression: Option<Compression>,
    pub columns: Option<Vec<String>>,
    pub filter: Option<String>,
    pub include_index: bool,
}

impl ExportOverrides {
    pub fn apply_to(&self, request: &mut ExportRequest) {
        if let Some(format) = self.format {
            request.options.format = format;
        }
        if let Some(compression) = self.compression {
            request.options.compression = Some(compression);
        }
        if let Some(columns) = &self.columns {
            request.columns = Some(columns.clone());
        }
        if let Some(filter) = &self.filter {
            request.filter = Some(filter.clone());
        }
        if self.include_index {
            request.options.include_index = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use sweep_model::FillStrategy;

    use super::*;

    #[test]
    fn recipe_with_steps_and_export() {
        let recipe = Recipe::from_toml(
            r#"
            [[steps]]
            op = "dedup"

            [[steps]]
            op = "fill-numeric"
            strategy = "median"

            [export]
            format = "json"
            columns = ["region"]
            "#,
        )
        .unwrap();
        assert_eq!(
            recipe.steps,
            vec![
                Transform::Dedup,
                Transform::FillNumeric {
                    strategy: FillStrategy::Median
                }
            ]
        );
        assert_eq!(recipe.export.options.format, ExportFormat::Json);
        assert_eq!(recipe.export.columns, Some(vec!["region".to_string()]));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Recipe::from_toml("stepz = []").is_err());
        assert!(Recipe::from_toml("[[steps]]\nop = \"shuffle\"").is_err());
    }

    #[test]
    fn overrides_win() {
        let mut recipe = Recipe::from_toml("[export]\nformat = \"json\"\nfilter = \"a > 1\"").unwrap();
        ExportOverrides {
            format: Some(ExportFormat::Csv),
            compression: Some(Compression::Zip),
            ..ExportOverrides::default()
        }
        .apply_to(&mut recipe.export);
        assert_eq!(recipe.export.options.format, ExportFormat::Csv);
        assert_eq!(recipe.export.options.compression, Some(Compression::Zip));
        assert_eq!(recipe.export.filter.as_deref(), Some("a > 1"));
    }
}

//! Code generation settings shared by export and import.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Measurement unit sizes are converted to when written to source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    /// Plain pixels, no conversion factor
    #[default]
    Px,
    /// Density independent pixels (`* dp`)
    Dp,
    /// Multiples of the font size (`* fs`)
    Fs,
}

impl Unit {
    /// Name of the factor variable in generated code, empty for pixels.
    pub const fn factor(&self) -> &'static str {
        match self {
            Unit::Px => "",
            Unit::Dp => "dp",
            Unit::Fs => "fs",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeGenSettings {
    /// Spaces per nesting level
    pub indent: usize,
    /// Loop variable used when an iteration has no bound index
    pub for_var_name: String,
    /// Name of the element alias declared for container-bound loops
    pub cur_item_var_name: String,
    pub unit: Unit,
    /// Literal line placed around child regions
    pub separator_marker: String,
}

impl Default for CodeGenSettings {
    fn default() -> Self {
        Self {
            indent: 4,
            for_var_name: "i".into(),
            cur_item_var_name: "item".into(),
            unit: Unit::Px,
            separator_marker: "/// @separator".into(),
        }
    }
}

impl CodeGenSettings {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings {}", path.display()))?;
        let settings = serde_json::from_str(&text)
            .with_context(|| format!("invalid settings file {}", path.display()))?;
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)
            .with_context(|| format!("failed to write settings {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_default() {
        let s = CodeGenSettings::default();
        assert_eq!(s.indent, 4);
        assert_eq!(s.for_var_name, "i");
        assert_eq!(s.unit, Unit::Px);
        assert_eq!(s.separator_marker, "/// @separator");
    }

    #[test]
    fn test_settings_partial_json() {
        // Missing fields fall back to defaults
        let s: CodeGenSettings = serde_json::from_str(r#"{ "unit": "dp", "indent": 2 }"#).unwrap();
        assert_eq!(s.unit, Unit::Dp);
        assert_eq!(s.indent, 2);
        assert_eq!(s.cur_item_var_name, "item");
    }

    #[test]
    fn test_settings_save_load() {
        let path = std::env::temp_dir().join("imrad_codegen_settings_test.json");
        let s = CodeGenSettings {
            for_var_name: "n".into(),
            unit: Unit::Fs,
            ..Default::default()
        };
        s.save(&path).unwrap();
        let loaded = CodeGenSettings::load(&path).unwrap();
        assert_eq!(loaded, s);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_unit_factor() {
        assert_eq!(Unit::Px.factor(), "");
        assert_eq!(Unit::Dp.factor(), "dp");
        assert_eq!(Unit::Fs.factor(), "fs");
    }
}

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::layer::{ButtonStyle, Layer, LayerError, LayerStack};
use crate::params::ShaderParameters;

/// Reference viewport default layer positions are expressed against.
const REFERENCE_WIDTH: f32 = 1920.0;
const REFERENCE_HEIGHT: f32 = 1080.0;

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("failed to read composition at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write composition to {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse composition: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize composition: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid composition: {0}")]
    Invalid(#[from] LayerError),
}

/// Editor-only toggles that never reach the exported page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalSettings {
    pub show_grid: bool,
    pub grid_opacity: f32,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            show_grid: false,
            grid_opacity: 0.15,
        }
    }
}

/// The whole editing session state: parameters, overlay layers, settings.
///
/// This is the owned configuration object passed between the UI shell, the
/// renderer, and the exporter. Parameters mutate only through
/// [`Composition::update_params`], which re-applies the editor ranges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Composition {
    #[serde(default)]
    pub params: ShaderParameters,
    #[serde(default)]
    pub settings: GlobalSettings,
    pub layers: LayerStack,
}

impl Default for Composition {
    /// The starter composition: headline text plus a call-to-action button,
    /// centered on the reference viewport.
    fn default() -> Self {
        let center_x = REFERENCE_WIDTH / 2.0;
        let center_y = REFERENCE_HEIGHT / 2.0;
        let headline = Layer {
            id: "1".to_string(),
            text: "G L I T C H".to_string(),
            x: center_x,
            y: center_y - 80.0,
            size: 100.0,
            font: "Clash Display".to_string(),
            weight: 700,
            opacity: 1.0,
            rotation: 0.0,
            letter_spacing: 2.0,
            blend_mode: Default::default(),
            color: "#FFFFFF".to_string(),
            italic: false,
            button: None,
        };
        let cta = Layer {
            id: "2".to_string(),
            text: "EXPLORE THE VOID".to_string(),
            x: center_x,
            y: center_y + 100.0,
            size: 14.0,
            font: "Space Mono".to_string(),
            weight: 700,
            opacity: 1.0,
            rotation: 0.0,
            letter_spacing: 4.0,
            blend_mode: Default::default(),
            color: "#000000".to_string(),
            italic: false,
            button: Some(ButtonStyle {
                padding_x: 44.0,
                padding_y: 20.0,
                border_radius: 0.0,
                background_color: "#CCFF00".to_string(),
                border_width: 0.0,
                border_color: "#CCFF00".to_string(),
            }),
        };
        Self {
            params: ShaderParameters::default(),
            settings: GlobalSettings::default(),
            layers: LayerStack::new(vec![headline, cta])
                .expect("starter layers are non-empty"),
        }
    }
}

impl Composition {
    /// Loads a TOML document, validates the layer invariants, and clamps the
    /// parameter knobs into their editor ranges.
    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let contents = fs::read_to_string(path).map_err(|source| DocumentError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut composition: Self = toml::from_str(&contents)?;
        composition.layers.validate()?;
        composition.params.clamp_to_ranges();
        Ok(composition)
    }

    /// Writes the document as pretty TOML.
    pub fn save(&self, path: &Path) -> Result<(), DocumentError> {
        let serialized = toml::to_string_pretty(self)?;
        fs::write(path, serialized).map_err(|source| DocumentError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The single mutation entry point for shader parameters.
    pub fn update_params(&mut self, mutate: impl FnOnce(&mut ShaderParameters)) {
        mutate(&mut self.params);
        self.params.clamp_to_ranges();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starter_composition_upholds_invariants() {
        let composition = Composition::default();
        assert_eq!(composition.layers.len(), 2);
        composition.layers.validate().unwrap();
        assert_eq!(composition.layers.selected().id, "1");
        assert!(composition.layers.get("2").unwrap().is_button());
        for layer in composition.layers.iter() {
            assert!(crate::SYSTEM_FONTS.contains(&layer.font.as_str()));
        }
    }

    #[test]
    fn document_round_trips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("composition.toml");
        let mut composition = Composition::default();
        composition.update_params(|params| params.zoom = 3.25);
        composition.save(&path).unwrap();

        let loaded = Composition::load(&path).unwrap();
        assert_eq!(loaded, composition);
    }

    #[test]
    fn load_clamps_out_of_range_knobs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("composition.toml");
        let mut composition = Composition::default();
        composition.params.iterations = 9999.0;
        composition.params.zoom = 100.0;
        composition.save(&path).unwrap();

        let loaded = Composition::load(&path).unwrap();
        assert_eq!(loaded.params.iterations, 200.0);
        assert_eq!(loaded.params.zoom, 8.0);
    }

    #[test]
    fn documents_without_layers_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("composition.toml");
        fs::write(
            &path,
            "[params]\nzoom = 1.0\n\n[layers]\nselected = \"1\"\nitems = []\n",
        )
        .unwrap();
        assert!(matches!(
            Composition::load(&path),
            Err(DocumentError::Invalid(LayerError::Empty))
        ));
    }

    #[test]
    fn update_params_applies_editor_ranges() {
        let mut composition = Composition::default();
        composition.update_params(|params| params.speed = 50.0);
        assert_eq!(composition.params.speed, 5.0);
    }
}

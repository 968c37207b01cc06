use serde::{Deserialize, Serialize};

/// Number of palette slots the coloring kernel samples from.
pub const PALETTE_SIZE: usize = 5;

/// Flat record of every knob that drives the animated background.
///
/// Field names serialize as camelCase so the snapshot baked into an exported
/// page keeps the shape the embedded runtime script expects. The renderer
/// reads a parameters value every frame; the exporter reads it once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShaderParameters {
    /// Exactly five hex color strings feeding the kernel palette.
    pub colors: [String; PALETTE_SIZE],
    pub complexity: f32,
    pub zoom: f32,
    pub speed: f32,
    pub distortion: f32,
    pub iterations: f32,
    pub noise: f32,
    pub hue_rotation: f32,
}

impl Default for ShaderParameters {
    fn default() -> Self {
        Self {
            colors: [
                "#CCFF00".to_string(),
                "#FF0055".to_string(),
                "#00F2FF".to_string(),
                "#9D00FF".to_string(),
                "#000000".to_string(),
            ],
            complexity: 80.0,
            zoom: 1.5,
            speed: 0.5,
            distortion: 1.0,
            iterations: 120.0,
            noise: 0.5,
            hue_rotation: 0.0,
        }
    }
}

impl ShaderParameters {
    /// Clamps every knob into its editor range.
    ///
    /// The kernel's own loop bound already caps iteration requests at 200;
    /// clamping here keeps document values and uniform values identical for
    /// out-of-range requests. `hue_rotation` has no upper bound.
    pub fn clamp_to_ranges(&mut self) {
        self.complexity = self.complexity.clamp(10.0, 300.0);
        self.zoom = self.zoom.clamp(0.1, 8.0);
        self.speed = self.speed.clamp(0.1, 5.0);
        self.distortion = self.distortion.clamp(-20.0, 20.0);
        self.iterations = self.iterations.clamp(10.0, 200.0);
        self.noise = self.noise.clamp(0.0, 1.0);
        self.hue_rotation = self.hue_rotation.max(0.0);
    }

    /// Range-clamped copy, for call sites that want value semantics.
    pub fn clamped(mut self) -> Self {
        self.clamp_to_ranges();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_shipped_preset() {
        let params = ShaderParameters::default();
        assert_eq!(params.colors[0], "#CCFF00");
        assert_eq!(params.colors[4], "#000000");
        assert_eq!(params.complexity, 80.0);
        assert_eq!(params.iterations, 120.0);
        assert_eq!(params.hue_rotation, 0.0);
    }

    #[test]
    fn iteration_requests_above_cap_clamp_to_cap() {
        let mut params = ShaderParameters {
            iterations: 500.0,
            ..ShaderParameters::default()
        };
        params.clamp_to_ranges();
        assert_eq!(params.iterations, 200.0);

        let exact = ShaderParameters {
            iterations: 200.0,
            ..ShaderParameters::default()
        };
        assert_eq!(params, exact.clamped());
    }

    #[test]
    fn hue_rotation_is_unbounded_above() {
        let params = ShaderParameters {
            hue_rotation: 720.0,
            ..ShaderParameters::default()
        }
        .clamped();
        assert_eq!(params.hue_rotation, 720.0);

        let negative = ShaderParameters {
            hue_rotation: -1.0,
            ..ShaderParameters::default()
        }
        .clamped();
        assert_eq!(negative.hue_rotation, 0.0);
    }

    #[test]
    fn serializes_camel_case_for_the_export_snapshot() {
        let params = ShaderParameters::default();
        let json = serde_json::to_string(&params).unwrap();
        assert!(json.contains("\"hueRotation\":"));
        assert!(json.contains("\"colors\":"));
    }
}

use bytemuck::{Pod, Zeroable};
use composition::{hex_to_rgb, ShaderParameters, PALETTE_SIZE};

/// Std140 mirror of the `EffectParams` uniform block in `shaders.rs`.
///
/// 128 bytes total; the two trailing floats pad the block to a 16-byte
/// boundary. Palette entries are vec4 slots whose alpha is fixed at 1.
#[repr(C, align(16))]
#[derive(Clone, Copy)]
pub(crate) struct EffectUniforms {
    pub resolution: [f32; 2],
    pub time: f32,
    pub zoom: f32,
    pub palette: [[f32; 4]; PALETTE_SIZE],
    pub complexity: f32,
    pub speed: f32,
    pub distortion: f32,
    pub iterations: f32,
    pub noise: f32,
    pub hue_rotation: f32,
    pub _padding: [f32; 2],
}

unsafe impl Zeroable for EffectUniforms {}
unsafe impl Pod for EffectUniforms {}

impl EffectUniforms {
    pub fn new(width: u32, height: u32) -> Self {
        let mut uniforms = Self::zeroed();
        uniforms.set_resolution(width as f32, height as f32);
        uniforms
    }

    pub fn set_resolution(&mut self, width: f32, height: f32) {
        self.resolution = [width, height];
    }

    pub fn set_time(&mut self, seconds: f32) {
        self.time = seconds;
    }

    /// Rebinds every per-frame input from the current parameter snapshot.
    ///
    /// Hex colors convert through [`hex_to_rgb`]; a malformed slot becomes a
    /// black contribution without failing the frame. Scalar knobs are passed
    /// through unconverted — the kernel's own loop bound caps iterations.
    pub fn set_parameters(&mut self, params: &ShaderParameters) {
        for (slot, hex) in self.palette.iter_mut().zip(params.colors.iter()) {
            let [r, g, b] = hex_to_rgb(hex);
            *slot = [r, g, b, 1.0];
        }
        self.zoom = params.zoom;
        self.complexity = params.complexity;
        self.speed = params.speed;
        self.distortion = params.distortion;
        self.iterations = params.iterations;
        self.noise = params.noise;
        self.hue_rotation = params.hue_rotation;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn baseline_params() -> ShaderParameters {
        // The golden regression scenario; identical to the shipped defaults.
        ShaderParameters {
            colors: [
                "#CCFF00".into(),
                "#FF0055".into(),
                "#00F2FF".into(),
                "#9D00FF".into(),
                "#000000".into(),
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

    #[test]
    fn block_size_matches_std140_layout() {
        assert_eq!(std::mem::size_of::<EffectUniforms>(), 128);
    }

    #[test]
    fn first_frame_inputs_are_deterministic() {
        let mut uniforms = EffectUniforms::new(1280, 720);
        uniforms.set_time(0.0);
        uniforms.set_parameters(&baseline_params());

        assert_eq!(uniforms.resolution, [1280.0, 720.0]);
        assert_eq!(uniforms.time, 0.0);
        assert_eq!(uniforms.palette[0], [204.0 / 255.0, 1.0, 0.0, 1.0]);
        assert_eq!(uniforms.palette[1], [1.0, 0.0, 85.0 / 255.0, 1.0]);
        assert_eq!(uniforms.palette[2], [0.0, 242.0 / 255.0, 1.0, 1.0]);
        assert_eq!(uniforms.palette[3], [157.0 / 255.0, 0.0, 1.0, 1.0]);
        assert_eq!(uniforms.palette[4], [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(uniforms.complexity, 80.0);
        assert_eq!(uniforms.zoom, 1.5);
        assert_eq!(uniforms.speed, 0.5);
        assert_eq!(uniforms.distortion, 1.0);
        assert_eq!(uniforms.iterations, 120.0);
        assert_eq!(uniforms.noise, 0.5);
        assert_eq!(uniforms.hue_rotation, 0.0);

        // Two identical bindings produce byte-identical uniform blocks, so
        // the first frame's GPU inputs are a stable regression baseline.
        let mut again = EffectUniforms::new(1280, 720);
        again.set_time(0.0);
        again.set_parameters(&baseline_params());
        assert_eq!(bytemuck::bytes_of(&uniforms), bytemuck::bytes_of(&again));
    }

    #[test]
    fn resize_between_frames_rebinds_the_exact_dimensions() {
        let mut uniforms = EffectUniforms::new(800, 600);
        uniforms.set_parameters(&baseline_params());
        uniforms.set_resolution(1024.0, 768.0);
        assert_eq!(uniforms.resolution, [1024.0, 768.0]);
        uniforms.set_resolution(333.0, 77.0);
        assert_eq!(uniforms.resolution, [333.0, 77.0]);
    }

    #[test]
    fn malformed_palette_slot_binds_black() {
        let mut params = baseline_params();
        params.colors[2] = "#XYZ".into();
        let mut uniforms = EffectUniforms::new(64, 64);
        uniforms.set_parameters(&params);
        assert_eq!(uniforms.palette[2], [0.0, 0.0, 0.0, 1.0]);
        // The rest of the frame still binds normally.
        assert_eq!(uniforms.palette[1], [1.0, 0.0, 85.0 / 255.0, 1.0]);
    }
}

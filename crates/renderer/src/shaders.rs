//! Built-in GLSL for the background effect.
//!
//! Both stages compile through wgpu's GLSL front end when the pipeline is
//! created. The fragment stage is the distortion/fractal coloring kernel:
//! an accumulation loop marches a sample position through a log-polar field,
//! summing palette contributions weighted by the inverse local field
//! thickness, then compresses the HDR sum with `tanh` and applies a fixed
//! gamma. The uniform block layout must match `EffectUniforms` in
//! `gpu/uniforms.rs`.

/// Clip-space unit quad: two triangles, six vertices.
pub(crate) const QUAD_VERTICES: [[f32; 2]; 6] = [
    [-1.0, -1.0],
    [1.0, -1.0],
    [-1.0, 1.0],
    [-1.0, 1.0],
    [1.0, -1.0],
    [1.0, 1.0],
];

/// Pass-through vertex stage for the full-screen quad.
pub(crate) const VERTEX_SHADER: &str = r"#version 450
layout(location = 0) in vec2 a_position;

void main() {
    gl_Position = vec4(a_position, 0.0, 1.0);
}
";

/// The coloring kernel.
///
/// The iteration loop steps by 2 up to a hard bound of 200 and breaks early
/// once the loop variable exceeds `u_iterations`, so requests above 200
/// change nothing. The `u_hueRotation` branch is a brightness pulse, not a
/// real hue rotation; the behaviour is kept as shipped.
pub(crate) const FRAGMENT_SHADER: &str = r"#version 450
layout(location = 0) out vec4 o;

layout(std140, set = 0, binding = 0) uniform EffectParams {
    vec2 r;
    float t;
    float u_zoom;
    vec4 u_palette[5];
    float u_complexity;
    float u_speed;
    float u_distortion;
    float u_iterations;
    float u_noise;
    float u_hueRotation;
    vec2 _pad;
} ubo;

void main() {
    // Fragment origin is top-left here; the reference output assumes the
    // WebGL bottom-left convention, so flip before sampling the field.
    vec3 frag = vec3(gl_FragCoord.x, ubo.r.y - gl_FragCoord.y, 0.5);
    float z = 0.0;
    float d = 0.0;
    float l = 0.0;
    vec4 acc = vec4(0.0);
    float time = ubo.t * ubo.u_speed;

    for (float i = 0.0; i < 200.0; i += 2.0) {
        if (i > ubo.u_iterations) {
            break;
        }
        vec3 p = z * (frag - vec3(ubo.r.x, ubo.r.y, ubo.r.y)) / ubo.r.y;
        p.z += 0.05 + ubo.u_distortion * 0.01;
        l = length(p) * ubo.u_zoom;
        vec3 v = vec3(atan(p.x, p.z), atan(p.y, length(p.xz)), log(l + 0.1))
            * (ubo.u_complexity * 0.1) + time;
        v.xy += sin(time + v.z) * vec2(0.2, 0.8);
        d = length(cos(v) + sin(v.yzx + v + time - l)) * l * 0.025;
        z += d;
        acc += vec4(ubo.u_palette[int(mod(i, 5.0))].rgb, 1.0)
            / (d + 1e-4 + ubo.u_noise * 0.001);
    }

    vec3 col = tanh(acc.rgb / 2500.0);
    if (ubo.u_hueRotation > 0.0) {
        col *= 1.0 + sin(time) * 0.1;
    }
    o = pow(vec4(col, 1.0), vec4(1.8));
}
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_covers_clip_space() {
        assert_eq!(QUAD_VERTICES.len(), 6);
        for [x, y] in QUAD_VERTICES {
            assert!(x == -1.0 || x == 1.0);
            assert!(y == -1.0 || y == 1.0);
        }
        // Both winding corners appear in both triangles.
        assert_eq!(QUAD_VERTICES[1], QUAD_VERTICES[4]);
        assert_eq!(QUAD_VERTICES[2], QUAD_VERTICES[3]);
    }

    #[test]
    fn stages_declare_the_shared_interface() {
        assert!(VERTEX_SHADER.contains("a_position"));
        assert!(FRAGMENT_SHADER.contains("EffectParams"));
        for knob in [
            "u_zoom",
            "u_complexity",
            "u_speed",
            "u_distortion",
            "u_iterations",
            "u_noise",
            "u_hueRotation",
        ] {
            assert!(FRAGMENT_SHADER.contains(knob), "missing {knob}");
        }
    }
}

//! Standalone page export.
//!
//! Serializes a composition into a single self-contained HTML document: a
//! full-viewport canvas, the overlay layers as statically positioned markup,
//! and an embedded script that reproduces the live preview's initialization
//! and per-frame contracts (same program, same six-vertex quad, same uniform
//! update order) against WebGL2. The current parameters are baked in as a
//! JSON literal — a one-time snapshot, so later edits never reach a page
//! that has already been written.
//!
//! The embedded GLSL pair below is intentionally an independent textual copy
//! of the native kernel: the artifact must stay runnable with no reach-back
//! into this process.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use composition::{Composition, Layer};

/// Default artifact file name.
pub const DEFAULT_EXPORT_FILENAME: &str = "forge-deploy.html";

/// Vertex stage embedded into exported pages (WebGL2 / GLSL ES 300).
const WEB_VERTEX_SHADER: &str = "#version 300 es
in vec4 a_position;
void main() {
    gl_Position = a_position;
}";

/// Fragment kernel embedded into exported pages (WebGL2 / GLSL ES 300).
const WEB_FRAGMENT_SHADER: &str = "#version 300 es
precision highp float;
out vec4 o;
uniform vec2 r;
uniform float t;
uniform vec3 u_c1, u_c2, u_c3, u_c4, u_c5;
uniform float u_zoom, u_complexity, u_speed, u_distortion, u_iterations, u_noise, u_hueRotation;

vec3 hsv2rgb(vec3 c) {
    vec4 K = vec4(1.0, 2.0 / 3.0, 1.0 / 3.0, 3.0);
    vec3 p = abs(fract(c.xxx + K.xyz) * 6.0 - K.www);
    return c.z * mix(K.xxx, clamp(p - K.xxx, 0.0, 1.0), c.y);
}

void main() {
    vec2 uv = (gl_FragCoord.xy * 2.0 - r) / min(r.x, r.y);
    vec3 p, v;
    vec3 palette[5] = vec3[](u_c1, u_c2, u_c3, u_c4, u_c5);
    float i = 0.0, z = 0.0, d = 0.0, l = 0.0;
    vec4 finalColor = vec4(0.0);
    float time = t * u_speed;

    for(i=0.0; i<200.0; i+=2.0) {
        if(i > u_iterations) break;
        p = z * (gl_FragCoord.rgb * 1.0 - r.xyy) / r.y;
        p.z += 0.05 + (u_distortion * 0.01);
        l = length(p) * u_zoom;
        v = vec3(atan(p.x, p.z), atan(p.y, length(p.xz)), log(l + 0.1)) * (u_complexity * 0.1) + time;
        v.xy += sin(time + v.z) * vec2(0.2, 0.8);
        z += d = length(cos(v) + sin(v.yzx + v + time - l)) * l * 0.025;
        finalColor += (vec4(palette[int(mod(i, 5.0))], 1.0) / (d + 1e-4 + (u_noise * 0.001)));
    }

    vec3 col = tanh(finalColor.rgb / 2500.0);

    // Hue Rotation
    if (u_hueRotation > 0.0) {
        vec3 hsv;
        // Simple hue shift logic
        col *= (1.0 + sin(time) * 0.1);
    }

    o = pow(vec4(col, 1.0), vec4(1.8));
}";

const DOC_HEAD: &str = "<!DOCTYPE html><html><head><title>FORGE_PRODUCTION</title><style>
body{margin:0;overflow:hidden;background:#000;font-family:sans-serif;}
canvas{display:block;width:100vw;height:100vh;}
.l{position:absolute;white-space:nowrap;transform:translate(-50%,-50%);cursor:pointer;text-decoration:none;display:flex;align-items:center;justify-content:center;}
button.l{border:none;outline:none;}
</style></head><body><canvas id=\"c\"></canvas>\n";

/// Initialization plus the per-frame loop: compile and link both stages,
/// upload the quad, resolve uniform locations (a missing location is a
/// WebGL no-op, never fatal), then resize / rebind / draw each frame and
/// reschedule via requestAnimationFrame. Mirrors the live renderer exactly.
const RUNTIME_SCRIPT: &str = r#"function s(t,x){const h=gl.createShader(t);gl.shaderSource(h,x);gl.compileShader(h);return h;}
const p=gl.createProgram();gl.attachShader(p,s(gl.VERTEX_SHADER,VS));gl.attachShader(p,s(gl.FRAGMENT_SHADER,FS));gl.linkProgram(p);gl.useProgram(p);
gl.bindBuffer(gl.ARRAY_BUFFER,gl.createBuffer());gl.bufferData(gl.ARRAY_BUFFER,new Float32Array([-1,-1,1,-1,-1,1,-1,1,1,-1,1,1]),gl.STATIC_DRAW);
const pos=gl.getAttribLocation(p,"a_position");gl.enableVertexAttribArray(pos);gl.vertexAttribPointer(pos,2,gl.FLOAT,false,0,0);
const loc={r:gl.getUniformLocation(p,"r"),t:gl.getUniformLocation(p,"t"),c:[1,2,3,4,5].map(i=>gl.getUniformLocation(p,"u_c"+i)),z:gl.getUniformLocation(p,"u_zoom"),cp:gl.getUniformLocation(p,"u_complexity"),s:gl.getUniformLocation(p,"u_speed"),d:gl.getUniformLocation(p,"u_distortion"),it:gl.getUniformLocation(p,"u_iterations"),n:gl.getUniformLocation(p,"u_noise"),hr:gl.getUniformLocation(p,"u_hueRotation")};
const h2r=h=>h.match(/[A-Za-z0-9]{2}/g).map(v=>parseInt(v,16)/255);
function L(t){c.width=window.innerWidth;c.height=window.innerHeight;gl.viewport(0,0,c.width,c.height);gl.uniform2f(loc.r,c.width,c.height);gl.uniform1f(loc.t,t*0.001);P.colors.forEach((col,i)=>gl.uniform3fv(loc.c[i],h2r(col)));gl.uniform1f(loc.z,P.zoom);gl.uniform1f(loc.cp,P.complexity);gl.uniform1f(loc.s,P.speed);gl.uniform1f(loc.d,P.distortion);gl.uniform1f(loc.it,P.iterations);gl.uniform1f(loc.n,P.noise);gl.uniform1f(loc.hr,P.hueRotation);gl.drawArrays(gl.TRIANGLES,0,6);requestAnimationFrame(L);}requestAnimationFrame(L);
"#;

/// Builds the complete artifact for the given composition.
pub fn build_artifact(composition: &Composition) -> Result<String> {
    let params_json = serde_json::to_string(&composition.params)
        .context("failed to serialize the parameter snapshot")?;

    let mut page = String::with_capacity(8 * 1024);
    page.push_str(DOC_HEAD);
    for layer in composition.layers.iter() {
        page.push_str(&layer_markup(layer));
        page.push('\n');
    }
    page.push_str("<script>\nconst c=document.getElementById('c'),gl=c.getContext('webgl2'),P=");
    page.push_str(&params_json);
    page.push_str(",VS=`");
    page.push_str(WEB_VERTEX_SHADER);
    page.push_str("`,FS=`");
    page.push_str(WEB_FRAGMENT_SHADER);
    page.push_str("`;\n");
    page.push_str(RUNTIME_SCRIPT);
    page.push_str("</script></body></html>\n");
    Ok(page)
}

/// Builds the artifact and writes it to `path`, returning the path written.
pub fn write_artifact(composition: &Composition, path: &Path) -> Result<PathBuf> {
    let page = build_artifact(composition)?;
    fs::write(path, page)
        .with_context(|| format!("failed to write export artifact to {}", path.display()))?;
    Ok(path.to_path_buf())
}

/// One positioned overlay element with its full inline style.
fn layer_markup(layer: &Layer) -> String {
    let mut style = format!(
        "left:{x}px;top:{y}px;font-size:{size}px;opacity:{opacity};transform:translate(-50%,-50%) rotate({rotation}deg);font-family:'{font}';letter-spacing:{spacing}px;mix-blend-mode:{blend};color:{color};font-weight:{weight};font-style:{font_style}",
        x = layer.x,
        y = layer.y,
        size = layer.size,
        opacity = layer.opacity,
        rotation = layer.rotation,
        font = layer.font,
        spacing = layer.letter_spacing,
        blend = layer.blend_mode,
        color = layer.color,
        weight = layer.weight,
        font_style = if layer.italic { "italic" } else { "normal" },
    );

    let text = escape_html(&layer.text);
    match &layer.button {
        Some(button) => {
            style.push_str(&format!(
                ";background:{bg};padding:{py}px {px}px;border-radius:{radius}px;border:{bw}px solid {bc}",
                bg = button.background_color,
                py = button.padding_y,
                px = button.padding_x,
                radius = button.border_radius,
                bw = button.border_width,
                bc = button.border_color,
            ));
            format!("<button class=\"l\" style=\"{style}\">{text}</button>")
        }
        None => format!("<div class=\"l\" style=\"{style}\">{text}</div>"),
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use composition::ShaderParameters;

    #[test]
    fn snapshot_round_trips_through_the_artifact() {
        let mut composition = Composition::default();
        composition.update_params(|params| {
            params.zoom = 3.3;
            params.iterations = 160.0;
            params.colors[1] = "#123456".to_string();
        });

        let page = build_artifact(&composition).unwrap();
        let start = page.find("P=").expect("baked snapshot present") + 2;
        let end = page[start..].find(",VS=").expect("snapshot terminator") + start;
        let parsed: ShaderParameters = serde_json::from_str(&page[start..end]).unwrap();
        assert_eq!(parsed, composition.params);
    }

    #[test]
    fn artifact_embeds_shaders_and_render_loop() {
        let page = build_artifact(&Composition::default()).unwrap();
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("getContext('webgl2')"));
        assert!(page.contains("#version 300 es"));
        assert!(page.contains("u_hueRotation"));
        assert!(page.contains("drawArrays(gl.TRIANGLES,0,6)"));
        assert!(page.contains("requestAnimationFrame(L)"));
    }

    #[test]
    fn layers_become_positioned_markup() {
        let composition = Composition::default();
        let page = build_artifact(&composition).unwrap();
        assert!(page.contains("<div class=\"l\""));
        assert!(page.contains("G L I T C H"));
        assert!(page.contains("<button class=\"l\""));
        assert!(page.contains("EXPLORE THE VOID"));
        assert!(page.contains("background:#CCFF00"));
        assert!(page.contains("padding:20px 44px"));
        assert!(page.contains("transform:translate(-50%,-50%) rotate(0deg)"));
    }

    #[test]
    fn layer_text_is_escaped() {
        let mut composition = Composition::default();
        let id = composition.layers.selected().id.clone();
        composition
            .layers
            .update(&id, |layer| layer.text = "<b>&\"hi\"</b>".to_string())
            .unwrap();
        let page = build_artifact(&composition).unwrap();
        assert!(page.contains("&lt;b&gt;&amp;&quot;hi&quot;&lt;/b&gt;"));
        assert!(!page.contains("<b>&\"hi\"</b>"));
    }

    #[test]
    fn write_artifact_creates_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_EXPORT_FILENAME);
        let written = write_artifact(&Composition::default(), &path).unwrap();
        assert_eq!(written, path);
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.ends_with("</body></html>\n"));
    }
}

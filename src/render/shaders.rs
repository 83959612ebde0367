/// Vertex shader for the foliage point cloud
///
/// Mirrors `particles::foliage::displace`: blend by the shared progress, sway
/// above 0.8, drift below 0.2, twinkle regardless.
pub const FOLIAGE_VERTEX_SHADER: &str = r#"#version 300 es
precision highp float;

layout(location = 0) in vec3 a_chaos;
layout(location = 1) in vec3 a_target;
layout(location = 2) in vec3 a_color;
layout(location = 3) in float a_random;

uniform mat4 u_view;
uniform mat4 u_projection;
uniform float u_time;
uniform float u_progress;
uniform float u_pixel_ratio;
uniform float u_size;

out vec3 v_color;
out float v_alpha;

void main() {
    v_color = a_color;

    vec3 pos = mix(a_chaos, a_target, u_progress);

    // Wind once mostly formed
    if (u_progress > 0.8) {
        float wind = sin(u_time * 2.0 + pos.y * 0.5) * 0.1 * u_progress;
        pos.x += wind;
        pos.z += wind * 0.5;
    }

    // Floating dust while scattered
    if (u_progress < 0.2) {
        pos.y += sin(u_time + a_random * 10.0) * 0.05;
    }

    vec4 view_pos = u_view * vec4(pos, 1.0);
    gl_Position = u_projection * view_pos;
    gl_PointSize = u_size * u_pixel_ratio * (1.0 + a_random) * (1.0 / -view_pos.z);

    v_alpha = 0.6 + 0.4 * sin(u_time * 3.0 + a_random * 10.0);
}
"#;

/// Fragment shader for the foliage point cloud
pub const FOLIAGE_FRAGMENT_SHADER: &str = r#"#version 300 es
precision highp float;

in vec3 v_color;
in float v_alpha;

out vec4 fragColor;

void main() {
    // Circular particle with a soft edge
    vec2 xy = gl_PointCoord - vec2(0.5);
    float ll = length(xy);
    if (ll > 0.5) {
        discard;
    }

    float strength = 1.0 - smoothstep(0.3, 0.5, ll);
    fragColor = vec4(v_color, v_alpha * strength);
}
"#;

/// Vertex shader for instanced ornaments
pub const ORNAMENT_VERTEX_SHADER: &str = r#"#version 300 es
precision highp float;

layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_normal;
layout(location = 2) in mat4 a_model;
layout(location = 6) in vec3 a_color;

uniform mat4 u_view;
uniform mat4 u_projection;

out vec3 v_world_position;
out vec3 v_normal;
out vec3 v_color;

void main() {
    vec4 world_pos = a_model * vec4(a_position, 1.0);
    v_world_position = world_pos.xyz;
    v_normal = mat3(a_model) * a_normal;
    v_color = a_color;
    gl_Position = u_projection * u_view * world_pos;
}
"#;

/// Fragment shader for instanced ornaments: glossy metal, or emissive for lights
pub const ORNAMENT_FRAGMENT_SHADER: &str = r#"#version 300 es
precision highp float;

in vec3 v_world_position;
in vec3 v_normal;
in vec3 v_color;

uniform vec3 u_camera_pos;
uniform vec3 u_ambient_color;
uniform float u_ambient_intensity;
uniform vec3 u_light_positions[3];
uniform vec3 u_light_radiance[3];
uniform float u_metalness;
uniform float u_roughness;
uniform float u_emissive;

out vec4 fragColor;

void main() {
    if (u_emissive > 0.0) {
        // Lights skip shading so bloom picks them up
        fragColor = vec4(v_color * u_emissive, 1.0);
        return;
    }

    vec3 normal = normalize(v_normal);
    vec3 view_dir = normalize(u_camera_pos - v_world_position);
    vec3 specular_color = mix(vec3(0.04), v_color, u_metalness);
    float shininess = mix(256.0, 8.0, u_roughness);

    vec3 color = v_color * u_ambient_color * u_ambient_intensity;

    for (int i = 0; i < 3; i++) {
        vec3 to_light = u_light_positions[i] - v_world_position;
        float dist2 = max(dot(to_light, to_light), 0.0001);
        vec3 light_dir = to_light * inversesqrt(dist2);
        vec3 radiance = u_light_radiance[i] / dist2;

        float ndotl = max(dot(normal, light_dir), 0.0);
        vec3 half_dir = normalize(light_dir + view_dir);
        float spec = pow(max(dot(normal, half_dir), 0.0), shininess);

        color += (v_color * (1.0 - u_metalness) * ndotl + specular_color * spec) * radiance;
    }

    // Cheap environment fill so metal never goes fully black
    float rim = pow(1.0 - max(dot(normal, view_dir), 0.0), 3.0);
    color += specular_color * rim * 0.35;

    fragColor = vec4(color, 1.0);
}
"#;

/// Fullscreen quad vertex shader for post-processing
pub const FULLSCREEN_VERTEX_SHADER: &str = r#"#version 300 es
precision highp float;

out vec2 v_uv;

void main() {
    // Fullscreen triangle
    float x = float((gl_VertexID & 1) << 2);
    float y = float((gl_VertexID & 2) << 1);
    v_uv = vec2(x * 0.5, y * 0.5);
    gl_Position = vec4(x - 1.0, y - 1.0, 0.0, 1.0);
}
"#;

/// Bloom extraction shader
pub const BLOOM_EXTRACT_SHADER: &str = r#"#version 300 es
precision highp float;

in vec2 v_uv;

uniform sampler2D u_texture;
uniform float u_threshold;

out vec4 fragColor;

void main() {
    vec3 color = texture(u_texture, v_uv).rgb;
    float brightness = dot(color, vec3(0.2126, 0.7152, 0.0722));

    if (brightness > u_threshold) {
        fragColor = vec4(color * (brightness - u_threshold), 1.0);
    } else {
        fragColor = vec4(0.0, 0.0, 0.0, 1.0);
    }
}
"#;

/// Gaussian blur shader
pub const BLUR_SHADER: &str = r#"#version 300 es
precision highp float;

in vec2 v_uv;

uniform sampler2D u_texture;
uniform vec2 u_direction;

out vec4 fragColor;

void main() {
    vec2 texel = 1.0 / vec2(textureSize(u_texture, 0));

    // 9-tap Gaussian blur
    float weights[5] = float[](0.227027, 0.1945946, 0.1216216, 0.054054, 0.016216);

    vec3 result = texture(u_texture, v_uv).rgb * weights[0];

    for (int i = 1; i < 5; i++) {
        vec2 offset = u_direction * texel * float(i) * 2.0;
        result += texture(u_texture, v_uv + offset).rgb * weights[i];
        result += texture(u_texture, v_uv - offset).rgb * weights[i];
    }

    fragColor = vec4(result, 1.0);
}
"#;

/// Final composite: bloom, vignette, Reinhard tone mapping
pub const COMPOSITE_SHADER: &str = r#"#version 300 es
precision highp float;

in vec2 v_uv;

uniform sampler2D u_scene;
uniform sampler2D u_bloom;
uniform float u_bloom_strength;
uniform float u_vignette_offset;
uniform float u_vignette_darkness;
uniform float u_exposure;

out vec4 fragColor;

void main() {
    vec3 scene = texture(u_scene, v_uv).rgb;
    vec3 bloom = texture(u_bloom, v_uv).rgb;

    vec3 color = scene + bloom * u_bloom_strength;

    vec2 coord = (v_uv - vec2(0.5)) * vec2(u_vignette_offset);
    color = mix(color, vec3(1.0 - u_vignette_darkness), dot(coord, coord));

    color *= u_exposure;
    color = color / (color + vec3(1.0));
    color = pow(max(color, vec3(0.0)), vec3(1.0 / 2.2));

    fragColor = vec4(color, 1.0);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particles::foliage::{DRIFT_THRESHOLD, WIND_THRESHOLD};

    #[test]
    fn test_shader_version() {
        for src in [
            FOLIAGE_VERTEX_SHADER,
            FOLIAGE_FRAGMENT_SHADER,
            ORNAMENT_VERTEX_SHADER,
            ORNAMENT_FRAGMENT_SHADER,
            FULLSCREEN_VERTEX_SHADER,
            BLOOM_EXTRACT_SHADER,
            BLUR_SHADER,
            COMPOSITE_SHADER,
        ] {
            assert!(src.starts_with("#version 300 es"));
        }
    }

    #[test]
    fn test_foliage_thresholds_match_cpu_law() {
        assert!(FOLIAGE_VERTEX_SHADER.contains(&format!("u_progress > {:.1}", WIND_THRESHOLD)));
        assert!(FOLIAGE_VERTEX_SHADER.contains(&format!("u_progress < {:.1}", DRIFT_THRESHOLD)));
    }

    #[test]
    fn test_ornament_attribute_slots() {
        // mat4 occupies four consecutive locations starting at 2
        assert!(ORNAMENT_VERTEX_SHADER.contains("layout(location = 2) in mat4 a_model"));
        assert!(ORNAMENT_VERTEX_SHADER.contains("layout(location = 6) in vec3 a_color"));
    }
}

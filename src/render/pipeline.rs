use web_sys::{
    WebGl2RenderingContext as Gl, WebGlBuffer, WebGlProgram, WebGlUniformLocation,
    WebGlVertexArrayObject,
};
use crate::config::{OrnamentShape, PostConfig};
use crate::mesh::Mesh;
use crate::particles::foliage::ATTRIBUTE_STRIDE;
use crate::particles::ornaments::{COLOR_STRIDE, TRANSFORM_STRIDE};
use crate::particles::{InstanceGroup, ParticleField};
use crate::scene::SceneComposer;
use super::webgl::{PassState, RenderTarget, WebGLContext};
use super::shaders::*;

/// Emissive multiplier for light bulbs
const LIGHT_EMISSIVE: f32 = 2.0;
/// Tone mapping exposure for the final composite
const EXPOSURE: f32 = 1.5;
/// Near-black green clear color
const BACKGROUND: [f32; 3] = [0.0, 0.012, 0.008];

/// Surface parameters for one ornament layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub metalness: f32,
    pub roughness: f32,
    /// Zero for lit surfaces, otherwise the emissive multiplier
    pub emissive: f32,
}

impl Material {
    pub fn for_shape(shape: OrnamentShape) -> Self {
        match shape {
            OrnamentShape::Sphere | OrnamentShape::Box => Self {
                metalness: 0.9,
                roughness: 0.1,
                emissive: 0.0,
            },
            OrnamentShape::Light => Self {
                metalness: 0.0,
                roughness: 1.0,
                emissive: LIGHT_EMISSIVE,
            },
        }
    }
}

/// Geometry shared by every instance of a shape
pub fn shape_mesh(shape: OrnamentShape) -> Mesh {
    match shape {
        OrnamentShape::Sphere | OrnamentShape::Light => Mesh::sphere(16, 16),
        OrnamentShape::Box => Mesh::cube(),
    }
}

/// Bloom runs at half resolution, never below one pixel
fn bloom_size(width: i32, height: i32) -> (i32, i32) {
    ((width / 2).max(1), (height / 2).max(1))
}

/// Cached uniform locations for the foliage shader
struct FoliageUniforms {
    view: Option<WebGlUniformLocation>,
    projection: Option<WebGlUniformLocation>,
    time: Option<WebGlUniformLocation>,
    progress: Option<WebGlUniformLocation>,
    pixel_ratio: Option<WebGlUniformLocation>,
    size: Option<WebGlUniformLocation>,
}

/// Cached uniform locations for the ornament shader
struct OrnamentUniforms {
    view: Option<WebGlUniformLocation>,
    projection: Option<WebGlUniformLocation>,
    camera_pos: Option<WebGlUniformLocation>,
    ambient_color: Option<WebGlUniformLocation>,
    ambient_intensity: Option<WebGlUniformLocation>,
    light_positions: Option<WebGlUniformLocation>,
    light_radiance: Option<WebGlUniformLocation>,
    metalness: Option<WebGlUniformLocation>,
    roughness: Option<WebGlUniformLocation>,
    emissive: Option<WebGlUniformLocation>,
}

/// Cached uniform locations for post-processing
struct PostUniforms {
    extract_texture: Option<WebGlUniformLocation>,
    threshold: Option<WebGlUniformLocation>,
    blur_texture: Option<WebGlUniformLocation>,
    direction: Option<WebGlUniformLocation>,
    scene: Option<WebGlUniformLocation>,
    bloom: Option<WebGlUniformLocation>,
    bloom_strength: Option<WebGlUniformLocation>,
    vignette_offset: Option<WebGlUniformLocation>,
    vignette_darkness: Option<WebGlUniformLocation>,
    exposure: Option<WebGlUniformLocation>,
}

/// Static foliage attributes on the GPU
struct FoliageBatch {
    vao: WebGlVertexArrayObject,
    _buffer: WebGlBuffer,
    count: i32,
}

/// GPU state for one ornament layer
struct OrnamentBatch {
    vao: WebGlVertexArrayObject,
    // Held so the buffers live as long as the VAO that references them
    _vertex_buffer: WebGlBuffer,
    _index_buffer: WebGlBuffer,
    _color_buffer: WebGlBuffer,
    transform_buffer: WebGlBuffer,
    index_count: i32,
    instance_count: i32,
    material: Material,
}

/// Render pipeline for the foliage cloud and the ornament layers
pub struct RenderPipeline {
    ctx: WebGLContext,

    // Shaders
    foliage_program: WebGlProgram,
    ornament_program: WebGlProgram,
    bloom_extract_program: WebGlProgram,
    blur_program: WebGlProgram,
    composite_program: WebGlProgram,

    // Uniform locations
    foliage_uniforms: FoliageUniforms,
    ornament_uniforms: OrnamentUniforms,
    post_uniforms: PostUniforms,

    foliage: Option<FoliageBatch>,
    ornament_batches: Vec<OrnamentBatch>,

    // Full-size scene target plus half-size bloom ping-pong pair
    scene_target: RenderTarget,
    bloom_targets: [RenderTarget; 2],

    // Dimensions
    width: i32,
    height: i32,
    pixel_ratio: f32,
}

impl RenderPipeline {
    pub fn new(gl: Gl, width: i32, height: i32) -> Result<Self, String> {
        let ctx = WebGLContext::new(gl);
        let (width, height) = (width.max(1), height.max(1));

        // Compile shaders
        let foliage_program = ctx.program(FOLIAGE_VERTEX_SHADER, FOLIAGE_FRAGMENT_SHADER)?;
        let ornament_program = ctx.program(ORNAMENT_VERTEX_SHADER, ORNAMENT_FRAGMENT_SHADER)?;
        let bloom_extract_program = ctx.program(FULLSCREEN_VERTEX_SHADER, BLOOM_EXTRACT_SHADER)?;
        let blur_program = ctx.program(FULLSCREEN_VERTEX_SHADER, BLUR_SHADER)?;
        let composite_program = ctx.program(FULLSCREEN_VERTEX_SHADER, COMPOSITE_SHADER)?;

        // Get uniform locations
        let foliage_uniforms = FoliageUniforms {
            view: ctx.uniform(&foliage_program, "u_view"),
            projection: ctx.uniform(&foliage_program, "u_projection"),
            time: ctx.uniform(&foliage_program, "u_time"),
            progress: ctx.uniform(&foliage_program, "u_progress"),
            pixel_ratio: ctx.uniform(&foliage_program, "u_pixel_ratio"),
            size: ctx.uniform(&foliage_program, "u_size"),
        };

        let ornament_uniforms = OrnamentUniforms {
            view: ctx.uniform(&ornament_program, "u_view"),
            projection: ctx.uniform(&ornament_program, "u_projection"),
            camera_pos: ctx.uniform(&ornament_program, "u_camera_pos"),
            ambient_color: ctx.uniform(&ornament_program, "u_ambient_color"),
            ambient_intensity: ctx.uniform(&ornament_program, "u_ambient_intensity"),
            light_positions: ctx.uniform(&ornament_program, "u_light_positions"),
            light_radiance: ctx.uniform(&ornament_program, "u_light_radiance"),
            metalness: ctx.uniform(&ornament_program, "u_metalness"),
            roughness: ctx.uniform(&ornament_program, "u_roughness"),
            emissive: ctx.uniform(&ornament_program, "u_emissive"),
        };

        let post_uniforms = PostUniforms {
            extract_texture: ctx.uniform(&bloom_extract_program, "u_texture"),
            threshold: ctx.uniform(&bloom_extract_program, "u_threshold"),
            blur_texture: ctx.uniform(&blur_program, "u_texture"),
            direction: ctx.uniform(&blur_program, "u_direction"),
            scene: ctx.uniform(&composite_program, "u_scene"),
            bloom: ctx.uniform(&composite_program, "u_bloom"),
            bloom_strength: ctx.uniform(&composite_program, "u_bloom_strength"),
            vignette_offset: ctx.uniform(&composite_program, "u_vignette_offset"),
            vignette_darkness: ctx.uniform(&composite_program, "u_vignette_darkness"),
            exposure: ctx.uniform(&composite_program, "u_exposure"),
        };

        let (scene_target, bloom_targets) = Self::create_targets(&ctx, width, height)?;

        Ok(Self {
            ctx,
            foliage_program,
            ornament_program,
            bloom_extract_program,
            blur_program,
            composite_program,
            foliage_uniforms,
            ornament_uniforms,
            post_uniforms,
            foliage: None,
            ornament_batches: Vec::new(),
            scene_target,
            bloom_targets,
            width,
            height,
            pixel_ratio: 1.0,
        })
    }

    fn create_targets(
        ctx: &WebGLContext,
        width: i32,
        height: i32,
    ) -> Result<(RenderTarget, [RenderTarget; 2]), String> {
        let scene = ctx.render_target(width, height, true)?;
        let (bloom_w, bloom_h) = bloom_size(width, height);
        let bloom = [
            ctx.render_target(bloom_w, bloom_h, false)?,
            ctx.render_target(bloom_w, bloom_h, false)?,
        ];
        Ok((scene, bloom))
    }

    /// Device pixel ratio used to scale point sprites
    pub fn set_pixel_ratio(&mut self, ratio: f32) {
        self.pixel_ratio = ratio;
    }

    /// Upload the static foliage attributes
    /// Format: chaos(3) + target(3) + color(3) + random(1) per particle
    pub fn upload_foliage(&mut self, field: &ParticleField) -> Result<(), String> {
        let vao = self.ctx.vertex_array()?;
        let buffer = self.ctx.array_buffer(&field.attribute_data(), Gl::STATIC_DRAW)?;

        let stride = ATTRIBUTE_STRIDE as i32;
        self.ctx.float_attribute(0, 3, stride, 0, 0);
        self.ctx.float_attribute(1, 3, stride, 3, 0);
        self.ctx.float_attribute(2, 3, stride, 6, 0);
        self.ctx.float_attribute(3, 1, stride, 9, 0);

        self.ctx.gl.bind_vertex_array(None);
        self.ctx.gl.bind_buffer(Gl::ARRAY_BUFFER, None);

        self.foliage = Some(FoliageBatch {
            vao,
            _buffer: buffer,
            count: field.count() as i32,
        });
        Ok(())
    }

    /// Build one instanced batch per ornament layer
    pub fn upload_ornaments(&mut self, groups: &[InstanceGroup]) -> Result<(), String> {
        let batches = groups
            .iter()
            .map(|group| self.create_batch(group))
            .collect::<Result<Vec<_>, _>>()?;
        self.ornament_batches = batches;
        Ok(())
    }

    fn create_batch(&self, group: &InstanceGroup) -> Result<OrnamentBatch, String> {
        let mesh = shape_mesh(group.shape());
        let vao = self.ctx.vertex_array()?;

        // Per-vertex: position(3) + normal(3)
        let vertex_buffer = self.ctx.array_buffer(&mesh.vertex_data(), Gl::STATIC_DRAW)?;
        self.ctx.float_attribute(0, 3, 6, 0, 0);
        self.ctx.float_attribute(1, 3, 6, 3, 0);

        // Per-instance model matrix, one vec4 column per location
        let transform_buffer = self.ctx.array_buffer(&group.transform_data(), Gl::DYNAMIC_DRAW)?;
        for column in 0..4u32 {
            self.ctx.float_attribute(2 + column, 4, TRANSFORM_STRIDE as i32, column as i32 * 4, 1);
        }

        // Per-instance color
        let color_buffer = self.ctx.array_buffer(&group.color_data(), Gl::STATIC_DRAW)?;
        self.ctx.float_attribute(6, 3, COLOR_STRIDE as i32, 0, 1);

        let index_buffer = self.ctx.element_buffer(mesh.index_data())?;

        self.ctx.gl.bind_vertex_array(None);
        self.ctx.gl.bind_buffer(Gl::ARRAY_BUFFER, None);

        Ok(OrnamentBatch {
            vao,
            _vertex_buffer: vertex_buffer,
            _index_buffer: index_buffer,
            _color_buffer: color_buffer,
            transform_buffer,
            index_count: mesh.index_data().len() as i32,
            instance_count: group.count() as i32,
            material: Material::for_shape(group.shape()),
        })
    }

    /// Push this frame's instance transforms
    pub fn update_ornaments(&self, groups: &[InstanceGroup]) {
        for (batch, group) in self.ornament_batches.iter().zip(groups) {
            self.ctx.write_array_buffer(&batch.transform_buffer, &group.transform_data());
        }
    }

    /// Render a frame
    pub fn render(&self, scene: &SceneComposer) {
        let gl = &self.ctx.gl;
        let camera = scene.camera();
        let lighting = scene.lighting();
        let field = scene.foliage();

        let aspect = self.width as f32 / self.height as f32;
        let projection = camera.projection_matrix(aspect);
        let view = camera.view_matrix();

        // === Pass 1: Scene into the offscreen target ===
        self.ctx.bind_target(Some(&self.scene_target), self.canvas_size());
        self.ctx.clear(BACKGROUND);

        // Solid ornaments first so the additive foliage is depth tested against them
        if !self.ornament_batches.is_empty() {
            self.ctx.set_pass(PassState::Opaque);
            gl.use_program(Some(&self.ornament_program));
            let u = &self.ornament_uniforms;

            self.ctx.set_mat4(&u.view, view.as_slice());
            self.ctx.set_mat4(&u.projection, projection.as_slice());
            self.ctx.set_vec3(&u.camera_pos, &camera.position.to_array());
            self.ctx.set_vec3(&u.ambient_color, &lighting.ambient_color.to_array());
            self.ctx.set_f32(&u.ambient_intensity, lighting.ambient_intensity);
            self.ctx.set_vec3(&u.light_positions, &lighting.position_data());
            self.ctx.set_vec3(&u.light_radiance, &lighting.radiance_data());

            for batch in self.ornament_batches.iter().filter(|b| b.instance_count > 0) {
                self.ctx.set_f32(&u.metalness, batch.material.metalness);
                self.ctx.set_f32(&u.roughness, batch.material.roughness);
                self.ctx.set_f32(&u.emissive, batch.material.emissive);

                gl.bind_vertex_array(Some(&batch.vao));
                gl.draw_elements_instanced_with_i32(
                    Gl::TRIANGLES,
                    batch.index_count,
                    Gl::UNSIGNED_INT,
                    0,
                    batch.instance_count,
                );
            }
        }

        // Foliage points
        if let Some(foliage) = self.foliage.as_ref().filter(|f| f.count > 0) {
            self.ctx.set_pass(PassState::Additive);
            gl.use_program(Some(&self.foliage_program));
            let u = &self.foliage_uniforms;

            self.ctx.set_mat4(&u.view, view.as_slice());
            self.ctx.set_mat4(&u.projection, projection.as_slice());
            self.ctx.set_f32(&u.time, field.time());
            self.ctx.set_f32(&u.progress, field.progress());
            self.ctx.set_f32(&u.pixel_ratio, self.pixel_ratio);
            self.ctx.set_f32(&u.size, field.point_size());

            gl.bind_vertex_array(Some(&foliage.vao));
            gl.draw_arrays(Gl::POINTS, 0, foliage.count);
        }

        gl.bind_vertex_array(None);
        self.post_process(&scene.config().post);
    }

    fn post_process(&self, post: &PostConfig) {
        let gl = &self.ctx.gl;
        let u = &self.post_uniforms;
        let [bloom_a, bloom_b] = &self.bloom_targets;
        self.ctx.set_pass(PassState::Fullscreen);

        // === Pass 2: Bright parts into bloom A ===
        self.ctx.bind_target(Some(bloom_a), self.canvas_size());
        gl.use_program(Some(&self.bloom_extract_program));
        self.ctx.set_sampler(&u.extract_texture, 0, &self.scene_target.texture);
        self.ctx.set_f32(&u.threshold, post.bloom_threshold);
        self.ctx.draw_fullscreen();

        // === Passes 3-4: Separable blur A -> B -> A ===
        gl.use_program(Some(&self.blur_program));
        for (source, dest, direction) in [(bloom_a, bloom_b, [1.0, 0.0]), (bloom_b, bloom_a, [0.0, 1.0])] {
            self.ctx.bind_target(Some(dest), self.canvas_size());
            self.ctx.set_sampler(&u.blur_texture, 0, &source.texture);
            self.ctx.set_vec2(&u.direction, direction);
            self.ctx.draw_fullscreen();
        }

        // === Pass 5: Composite to the canvas ===
        self.ctx.bind_target(None, self.canvas_size());
        gl.use_program(Some(&self.composite_program));
        self.ctx.set_sampler(&u.scene, 0, &self.scene_target.texture);
        self.ctx.set_sampler(&u.bloom, 1, &bloom_a.texture);
        self.ctx.set_f32(&u.bloom_strength, post.bloom_strength);
        self.ctx.set_f32(&u.vignette_offset, post.vignette_offset);
        self.ctx.set_f32(&u.vignette_darkness, post.vignette_darkness);
        self.ctx.set_f32(&u.exposure, EXPOSURE);
        self.ctx.draw_fullscreen();
    }

    fn canvas_size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    /// Resize the render pipeline
    pub fn resize(&mut self, width: i32, height: i32) -> Result<(), String> {
        let (width, height) = (width.max(1), height.max(1));
        let (scene, bloom) = Self::create_targets(&self.ctx, width, height)?;
        self.scene_target = scene;
        self.bloom_targets = bloom;
        self.width = width;
        self.height = height;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lights_are_emissive() {
        assert!(Material::for_shape(OrnamentShape::Light).emissive > 0.0);
        let ball = Material::for_shape(OrnamentShape::Sphere);
        assert_eq!(ball.emissive, 0.0);
        assert_eq!((ball.metalness, ball.roughness), (0.9, 0.1));
    }

    #[test]
    fn test_shape_meshes() {
        assert_eq!(shape_mesh(OrnamentShape::Box).triangle_count(), 12);
        assert_eq!(shape_mesh(OrnamentShape::Light).vertex_count(), 17 * 17);
    }

    #[test]
    fn test_bloom_size_halves_and_clamps() {
        assert_eq!(bloom_size(1280, 720), (640, 360));
        assert_eq!(bloom_size(1, 3), (1, 1));
    }
}

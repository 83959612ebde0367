use wasm_bindgen::prelude::*;
use web_sys::{WebGl2RenderingContext, HtmlCanvasElement};

pub mod animation;
pub mod config;
pub mod math;
pub mod mesh;
pub mod particles;
pub mod render;
pub mod scene;

use animation::{Mode, ModeController};
use config::SceneConfig;
use render::RenderPipeline;
use scene::SceneComposer;

/// Initialize panic hook and console logging
///
/// No tracing subscriber is installed, so `tracing` events fall through to
/// the `log` facade and land in the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    #[cfg(all(feature = "console_log", target_arch = "wasm32"))]
    if console_log::init_with_level(console_level()).is_ok() {
        log::info!("morphing-tree starting");
    }
}

/// Verbose in debug builds, mode changes and warnings only in release
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
fn console_level() -> log::Level {
    if cfg!(debug_assertions) {
        log::Level::Debug
    } else {
        log::Level::Info
    }
}

/// Main engine state exposed to JavaScript
///
/// The host owns the mode: UI buttons call `toggle` or `set_formed`, and the
/// animation loop calls `render` with the frame delta in seconds.
#[wasm_bindgen]
pub struct MorphingTree {
    pipeline: RenderPipeline,
    scene: SceneComposer,
    controller: ModeController,
}

#[wasm_bindgen]
impl MorphingTree {
    /// Create an engine with the default scene
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, seed: Option<u32>) -> Result<MorphingTree, JsValue> {
        Self::build(canvas, SceneConfig::default(), seed)
    }

    /// Create an engine from a YAML scene description
    #[wasm_bindgen]
    pub fn with_config(canvas: HtmlCanvasElement, yaml: &str, seed: Option<u32>) -> Result<MorphingTree, JsValue> {
        let config = SceneConfig::from_yaml(yaml)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Self::build(canvas, config, seed)
    }

    fn build(canvas: HtmlCanvasElement, config: SceneConfig, seed: Option<u32>) -> Result<MorphingTree, JsValue> {
        let width = canvas.width() as i32;
        let height = canvas.height() as i32;

        let gl = canvas
            .get_context("webgl2")?
            .ok_or("Failed to get WebGL2 context")?
            .dyn_into::<WebGl2RenderingContext>()?;

        let mut pipeline = RenderPipeline::new(gl, width, height)
            .map_err(|e| JsValue::from_str(&e))?;
        pipeline.set_pixel_ratio(device_pixel_ratio());

        let seed = seed.map(u64::from).unwrap_or_else(|| seed_from_unit(js_sys::Math::random()));
        let scene = SceneComposer::new(config, seed)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        let mut engine = Self {
            pipeline,
            scene,
            controller: ModeController::default(),
        };
        engine.upload_scene()?;
        Ok(engine)
    }

    fn upload_scene(&mut self) -> Result<(), JsValue> {
        self.pipeline.upload_foliage(self.scene.foliage())
            .map_err(|e| JsValue::from_str(&e))?;
        self.pipeline.upload_ornaments(self.scene.ornaments())
            .map_err(|e| JsValue::from_str(&e))
    }

    /// Advance every layer by `dt` seconds and draw the frame
    #[wasm_bindgen]
    pub fn render(&mut self, dt: f32) {
        self.scene.advance(self.controller.mode(), dt);
        self.pipeline.update_ornaments(self.scene.ornaments());
        self.pipeline.render(&self.scene);
    }

    /// Flip between CHAOS and FORMED, returning the new mode name
    #[wasm_bindgen]
    pub fn toggle(&mut self) -> String {
        self.controller.toggle().as_str().to_string()
    }

    #[wasm_bindgen]
    pub fn set_formed(&mut self, formed: bool) {
        let mode = if formed { Mode::Formed } else { Mode::Chaos };
        self.controller.set(mode);
    }

    #[wasm_bindgen]
    pub fn is_formed(&self) -> bool {
        self.controller.mode().is_formed()
    }

    /// "CHAOS" or "FORMED"
    #[wasm_bindgen]
    pub fn mode(&self) -> String {
        self.controller.mode().as_str().to_string()
    }

    /// Shared foliage progress in [0, 1]
    #[wasm_bindgen]
    pub fn foliage_progress(&self) -> f32 {
        self.scene.foliage().progress()
    }

    /// Mean formation of an ornament layer ("balls", "gifts", "lights")
    #[wasm_bindgen]
    pub fn group_formation(&self, name: &str) -> Option<f32> {
        self.scene.ornament(name).map(|group| group.formation())
    }

    /// Replace the scene description; every layer is regenerated
    #[wasm_bindgen]
    pub fn reconfigure(&mut self, yaml: &str) -> Result<(), JsValue> {
        let config = SceneConfig::from_yaml(yaml)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.scene.reconfigure(config)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.upload_scene()
    }

    /// Current scene description as YAML
    #[wasm_bindgen]
    pub fn config_yaml(&self) -> Result<String, JsValue> {
        self.scene.config().to_yaml()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Resize the canvas
    #[wasm_bindgen]
    pub fn resize(&mut self, width: i32, height: i32) -> Result<(), JsValue> {
        self.pipeline.set_pixel_ratio(device_pixel_ratio());
        self.pipeline.resize(width, height)
            .map_err(|e| JsValue::from_str(&e))
    }

    /// Orbit camera
    #[wasm_bindgen]
    pub fn orbit(&mut self, delta_x: f32, delta_y: f32) {
        self.scene.camera_mut().orbit(delta_x, delta_y);
    }

    /// Zoom camera
    #[wasm_bindgen]
    pub fn zoom(&mut self, delta: f32) {
        self.scene.camera_mut().zoom(delta);
    }
}

/// Browser pixel ratio, capped at 2
fn device_pixel_ratio() -> f32 {
    web_sys::window()
        .map(|w| w.device_pixel_ratio() as f32)
        .unwrap_or(1.0)
        .clamp(1.0, 2.0)
}

/// Map a uniform sample in [0, 1) onto the u32 seed range
fn seed_from_unit(r: f64) -> u64 {
    (r.clamp(0.0, 1.0) * u32::MAX as f64) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_level_keeps_mode_changes() {
        // Mode changes are logged at info and must always reach the console
        assert!(console_level() >= log::Level::Info);
    }

    #[test]
    fn test_seed_from_unit() {
        assert_eq!(seed_from_unit(0.0), 0);
        assert_eq!(seed_from_unit(1.0), u32::MAX as u64);
        assert_eq!(seed_from_unit(-3.0), 0);
        assert!(seed_from_unit(0.5) > 0);
    }
}

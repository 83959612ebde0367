use crate::math::Vec3;

/// Positional light with inverse-square falloff
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Vec3,
    pub intensity: f32,
}

/// Static lighting for the ornaments
#[derive(Debug, Clone, PartialEq)]
pub struct LightingRig {
    pub ambient_color: Vec3,
    pub ambient_intensity: f32,
    /// Warm key, red fill, cool rim
    pub lights: [PointLight; 3],
}

fn rgb8(r: u8, g: u8, b: u8) -> Vec3 {
    Vec3::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
}

impl Default for LightingRig {
    fn default() -> Self {
        Self {
            ambient_color: rgb8(0x00, 0x10, 0x05),
            ambient_intensity: 0.3,
            lights: [
                PointLight {
                    position: Vec3::new(10.0, 20.0, 10.0),
                    color: rgb8(0xff, 0xec, 0xb3),
                    intensity: 500.0,
                },
                PointLight {
                    position: Vec3::new(-15.0, 10.0, -10.0),
                    color: rgb8(0xd9, 0x04, 0x29),
                    intensity: 400.0,
                },
                PointLight {
                    position: Vec3::new(0.0, -5.0, 15.0),
                    color: rgb8(0xe0, 0xf7, 0xfa),
                    intensity: 150.0,
                },
            ],
        }
    }
}

impl LightingRig {
    /// Flattened light positions, 9 floats
    pub fn position_data(&self) -> [f32; 9] {
        let mut data = [0.0; 9];
        for (i, light) in self.lights.iter().enumerate() {
            data[i * 3..i * 3 + 3].copy_from_slice(&light.position.to_array());
        }
        data
    }

    /// Flattened colors premultiplied by intensity, 9 floats
    pub fn radiance_data(&self) -> [f32; 9] {
        let mut data = [0.0; 9];
        for (i, light) in self.lights.iter().enumerate() {
            data[i * 3..i * 3 + 3].copy_from_slice(&light.color.scale(light.intensity).to_array());
        }
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rig() {
        let rig = LightingRig::default();
        assert_eq!(rig.lights[0].position, Vec3::new(10.0, 20.0, 10.0));
        assert!((rig.lights[1].color.x - 0xd9 as f32 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_radiance_is_premultiplied() {
        let rig = LightingRig::default();
        let data = rig.radiance_data();
        assert!((data[0] - 500.0).abs() < 1e-3);
        assert_eq!(&rig.position_data()[6..9], &[0.0, -5.0, 15.0]);
    }
}

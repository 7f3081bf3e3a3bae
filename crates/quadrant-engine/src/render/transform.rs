use glam::{Mat4, Vec3};

const FIELD_OF_VIEW_DEG: f32 = 45.0;
const Z_NEAR: f32 = 0.1;
const Z_FAR: f32 = 100.0;
const CAMERA_DISTANCE: f32 = 6.0;

/// Matrices uploaded to `uProjectionMatrix` and `uModelViewMatrix`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transforms {
    pub projection: Mat4,
    pub model_view: Mat4,
}

impl Transforms {
    /// 45° perspective looking at the square from 6 units away.
    pub fn perspective(aspect: f32) -> Self {
        let aspect = if aspect.is_finite() && aspect > 0.0 { aspect } else { 1.0 };
        Self {
            projection: Mat4::perspective_rh(FIELD_OF_VIEW_DEG.to_radians(), aspect, Z_NEAR, Z_FAR),
            model_view: Mat4::from_translation(Vec3::new(0.0, 0.0, -CAMERA_DISTANCE)),
        }
    }
}

impl Default for Transforms {
    fn default() -> Self {
        Self::perspective(1.0)
    }
}

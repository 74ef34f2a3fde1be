//! Value types for the scene vocabulary.

use glam::{Mat4, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::errors::ElementError;

/// An RGBA color. Every channel lies in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Whether a single channel value is inside `[0, 1]`.
    pub fn is_valid_channel(value: f32) -> bool {
        (0.0..=1.0).contains(&value)
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Rgba::BLACK
    }
}

impl From<Rgba> for Vec4 {
    fn from(c: Rgba) -> Self {
        Vec4::new(c.r, c.g, c.b, c.a)
    }
}

/// Contents of the `<scene>` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneInfo {
    /// Id of the node traversal starts from.
    pub root: String,
    /// Length of the reference axes drawn by the host.
    pub axis_length: f32,
}

/// A camera declared in `<views>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum View {
    Perspective {
        near: f32,
        far: f32,
        /// Vertical field of view in radians.
        fov: f32,
        from: Vec3,
        to: Vec3,
    },
    Orthographic {
        near: f32,
        far: f32,
        left: f32,
        right: f32,
        top: f32,
        bottom: f32,
    },
}

impl View {
    pub fn near(&self) -> f32 {
        match self {
            View::Perspective { near, .. } | View::Orthographic { near, .. } => *near,
        }
    }

    pub fn far(&self) -> f32 {
        match self {
            View::Perspective { far, .. } | View::Orthographic { far, .. } => *far,
        }
    }

    /// Check the clipping planes: `0 < near < far`.
    pub fn validate(&self) -> Result<(), ElementError> {
        let (near, far) = (self.near(), self.far());
        if near <= 0.0 {
            return Err(ElementError::new(format!("near plane must be positive, got {near}")));
        }
        if near >= far {
            return Err(ElementError::new(format!(
                "near plane ({near}) must be closer than far plane ({far})"
            )));
        }
        Ok(())
    }

    /// Projection matrix for the given aspect ratio.
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        match *self {
            View::Perspective { near, far, fov, .. } => Mat4::perspective_rh(fov, aspect, near, far),
            View::Orthographic {
                near,
                far,
                left,
                right,
                top,
                bottom,
            } => Mat4::orthographic_rh(left, right, bottom, top, near, far),
        }
    }

    /// View matrix. Orthographic views look down -Z from the origin.
    pub fn view_matrix(&self) -> Mat4 {
        match *self {
            View::Perspective { from, to, .. } => Mat4::look_at_rh(from, to, Vec3::Y),
            View::Orthographic { .. } => Mat4::IDENTITY,
        }
    }
}

/// Global lighting settings from `<illumination>`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Illumination {
    pub doublesided: bool,
    pub local: bool,
    pub ambient: Rgba,
    pub background: Rgba,
}

impl Default for Illumination {
    fn default() -> Self {
        Self {
            doublesided: false,
            local: true,
            ambient: Rgba::new(0.1, 0.1, 0.1, 1.0),
            background: Rgba::BLACK,
        }
    }
}

/// The three color terms every light carries.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LightColors {
    pub ambient: Rgba,
    pub diffuse: Rgba,
    pub specular: Rgba,
}

/// A light declared in `<lights>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Light {
    Omni {
        enabled: bool,
        location: Vec4,
        colors: LightColors,
    },
    Spot {
        enabled: bool,
        location: Vec4,
        target: Vec3,
        /// Cutoff angle in degrees.
        angle: f32,
        exponent: f32,
        colors: LightColors,
    },
}

impl Light {
    pub fn enabled(&self) -> bool {
        match self {
            Light::Omni { enabled, .. } | Light::Spot { enabled, .. } => *enabled,
        }
    }

    /// Toggle the light; the host exposes this as a UI switch.
    pub fn set_enabled(&mut self, value: bool) {
        match self {
            Light::Omni { enabled, .. } | Light::Spot { enabled, .. } => *enabled = value,
        }
    }

    pub fn location(&self) -> Vec4 {
        match self {
            Light::Omni { location, .. } | Light::Spot { location, .. } => *location,
        }
    }

    pub fn colors(&self) -> &LightColors {
        match self {
            Light::Omni { colors, .. } | Light::Spot { colors, .. } => colors,
        }
    }

    /// Normalized spot direction, from location towards target.
    pub fn spot_direction(&self) -> Option<Vec3> {
        match self {
            Light::Spot {
                location, target, ..
            } => Some((*target - location.truncate()).normalize_or_zero()),
            Light::Omni { .. } => None,
        }
    }
}

/// A texture declared in `<textures>`. Only the path is kept; image decoding
/// belongs to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Texture {
    pub file: String,
    pub length_s: f32,
    pub length_t: f32,
}

/// A material declared in `<materials>`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub emission: Rgba,
    pub ambient: Rgba,
    pub diffuse: Rgba,
    pub specular: Rgba,
    pub shininess: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            emission: Rgba::BLACK,
            ambient: Rgba::new(0.2, 0.2, 0.2, 1.0),
            diffuse: Rgba::new(0.8, 0.8, 0.8, 1.0),
            specular: Rgba::BLACK,
            shininess: 10.0,
        }
    }
}

/// Rotation axis of a `<rotate>` op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn parse(value: &str) -> Option<Axis> {
        match value.trim() {
            "x" | "X" => Some(Axis::X),
            "y" | "Y" => Some(Axis::Y),
            "z" | "Z" => Some(Axis::Z),
            _ => None,
        }
    }
}

/// One primitive transformation op.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TransformOp {
    Translate(Vec3),
    /// Rotation by `angle` degrees around `axis`.
    Rotate { axis: Axis, angle: f32 },
    Scale(Vec3),
}

impl TransformOp {
    pub fn matrix(&self) -> Mat4 {
        match *self {
            TransformOp::Translate(v) => Mat4::from_translation(v),
            TransformOp::Rotate { axis, angle } => {
                let radians = angle.to_radians();
                match axis {
                    Axis::X => Mat4::from_rotation_x(radians),
                    Axis::Y => Mat4::from_rotation_y(radians),
                    Axis::Z => Mat4::from_rotation_z(radians),
                }
            }
            TransformOp::Scale(v) => Mat4::from_scale(v),
        }
    }
}

/// Compose ops in document order: `op1 · op2 · … · opN`.
pub fn compose(ops: &[TransformOp]) -> Mat4 {
    ops.iter().fold(Mat4::IDENTITY, |acc, op| acc * op.matrix())
}

/// A named, reusable transformation from `<transformations>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transformation {
    pub ops: Vec<TransformOp>,
    /// Composed matrix, cached at construction.
    pub matrix: Mat4,
}

impl Transformation {
    pub fn new(ops: Vec<TransformOp>) -> Self {
        let matrix = compose(&ops);
        Self { ops, matrix }
    }
}

/// Token that makes a property fall through to the parent's value.
pub const INHERIT: &str = "inherit";
/// Token that explicitly clears a property.
pub const NONE: &str = "none";

/// An overridable property slot: inherit from the parent, clear it, or set it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Override<T> {
    Inherit,
    None,
    Value(T),
}

impl<T> Default for Override<T> {
    fn default() -> Self {
        Override::Inherit
    }
}

impl<T> Override<T> {
    /// Interpret an id attribute, mapping the `inherit` and `none` tokens.
    pub fn from_token<E>(token: &str, value: impl FnOnce(&str) -> Result<T, E>) -> Result<Self, E> {
        match token {
            INHERIT => Ok(Override::Inherit),
            NONE => Ok(Override::None),
            id => value(id).map(Override::Value),
        }
    }

    /// Effective value given what the parent resolved to.
    pub fn resolve(self, inherited: Option<T>) -> Option<T> {
        match self {
            Override::Inherit => inherited,
            Override::None => None,
            Override::Value(v) => Some(v),
        }
    }

    pub fn is_inherit(&self) -> bool {
        matches!(self, Override::Inherit)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Override<U> {
        match self {
            Override::Inherit => Override::Inherit,
            Override::None => Override::None,
            Override::Value(v) => Override::Value(f(v)),
        }
    }
}

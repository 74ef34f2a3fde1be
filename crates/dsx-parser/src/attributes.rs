//! Typed attribute access.
//!
//! The `get_*` functions are pure lookups: a missing or malformed attribute is
//! simply `None`. [`FieldReader`] layers the recovery policy on top, turning
//! absence into either a default plus a field warning or an [`ElementError`].

use dsx_core::{Diagnostics, ElementError, Rgba};
use glam::{Vec3, Vec4};

use crate::xml::Element;

pub fn get_string<'a>(element: &'a Element, name: &str) -> Option<&'a str> {
    element.attribute(name)
}

/// A finite number, or `None` when missing, non-numeric, NaN or infinite.
pub fn get_float(element: &Element, name: &str) -> Option<f32> {
    get_string(element, name)?
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
}

/// An integer; integral floats such as `"16.0"` are accepted.
pub fn get_integer(element: &Element, name: &str) -> Option<i64> {
    let raw = get_string(element, name)?.trim();
    raw.parse::<i64>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && v.fract() == 0.0)
            .map(|v| v as i64)
    })
}

/// `1`/`true` or `0`/`false`.
pub fn get_boolean(element: &Element, name: &str) -> Option<bool> {
    match get_string(element, name)?.trim() {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}

/// Reads the fields of one element, recording substituted defaults.
pub struct FieldReader<'a> {
    element: &'a Element,
    location: String,
    diagnostics: &'a mut Diagnostics,
}

impl<'a> FieldReader<'a> {
    pub fn new(element: &'a Element, location: impl Into<String>, diagnostics: &'a mut Diagnostics) -> Self {
        Self {
            element,
            location: location.into(),
            diagnostics,
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    fn warn(&mut self, message: String) {
        self.diagnostics.field(self.location.clone(), Some(self.element.line), message);
    }

    /// A required string attribute.
    pub fn require_str(&self, name: &str) -> Result<&'a str, ElementError> {
        get_string(self.element, name)
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| ElementError::missing_attribute(&self.element.name, name))
    }

    /// A required number.
    pub fn require_float(&self, name: &str) -> Result<f32, ElementError> {
        get_float(self.element, name).ok_or_else(|| ElementError::missing_attribute(&self.element.name, name))
    }

    /// A number with a documented default.
    pub fn float_or(&mut self, name: &str, default: f32) -> f32 {
        match get_float(self.element, name) {
            Some(v) => v,
            None => {
                self.warn(format!("attribute '{name}' is missing or not a number; using {default}"));
                default
            }
        }
    }

    /// A number with a default that must also satisfy `valid`.
    pub fn float_where(&mut self, name: &str, default: f32, domain: &str, valid: impl Fn(f32) -> bool) -> f32 {
        let value = self.float_or(name, default);
        if valid(value) {
            value
        } else {
            self.warn(format!("attribute '{name}' = {value} must be {domain}; using {default}"));
            default
        }
    }

    /// An attribute that may be absent without comment, but warns when present and unusable.
    pub fn optional_positive(&mut self, name: &str) -> Option<f32> {
        let raw = get_string(self.element, name)?;
        match get_float(self.element, name) {
            Some(v) if v > 0.0 => Some(v),
            _ => {
                self.warn(format!("attribute '{name}' = '{raw}' must be a positive number; ignored"));
                None
            }
        }
    }

    /// A non-negative count with a default.
    pub fn count_or(&mut self, name: &str, default: u32) -> u32 {
        match get_integer(self.element, name).map(u32::try_from) {
            Some(Ok(v)) => v,
            _ => {
                self.warn(format!(
                    "attribute '{name}' is missing or not a non-negative integer; using {default}"
                ));
                default
            }
        }
    }

    /// A required non-negative count.
    pub fn require_count(&self, name: &str) -> Result<u32, ElementError> {
        get_integer(self.element, name)
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| ElementError::missing_attribute(&self.element.name, name))
    }

    pub fn bool_or(&mut self, name: &str, default: bool) -> bool {
        match get_boolean(self.element, name) {
            Some(v) => v,
            None => {
                self.warn(format!("attribute '{name}' is missing or not a boolean; using {default}"));
                default
            }
        }
    }

    /// `x`, `y`, `z` as a required point.
    pub fn require_vec3(&self) -> Result<Vec3, ElementError> {
        point(self.element)
    }

    /// `x`, `y`, `z` required, `w` defaulting to 1.
    pub fn require_vec4(&mut self) -> Result<Vec4, ElementError> {
        let xyz = self.require_vec3()?;
        Ok(xyz.extend(self.float_or("w", 1.0)))
    }

    /// `r`, `g`, `b`, `a` channels. A missing or out-of-range channel becomes
    /// 1.0 with one warning for that channel.
    pub fn rgba(&mut self) -> Rgba {
        let mut channel = |name: &str| match get_float(self.element, name) {
            Some(v) if Rgba::is_valid_channel(v) => v,
            Some(v) => {
                self.warn(format!("channel '{name}' = {v} is outside [0, 1]; using 1.0"));
                1.0
            }
            None => {
                self.warn(format!("channel '{name}' is missing or not a number; using 1.0"));
                1.0
            }
        };
        let r = channel("r");
        let g = channel("g");
        let b = channel("b");
        let a = channel("a");
        Rgba::new(r, g, b, a)
    }
}

/// Required `x`, `y`, `z` attributes.
pub fn point(element: &Element) -> Result<Vec3, ElementError> {
    let coordinate = |name: &str| {
        get_float(element, name).ok_or_else(|| ElementError::missing_attribute(&element.name, name))
    };
    Ok(Vec3::new(coordinate("x")?, coordinate("y")?, coordinate("z")?))
}

/// Required `x`, `y`, `z` attributes of the child `name`.
pub fn point_child(parent: &Element, name: &str) -> Result<Vec3, ElementError> {
    let child = parent
        .child(name)
        .ok_or_else(|| ElementError::new(format!("<{}> is missing its <{name}> child", parent.name)))?;
    point(child)
}

/// Read the color child `name` of `parent`. A missing child is opaque black with a warning.
pub fn color_child(parent: &Element, name: &str, location: &str, diagnostics: &mut Diagnostics) -> Rgba {
    match parent.child(name) {
        Some(child) => FieldReader::new(child, format!("{location} > {name}"), diagnostics).rgba(),
        None => {
            diagnostics.field(
                location.to_string(),
                Some(parent.line),
                format!("missing <{name}> color; using opaque black"),
            );
            Rgba::BLACK
        }
    }
}

use dsx_core::{Diagnostics, ElementError, Light, LightColors, LoadOptions, SymbolTable};

use super::{check_children, declare, each_entry};
use crate::attributes::{color_child, point_child, FieldReader};
use crate::xml::Element;

const DEFAULT_SPOT_ANGLE: f32 = 45.0;
const DEFAULT_SPOT_EXPONENT: f32 = 1.0;

/// Parse `<lights>` into `table`.
pub fn parse_lights(
    section: &Element,
    table: &mut SymbolTable<Light>,
    options: &LoadOptions,
    diagnostics: &mut Diagnostics,
) {
    each_entry(section, &["omni", "spot"], diagnostics, |entry, diagnostics| {
        let parsed = parse_light(entry.element, &entry.location, diagnostics);
        declare(table, &entry, parsed, options.duplicate_ids, diagnostics)
    });
}

fn parse_light(element: &Element, location: &str, diagnostics: &mut Diagnostics) -> Result<Light, ElementError> {
    let is_spot = element.name == "spot";
    let mut fields = FieldReader::new(element, location, diagnostics);
    let enabled = fields.bool_or("enabled", true);
    let (angle, exponent) = if is_spot {
        (
            fields.float_or("angle", DEFAULT_SPOT_ANGLE),
            fields.float_where("exponent", DEFAULT_SPOT_EXPONENT, "non-negative", |v| v >= 0.0),
        )
    } else {
        (DEFAULT_SPOT_ANGLE, DEFAULT_SPOT_EXPONENT)
    };

    let allowed: &[&str] = if is_spot {
        &["location", "target", "ambient", "diffuse", "specular"]
    } else {
        &["location", "ambient", "diffuse", "specular"]
    };
    check_children(element, allowed, location, diagnostics);

    let location_el = element
        .child("location")
        .ok_or_else(|| ElementError::new(format!("<{}> is missing its <location> child", element.name)))?;
    let position = FieldReader::new(location_el, format!("{location} > location"), diagnostics).require_vec4()?;

    let colors = LightColors {
        ambient: color_child(element, "ambient", location, diagnostics),
        diffuse: color_child(element, "diffuse", location, diagnostics),
        specular: color_child(element, "specular", location, diagnostics),
    };

    if is_spot {
        Ok(Light::Spot {
            enabled,
            location: position,
            target: point_child(element, "target")?,
            angle,
            exponent,
            colors,
        })
    } else {
        Ok(Light::Omni {
            enabled,
            location: position,
            colors,
        })
    }
}

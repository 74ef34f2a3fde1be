use dsx_core::{Diagnostics, ElementError, LoadOptions, SymbolTable, View};

use super::{check_children, declare, each_entry};
use crate::attributes::{get_string, point_child, FieldReader};
use crate::xml::Element;

const DEFAULT_NEAR: f32 = 0.1;
const DEFAULT_FAR: f32 = 500.0;
const DEFAULT_ANGLE: f32 = 45.0;

/// Parse `<views>` into `table`. Returns the `default` attribute, if any.
pub fn parse_views(
    section: &Element,
    table: &mut SymbolTable<View>,
    options: &LoadOptions,
    diagnostics: &mut Diagnostics,
) -> Option<String> {
    each_entry(section, &["perspective", "ortho"], diagnostics, |entry, diagnostics| {
        let parsed = match entry.element.name.as_str() {
            "perspective" => parse_perspective(entry.element, &entry.location, diagnostics),
            _ => parse_ortho(entry.element, &entry.location, diagnostics),
        };
        declare(table, &entry, parsed, options.duplicate_ids, diagnostics)
    });

    get_string(section, "default")
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

fn parse_perspective(element: &Element, location: &str, diagnostics: &mut Diagnostics) -> Result<View, ElementError> {
    let mut fields = FieldReader::new(element, location, diagnostics);
    let near = fields.float_or("near", DEFAULT_NEAR);
    let far = fields.float_or("far", DEFAULT_FAR);
    let angle = fields.float_or("angle", DEFAULT_ANGLE);
    check_children(element, &["from", "to"], location, diagnostics);

    let view = View::Perspective {
        near,
        far,
        fov: angle.to_radians(),
        from: point_child(element, "from")?,
        to: point_child(element, "to")?,
    };
    view.validate()?;
    Ok(view)
}

fn parse_ortho(element: &Element, location: &str, diagnostics: &mut Diagnostics) -> Result<View, ElementError> {
    let mut fields = FieldReader::new(element, location, diagnostics);
    let near = fields.float_or("near", DEFAULT_NEAR);
    let far = fields.float_or("far", DEFAULT_FAR);
    let view = View::Orthographic {
        near,
        far,
        left: fields.require_float("left")?,
        right: fields.require_float("right")?,
        top: fields.require_float("top")?,
        bottom: fields.require_float("bottom")?,
    };
    view.validate()?;
    Ok(view)
}

/// Pick the default view: the requested id if declared, otherwise the first view.
pub fn resolve_default_view(
    requested: Option<&str>,
    table: &SymbolTable<View>,
    line: Option<usize>,
    diagnostics: &mut Diagnostics,
) -> Option<String> {
    if let Some(id) = requested {
        if table.contains(id) {
            return Some(id.to_string());
        }
    }

    let fallback = table.ids().next().map(str::to_string);
    let message = match (requested, &fallback) {
        (Some(id), Some(first)) => format!("default view '{id}' is not declared; using '{first}'"),
        (None, Some(first)) => format!("no default view given; using '{first}'"),
        (_, None) => "no usable view declared".to_string(),
    };
    diagnostics.field("views", line, message);
    fallback
}

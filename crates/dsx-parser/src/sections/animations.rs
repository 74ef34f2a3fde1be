use dsx_core::{Animation, Diagnostics, ElementError, LoadOptions, SymbolTable};
use glam::Vec3;

use super::{declare, each_entry, unknown_tag};
use crate::attributes::{get_float, get_string, point, FieldReader};
use crate::xml::Element;

/// Parse `<animations>` into `table`. Spans are given in seconds.
pub fn parse_animations(
    section: &Element,
    table: &mut SymbolTable<Animation>,
    options: &LoadOptions,
    diagnostics: &mut Diagnostics,
) {
    each_entry(section, &["linear", "circular"], diagnostics, |entry, diagnostics| {
        let parsed = match entry.element.name.as_str() {
            "linear" => parse_linear(entry.element, &entry.location, diagnostics),
            _ => parse_circular(entry.element, &entry.location, diagnostics),
        };
        declare(table, &entry, parsed, options.duplicate_ids, diagnostics)
    });
}

fn span_ms(fields: &FieldReader<'_>) -> Result<f32, ElementError> {
    Ok(fields.require_float("span")? * 1000.0)
}

/// `xx`/`yy`/`zz` as written by older documents, or `x`/`y`/`z`.
fn control_point(element: &Element) -> Result<Vec3, ElementError> {
    match (get_float(element, "xx"), get_float(element, "yy"), get_float(element, "zz")) {
        (Some(x), Some(y), Some(z)) => Ok(Vec3::new(x, y, z)),
        _ => point(element),
    }
}

fn parse_linear(element: &Element, location: &str, diagnostics: &mut Diagnostics) -> Result<Animation, ElementError> {
    let duration_ms = span_ms(&FieldReader::new(element, location, diagnostics))?;
    let mut points = Vec::new();
    for child in &element.children {
        if child.name == "controlpoint" {
            points.push(control_point(child)?);
        } else {
            unknown_tag(diagnostics, location, child);
        }
    }
    Animation::linear(duration_ms, points)
}

/// `center` is a whitespace-separated triple.
fn parse_center(element: &Element) -> Result<Vec3, ElementError> {
    let raw = get_string(element, "center").ok_or_else(|| ElementError::missing_attribute("circular", "center"))?;
    let values: Vec<f32> = raw
        .split_whitespace()
        .map(str::parse::<f32>)
        .collect::<Result<_, _>>()
        .map_err(|_| ElementError::new(format!("center '{raw}' is not a list of numbers")))?;
    match values.as_slice() {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => Err(ElementError::new(format!("center '{raw}' must have three components"))),
    }
}

fn parse_circular(element: &Element, location: &str, diagnostics: &mut Diagnostics) -> Result<Animation, ElementError> {
    let fields = FieldReader::new(element, location, diagnostics);
    let duration_ms = span_ms(&fields)?;
    let radius = fields.require_float("radius")?;
    let start_angle = fields.require_float("startang")?;
    let sweep_angle = fields.require_float("rotang")?;
    Animation::circular(parse_center(element)?, radius, start_angle, sweep_angle, duration_ms)
}

use dsx_core::{Diagnostics, ElementError, LoadOptions, Material, SymbolTable};

use super::{check_children, declare, each_entry};
use crate::attributes::{color_child, FieldReader};
use crate::xml::Element;

const DEFAULT_SHININESS: f32 = 10.0;
const COLOR_TAGS: [&str; 4] = ["emission", "ambient", "diffuse", "specular"];

/// Parse `<materials>` into `table`.
pub fn parse_materials(
    section: &Element,
    table: &mut SymbolTable<Material>,
    options: &LoadOptions,
    diagnostics: &mut Diagnostics,
) {
    each_entry(section, &["material"], diagnostics, |entry, diagnostics| {
        let parsed = parse_material(entry.element, &entry.location, diagnostics);
        declare(table, &entry, parsed, options.duplicate_ids, diagnostics)
    });
}

fn parse_material(element: &Element, location: &str, diagnostics: &mut Diagnostics) -> Result<Material, ElementError> {
    let shininess = FieldReader::new(element, location, diagnostics).float_where(
        "shininess",
        DEFAULT_SHININESS,
        "non-negative",
        |v| v >= 0.0,
    );
    check_children(element, &COLOR_TAGS, location, diagnostics);

    Ok(Material {
        emission: color_child(element, "emission", location, diagnostics),
        ambient: color_child(element, "ambient", location, diagnostics),
        diffuse: color_child(element, "diffuse", location, diagnostics),
        specular: color_child(element, "specular", location, diagnostics),
        shininess,
    })
}

use dsx_core::{Diagnostics, ElementError, LoadOptions, SymbolTable, Texture};

use super::{declare, each_entry};
use crate::attributes::FieldReader;
use crate::xml::Element;

/// Parse `<textures>` into `table`. Only the file path is kept.
pub fn parse_textures(
    section: &Element,
    table: &mut SymbolTable<Texture>,
    options: &LoadOptions,
    diagnostics: &mut Diagnostics,
) {
    each_entry(section, &["texture"], diagnostics, |entry, diagnostics| {
        let parsed = parse_texture(entry.element, &entry.location, diagnostics);
        declare(table, &entry, parsed, options.duplicate_ids, diagnostics)
    });
}

fn parse_texture(element: &Element, location: &str, diagnostics: &mut Diagnostics) -> Result<Texture, ElementError> {
    let mut fields = FieldReader::new(element, location, diagnostics);
    let file = fields.require_str("file")?.trim().to_string();
    Ok(Texture {
        file,
        length_s: fields.optional_positive("length_s").unwrap_or(1.0),
        length_t: fields.optional_positive("length_t").unwrap_or(1.0),
    })
}

use dsx_core::{Diagnostics, Illumination};

use super::check_children;
use crate::attributes::{color_child, FieldReader};
use crate::xml::Element;

/// Parse the global lighting section (`<illumination>` or `<ambient>`).
pub fn parse_illumination(section: &Element, diagnostics: &mut Diagnostics) -> Illumination {
    let location = section.name.as_str();
    let defaults = Illumination::default();

    let mut fields = FieldReader::new(section, location, diagnostics);
    let doublesided = fields.bool_or("doublesided", defaults.doublesided);
    let local = fields.bool_or("local", defaults.local);
    check_children(section, &["ambient", "background"], location, diagnostics);

    Illumination {
        doublesided,
        local,
        ambient: color_child(section, "ambient", location, diagnostics),
        background: color_child(section, "background", location, diagnostics),
    }
}

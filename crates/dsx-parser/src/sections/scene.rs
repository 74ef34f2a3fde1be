use dsx_core::{Diagnostics, LoadError, SceneInfo};

use crate::attributes::{get_string, FieldReader};
use crate::xml::Element;

const DEFAULT_AXIS_LENGTH: f32 = 1.0;

/// Parse `<scene root="..." axis_length="..."/>`. A missing root id is fatal.
pub fn parse_scene(element: &Element, diagnostics: &mut Diagnostics) -> Result<SceneInfo, LoadError> {
    let root = get_string(element, "root")
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or(LoadError::MissingRootId)?;

    let axis_length = FieldReader::new(element, "scene", diagnostics).float_where(
        "axis_length",
        DEFAULT_AXIS_LENGTH,
        "non-negative",
        |v| v >= 0.0,
    );

    Ok(SceneInfo {
        root: root.to_string(),
        axis_length,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::test_support::element;

    #[test]
    fn test_scene() {
        let mut diagnostics = Diagnostics::new();
        let info = parse_scene(&element(r#"<scene root="world" axis_length="3"/>"#), &mut diagnostics).unwrap();
        assert_eq!(info.root, "world");
        assert_eq!(info.axis_length, 3.0);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_axis_length_default() {
        let mut diagnostics = Diagnostics::new();
        let info = parse_scene(&element(r#"<scene root="world" axis_length="-2"/>"#), &mut diagnostics).unwrap();
        assert_eq!(info.axis_length, 1.0);
        assert_eq!(diagnostics.warnings().count(), 1);
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let mut diagnostics = Diagnostics::new();
        let err = parse_scene(&element(r#"<scene root="  "/>"#), &mut diagnostics).unwrap_err();
        assert!(matches!(err, LoadError::MissingRootId));
    }
}

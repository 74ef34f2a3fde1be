use dsx_core::{Axis, Diagnostics, ElementError, LoadOptions, SymbolTable, TransformOp, Transformation};

use super::{declare, each_entry, unknown_tag};
use crate::attributes::{get_float, get_string, point};
use crate::xml::Element;

/// Whether `tag` names a primitive transformation op.
pub fn is_op_tag(tag: &str) -> bool {
    matches!(tag, "translate" | "rotate" | "scale")
}

/// Parse one `<translate>`, `<rotate>` or `<scale>` element.
pub fn parse_op(element: &Element) -> Result<TransformOp, ElementError> {
    match element.name.as_str() {
        "translate" => Ok(TransformOp::Translate(point(element)?)),
        "scale" => Ok(TransformOp::Scale(point(element)?)),
        "rotate" => {
            let raw = get_string(element, "axis").ok_or_else(|| ElementError::missing_attribute("rotate", "axis"))?;
            let axis = Axis::parse(raw)
                .ok_or_else(|| ElementError::new(format!("<rotate> axis must be x, y or z, got '{raw}'")))?;
            let angle = get_float(element, "angle").ok_or_else(|| ElementError::missing_attribute("rotate", "angle"))?;
            Ok(TransformOp::Rotate { axis, angle })
        }
        other => Err(ElementError::new(format!("<{other}> is not a transformation op"))),
    }
}

/// Parse `<transformations>` into `table`.
pub fn parse_transformations(
    section: &Element,
    table: &mut SymbolTable<Transformation>,
    options: &LoadOptions,
    diagnostics: &mut Diagnostics,
) {
    each_entry(section, &["transformation"], diagnostics, |entry, diagnostics| {
        let parsed = parse_transformation(entry.element, &entry.location, diagnostics);
        declare(table, &entry, parsed, options.duplicate_ids, diagnostics)
    });
}

fn parse_transformation(
    element: &Element,
    location: &str,
    diagnostics: &mut Diagnostics,
) -> Result<Transformation, ElementError> {
    let mut ops = Vec::with_capacity(element.children.len());
    for child in &element.children {
        if is_op_tag(&child.name) {
            ops.push(parse_op(child)?);
        } else {
            unknown_tag(diagnostics, location, child);
        }
    }
    Ok(Transformation::new(ops))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::test_support::element;
    use glam::{Mat4, Vec3};

    #[test]
    fn test_ops_compose_in_document_order() {
        let mut diagnostics = Diagnostics::new();
        let mut table = SymbolTable::new("transformation");
        let source = r#"
<transformations>
    <transformation id="t">
        <translate x="1" y="0" z="0"/>
        <scale x="2" y="2" z="2"/>
    </transformation>
</transformations>"#;
        parse_transformations(&element(source), &mut table, &LoadOptions::default(), &mut diagnostics);

        let expected = Mat4::from_translation(Vec3::X) * Mat4::from_scale(Vec3::splat(2.0));
        let t = table.get("t").unwrap();
        assert_eq!(t.ops.len(), 2);
        assert!(t.matrix.abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn test_bad_axis_rejects_transformation() {
        let mut diagnostics = Diagnostics::new();
        let mut table = SymbolTable::new("transformation");
        let source = r#"
<transformations>
    <transformation id="bad"><rotate axis="w" angle="90"/></transformation>
    <transformation id="ok"><rotate axis="y" angle="90"/><shear/></transformation>
</transformations>"#;
        parse_transformations(&element(source), &mut table, &LoadOptions::default(), &mut diagnostics);

        assert!(!table.contains("bad"));
        assert!(table.contains("ok"));
        assert_eq!(diagnostics.errors().count(), 1);
        assert!(diagnostics.first_error().unwrap().message.contains("'w'"));
    }
}

//! Raw component declarations.
//!
//! References are kept as ids here; the graph builder resolves them once
//! every node has been declared.

use dsx_core::{Diagnostics, ElementError, LoadOptions, TransformOp};
use dsx_shapes::Shape;

use super::{each_entry, unknown_tag};
use super::primitives::{is_shape_tag, parse_shape};
use super::transformations::{is_op_tag, parse_op};
use crate::attributes::FieldReader;
use crate::schema::{note_out_of_order, ComponentPart, OrderTracker};
use crate::xml::Element;

/// An id reference and where it was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub id: String,
    pub line: usize,
}

/// One step of a component transform, in document order.
#[derive(Debug, Clone, PartialEq)]
pub enum TransformStep {
    Op(TransformOp),
    Named(Reference),
}

/// The `<texture>` of a component: an id or the `inherit`/`none` tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureRef {
    pub id: String,
    pub length_s: Option<f32>,
    pub length_t: Option<f32>,
    pub line: usize,
}

/// An entry of `<children>`.
#[derive(Debug, Clone, PartialEq)]
pub enum ChildRef {
    Component(Reference),
    Primitive(Reference),
    /// A shape written inline; becomes an anonymous leaf.
    Shape { shape: Shape, line: usize },
}

/// Everything a component declares, unresolved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentBody {
    pub transform: Vec<TransformStep>,
    pub animations: Vec<Reference>,
    /// Material ids or the `inherit`/`none` tokens.
    pub materials: Vec<Reference>,
    pub texture: Option<TextureRef>,
    pub children: Vec<ChildRef>,
}

/// A `<component>` with an id. A body that failed to parse is kept as the
/// error so the component can still be declared as an empty node.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentDecl {
    pub id: String,
    pub line: usize,
    pub body: Result<ComponentBody, ElementError>,
}

/// Parse `<components>`.
pub fn parse_components(
    section: &Element,
    options: &LoadOptions,
    diagnostics: &mut Diagnostics,
) -> Vec<ComponentDecl> {
    let mut components = Vec::new();
    each_entry(section, &["component"], diagnostics, |entry, diagnostics| {
        let body = parse_body(entry.element, &entry.location, options, diagnostics);
        components.push(ComponentDecl {
            id: entry.id.to_string(),
            line: entry.element.line,
            body,
        });
        true
    });
    components
}

fn reference(element: &Element) -> Result<Reference, ElementError> {
    let id = element
        .attribute("id")
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ElementError::missing_attribute(&element.name, "id"))?;
    Ok(Reference {
        id: id.to_string(),
        line: element.line,
    })
}

fn parse_body(
    element: &Element,
    location: &str,
    options: &LoadOptions,
    diagnostics: &mut Diagnostics,
) -> Result<ComponentBody, ElementError> {
    let mut body = ComponentBody::default();
    let mut order = OrderTracker::new();

    for part_el in &element.children {
        let Some(part) = ComponentPart::from_tag(&part_el.name) else {
            unknown_tag(diagnostics, location, part_el);
            continue;
        };
        if let Some(after) = order.observe(part) {
            if options.ordering_warnings {
                note_out_of_order(diagnostics, location, part_el.line, part.tag(), after.tag());
            }
        }

        let part_location = format!("{location} > {}", part_el.name);
        match part {
            ComponentPart::Transformation => {
                for child in &part_el.children {
                    if child.name == "transformationref" {
                        body.transform.push(TransformStep::Named(reference(child)?));
                    } else if is_op_tag(&child.name) {
                        body.transform.push(TransformStep::Op(parse_op(child)?));
                    } else {
                        unknown_tag(diagnostics, &part_location, child);
                    }
                }
            }
            ComponentPart::Animations => {
                for child in &part_el.children {
                    if child.name == "animationref" {
                        body.animations.push(reference(child)?);
                    } else {
                        unknown_tag(diagnostics, &part_location, child);
                    }
                }
            }
            ComponentPart::Materials => {
                for child in &part_el.children {
                    if child.name == "material" {
                        body.materials.push(reference(child)?);
                    } else {
                        unknown_tag(diagnostics, &part_location, child);
                    }
                }
            }
            ComponentPart::Texture => {
                if body.texture.is_some() {
                    diagnostics.field(
                        location.to_string(),
                        Some(part_el.line),
                        "more than one <texture>; keeping the last",
                    );
                }
                let Reference { id, line } = reference(part_el)?;
                let mut fields = FieldReader::new(part_el, part_location, diagnostics);
                body.texture = Some(TextureRef {
                    id,
                    length_s: fields.optional_positive("length_s"),
                    length_t: fields.optional_positive("length_t"),
                    line,
                });
            }
            ComponentPart::Children => {
                for child in &part_el.children {
                    match child.name.as_str() {
                        "componentref" => body.children.push(ChildRef::Component(reference(child)?)),
                        "primitiveref" => body.children.push(ChildRef::Primitive(reference(child)?)),
                        tag if is_shape_tag(tag) => {
                            let shape_location = format!("{part_location} > {tag}");
                            body.children.push(ChildRef::Shape {
                                shape: parse_shape(child, &shape_location, diagnostics)?,
                                line: child.line,
                            });
                        }
                        _ => unknown_tag(diagnostics, &part_location, child),
                    }
                }
            }
        }
    }

    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::test_support::element;
    use dsx_core::DiagnosticKind;
    use glam::Vec3;

    const COMPONENTS: &str = r#"
<components>
    <component id="root">
        <transformation>
            <translate x="0" y="0" z="5"/>
            <transformationref id="spin"/>
        </transformation>
        <materials>
            <material id="inherit"/>
            <material id="gold"/>
        </materials>
        <texture id="wood" length_s="2"/>
        <children>
            <componentref id="table"/>
            <primitiveref id="floor"/>
            <sphere radius="1" slices="8" stacks="4"/>
        </children>
    </component>
    <component id="table">
        <children><componentref id="root"/></children>
        <animations><animationref id="slide"/></animations>
    </component>
    <component id="broken">
        <transformation><rotate axis="q" angle="1"/></transformation>
    </component>
</components>"#;

    #[test]
    fn test_component_body() {
        let mut diagnostics = Diagnostics::new();
        let components = parse_components(&element(COMPONENTS), &LoadOptions::default(), &mut diagnostics);
        assert_eq!(components.len(), 3);

        let root = components[0].body.as_ref().unwrap();
        assert_eq!(
            root.transform[0],
            TransformStep::Op(TransformOp::Translate(Vec3::new(0.0, 0.0, 5.0)))
        );
        assert!(matches!(&root.transform[1], TransformStep::Named(r) if r.id == "spin"));
        let materials: Vec<_> = root.materials.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(materials, ["inherit", "gold"]);
        let texture = root.texture.as_ref().unwrap();
        assert_eq!((texture.id.as_str(), texture.length_s, texture.length_t), ("wood", Some(2.0), None));
        assert_eq!(root.children.len(), 3);
        assert!(matches!(root.children[2], ChildRef::Shape { .. }));

        let table = components[1].body.as_ref().unwrap();
        assert_eq!(table.animations[0].id, "slide");

        assert!(components[2].body.is_err());
    }

    #[test]
    fn test_out_of_order_parts_are_noted() {
        let mut diagnostics = Diagnostics::new();
        parse_components(&element(COMPONENTS), &LoadOptions::default(), &mut diagnostics);
        assert_eq!(diagnostics.count(DiagnosticKind::Ordering), 1);

        let mut quiet = Diagnostics::new();
        let options = LoadOptions::default().without_ordering_warnings();
        parse_components(&element(COMPONENTS), &options, &mut quiet);
        assert_eq!(quiet.count(DiagnosticKind::Ordering), 0);
    }
}

use dsx_core::{Diagnostics, ElementError};
use dsx_shapes::Shape;
use glam::Vec3;

use super::{each_entry, unknown_tag};
use crate::attributes::{point, FieldReader};
use crate::xml::Element;

const DEFAULT_SLICES: u32 = 16;
const DEFAULT_STACKS: u32 = 8;
const DEFAULT_LOOPS: u32 = 16;
const DEFAULT_PARTS: u32 = 10;

const SHAPE_TAGS: [&str; 7] = ["rectangle", "triangle", "cylinder", "sphere", "torus", "plane", "patch"];

/// A parsed `<primitive>`: an id and its validated shape.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveDecl {
    pub id: String,
    pub shape: Shape,
    pub line: usize,
}

/// Whether `tag` names a leaf shape.
pub fn is_shape_tag(tag: &str) -> bool {
    SHAPE_TAGS.contains(&tag)
}

/// Parse `<primitives>`. Shapes are built and validated immediately.
pub fn parse_primitives(section: &Element, diagnostics: &mut Diagnostics) -> Vec<PrimitiveDecl> {
    let mut primitives = Vec::new();
    each_entry(section, &["primitive"], diagnostics, |entry, diagnostics| {
        match parse_primitive(entry.element, &entry.location, diagnostics) {
            Ok(shape) => {
                primitives.push(PrimitiveDecl {
                    id: entry.id.to_string(),
                    shape,
                    line: entry.element.line,
                });
                true
            }
            Err(err) => {
                diagnostics.element(entry.location, Some(entry.element.line), err.message);
                false
            }
        }
    });
    primitives
}

fn parse_primitive(element: &Element, location: &str, diagnostics: &mut Diagnostics) -> Result<Shape, ElementError> {
    let mut shapes = Vec::new();
    for child in &element.children {
        if is_shape_tag(&child.name) {
            shapes.push(child);
        } else {
            unknown_tag(diagnostics, location, child);
        }
    }

    let (first, extra) = shapes
        .split_first()
        .ok_or_else(|| ElementError::new("primitive declares no shape"))?;
    if !extra.is_empty() {
        diagnostics.field(
            location.to_string(),
            Some(element.line),
            format!("primitive declares {} shapes; using the first <{}>", shapes.len(), first.name),
        );
    }
    parse_shape(first, &format!("{location} > {}", first.name), diagnostics)
}

/// Parse and validate one shape element.
pub fn parse_shape(element: &Element, location: &str, diagnostics: &mut Diagnostics) -> Result<Shape, ElementError> {
    let mut fields = FieldReader::new(element, location, diagnostics);
    let shape = match element.name.as_str() {
        "rectangle" => Shape::Rectangle {
            x1: fields.require_float("x1")?,
            y1: fields.require_float("y1")?,
            x2: fields.require_float("x2")?,
            y2: fields.require_float("y2")?,
        },
        "triangle" => {
            let vertex = |n: u32| -> Result<Vec3, ElementError> {
                Ok(Vec3::new(
                    fields.require_float(&format!("x{n}"))?,
                    fields.require_float(&format!("y{n}"))?,
                    fields.require_float(&format!("z{n}"))?,
                ))
            };
            Shape::Triangle {
                p1: vertex(1)?,
                p2: vertex(2)?,
                p3: vertex(3)?,
            }
        }
        "cylinder" => Shape::Cylinder {
            base: fields.require_float("base")?,
            top: fields.require_float("top")?,
            height: fields.require_float("height")?,
            slices: fields.count_or("slices", DEFAULT_SLICES),
            stacks: fields.count_or("stacks", DEFAULT_STACKS),
        },
        "sphere" => Shape::Sphere {
            radius: fields.require_float("radius")?,
            slices: fields.count_or("slices", DEFAULT_SLICES),
            stacks: fields.count_or("stacks", DEFAULT_STACKS),
        },
        "torus" => Shape::Torus {
            inner: fields.require_float("inner")?,
            outer: fields.require_float("outer")?,
            slices: fields.count_or("slices", DEFAULT_SLICES),
            loops: fields.count_or("loops", DEFAULT_LOOPS),
        },
        "plane" => Shape::Plane {
            dim_x: fields.require_float("dimX")?,
            dim_y: fields.require_float("dimY")?,
            parts_x: fields.count_or("partsX", DEFAULT_PARTS),
            parts_y: fields.count_or("partsY", DEFAULT_PARTS),
        },
        "patch" => {
            let order_u = fields.require_count("orderU")?;
            let order_v = fields.require_count("orderV")?;
            let parts_u = fields.count_or("partsU", DEFAULT_PARTS);
            let parts_v = fields.count_or("partsV", DEFAULT_PARTS);
            let mut control_points = Vec::new();
            for child in &element.children {
                if child.name == "controlpoint" {
                    control_points.push(point(child)?);
                } else {
                    unknown_tag(diagnostics, location, child);
                }
            }
            Shape::Patch {
                order_u,
                order_v,
                parts_u,
                parts_v,
                control_points,
            }
        }
        other => return Err(ElementError::new(format!("<{other}> is not a shape"))),
    };
    shape.validate()?;
    Ok(shape)
}

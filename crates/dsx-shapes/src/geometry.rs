//! Shape definitions and mesh types.

use dsx_core::ShapeError;
use glam::{Vec2, Vec3};

/// A parametric leaf shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Axis-aligned rectangle in the XY plane between two corners.
    Rectangle { x1: f32, y1: f32, x2: f32, y2: f32 },
    /// Triangle from three arbitrary vertices.
    Triangle { p1: Vec3, p2: Vec3, p3: Vec3 },
    /// Cylinder or cone along +Z, `base` radius at z = 0 and `top` radius at z = `height`.
    Cylinder {
        base: f32,
        top: f32,
        height: f32,
        slices: u32,
        stacks: u32,
    },
    /// Sphere centered at the origin.
    Sphere { radius: f32, slices: u32, stacks: u32 },
    /// Torus around the Z axis; `inner` is the tube radius, `outer` the ring radius.
    Torus {
        inner: f32,
        outer: f32,
        slices: u32,
        loops: u32,
    },
    /// Subdivided plane in XZ centered at the origin, facing +Y.
    Plane {
        dim_x: f32,
        dim_y: f32,
        parts_x: u32,
        parts_y: u32,
    },
    /// Bezier patch. Control points are stored u-major: `(order_u + 1)` rows of `(order_v + 1)`.
    Patch {
        order_u: u32,
        order_v: u32,
        parts_u: u32,
        parts_v: u32,
        control_points: Vec<Vec3>,
    },
}

/// Texture tiling lengths: how many scene units one texture repeat covers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tiling {
    pub length_s: f32,
    pub length_t: f32,
}

impl Default for Tiling {
    fn default() -> Self {
        Self {
            length_s: 1.0,
            length_t: 1.0,
        }
    }
}

impl Tiling {
    pub fn new(length_s: f32, length_t: f32) -> Self {
        Self { length_s, length_t }
    }
}

fn positive(shape: &'static str, param: &'static str, value: f32) -> Result<(), ShapeError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ShapeError::NonPositive { shape, param, value })
    }
}

/// Upper bound for slices, stacks, loops and parts.
pub const MAX_DIVISIONS: u32 = 1024;

/// Upper bound for a patch's orderU and orderV.
pub const MAX_PATCH_ORDER: u32 = 16;

fn within(shape: &'static str, param: &'static str, value: u32, min: u32, max: u32) -> Result<(), ShapeError> {
    if value < min {
        Err(ShapeError::TooFewDivisions {
            shape,
            param,
            min,
            value,
        })
    } else if value > max {
        Err(ShapeError::TooManyDivisions {
            shape,
            param,
            max,
            value,
        })
    } else {
        Ok(())
    }
}

fn divisions(shape: &'static str, param: &'static str, value: u32, min: u32) -> Result<(), ShapeError> {
    within(shape, param, value, min, MAX_DIVISIONS)
}

impl Shape {
    /// The element name this shape is declared with.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Shape::Rectangle { .. } => "rectangle",
            Shape::Triangle { .. } => "triangle",
            Shape::Cylinder { .. } => "cylinder",
            Shape::Sphere { .. } => "sphere",
            Shape::Torus { .. } => "torus",
            Shape::Plane { .. } => "plane",
            Shape::Patch { .. } => "patch",
        }
    }

    /// Check the shape parameters.
    pub fn validate(&self) -> Result<(), ShapeError> {
        match self {
            Shape::Rectangle { x1, y1, x2, y2 } => {
                if (x2 - x1).abs() <= f32::EPSILON || (y2 - y1).abs() <= f32::EPSILON {
                    return Err(ShapeError::DegenerateRectangle);
                }
                Ok(())
            }
            Shape::Triangle { p1, p2, p3 } => {
                if (*p2 - *p1).cross(*p3 - *p1).length_squared() <= f32::EPSILON {
                    return Err(ShapeError::DegenerateTriangle);
                }
                Ok(())
            }
            Shape::Cylinder {
                base,
                top,
                height,
                slices,
                stacks,
            } => {
                positive("cylinder", "height", *height)?;
                if *base < 0.0 || *top < 0.0 || (*base == 0.0 && *top == 0.0) {
                    return Err(ShapeError::NonPositive {
                        shape: "cylinder",
                        param: if *base <= 0.0 { "base" } else { "top" },
                        value: base.min(*top),
                    });
                }
                divisions("cylinder", "slices", *slices, 3)?;
                divisions("cylinder", "stacks", *stacks, 1)
            }
            Shape::Sphere {
                radius,
                slices,
                stacks,
            } => {
                positive("sphere", "radius", *radius)?;
                divisions("sphere", "slices", *slices, 3)?;
                divisions("sphere", "stacks", *stacks, 2)
            }
            Shape::Torus {
                inner,
                outer,
                slices,
                loops,
            } => {
                positive("torus", "inner", *inner)?;
                positive("torus", "outer", *outer)?;
                divisions("torus", "slices", *slices, 3)?;
                divisions("torus", "loops", *loops, 3)
            }
            Shape::Plane {
                dim_x,
                dim_y,
                parts_x,
                parts_y,
            } => {
                positive("plane", "dimX", *dim_x)?;
                positive("plane", "dimY", *dim_y)?;
                divisions("plane", "partsX", *parts_x, 1)?;
                divisions("plane", "partsY", *parts_y, 1)
            }
            Shape::Patch {
                order_u,
                order_v,
                parts_u,
                parts_v,
                control_points,
            } => {
                within("patch", "orderU", *order_u, 1, MAX_PATCH_ORDER)?;
                within("patch", "orderV", *order_v, 1, MAX_PATCH_ORDER)?;
                divisions("patch", "partsU", *parts_u, 1)?;
                divisions("patch", "partsV", *parts_v, 1)?;
                let expected = (*order_u as usize + 1) * (*order_v as usize + 1);
                if control_points.len() != expected {
                    return Err(ShapeError::ControlPointCount {
                        order_u: *order_u,
                        order_v: *order_v,
                        expected,
                        found: control_points.len(),
                    });
                }
                Ok(())
            }
        }
    }

    /// Analytic bounds in local space.
    pub fn bounding_box(&self) -> BoundingBox {
        match self {
            Shape::Rectangle { x1, y1, x2, y2 } => BoundingBox::new(
                Vec3::new(x1.min(*x2), y1.min(*y2), 0.0),
                Vec3::new(x1.max(*x2), y1.max(*y2), 0.0),
            ),
            Shape::Triangle { p1, p2, p3 } => BoundingBox::new(p1.min(*p2).min(*p3), p1.max(*p2).max(*p3)),
            Shape::Cylinder {
                base, top, height, ..
            } => {
                let r = base.max(*top);
                BoundingBox::new(Vec3::new(-r, -r, 0.0), Vec3::new(r, r, *height))
            }
            Shape::Sphere { radius, .. } => BoundingBox::new(Vec3::splat(-radius), Vec3::splat(*radius)),
            Shape::Torus { inner, outer, .. } => {
                let r = inner + outer;
                BoundingBox::new(Vec3::new(-r, -r, -inner), Vec3::new(r, r, *inner))
            }
            Shape::Plane { dim_x, dim_y, .. } => BoundingBox::new(
                Vec3::new(-dim_x / 2.0, 0.0, -dim_y / 2.0),
                Vec3::new(dim_x / 2.0, 0.0, dim_y / 2.0),
            ),
            // Bezier surfaces lie inside the convex hull of their control points.
            Shape::Patch { control_points, .. } => BoundingBox::from_points(control_points.iter().copied())
                .unwrap_or_else(|| BoundingBox::new(Vec3::ZERO, Vec3::ZERO)),
        }
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn from_points(points: impl Iterator<Item = Vec3>) -> Option<Self> {
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        let mut has_points = false;

        for p in points {
            min = min.min(p);
            max = max.max(p);
            has_points = true;
        }

        if has_points {
            Some(Self { min, max })
        } else {
            None
        }
    }

    /// Check if a point is inside the bounding box, with a small tolerance.
    pub fn contains(&self, point: Vec3) -> bool {
        const EPS: f32 = 1e-4;
        point.cmpge(self.min - EPS).all() && point.cmple(self.max + EPS).all()
    }
}

/// A triangle mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(self.positions.iter().copied())
    }

    /// Push one vertex and return its index.
    pub fn push_vertex(&mut self, position: Vec3, normal: Vec3, uv: Vec2) -> u32 {
        let index = self.positions.len() as u32;
        self.positions.push(position);
        self.normals.push(normal);
        self.uvs.push(uv);
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_degenerate_shapes() {
        let flat = Shape::Rectangle { x1: 0.0, y1: 0.0, x2: 1.0, y2: 0.0 };
        assert_eq!(flat.validate(), Err(ShapeError::DegenerateRectangle));

        let line = Shape::Triangle {
            p1: Vec3::ZERO,
            p2: Vec3::X,
            p3: Vec3::X * 2.0,
        };
        assert_eq!(line.validate(), Err(ShapeError::DegenerateTriangle));

        let sphere = Shape::Sphere { radius: 1.0, slices: 2, stacks: 8 };
        assert!(matches!(sphere.validate(), Err(ShapeError::TooFewDivisions { param: "slices", .. })));

        let cone = Shape::Cylinder { base: 1.0, top: 0.0, height: 2.0, slices: 8, stacks: 1 };
        assert!(cone.validate().is_ok());

        let needle = Shape::Cylinder { base: 0.0, top: 0.0, height: 2.0, slices: 8, stacks: 1 };
        assert!(needle.validate().is_err());
    }

    #[test]
    fn test_patch_control_point_count() {
        let patch = Shape::Patch {
            order_u: 1,
            order_v: 2,
            parts_u: 4,
            parts_v: 4,
            control_points: vec![Vec3::ZERO; 5],
        };
        assert_eq!(
            patch.validate(),
            Err(ShapeError::ControlPointCount {
                order_u: 1,
                order_v: 2,
                expected: 6,
                found: 5
            })
        );
    }

    #[test]
    fn test_bounding_boxes() {
        let rect = Shape::Rectangle { x1: 2.0, y1: 3.0, x2: -1.0, y2: 0.0 };
        let bounds = rect.bounding_box();
        assert_eq!(bounds.min, Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(bounds.max, Vec3::new(2.0, 3.0, 0.0));

        let torus = Shape::Torus { inner: 0.5, outer: 2.0, slices: 8, loops: 8 };
        let bounds = torus.bounding_box();
        assert_eq!(bounds.max - bounds.min, Vec3::new(5.0, 5.0, 1.0));
    }

    #[test]
    fn test_division_counts_are_capped() {
        let sphere = Shape::Sphere { radius: 1.0, slices: u32::MAX, stacks: 8 };
        assert_eq!(
            sphere.validate(),
            Err(ShapeError::TooManyDivisions {
                shape: "sphere",
                param: "slices",
                max: MAX_DIVISIONS,
                value: u32::MAX
            })
        );

        let plane = Shape::Plane { dim_x: 1.0, dim_y: 1.0, parts_x: 4, parts_y: MAX_DIVISIONS + 1 };
        assert!(matches!(plane.validate(), Err(ShapeError::TooManyDivisions { param: "partsY", .. })));

        let torus = Shape::Torus { inner: 0.5, outer: 2.0, slices: MAX_DIVISIONS, loops: 3 };
        assert!(torus.validate().is_ok());
    }

    #[test]
    fn test_patch_order_is_capped() {
        let patch = Shape::Patch {
            order_u: u32::MAX,
            order_v: 1,
            parts_u: 4,
            parts_v: 4,
            control_points: vec![Vec3::ZERO; 4],
        };
        assert_eq!(
            patch.validate(),
            Err(ShapeError::TooManyDivisions {
                shape: "patch",
                param: "orderU",
                max: MAX_PATCH_ORDER,
                value: u32::MAX
            })
        );
    }
}

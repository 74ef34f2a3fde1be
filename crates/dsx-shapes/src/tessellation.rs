//! Shape tessellation into triangle meshes.
//!
//! Grid shapes emit `(a + 1) * (b + 1)` vertices with a duplicated seam so
//! texture coordinates stay continuous.

use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};

use crate::geometry::{Mesh, Shape, Tiling};

impl Shape {
    pub fn tessellate(&self, tiling: Tiling) -> Mesh {
        tessellate(self, tiling)
    }
}

/// Tessellate a shape. Texture coordinates on flat shapes follow `tiling`;
/// curved shapes map the full texture once around their parameter domain.
pub fn tessellate(shape: &Shape, tiling: Tiling) -> Mesh {
    match shape {
        Shape::Rectangle { x1, y1, x2, y2 } => rectangle(*x1, *y1, *x2, *y2, tiling),
        Shape::Triangle { p1, p2, p3 } => triangle(*p1, *p2, *p3, tiling),
        Shape::Cylinder {
            base,
            top,
            height,
            slices,
            stacks,
        } => cylinder(*base, *top, *height, *slices, *stacks),
        Shape::Sphere {
            radius,
            slices,
            stacks,
        } => sphere(*radius, *slices, *stacks),
        Shape::Torus {
            inner,
            outer,
            slices,
            loops,
        } => torus(*inner, *outer, *slices, *loops),
        Shape::Plane {
            dim_x,
            dim_y,
            parts_x,
            parts_y,
        } => plane(*dim_x, *dim_y, *parts_x, *parts_y, tiling),
        Shape::Patch {
            order_u,
            order_v,
            parts_u,
            parts_v,
            control_points,
        } => patch(*order_u, *order_v, *parts_u, *parts_v, control_points),
    }
}

/// Emit two triangles per cell of a `(columns + 1) x (rows + 1)` vertex grid
/// starting at vertex `base`.
fn grid_indices(mesh: &mut Mesh, base: u32, columns: u32, rows: u32) {
    let stride = columns + 1;
    for row in 0..rows {
        for col in 0..columns {
            let a = base + row * stride + col;
            let b = a + 1;
            let c = a + stride;
            let d = c + 1;
            mesh.indices.extend_from_slice(&[a, b, d, a, d, c]);
        }
    }
}

fn rectangle(x1: f32, y1: f32, x2: f32, y2: f32, tiling: Tiling) -> Mesh {
    let mut mesh = Mesh::new();
    let (min_x, max_x) = (x1.min(x2), x1.max(x2));
    let (min_y, max_y) = (y1.min(y2), y1.max(y2));
    let s = (max_x - min_x) / tiling.length_s;
    let t = (max_y - min_y) / tiling.length_t;

    let a = mesh.push_vertex(Vec3::new(min_x, min_y, 0.0), Vec3::Z, Vec2::new(0.0, 0.0));
    let b = mesh.push_vertex(Vec3::new(max_x, min_y, 0.0), Vec3::Z, Vec2::new(s, 0.0));
    let c = mesh.push_vertex(Vec3::new(max_x, max_y, 0.0), Vec3::Z, Vec2::new(s, t));
    let d = mesh.push_vertex(Vec3::new(min_x, max_y, 0.0), Vec3::Z, Vec2::new(0.0, t));
    mesh.indices.extend_from_slice(&[a, b, c, a, c, d]);
    mesh
}

fn triangle(p1: Vec3, p2: Vec3, p3: Vec3, tiling: Tiling) -> Mesh {
    let mut mesh = Mesh::new();
    let normal = (p2 - p1).cross(p3 - p1).normalize_or_zero();

    // Lay the triangle flat: p1 at the origin, p2 along +s, p3 projected onto that edge.
    let edge = p2 - p1;
    let edge_len = edge.length();
    let to_p3 = p3 - p1;
    let (along, across) = if edge_len > 0.0 {
        let along = to_p3.dot(edge) / edge_len;
        (along, (to_p3.length_squared() - along * along).max(0.0).sqrt())
    } else {
        (0.0, 0.0)
    };

    let a = mesh.push_vertex(p1, normal, Vec2::ZERO);
    let b = mesh.push_vertex(p2, normal, Vec2::new(edge_len / tiling.length_s, 0.0));
    let c = mesh.push_vertex(
        p3,
        normal,
        Vec2::new(along / tiling.length_s, across / tiling.length_t),
    );
    mesh.indices.extend_from_slice(&[a, b, c]);
    mesh
}

fn cylinder(base: f32, top: f32, height: f32, slices: u32, stacks: u32) -> Mesh {
    let mut mesh = Mesh::new();
    // Radial normals tilt by the cone slope.
    let slope = (base - top) / height;

    for stack in 0..=stacks {
        let v = stack as f32 / stacks as f32;
        let z = v * height;
        let radius = base + (top - base) * v;
        for slice in 0..=slices {
            let u = slice as f32 / slices as f32;
            let theta = u * TAU;
            let (sin, cos) = theta.sin_cos();
            let normal = Vec3::new(cos, sin, slope).normalize_or_zero();
            mesh.push_vertex(Vec3::new(radius * cos, radius * sin, z), normal, Vec2::new(u, v));
        }
    }
    grid_indices(&mut mesh, 0, slices, stacks);

    if base > 0.0 {
        cap(&mut mesh, base, 0.0, -Vec3::Z, slices);
    }
    if top > 0.0 {
        cap(&mut mesh, top, height, Vec3::Z, slices);
    }
    mesh
}

/// Triangle-fan disk closing one end of a cylinder.
fn cap(mesh: &mut Mesh, radius: f32, z: f32, normal: Vec3, slices: u32) {
    let center = mesh.push_vertex(Vec3::new(0.0, 0.0, z), normal, Vec2::splat(0.5));
    let first = center + 1;
    for slice in 0..=slices {
        let theta = slice as f32 / slices as f32 * TAU;
        let (sin, cos) = theta.sin_cos();
        mesh.push_vertex(
            Vec3::new(radius * cos, radius * sin, z),
            normal,
            Vec2::new(0.5 + 0.5 * cos, 0.5 + 0.5 * sin),
        );
    }
    for slice in 0..slices {
        let a = first + slice;
        let b = a + 1;
        // Keep the winding counter-clockwise as seen from outside.
        if normal.z > 0.0 {
            mesh.indices.extend_from_slice(&[center, a, b]);
        } else {
            mesh.indices.extend_from_slice(&[center, b, a]);
        }
    }
}

fn sphere(radius: f32, slices: u32, stacks: u32) -> Mesh {
    let mut mesh = Mesh::new();

    for stack in 0..=stacks {
        let v = stack as f32 / stacks as f32;
        let phi = -PI / 2.0 + v * PI;
        let (sin_phi, cos_phi) = phi.sin_cos();
        for slice in 0..=slices {
            let u = slice as f32 / slices as f32;
            let (sin_theta, cos_theta) = (u * TAU).sin_cos();
            let normal = Vec3::new(cos_phi * cos_theta, cos_phi * sin_theta, sin_phi);
            mesh.push_vertex(normal * radius, normal, Vec2::new(u, v));
        }
    }
    grid_indices(&mut mesh, 0, slices, stacks);
    mesh
}

fn torus(inner: f32, outer: f32, slices: u32, loops: u32) -> Mesh {
    let mut mesh = Mesh::new();

    for ring in 0..=loops {
        let v = ring as f32 / loops as f32;
        let (sin_ring, cos_ring) = (v * TAU).sin_cos();
        for slice in 0..=slices {
            let u = slice as f32 / slices as f32;
            let (sin_tube, cos_tube) = (u * TAU).sin_cos();
            let normal = Vec3::new(cos_tube * cos_ring, cos_tube * sin_ring, sin_tube);
            let center = Vec3::new(outer * cos_ring, outer * sin_ring, 0.0);
            mesh.push_vertex(center + normal * inner, normal, Vec2::new(u, v));
        }
    }
    grid_indices(&mut mesh, 0, slices, loops);
    mesh
}

fn plane(dim_x: f32, dim_y: f32, parts_x: u32, parts_y: u32, tiling: Tiling) -> Mesh {
    let mut mesh = Mesh::new();

    for row in 0..=parts_y {
        let fz = row as f32 / parts_y as f32;
        let z = dim_y * (fz - 0.5);
        for col in 0..=parts_x {
            let fx = col as f32 / parts_x as f32;
            let x = dim_x * (fx - 0.5);
            let uv = Vec2::new(fx * dim_x / tiling.length_s, fz * dim_y / tiling.length_t);
            mesh.push_vertex(Vec3::new(x, 0.0, z), Vec3::Y, uv);
        }
    }
    // Rows run towards +Z, so flip the grid winding to face +Y.
    let start = mesh.indices.len();
    grid_indices(&mut mesh, 0, parts_x, parts_y);
    for tri in mesh.indices[start..].chunks_exact_mut(3) {
        tri.swap(1, 2);
    }
    mesh
}

fn binomial(n: u32, k: u32) -> f32 {
    (0..k).fold(1.0, |acc, i| acc * (n - i) as f32 / (i + 1) as f32)
}

/// Bernstein basis values and derivatives of degree `order` at `t`.
fn bernstein(order: u32, t: f32) -> (Vec<f32>, Vec<f32>) {
    let n = order;
    let basis = (0..=n)
        .map(|i| binomial(n, i) * t.powi(i as i32) * (1.0 - t).powi((n - i) as i32))
        .collect();
    let derivative = (0..=n)
        .map(|i| {
            let mut d = 0.0;
            if i > 0 {
                d += binomial(n - 1, i - 1) * t.powi(i as i32 - 1) * (1.0 - t).powi((n - i) as i32);
            }
            if i < n {
                d -= binomial(n - 1, i) * t.powi(i as i32) * (1.0 - t).powi((n - 1 - i) as i32);
            }
            d * n as f32
        })
        .collect();
    (basis, derivative)
}

fn patch(order_u: u32, order_v: u32, parts_u: u32, parts_v: u32, control_points: &[Vec3]) -> Mesh {
    let mut mesh = Mesh::new();
    let columns = (order_v + 1) as usize;

    for row in 0..=parts_v {
        let v = row as f32 / parts_v as f32;
        let (bv, dbv) = bernstein(order_v, v);
        for col in 0..=parts_u {
            let u = col as f32 / parts_u as f32;
            let (bu, dbu) = bernstein(order_u, u);

            let mut position = Vec3::ZERO;
            let mut du = Vec3::ZERO;
            let mut dv = Vec3::ZERO;
            for (i, (b_u, db_u)) in bu.iter().zip(&dbu).enumerate() {
                for (j, (b_v, db_v)) in bv.iter().zip(&dbv).enumerate() {
                    let Some(point) = control_points.get(i * columns + j) else {
                        continue;
                    };
                    position += *point * (b_u * b_v);
                    du += *point * (db_u * b_v);
                    dv += *point * (b_u * db_v);
                }
            }
            let normal = du.cross(dv).normalize_or_zero();
            mesh.push_vertex(position, normal, Vec2::new(u, v));
        }
    }
    grid_indices(&mut mesh, 0, parts_u, parts_v);
    mesh
}

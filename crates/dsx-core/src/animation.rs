//! Keyframe-free animations: piecewise-linear paths and circular arcs.
//!
//! An [`Animation`] is an immutable definition from `<animations>`; every node
//! that references it owns its own [`AnimationState`] so two components
//! sharing an animation id play it independently.

use std::f32::consts::PI;

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::errors::ElementError;

/// Segments shorter than this are treated as zero-length.
const MIN_SEGMENT: f32 = 1e-6;

/// An animation definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Animation {
    /// Constant-speed travel along a polyline.
    Linear {
        duration_ms: f32,
        control_points: Vec<Vec3>,
    },
    /// Travel along an arc in the XZ plane around `center`.
    Circular {
        center: Vec3,
        radius: f32,
        /// Degrees.
        start_angle: f32,
        /// Degrees; negative sweeps run clockwise.
        sweep_angle: f32,
        duration_ms: f32,
    },
}

/// Position and facing at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    /// Rotation about +Y (radians) that turns +Z towards the travel direction.
    pub heading: f32,
}

impl Pose {
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_translation(self.position) * Mat4::from_rotation_y(self.heading)
    }
}

impl Animation {
    /// Build a linear animation. Needs a positive duration and two or more points.
    pub fn linear(duration_ms: f32, control_points: Vec<Vec3>) -> Result<Self, ElementError> {
        check_duration(duration_ms)?;
        if control_points.len() < 2 {
            return Err(ElementError::new(format!(
                "linear animation needs at least 2 control points, got {}",
                control_points.len()
            )));
        }
        Ok(Animation::Linear {
            duration_ms,
            control_points,
        })
    }

    /// Build a circular animation. Needs a positive duration and a non-negative radius.
    pub fn circular(
        center: Vec3,
        radius: f32,
        start_angle: f32,
        sweep_angle: f32,
        duration_ms: f32,
    ) -> Result<Self, ElementError> {
        check_duration(duration_ms)?;
        if radius.is_nan() || radius < 0.0 {
            return Err(ElementError::new(format!("circular animation radius must be >= 0, got {radius}")));
        }
        Ok(Animation::Circular {
            center,
            radius,
            start_angle,
            sweep_angle,
            duration_ms,
        })
    }

    pub fn duration_ms(&self) -> f32 {
        match self {
            Animation::Linear { duration_ms, .. } | Animation::Circular { duration_ms, .. } => *duration_ms,
        }
    }

    /// Total distance travelled over the whole animation.
    pub fn path_length(&self) -> f32 {
        match self {
            Animation::Linear { control_points, .. } => control_points
                .windows(2)
                .map(|pair| pair[0].distance(pair[1]))
                .sum(),
            Animation::Circular {
                radius, sweep_angle, ..
            } => radius * sweep_angle.to_radians().abs(),
        }
    }

    /// Pose after `elapsed_ms`; times past the duration give the terminal pose.
    pub fn sample(&self, elapsed_ms: f32) -> Pose {
        let fraction = (elapsed_ms / self.duration_ms()).clamp(0.0, 1.0);
        match self {
            Animation::Linear { control_points, .. } => sample_polyline(control_points, fraction * self.path_length()),
            Animation::Circular {
                center,
                radius,
                start_angle,
                sweep_angle,
                ..
            } => {
                let angle = (start_angle + sweep_angle * fraction).to_radians();
                let position = *center + Vec3::new(radius * angle.cos(), 0.0, -radius * angle.sin());
                // Tangent of the arc, in the direction of travel.
                let heading = if *sweep_angle >= 0.0 { angle + PI } else { angle };
                Pose { position, heading }
            }
        }
    }
}

fn check_duration(duration_ms: f32) -> Result<(), ElementError> {
    if duration_ms > 0.0 && duration_ms.is_finite() {
        Ok(())
    } else {
        Err(ElementError::new(format!("animation duration must be positive, got {duration_ms} ms")))
    }
}

/// Walk `distance` along the polyline.
fn sample_polyline(points: &[Vec3], distance: f32) -> Pose {
    let mut remaining = distance;
    let mut last = Pose {
        position: points.first().copied().unwrap_or(Vec3::ZERO),
        heading: 0.0,
    };

    for pair in points.windows(2) {
        let segment = pair[1] - pair[0];
        let length = segment.length();
        if length < MIN_SEGMENT {
            continue;
        }
        let heading = segment.x.atan2(segment.z);
        if remaining <= length {
            return Pose {
                position: pair[0] + segment * (remaining / length),
                heading,
            };
        }
        remaining -= length;
        last = Pose {
            position: pair[1],
            heading,
        };
    }

    last
}

/// Playback state of one animation on one node.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationState {
    pub animation: Animation,
    pub elapsed_ms: f32,
    pub ended: bool,
}

impl AnimationState {
    pub fn new(animation: Animation) -> Self {
        Self {
            animation,
            elapsed_ms: 0.0,
            ended: false,
        }
    }

    /// Advance the clock. Once the duration is reached the state freezes.
    pub fn advance(&mut self, delta_ms: f32) {
        if self.ended {
            return;
        }
        self.elapsed_ms += delta_ms.max(0.0);
        let duration = self.animation.duration_ms();
        if self.elapsed_ms >= duration {
            self.elapsed_ms = duration;
            self.ended = true;
        }
    }

    pub fn pose(&self) -> Pose {
        self.animation.sample(self.elapsed_ms)
    }

    pub fn matrix(&self) -> Mat4 {
        self.pose().matrix()
    }

    pub fn reset(&mut self) {
        self.elapsed_ms = 0.0;
        self.ended = false;
    }
}

/// Advance a sequential chain: animation `k > 0` only runs once `k - 1` has ended.
pub fn advance_chain(chain: &mut [AnimationState], delta_ms: f32) {
    // Back to front, so an animation that ends during this tick does not
    // start its successor in the same tick.
    for k in (0..chain.len()).rev() {
        if k == 0 || chain[k - 1].ended {
            chain[k].advance(delta_ms);
        }
    }
}

/// Combined matrix of a chain, using the same gating rule as [`advance_chain`].
pub fn chain_matrix(chain: &[AnimationState]) -> Mat4 {
    let mut matrix = Mat4::IDENTITY;
    for (k, state) in chain.iter().enumerate() {
        if k > 0 && !chain[k - 1].ended {
            break;
        }
        matrix *= state.matrix();
    }
    matrix
}

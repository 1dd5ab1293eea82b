//! Wraparound motion on the toroidal field
//!
//! The field is a square of side `field_size`; leaving one edge re-enters
//! from the opposite one. Every position handed back by this module lies in
//! `[0, field_size)` on both axes.

use glam::Vec2;

/// Reduce a single coordinate into `[0, field_size)`
#[inline]
pub fn wrap(v: f32, field_size: f32) -> f32 {
    let w = v.rem_euclid(field_size);
    // A tiny negative input can round up to exactly field_size
    if w >= field_size { 0.0 } else { w }
}

/// Reduce a position into the field on both axes
#[inline]
pub fn wrap_position(p: Vec2, field_size: f32) -> Vec2 {
    Vec2::new(wrap(p.x, field_size), wrap(p.y, field_size))
}

/// Apply `position + velocity * dt` and wrap the result into the field
///
/// Large displacements wrap as many times as needed.
#[inline]
pub fn advance(position: Vec2, velocity: Vec2, dt: f32, field_size: f32) -> Vec2 {
    wrap_position(position + velocity * dt, field_size)
}

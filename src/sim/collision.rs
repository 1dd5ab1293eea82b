//! Collision dispatch
//!
//! Naive pairwise pass over the live set. Entity counts on an arcade field
//! are small, so O(n²) is fine; a uniform grid over the torus would be the
//! place to start if that ever changes.
//!
//! Dispatch carries no game rules: it decides which pairs are worth testing
//! (capability flags), tests them, and tells both sides.

use glam::Vec2;

use super::outline::overlap_on_torus;
use super::participant::{Capabilities, Effects, ParticipantId, ParticipantView};
use super::state::ParticipantState;

/// Field-space shape of one participant for the current frame
struct Shape {
    id: ParticipantId,
    capabilities: Capabilities,
    points: Vec<Vec2>,
}

impl ParticipantState {
    /// Test every interacting pair and deliver overlaps to both sides
    ///
    /// Returns the number of overlapping pairs delivered.
    pub(super) fn dispatch_collisions(&mut self) -> usize {
        let field_size = self.field_size;

        // Outlines follow this frame's motion; nothing is carried over
        let shapes: Vec<Shape> = self
            .live
            .iter()
            .filter_map(|id| {
                let p = self.participants.get(*id)?;
                let body = p.body();
                if body.expired() {
                    return None;
                }
                Some(Shape {
                    id: *id,
                    capabilities: p.capabilities(),
                    points: p.outline().to_field(body.position(), body.rotation()),
                })
            })
            .collect();

        let mut collisions = 0;
        for (i, a) in shapes.iter().enumerate() {
            for b in &shapes[i + 1..] {
                if !Capabilities::interacts(a.capabilities, b.capabilities) {
                    continue;
                }
                // Earlier deliveries this frame may have expired either side
                if self.is_expired(a.id) || self.is_expired(b.id) {
                    continue;
                }
                if !overlap_on_torus(&a.points, &b.points, field_size) {
                    continue;
                }

                let (Some(view_a), Some(view_b)) = (self.view(a.id), self.view(b.id)) else {
                    continue;
                };
                log::trace!(
                    "Collision {:?} ({:?}) <-> {:?} ({:?})",
                    a.id,
                    view_a.kind,
                    b.id,
                    view_b.kind
                );
                collisions += 1;

                // Both directions, even if the first callback expired the other side
                self.deliver_collision(a.id, &view_b);
                self.deliver_collision(b.id, &view_a);
            }
        }
        collisions
    }

    fn deliver_collision(&mut self, id: ParticipantId, other: &ParticipantView) {
        let Some(p) = self.participants.get_mut(id) else {
            return;
        };
        let mut fx = Effects::new(id, &mut self.rng);
        p.collided_with(other, &mut fx);
        let outcome = fx.finish();
        self.apply(outcome);
    }
}

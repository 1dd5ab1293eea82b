//! Participant registry
//!
//! Owns every participant and runs one frame at a time. Structural changes
//! (additions and removals) are buffered and reconciled at a single commit
//! point at the top of [`ParticipantState::advance`], so nothing is ever
//! inserted into or removed from the live set while it is being walked.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use slotmap::SlotMap;

use super::countdown::{CountdownScheduler, Fired};
use super::participant::{
    CountdownRequest, Effects, GameEvent, Outcome, Participant, ParticipantId, ParticipantKind,
    ParticipantView,
};
use crate::consts::FIELD_SIZE;

/// What happened during one call to [`ParticipantState::advance`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Frame number (1-based)
    pub frame: u64,
    /// Pending participants that joined the live set
    pub committed: usize,
    /// Expired participants removed
    pub purged: usize,
    /// Overlapping pairs delivered to participants
    pub collisions: usize,
    /// Countdowns delivered to their targets
    pub countdowns_fired: usize,
}

/// Registry of every participant on one field
pub struct ParticipantState {
    pub(super) field_size: f32,
    frame: u64,
    pub(super) participants: SlotMap<ParticipantId, Box<dyn Participant>>,
    /// Committed participants, in commit order
    pub(super) live: Vec<ParticipantId>,
    /// Registered but not yet committed
    pending_add: Vec<ParticipantId>,
    /// Expired but not yet purged
    pending_remove: Vec<ParticipantId>,
    countdowns: CountdownScheduler,
    /// Countdowns on pending participants, armed when their target commits
    pending_countdowns: Vec<CountdownRequest>,
    events: Vec<GameEvent>,
    pub(super) rng: Pcg32,
}

impl std::fmt::Debug for ParticipantState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParticipantState")
            .field("field_size", &self.field_size)
            .field("frame", &self.frame)
            .field("live", &self.live.len())
            .field("pending_add", &self.pending_add.len())
            .field("pending_remove", &self.pending_remove.len())
            .field("countdowns", &self.countdowns.armed_count())
            .field("pending_countdowns", &self.pending_countdowns.len())
            .finish()
    }
}

impl ParticipantState {
    /// Empty registry on a square field of side `field_size`
    pub fn new(field_size: f32, seed: u64) -> Self {
        let field_size = if field_size.is_finite() && field_size > 0.0 {
            field_size
        } else {
            log::warn!("Invalid field size {}, using {}", field_size, FIELD_SIZE);
            FIELD_SIZE
        };

        Self {
            field_size,
            frame: 0,
            participants: SlotMap::with_key(),
            live: Vec::new(),
            pending_add: Vec::new(),
            pending_remove: Vec::new(),
            countdowns: CountdownScheduler::new(),
            pending_countdowns: Vec::new(),
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn field_size(&self) -> f32 {
        self.field_size
    }

    /// Frames advanced so far
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Shared simulation RNG
    pub fn rng(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    /// Register a participant; it joins the live set at the next commit point
    pub fn add_participant(&mut self, participant: Box<dyn Participant>) -> ParticipantId {
        let id = self.participants.insert(participant);
        self.pending_add.push(id);

        if let Some(p) = self.participants.get_mut(id) {
            let mut fx = Effects::new(id, &mut self.rng);
            p.registered(&mut fx);
            let outcome = fx.finish();
            self.apply(outcome);
        }
        id
    }

    /// Expire a participant
    ///
    /// Idempotent: `None`, stale ids and already-expired participants are
    /// ignored. Returns whether this call did the expiring.
    pub fn expire(&mut self, id: Option<ParticipantId>) -> bool {
        let Some(id) = id else {
            return false;
        };
        let Some(p) = self.participants.get_mut(id) else {
            return false;
        };
        if !p.body_mut().mark_expired() {
            return false;
        }

        self.pending_remove.push(id);
        let before = self.pending_countdowns.len();
        self.pending_countdowns.retain(|c| c.target != id);
        let held = before - self.pending_countdowns.len();
        let cancelled = self.countdowns.cancel_target(id) + held;
        if cancelled > 0 {
            log::trace!("Expiry of {:?} cancelled {} countdown(s)", id, cancelled);
        }
        true
    }

    /// Whether `id` is unknown, purged, or marked expired
    pub fn is_expired(&self, id: ParticipantId) -> bool {
        !self.is_live(id)
    }

    fn is_live(&self, id: ParticipantId) -> bool {
        self.participants
            .get(id)
            .is_some_and(|p| !p.body().expired())
    }

    /// Arm a countdown on `target`; refused for expired or unknown targets
    ///
    /// A target that has not been committed yet keeps its countdown on hold
    /// until the commit point, so it never ticks before the target is live.
    pub fn schedule_countdown(&mut self, target: ParticipantId, ticks: u32, payload: u32) -> bool {
        if !self.is_live(target) {
            return false;
        }
        if self.pending_add.contains(&target) {
            self.pending_countdowns.push(CountdownRequest {
                target,
                ticks,
                payload,
            });
        } else {
            self.countdowns.arm(target, ticks, payload);
        }
        true
    }

    /// Remaining ticks of the countdowns targeting `target`, held ones last
    pub fn countdowns_for(&self, target: ParticipantId) -> Vec<u32> {
        let mut remaining = self.countdowns.remaining_for(target);
        remaining.extend(
            self.pending_countdowns
                .iter()
                .filter(|c| c.target == target)
                .map(|c| c.ticks.max(1)),
        );
        remaining
    }

    /// Run one frame: commit, purge, move, collide, tick countdowns
    pub fn advance(&mut self) -> FrameReport {
        self.frame += 1;
        let mut report = FrameReport {
            frame: self.frame,
            ..Default::default()
        };

        report.committed = self.commit();
        report.purged = self.purge();
        if report.committed > 0 || report.purged > 0 {
            log::debug!(
                "Frame {}: committed {}, purged {}, live {}",
                self.frame,
                report.committed,
                report.purged,
                self.live.len()
            );
        }

        let field_size = self.field_size;
        for id in &self.live {
            if let Some(p) = self.participants.get_mut(*id) {
                if !p.body().expired() {
                    p.step(field_size);
                }
            }
        }

        report.collisions = self.dispatch_collisions();
        report.countdowns_fired = self.tick_countdowns();
        report
    }

    /// Move pending additions into the live set and arm their countdowns
    ///
    /// Every live body is wrapped back into the field here, which also
    /// catches positions set through [`ParticipantState::get_mut`].
    fn commit(&mut self) -> usize {
        let committed = std::mem::take(&mut self.pending_add);
        let count = committed.len();
        self.live.extend(committed);

        let field_size = self.field_size;
        for id in &self.live {
            if let Some(p) = self.participants.get_mut(*id) {
                p.body_mut().wrap_into(field_size);
            }
        }

        for request in std::mem::take(&mut self.pending_countdowns) {
            if self.is_live(request.target) {
                self.countdowns.arm(request.target, request.ticks, request.payload);
            }
        }
        count
    }

    /// Drop participants expired since the last commit
    fn purge(&mut self) -> usize {
        let doomed = std::mem::take(&mut self.pending_remove);
        if doomed.is_empty() {
            return 0;
        }
        for id in &doomed {
            self.participants.remove(*id);
        }
        let participants = &self.participants;
        self.live.retain(|id| participants.contains_key(*id));
        doomed.len()
    }

    fn tick_countdowns(&mut self) -> usize {
        let participants = &self.participants;
        let fired = self
            .countdowns
            .tick(|id| participants.get(id).is_some_and(|p| !p.body().expired()));

        let mut delivered = 0;
        for Fired { target, payload } in fired {
            // An earlier countdown this tick may have expired the target
            if !self.is_live(target) {
                continue;
            }
            if let Some(p) = self.participants.get_mut(target) {
                let mut fx = Effects::new(target, &mut self.rng);
                p.countdown_complete(payload, &mut fx);
                let outcome = fx.finish();
                self.apply(outcome);
                delivered += 1;
            }
        }
        delivered
    }

    /// Apply what a callback asked for
    pub(super) fn apply(&mut self, outcome: Outcome) {
        let Outcome {
            spawned,
            expired,
            countdowns,
            events,
        } = outcome;

        for request in countdowns {
            self.schedule_countdown(request.target, request.ticks, request.payload);
        }
        self.events.extend(events);
        for participant in spawned {
            self.add_participant(participant);
        }
        for id in expired {
            self.expire(Some(id));
        }
    }

    /// Live participants that are not expired, in commit order
    pub fn participants(&self) -> impl Iterator<Item = &dyn Participant> + '_ {
        self.live
            .iter()
            .filter_map(|id| self.participants.get(*id))
            .filter(|p| !p.body().expired())
            .map(|p| &**p)
    }

    /// Owned copy of every live participant, outlines in field space
    pub fn snapshot(&self) -> Vec<ParticipantView> {
        self.live
            .iter()
            .filter_map(|id| self.view(*id))
            .collect()
    }

    /// View of a single non-expired participant
    pub fn view(&self, id: ParticipantId) -> Option<ParticipantView> {
        self.participants
            .get(id)
            .filter(|p| !p.body().expired())
            .map(|p| ParticipantView::of(id, p.as_ref(), self.field_size))
    }

    pub fn get(&self, id: ParticipantId) -> Option<&dyn Participant> {
        self.participants.get(id).map(|p| &**p)
    }

    pub fn get_mut(&mut self, id: ParticipantId) -> Option<&mut dyn Participant> {
        let p: &mut dyn Participant = self.participants.get_mut(id)?.as_mut();
        Some(p)
    }

    /// Position of a non-expired participant
    pub fn position_of(&self, id: ParticipantId) -> Option<Vec2> {
        self.view(id).map(|v| v.position)
    }

    fn count_kind(&self, kind: ParticipantKind) -> usize {
        self.participants
            .values()
            .filter(|p| !p.body().expired() && p.kind() == kind)
            .count()
    }

    /// Non-expired asteroids, committed or pending
    pub fn count_asteroids(&self) -> usize {
        self.count_kind(ParticipantKind::Asteroid)
    }

    /// Non-expired bullets, committed or pending
    pub fn count_bullets(&self) -> usize {
        self.count_kind(ParticipantKind::Bullet)
    }

    /// Committed participants (expired ones included until purged)
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Participants registered but not yet committed
    pub fn pending_count(&self) -> usize {
        self.pending_add.len()
    }

    /// Events emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Expire everything and empty every buffer
    pub fn clear(&mut self) {
        log::debug!(
            "Clearing {} participant(s), {} countdown(s)",
            self.participants.len(),
            self.countdowns.armed_count()
        );
        self.participants.clear();
        self.live.clear();
        self.pending_add.clear();
        self.pending_remove.clear();
        self.countdowns.clear();
        self.pending_countdowns.clear();
        self.events.clear();
    }
}

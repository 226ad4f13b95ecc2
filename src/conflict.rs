use crate::model::{Placement, Room};
use crate::policy::OverlapPolicies;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ConflictKind {
    TeacherDoubleBooked,
    /// Same subject, same population, and no overlap grant covers it.
    ClassDoubleBooked,
    /// Different subjects for one population. Never suppressible.
    ClassDoubleBookedOtherSubject,
    RoomOverCapacity {
        #[serde(rename = "roomName")]
        room_name: String,
    },
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictKind::TeacherDoubleBooked => f.write_str("teacher double-booked"),
            ConflictKind::ClassDoubleBooked => f.write_str("class double-booked"),
            ConflictKind::ClassDoubleBookedOtherSubject => {
                f.write_str("class double-booked (different subject)")
            }
            ConflictKind::RoomOverCapacity { room_name } => {
                write!(f, "room over capacity ({room_name})")
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    pub has_conflict: bool,
    pub conflicting_placements: Vec<Placement>,
    pub kinds: Vec<ConflictKind>,
    pub reason: String,
}

impl Conflict {
    #[allow(dead_code)]
    pub fn has(&self, kind: &ConflictKind) -> bool {
        self.kinds.contains(kind)
    }

    #[allow(dead_code)]
    pub fn involves(&self, placement_id: &str) -> bool {
        self.conflicting_placements
            .iter()
            .any(|p| p.id == placement_id)
    }
}

#[derive(Default)]
struct Collector {
    seen: HashSet<String>,
    placements: Vec<Placement>,
    kinds: Vec<ConflictKind>,
}

impl Collector {
    fn push(&mut self, placement: &Placement, kind: ConflictKind) {
        if self.seen.insert(placement.id.clone()) {
            self.placements.push(placement.clone());
        }
        if !self.kinds.contains(&kind) {
            self.kinds.push(kind);
        }
    }

    fn finish(self) -> Conflict {
        let reason = self
            .kinds
            .iter()
            .map(|k| k.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        Conflict {
            has_conflict: !self.placements.is_empty(),
            conflicting_placements: self.placements,
            kinds: self.kinds,
            reason,
        }
    }
}

/// Checks `candidate` against `placements` and reports every collision.
///
/// Teacher, class and room checks run independently and their findings are
/// unioned. The candidate itself (matched by id) is skipped, so an existing
/// placement can be re-checked in place. Nothing here blocks a placement;
/// callers decide what a non-empty report means.
pub fn check_conflict(
    candidate: &Placement,
    placements: &[Placement],
    policies: &OverlapPolicies,
    rooms: &[Room],
) -> Conflict {
    let mut out = Collector::default();
    let others = || {
        placements
            .iter()
            .filter(move |p| p.id != candidate.id && p.same_cell(candidate))
    };

    if let Some(teacher) = candidate.teacher() {
        for p in others().filter(|p| p.teacher() == Some(teacher)) {
            out.push(p, ConflictKind::TeacherDoubleBooked);
        }
    }

    let class = &candidate.class_id;
    if !class.is_sentinel() && !class.as_str().is_empty() {
        for p in others().filter(|p| class.shares_population(&p.class_id)) {
            if p.subject != candidate.subject {
                out.push(p, ConflictKind::ClassDoubleBookedOtherSubject);
                continue;
            }
            let allowed = policies.is_overlap_allowed(&candidate.subject, class.grade())
                || policies.is_overlap_allowed(&p.subject, p.class_id.grade());
            if !allowed {
                out.push(p, ConflictKind::ClassDoubleBooked);
            }
        }
    }

    // Unknown room ids carry no capacity constraint.
    if let Some(room) = candidate
        .room()
        .and_then(|id| rooms.iter().find(|r| r.id == id))
    {
        let occupants: Vec<&Placement> = others()
            .filter(|p| p.room() == Some(room.id.as_str()))
            .collect();
        if !occupants.is_empty() && occupants.len() as u64 >= u64::from(room.capacity) {
            for p in occupants {
                out.push(
                    p,
                    ConflictKind::RoomOverCapacity {
                        room_name: room.name.clone(),
                    },
                );
            }
        }
    }

    out.finish()
}

/// Checks a batch as if it were applied in order: each candidate sees the
/// existing placements plus every earlier candidate of the batch.
pub fn check_batch(
    candidates: &[Placement],
    placements: &[Placement],
    policies: &OverlapPolicies,
    rooms: &[Room],
) -> Vec<Conflict> {
    let mut working = placements.to_vec();
    let mut reports = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        reports.push(check_conflict(candidate, &working, policies, rooms));
        working.push(candidate.clone());
    }
    reports
}

/// Ids of every placement that currently reports a conflict.
pub fn conflicting_ids(
    placements: &[Placement],
    policies: &OverlapPolicies,
    rooms: &[Room],
) -> Vec<String> {
    placements
        .iter()
        .filter(|p| check_conflict(p, placements, policies, rooms).has_conflict)
        .map(|p| p.id.clone())
        .collect()
}

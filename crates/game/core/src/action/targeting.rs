//! Targeting system for skills.
//!
//! A [`TargetMode`] names which living units a skill may affect. Resolution is
//! a pure read of the battlefield: candidates come back nearest first, and
//! single-target modes use only the head of the list.

use std::cmp::Ordering;

use crate::engine::Battlefield;
use crate::state::UnitId;

// ============================================================================
// Targeting Mode
// ============================================================================

/// How a skill selects targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TargetMode {
    /// The acting unit.
    SelfOnly,
    /// Nearest other ally, or one about as near.
    CloseAlly,
    /// Nearest enemy, or one about as near.
    CloseEnemy,
    AnyAlly,
    AnyOtherAlly,
    AllAllies,
    AllOtherAllies,
    AnyEnemy,
    AllEnemies,
    Anyone,
    AnyoneElse,
    Everyone,
    EveryoneElse,
}

/// Which side of the actor a candidate must be on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    Allies,
    Enemies,
    Both,
}

impl TargetMode {
    /// Effects go to every candidate, not just the first.
    pub fn is_all(self) -> bool {
        matches!(
            self,
            Self::AllAllies | Self::AllOtherAllies | Self::AllEnemies | Self::Everyone | Self::EveryoneElse
        )
    }

    /// Candidates are cut down to those near the nearest one.
    pub fn is_close(self) -> bool {
        matches!(self, Self::CloseAlly | Self::CloseEnemy)
    }

    /// The actor itself is never a candidate.
    pub fn excludes_self(self) -> bool {
        matches!(
            self,
            Self::CloseAlly
                | Self::AnyOtherAlly
                | Self::AllOtherAllies
                | Self::AnyoneElse
                | Self::EveryoneElse
        )
    }

    fn side(self) -> Side {
        match self {
            Self::SelfOnly
            | Self::CloseAlly
            | Self::AnyAlly
            | Self::AnyOtherAlly
            | Self::AllAllies
            | Self::AllOtherAllies => Side::Allies,
            Self::CloseEnemy | Self::AnyEnemy | Self::AllEnemies => Side::Enemies,
            Self::Anyone | Self::AnyoneElse | Self::Everyone | Self::EveryoneElse => Side::Both,
        }
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// A unit under consideration, measured from the actor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    pub unit: UnitId,
    /// Distance between base coordinates. Decides eligibility.
    pub distance: f64,
    /// Distance between display coordinates. Only breaks ties.
    pub display_distance: f64,
}

impl Candidate {
    fn nearest_first(a: &Candidate, b: &Candidate) -> Ordering {
        a.distance
            .total_cmp(&b.distance)
            .then(a.display_distance.total_cmp(&b.display_distance))
            .then(a.unit.cmp(&b.unit))
    }
}

/// Keeps candidates closer than the nearest distance plus `slack`, nearest first.
pub fn select_close(mut candidates: Vec<Candidate>, slack: f64) -> Vec<UnitId> {
    candidates.sort_by(Candidate::nearest_first);
    let Some(nearest) = candidates.first().map(|c| c.distance) else {
        return Vec::new();
    };
    let limit = nearest + slack;
    candidates
        .into_iter()
        .filter(|c| c.distance < limit)
        .map(|c| c.unit)
        .collect()
}

/// Living units `mode` lets `actor` target, nearest first.
///
/// Returns nothing when the actor is not on the battlefield.
pub fn resolve_targets(field: &Battlefield, actor: UnitId, mode: TargetMode) -> Vec<UnitId> {
    let (Some(unit), Some(team)) = (field.unit(actor), field.team(actor)) else {
        return Vec::new();
    };

    if mode == TargetMode::SelfOnly {
        return if unit.is_defeated() { Vec::new() } else { vec![actor] };
    }

    let side = mode.side();
    let mut candidates: Vec<Candidate> = field
        .units()
        .filter(|(id, other)| {
            if other.is_defeated() || (mode.excludes_self() && *id == actor) {
                return false;
            }
            let same_team = field.team(*id) == Some(team);
            match side {
                Side::Allies => same_team,
                Side::Enemies => !same_team,
                Side::Both => true,
            }
        })
        .filter_map(|(id, _)| {
            Some(Candidate {
                unit: id,
                distance: field.distance(actor, id)?,
                display_distance: field.display_distance(actor, id)?,
            })
        })
        .collect();

    if mode.is_close() {
        return select_close(candidates, field.config().close_distance);
    }
    candidates.sort_by(Candidate::nearest_first);
    candidates.into_iter().map(|c| c.unit).collect()
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    fn candidate(unit: u32, distance: f64) -> Candidate {
        Candidate {
            unit: UnitId(unit),
            distance,
            display_distance: distance,
        }
    }

    #[test]
    fn close_keeps_candidates_within_slack_of_the_nearest() {
        let picked = select_close(
            vec![candidate(3, 13.0), candidate(1, 5.0), candidate(2, 8.0)],
            8.0,
        );
        assert_eq!(picked, vec![UnitId(1), UnitId(2)]);
    }

    #[test]
    fn close_boundary_is_exclusive() {
        let picked = select_close(vec![candidate(1, 5.0), candidate(2, 13.0)], 8.0);
        assert_eq!(picked, vec![UnitId(1)]);
    }

    #[test]
    fn ties_break_on_display_distance_then_id() {
        let mut jittered = candidate(1, 10.0);
        jittered.display_distance = 10.4;
        let mut steady = candidate(2, 10.0);
        steady.display_distance = 9.8;

        let picked = select_close(vec![jittered, steady, candidate(0, 10.0)], 0.5);
        assert_eq!(picked, vec![UnitId(2), UnitId(0), UnitId(1)]);
    }

    #[test]
    fn jitter_never_decides_eligibility() {
        let mut near = candidate(1, 5.0);
        near.display_distance = 5.4;
        let mut edge = candidate(2, 13.0);
        edge.display_distance = 12.6;

        assert_eq!(select_close(vec![near, edge], 8.0), vec![UnitId(1)]);
    }

    #[test]
    fn empty_pool_selects_nothing() {
        assert!(select_close(Vec::new(), 8.0).is_empty());
    }

    #[test]
    fn mode_classification() {
        let all: Vec<_> = TargetMode::iter().filter(|m| m.is_all()).collect();
        assert_eq!(
            all,
            vec![
                TargetMode::AllAllies,
                TargetMode::AllOtherAllies,
                TargetMode::AllEnemies,
                TargetMode::Everyone,
                TargetMode::EveryoneElse,
            ]
        );
        assert!(TargetMode::CloseAlly.excludes_self());
        assert!(!TargetMode::CloseEnemy.excludes_self());
        assert_eq!(TargetMode::CloseEnemy.to_string(), "CloseEnemy");
    }
}

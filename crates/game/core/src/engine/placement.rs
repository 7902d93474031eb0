//! Battlefield geometry.
//!
//! Teams sit on spokes around the centre: team `i` of `n` faces inwards along
//! the angle `2πi/n`, rows step outwards from the front line and slots fan out
//! sideways from the spoke (0, +1, -1, +2, ...). Only distances matter to the
//! rules; the layout exists so that "close" is meaningful.

use std::f64::consts::TAU;

use crate::config::BattleConfig;
use crate::state::TeamId;

/// A 2-D coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance.
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn offset(self, by: Point) -> Self {
        Self::new(self.x + by.x, self.y + by.y)
    }
}

/// Where a unit stands.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Location {
    pub team: TeamId,
    pub row: u8,
    /// Order of arrival within the team's row.
    pub slot: u32,
    /// Presentation-only displacement from the base coordinate.
    pub jitter: Point,
}

impl Location {
    /// Exact coordinate given the team's spoke (`team_index` of `team_count`).
    pub fn base(&self, team_index: usize, team_count: usize) -> Point {
        let spokes = team_count.max(2) as f64;
        let angle = TAU * team_index as f64 / spokes;
        let (sin, cos) = angle.sin_cos();

        let depth = BattleConfig::FRONT_OFFSET + f64::from(self.row) * BattleConfig::ROW_SPACING;
        let lateral = slot_lateral(self.slot) * BattleConfig::SLOT_SPACING;

        Point::new(cos * depth - sin * lateral, sin * depth + cos * lateral)
    }

    /// Base coordinate plus jitter.
    pub fn display(&self, team_index: usize, team_count: usize) -> Point {
        self.base(team_index, team_count).offset(self.jitter)
    }
}

/// Sideways step of a slot: 0, +1, -1, +2, -2, ...
fn slot_lateral(slot: u32) -> f64 {
    let step = f64::from(slot.div_ceil(2));
    if slot % 2 == 1 { step } else { -step }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(team: u8, row: u8, slot: u32) -> Location {
        Location {
            team: TeamId(team),
            row,
            slot,
            jitter: Point::ORIGIN,
        }
    }

    #[test]
    fn slots_fan_out_from_the_spoke() {
        assert_eq!(slot_lateral(0), 0.0);
        assert_eq!(slot_lateral(1), 1.0);
        assert_eq!(slot_lateral(2), -1.0);
        assert_eq!(slot_lateral(3), 2.0);
    }

    #[test]
    fn two_teams_face_each_other_across_the_centre() {
        let front_a = at(0, 0, 0).base(0, 2);
        let front_b = at(1, 0, 0).base(1, 2);
        let back_b = at(1, 1, 0).base(1, 2);

        assert!((front_a.distance(front_b) - 2.0 * BattleConfig::FRONT_OFFSET).abs() < 1e-9);
        assert!(
            (front_a.distance(back_b) - (2.0 * BattleConfig::FRONT_OFFSET + BattleConfig::ROW_SPACING))
                .abs()
                < 1e-9
        );
    }

    #[test]
    fn jitter_only_moves_the_display_coordinate() {
        let mut loc = at(0, 0, 1);
        loc.jitter = Point::new(0.25, -0.25);
        let base = loc.base(0, 2);
        let display = loc.display(0, 2);
        assert_eq!(display, Point::new(base.x + 0.25, base.y - 0.25));
    }
}

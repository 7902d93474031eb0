//! Battle presentation through `tracing`.

use battle_core::{ActionReport, BattleEvent, BattleSink, Resolution, TeamId, UnitId};

/// Logs every report as it arrives and keeps a tally for the summary.
#[derive(Debug, Default)]
pub struct LogPresenter {
    actions: usize,
    defeats: usize,
    winner: Option<Option<TeamId>>,
}

impl LogPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn actions(&self) -> usize {
        self.actions
    }

    pub fn defeats(&self) -> usize {
        self.defeats
    }

    /// `None` until the battle is over, then the winner if there was one.
    pub fn outcome(&self) -> Option<Option<TeamId>> {
        self.winner
    }
}

impl BattleSink for LogPresenter {
    fn on_action(&mut self, report: &ActionReport) {
        self.actions += 1;
        let snapshot = &report.snapshot;
        let name = |id: UnitId| snapshot.unit(id).map_or("?", |u| u.name.as_str());

        match &report.resolution {
            Resolution::Applied { targets } => {
                let targets: Vec<&str> = targets.iter().map(|id| name(*id)).collect();
                tracing::info!(
                    at = %snapshot.clock,
                    "{} uses {} on {}",
                    report.actor_name(),
                    report.skill,
                    if targets.is_empty() { "nobody".to_string() } else { targets.join(", ") }
                );
            }
            Resolution::Partial => {
                tracing::info!(at = %snapshot.clock, "{} partly lands {}", report.actor_name(), report.skill);
            }
            Resolution::Failed => {}
        }
    }

    fn on_event(&mut self, event: &BattleEvent) {
        match event {
            BattleEvent::Joined { unit, team } => tracing::debug!(%unit, %team, "joined"),
            BattleEvent::Left { unit } => tracing::info!(%unit, "left the battlefield"),
            BattleEvent::StatusApplied {
                unit,
                status,
                outcome,
            } => tracing::debug!(%unit, %status, ?outcome, "status applied"),
            BattleEvent::StatusRemoved { unit, status } => {
                tracing::debug!(%unit, %status, "status removed")
            }
            BattleEvent::Defeated { unit } => {
                self.defeats += 1;
                tracing::info!(%unit, "defeated");
            }
        }
    }

    fn on_battle_end(&mut self, winner: Option<TeamId>) {
        self.winner = Some(winner);
        match winner {
            Some(team) => tracing::info!(actions = self.actions, "{team} wins"),
            None => tracing::info!(actions = self.actions, "no winner"),
        }
    }
}

#[cfg(test)]
mod tests {
    use battle_core::{
        BattleConfig, Battlefield, Cooldown, Guard, Skill, SkillSpec, Status, StatusDuration,
        StatusFlags, StatusSpec, TargetMode, Unit, UnitSpec,
    };

    use super::*;

    fn knockout() -> Status {
        Status::new(StatusSpec {
            flags: StatusFlags::DEFEATING,
            apply_guard: Guard::Always,
            ..StatusSpec::new("Knockout", "Out cold", StatusDuration::Infinite)
        })
        .unwrap()
    }

    fn boxer(name: &str, cooldown: u64) -> Unit {
        let punch = Skill::new(SkillSpec {
            effects: vec![knockout()],
            ..SkillSpec::new(name, "One punch", TargetMode::CloseEnemy, Cooldown::Every(cooldown))
        })
        .unwrap();
        Unit::new(UnitSpec::new(name, 0, vec![punch])).unwrap()
    }

    #[test]
    fn tallies_a_one_punch_battle() {
        let mut field = Battlefield::new(BattleConfig::deterministic()).unwrap();
        field.add_unit(boxer("Red", 100), TeamId(0));
        field.add_unit(boxer("Blue", 200), TeamId(1));

        let mut presenter = LogPresenter::new();
        let winner = field.run(&mut presenter);

        assert_eq!(winner, Some(TeamId(0)));
        assert_eq!(presenter.actions(), 1);
        assert_eq!(presenter.defeats(), 1);
        assert_eq!(presenter.outcome(), Some(Some(TeamId(0))));
    }
}

//! Name resolution from definition records into core templates.
//!
//! Statuses nest the statuses their triggers apply, and skills nest their
//! effects and sub-skills, so every reference is resolved into an owned copy.
//! Reference cycles therefore cannot be represented and are load errors.

use std::collections::BTreeMap;

use anyhow::Context;
use battle_core::{
    Cooldown, Reaction, Skill, SkillSpec, Status, StatusDuration, StatusSpec, StatusTrigger,
    TeamId, Unit, UnitSpec,
};

use crate::loaders::{
    FighterDef, LoadResult, ReactionDef, ScenarioDef, SkillDef, StatusDef,
};

/// Validated, name-indexed battle content.
#[derive(Debug, Clone, Default)]
pub struct ContentLibrary {
    statuses: BTreeMap<String, StatusDef>,
    skills: BTreeMap<String, SkillDef>,
    fighters: BTreeMap<String, FighterDef>,
}

impl ContentLibrary {
    /// Indexes the definitions and builds every one of them once, so that
    /// broken content fails here rather than mid-battle.
    pub fn new(
        statuses: Vec<StatusDef>,
        skills: Vec<SkillDef>,
        fighters: Vec<FighterDef>,
    ) -> LoadResult<Self> {
        let library = Self {
            statuses: index("status", statuses, |d| &d.name)?,
            skills: index("skill", skills, |d| &d.name)?,
            fighters: index("fighter", fighters, |d| &d.name)?,
        };

        for name in library.statuses.keys() {
            library.status(name)?;
        }
        for name in library.skills.keys() {
            library.skill(name)?;
        }
        for name in library.fighters.keys() {
            library.unit(name)?;
        }
        tracing::debug!(
            statuses = library.statuses.len(),
            skills = library.skills.len(),
            fighters = library.fighters.len(),
            "content library ready"
        );
        Ok(library)
    }

    pub fn status_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.statuses.keys().map(String::as_str)
    }

    pub fn skill_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.skills.keys().map(String::as_str)
    }

    pub fn fighter_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.fighters.keys().map(String::as_str)
    }

    /// Builds a fresh status template.
    pub fn status(&self, name: &str) -> LoadResult<Status> {
        self.build_status(name, &mut Vec::new())
    }

    /// Builds a fresh skill, cooldown reset.
    pub fn skill(&self, name: &str) -> LoadResult<Skill> {
        self.build_skill(name, &mut Vec::new())
    }

    /// Builds a fresh unit of the named fighter.
    pub fn unit(&self, name: &str) -> LoadResult<Unit> {
        let def = self
            .fighters
            .get(name)
            .with_context(|| format!("unknown fighter '{name}'"))?;
        let skills = def
            .skills
            .iter()
            .map(|skill| self.skill(skill))
            .collect::<LoadResult<Vec<_>>>()
            .with_context(|| format!("in fighter '{name}'"))?;
        Ok(Unit::new(UnitSpec::new(&def.name, def.row, skills))?)
    }

    /// Builds the units of a scenario, paired with their team.
    pub fn muster(&self, scenario: &ScenarioDef) -> LoadResult<Vec<(TeamId, Unit)>> {
        let mut units = Vec::new();
        for (index, squad) in scenario.teams.iter().enumerate() {
            let team = TeamId(
                u8::try_from(index)
                    .with_context(|| format!("scenario '{}' has too many teams", scenario.name))?,
            );
            for fighter in squad {
                let unit = self
                    .unit(fighter)
                    .with_context(|| format!("in scenario '{}'", scenario.name))?;
                units.push((team, unit));
            }
        }
        Ok(units)
    }

    fn build_status(&self, name: &str, path: &mut Vec<String>) -> LoadResult<Status> {
        enter("status", name, path)?;
        let def = self
            .statuses
            .get(name)
            .with_context(|| format!("unknown status '{name}'"))?;

        let mut triggers = Vec::with_capacity(def.triggers.len());
        for trigger in &def.triggers {
            let reaction = match &trigger.reaction {
                ReactionDef::Apply(target) => Reaction::Apply(Box::new(
                    self.build_status(target, path)
                        .with_context(|| format!("in trigger of status '{name}'"))?,
                )),
                ReactionDef::Remove(target) => {
                    if !self.statuses.contains_key(target) {
                        anyhow::bail!("status '{name}' removes unknown status '{target}'");
                    }
                    Reaction::Remove(target.clone())
                }
            };
            triggers.push(StatusTrigger {
                on: trigger.on,
                reaction,
            });
        }
        path.pop();

        Ok(Status::new(StatusSpec {
            name: def.name.clone(),
            description: def.description.clone(),
            duration: StatusDuration::from_millis(def.duration),
            stacks: def.stacks,
            flags: def.flags,
            apply_guard: def.apply_guard.clone(),
            remove_guard: def.remove_guard.clone(),
            triggers,
        })?)
    }

    fn build_skill(&self, name: &str, path: &mut Vec<String>) -> LoadResult<Skill> {
        enter("skill", name, path)?;
        let def = self
            .skills
            .get(name)
            .with_context(|| format!("unknown skill '{name}'"))?;

        let effects = def
            .effects
            .iter()
            .map(|effect| self.status(effect))
            .collect::<LoadResult<Vec<_>>>()
            .with_context(|| format!("in effects of skill '{name}'"))?;
        for requirement in &def.requirements {
            if !self.statuses.contains_key(requirement) {
                anyhow::bail!("skill '{name}' requires unknown status '{requirement}'");
            }
        }
        let mut sub_skills = Vec::with_capacity(def.sub_skills.len());
        for sub in &def.sub_skills {
            sub_skills.push(
                self.build_skill(sub, path)
                    .with_context(|| format!("in sub-skills of skill '{name}'"))?,
            );
        }
        path.pop();

        Ok(Skill::new(SkillSpec {
            name: def.name.clone(),
            description: def.description.clone(),
            target: def.target,
            cooldown: Cooldown::from_millis(def.cooldown),
            guard: def.guard.clone(),
            effects,
            requirements: def.requirements.clone(),
            sub_skills,
        })?)
    }
}

/// Pushes `name` onto the resolution path, failing if it is already on it.
fn enter(kind: &str, name: &str, path: &mut Vec<String>) -> LoadResult<()> {
    if path.iter().any(|seen| seen == name) {
        let mut chain = path.clone();
        chain.push(name.to_string());
        anyhow::bail!("{kind} reference cycle: {}", chain.join(" -> "));
    }
    path.push(name.to_string());
    Ok(())
}

fn index<T>(kind: &str, defs: Vec<T>, name: impl Fn(&T) -> &String) -> LoadResult<BTreeMap<String, T>> {
    let mut map = BTreeMap::new();
    for def in defs {
        let key = name(&def).clone();
        if map.contains_key(&key) {
            anyhow::bail!("duplicate {kind} '{key}'");
        }
        map.insert(key, def);
    }
    Ok(map)
}

//! Teams and formations: composition invariants, element synergy, and
//! formation activation.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::element::Element;
use super::grid::GridPosition;
use super::stats::Stat;

pub const MAX_TEAM_MEMBERS: usize = 5;
pub const MAX_TEAMS_PER_PLAYER: usize = 10;
/// Power bonus per unordered same-element adjacent pair.
pub const SYNERGY_BONUS_PER_PAIR: u64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TeamError {
    #[error("team is full")]
    Full,
    #[error("hero is already in the team")]
    DuplicateHero,
    #[error("position is already occupied")]
    PositionOccupied,
    #[error("hero is not in the team")]
    MemberNotFound,
}

/// One occupied slot: a hero reference plus its grid cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSlot {
    pub hero_id: String,
    pub element: Element,
    pub power: u64,
    pub position: GridPosition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BonusKind {
    Flat,
    Percent,
}

/// A single formation bonus: which stat (or "all"), how much, and whether it
/// is flat or percent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormationBonus {
    /// None means the bonus applies to overall power ("all").
    pub stat: Option<Stat>,
    pub value: f64,
    pub kind: BonusKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Formation {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Distinct elements required, 0 for none.
    pub required_elements: usize,
    /// Specific hero templates that must all be present.
    pub required_heroes: Vec<String>,
    pub min_members: usize,
    pub bonuses: Vec<FormationBonus>,
}

impl Formation {
    /// All requirements must hold for the formation to be active.
    pub fn is_active_for(&self, team: &Team, member_templates: &[String]) -> bool {
        if team.members.len() < self.min_members {
            return false;
        }
        if self.required_elements > 0 {
            let distinct: HashSet<Element> = team.members.iter().map(|s| s.element).collect();
            if distinct.len() < self.required_elements {
                return false;
            }
        }
        if !self.required_heroes.is_empty() {
            let owned: HashSet<&str> = member_templates.iter().map(|s| s.as_str()).collect();
            if !self.required_heroes.iter().all(|h| owned.contains(h.as_str())) {
                return false;
            }
        }
        true
    }

    /// Summed percent bonus for overall power.
    pub fn all_percent_bonus(&self) -> f64 {
        self.bonuses
            .iter()
            .filter(|b| b.stat.is_none() && b.kind == BonusKind::Percent)
            .map(|b| b.value)
            .sum()
    }
}

/// A player-owned team composition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub player_id: String,
    pub name: String,
    pub slot_number: u32,
    pub members: Vec<TeamSlot>,
    pub formation_id: Option<String>,
    pub is_default: bool,
}

impl Team {
    pub fn new(id: &str, player_id: &str, name: &str, slot_number: u32, is_default: bool) -> Self {
        Team {
            id: id.to_string(),
            player_id: player_id.to_string(),
            name: name.to_string(),
            slot_number,
            members: Vec::new(),
            formation_id: None,
            is_default,
        }
    }

    /// Add a member, enforcing the size cap, hero uniqueness, and position
    /// uniqueness. On error nothing changes.
    pub fn add_member(&mut self, slot: TeamSlot) -> Result<(), TeamError> {
        if self.members.len() >= MAX_TEAM_MEMBERS {
            return Err(TeamError::Full);
        }
        if self.members.iter().any(|m| m.hero_id == slot.hero_id) {
            return Err(TeamError::DuplicateHero);
        }
        if self.members.iter().any(|m| m.position == slot.position) {
            return Err(TeamError::PositionOccupied);
        }
        self.members.push(slot);
        Ok(())
    }

    pub fn remove_member(&mut self, hero_id: &str) -> Result<TeamSlot, TeamError> {
        let pos = self
            .members
            .iter()
            .position(|m| m.hero_id == hero_id)
            .ok_or(TeamError::MemberNotFound)?;
        Ok(self.members.remove(pos))
    }

    pub fn move_member(&mut self, hero_id: &str, position: GridPosition) -> Result<(), TeamError> {
        if self
            .members
            .iter()
            .any(|m| m.position == position && m.hero_id != hero_id)
        {
            return Err(TeamError::PositionOccupied);
        }
        let member = self
            .members
            .iter_mut()
            .find(|m| m.hero_id == hero_id)
            .ok_or(TeamError::MemberNotFound)?;
        member.position = position;
        Ok(())
    }

    pub fn member_at(&self, position: GridPosition) -> Option<&TeamSlot> {
        self.members.iter().find(|m| m.position == position)
    }

    /// +50 power per unordered pair of adjacent same-element members.
    pub fn element_synergy(&self) -> u64 {
        let mut bonus = 0;
        for (i, a) in self.members.iter().enumerate() {
            for b in &self.members[i + 1..] {
                if a.element == b.element && a.position.is_adjacent(&b.position) {
                    bonus += SYNERGY_BONUS_PER_PAIR;
                }
            }
        }
        bonus
    }

    /// Member power sum plus synergy, scaled by the formation's "all" percent
    /// bonus when one is active.
    pub fn total_power(&self, active_formation: Option<&Formation>) -> u64 {
        let base: u64 = self.members.iter().map(|m| m.power).sum();
        let scaled = match active_formation {
            Some(f) => (base as f64 * (1.0 + f.all_percent_bonus() / 100.0)) as u64,
            None => base,
        };
        scaled + self.element_synergy()
    }
}

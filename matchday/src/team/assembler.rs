//! Team assembly rules.
//!
//! Storage backends call [`check_groups`] while holding the event lock, so
//! the participant set and the existing teams they pass in are the ones the
//! new teams will be created against.

use std::collections::BTreeSet;

use super::models::{NewTeam, Team};
use crate::errors::{Entity, RosterError, RosterResult};
use crate::event::models::EventId;
use crate::tournament::models::TournamentPlayerId;

/// Check every group against the tournament team size, the event roster and
/// the teams the event already has.
///
/// Groups are checked in order and the first violation is returned. A member
/// of an existing team counts as already placed.
///
/// # Errors
///
/// * `RosterError::MissingField` - Group with a blank name
/// * `RosterError::DuplicateName` - Team name already used in the event
/// * `RosterError::TeamSizeExceeded` - Group larger than `teams_n`
/// * `RosterError::NotEventParticipant` - Member not admitted to the event
/// * `RosterError::DuplicateTeamMember` - Member placed in two teams
pub fn check_groups(
    event_id: EventId,
    teams_n: i32,
    participants: &BTreeSet<TournamentPlayerId>,
    existing: &[Team],
    groups: &[NewTeam],
) -> RosterResult<()> {
    let mut names: BTreeSet<&str> = existing.iter().map(|team| team.name.as_str()).collect();
    let mut placed: BTreeSet<TournamentPlayerId> = existing
        .iter()
        .flat_map(|team| team.players.iter().copied())
        .collect();

    for group in groups {
        let name = group.name.trim();
        if name.is_empty() {
            return Err(RosterError::MissingField("name"));
        }
        if !names.insert(name) {
            return Err(RosterError::DuplicateName {
                entity: Entity::Team,
                name: name.to_string(),
            });
        }

        if group.players.len() > teams_n.max(0) as usize {
            return Err(RosterError::TeamSizeExceeded {
                team: group.name.clone(),
                size: group.players.len(),
                limit: teams_n,
            });
        }

        for &member in &group.players {
            if !participants.contains(&member) {
                return Err(RosterError::NotEventParticipant {
                    tournament_player_id: member,
                    event_id,
                });
            }
            if !placed.insert(member) {
                return Err(RosterError::DuplicateTeamMember(member));
            }
        }
    }

    Ok(())
}

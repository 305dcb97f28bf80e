//! Event membership reconciliation.
//!
//! A reconcile request names tournament players whose event membership
//! should flip: members are released, non-members are admitted. The request
//! is never read as a replacement roster.
//!
//! Planning is pure so both storage backends share it; they run it while
//! holding the event lock and apply the whole plan or nothing.

use std::collections::BTreeSet;

use crate::errors::{RosterError, RosterResult};
use crate::tournament::models::{TournamentId, TournamentPlayerId};

/// Changes to apply to an event roster
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TogglePlan {
    /// Players to add
    pub admit: BTreeSet<TournamentPlayerId>,
    /// Players to remove
    pub release: BTreeSet<TournamentPlayerId>,
}

impl TogglePlan {
    /// Split `requested` by current membership
    pub fn new(
        current: &BTreeSet<TournamentPlayerId>,
        requested: &BTreeSet<TournamentPlayerId>,
    ) -> Self {
        let (release, admit): (BTreeSet<_>, BTreeSet<_>) =
            requested.iter().partition(|id| current.contains(*id));
        Self { admit, release }
    }

    pub fn is_empty(&self) -> bool {
        self.admit.is_empty() && self.release.is_empty()
    }

    /// Apply to an in-memory roster
    pub fn apply(&self, roster: &mut BTreeSet<TournamentPlayerId>) {
        for id in &self.release {
            roster.remove(id);
        }
        roster.extend(self.admit.iter().copied());
    }
}

/// Reject any requested id that is not a tournament player of `tournament_id`.
///
/// `tournament_roster` holds the ids of the tournament's player records.
pub fn check_scope(
    tournament_id: TournamentId,
    tournament_roster: &BTreeSet<TournamentPlayerId>,
    requested: &BTreeSet<TournamentPlayerId>,
) -> RosterResult<()> {
    match requested.difference(tournament_roster).next() {
        Some(&stray) => Err(RosterError::CrossTournamentReference {
            tournament_player_id: stray,
            tournament_id,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn set(ids: &[TournamentPlayerId]) -> BTreeSet<TournamentPlayerId> {
        ids.iter().copied().collect()
    }

    #[test]
    fn test_plan_splits_members_and_newcomers() {
        let plan = TogglePlan::new(&set(&[1, 2]), &set(&[2, 3]));
        assert_eq!(plan.release, set(&[2]));
        assert_eq!(plan.admit, set(&[3]));
    }

    #[test]
    fn test_apply_is_symmetric_difference() {
        let mut roster = set(&[1, 2]);
        TogglePlan::new(&roster, &set(&[2, 3])).apply(&mut roster);
        assert_eq!(roster, set(&[1, 3]));
    }

    #[test]
    fn test_empty_request_is_noop() {
        let plan = TogglePlan::new(&set(&[1]), &BTreeSet::new());
        assert!(plan.is_empty());
    }

    #[test]
    fn test_scope_rejects_foreign_player() {
        let err = check_scope(4, &set(&[1, 2]), &set(&[2, 5])).unwrap_err();
        assert!(matches!(
            err,
            RosterError::CrossTournamentReference {
                tournament_player_id: 5,
                tournament_id: 4
            }
        ));
        assert!(check_scope(4, &set(&[1, 2]), &set(&[1])).is_ok());
    }

    proptest! {
        #[test]
        fn prop_toggle_twice_restores_roster(
            current in prop::collection::btree_set(0i64..50, 0..20),
            requested in prop::collection::btree_set(0i64..50, 0..20),
        ) {
            let mut roster = current.clone();
            TogglePlan::new(&roster, &requested).apply(&mut roster);
            TogglePlan::new(&roster, &requested).apply(&mut roster);
            prop_assert_eq!(roster, current);
        }

        #[test]
        fn prop_toggle_matches_symmetric_difference(
            current in prop::collection::btree_set(0i64..50, 0..20),
            requested in prop::collection::btree_set(0i64..50, 0..20),
        ) {
            let mut roster = current.clone();
            TogglePlan::new(&roster, &requested).apply(&mut roster);
            let expected: BTreeSet<_> = current.symmetric_difference(&requested).copied().collect();
            prop_assert_eq!(roster, expected);
        }
    }
}

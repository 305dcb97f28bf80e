//! PostgreSQL repository.
//!
//! Every mutating call runs in one transaction bounded by
//! [`within_transaction_timeout`]. Calls that read-modify-write an event lock
//! its row with `SELECT ... FOR UPDATE` first, so concurrent reconciliations
//! of the same event are serialized.

use async_trait::async_trait;
use sqlx::postgres::{PgConnection, PgPool, PgRow};
use sqlx::Row;
use std::collections::BTreeSet;
use std::sync::Arc;

use super::repository::{
    AccountRepository, EventRepository, Repository, TeamRepository, TournamentRepository,
};
use super::timeouts::{with_default_timeout, within_transaction_timeout};
use crate::auth::models::{Account, AccountCredentials, AccountId, NewAccount};
use crate::errors::{Entity, RosterError, RosterResult};
use crate::event::models::{Event, EventDraft, EventId, EventStatus};
use crate::identity::models::{Player, PlayerId};
use crate::membership::{self, TogglePlan};
use crate::team::assembler;
use crate::team::models::{NewTeam, Team};
use crate::tournament::models::{
    NewTournament, Tournament, TournamentChanges, TournamentId, TournamentPlayer,
    TournamentPlayerId,
};

const ACCOUNT_COLUMNS: &str = "id, email, name, is_active, is_admin, created_at";

const EVENT_COLUMNS: &str =
    "id, tournament_id, name, sport, start_date, end_date, status, created_by, created_at";

/// Repository backed by a PostgreSQL pool
#[derive(Clone)]
pub struct PgRepository {
    pool: Arc<PgPool>,
}

impl PgRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

/// Map a unique violation on insert/update to a domain error
fn unique_violation(err: sqlx::Error, entity: Entity, name: &str) -> RosterError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return RosterError::DuplicateName {
                entity,
                name: name.to_string(),
            };
        }
    }
    RosterError::Database(err)
}

/// Map a foreign key violation to a not-found error for the referenced record
fn missing_reference(err: sqlx::Error, entity: Entity, id: i64) -> RosterError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_foreign_key_violation() {
            return RosterError::not_found(entity, id);
        }
    }
    RosterError::Database(err)
}

fn account_from_row(row: &PgRow) -> Account {
    Account {
        id: row.get("id"),
        email: row.get("email"),
        name: row.get("name"),
        is_active: row.get("is_active"),
        is_admin: row.get("is_admin"),
        created_at: row.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
    }
}

fn tournament_player_from_row(row: &PgRow) -> TournamentPlayer {
    TournamentPlayer {
        id: row.get("id"),
        player_id: row.get("player_id"),
        tournament_id: row.get("tournament_id"),
        created_at: row.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
    }
}

fn event_from_row(row: &PgRow, players: BTreeSet<TournamentPlayerId>) -> RosterResult<Event> {
    let status: String = row.get("status");
    let status: EventStatus = status
        .parse()
        .map_err(|e: crate::event::models::ParseStatusError| {
            RosterError::Database(sqlx::Error::Decode(Box::new(e)))
        })?;

    Ok(Event {
        id: row.get("id"),
        tournament_id: row.get("tournament_id"),
        name: row.get("name"),
        sport: row.get("sport"),
        start_date: row.get("start_date"),
        end_date: row.get("end_date"),
        status,
        created_by: row.get("created_by"),
        created_at: row.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
        players,
    })
}

async fn load_tournament(
    conn: &mut PgConnection,
    tournament_id: TournamentId,
) -> RosterResult<Tournament> {
    let row = sqlx::query(
        "SELECT id, name, description, teams_n, created_at FROM tournaments WHERE id = $1",
    )
    .bind(tournament_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(RosterError::not_found(Entity::Tournament, tournament_id))?;

    let players: Vec<PlayerId> = sqlx::query_scalar(
        "SELECT player_id FROM tournament_players WHERE tournament_id = $1 ORDER BY player_id",
    )
    .bind(tournament_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(Tournament {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        teams_n: row.get("teams_n"),
        created_at: row.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
        players,
    })
}

async fn event_players(
    conn: &mut PgConnection,
    event_id: EventId,
) -> RosterResult<BTreeSet<TournamentPlayerId>> {
    let ids: Vec<TournamentPlayerId> =
        sqlx::query_scalar("SELECT tournament_player_id FROM event_players WHERE event_id = $1")
            .bind(event_id)
            .fetch_all(&mut *conn)
            .await?;
    Ok(ids.into_iter().collect())
}

/// Teams of an event with their members, ordered by id
async fn event_teams(conn: &mut PgConnection, event_id: EventId) -> RosterResult<Vec<Team>> {
    let rows = sqlx::query(
        "SELECT teams.id, teams.name,
                COALESCE(ARRAY_AGG(team_players.tournament_player_id)
                         FILTER (WHERE team_players.tournament_player_id IS NOT NULL),
                         '{}') AS players
         FROM teams
         LEFT JOIN team_players ON team_players.team_id = teams.id
         WHERE teams.event_id = $1
         GROUP BY teams.id, teams.name
         ORDER BY teams.id",
    )
    .bind(event_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .iter()
        .map(|r| Team {
            id: r.get("id"),
            event_id,
            name: r.get("name"),
            players: r
                .get::<Vec<TournamentPlayerId>, _>("players")
                .into_iter()
                .collect(),
        })
        .collect())
}

/// Load an event, optionally locking its row for the rest of the transaction
async fn load_event(
    conn: &mut PgConnection,
    event_id: EventId,
    for_update: bool,
) -> RosterResult<Event> {
    let lock = if for_update { " FOR UPDATE" } else { "" };
    let row = sqlx::query(&format!(
        "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1{lock}"
    ))
    .bind(event_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(RosterError::not_found(Entity::Event, event_id))?;

    let players = event_players(conn, event_id).await?;
    event_from_row(&row, players)
}

async fn register_in(
    conn: &mut PgConnection,
    tournament_id: TournamentId,
    players: &BTreeSet<PlayerId>,
) -> RosterResult<Vec<TournamentPlayer>> {
    if players.is_empty() {
        return Ok(Vec::new());
    }
    let requested: Vec<PlayerId> = players.iter().copied().collect();

    let known: Vec<PlayerId> = sqlx::query_scalar("SELECT id FROM players WHERE id = ANY($1)")
        .bind(&requested)
        .fetch_all(&mut *conn)
        .await?;
    if let Some(&missing) = requested.iter().find(|id| !known.contains(id)) {
        return Err(RosterError::not_found(Entity::Player, missing));
    }

    sqlx::query(
        "INSERT INTO tournament_players (player_id, tournament_id)
         SELECT player_id, $2 FROM UNNEST($1::BIGINT[]) AS player_id
         ON CONFLICT (player_id, tournament_id) DO NOTHING",
    )
    .bind(&requested)
    .bind(tournament_id)
    .execute(&mut *conn)
    .await
    .map_err(|e| missing_reference(e, Entity::Tournament, tournament_id))?;

    let rows = sqlx::query(
        "SELECT id, player_id, tournament_id, created_at FROM tournament_players
         WHERE tournament_id = $1 AND player_id = ANY($2)
         ORDER BY player_id",
    )
    .bind(tournament_id)
    .bind(&requested)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows.iter().map(tournament_player_from_row).collect())
}

#[async_trait]
impl AccountRepository for PgRepository {
    async fn create_account(&self, new: &NewAccount) -> RosterResult<Account> {
        let row = with_default_timeout(
            sqlx::query(&format!(
                "INSERT INTO accounts (email, name, password_hash, is_admin)
                 VALUES ($1, $2, $3, $4)
                 RETURNING {ACCOUNT_COLUMNS}"
            ))
            .bind(&new.email)
            .bind(&new.name)
            .bind(&new.password_hash)
            .bind(new.is_admin)
            .fetch_one(self.pool.as_ref()),
        )
        .await;

        match row {
            Ok(row) => Ok(account_from_row(&row)),
            Err(super::timeouts::TimeoutError::Database(e)) => {
                Err(unique_violation(e, Entity::Account, &new.email))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_account(&self, account_id: AccountId) -> RosterResult<()> {
        let result = with_default_timeout(
            sqlx::query("DELETE FROM accounts WHERE id = $1")
                .bind(account_id)
                .execute(self.pool.as_ref()),
        )
        .await?;

        if result.rows_affected() == 0 {
            return Err(RosterError::not_found(Entity::Account, account_id));
        }
        Ok(())
    }

    async fn find_account(&self, account_id: AccountId) -> RosterResult<Option<Account>> {
        let row = with_default_timeout(
            sqlx::query(&format!(
                "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1"
            ))
            .bind(account_id)
            .fetch_optional(self.pool.as_ref()),
        )
        .await?;

        Ok(row.as_ref().map(account_from_row))
    }

    async fn find_credentials(&self, email: &str) -> RosterResult<Option<AccountCredentials>> {
        let row = with_default_timeout(
            sqlx::query(&format!(
                "SELECT {ACCOUNT_COLUMNS}, password_hash FROM accounts WHERE email = $1"
            ))
            .bind(email)
            .fetch_optional(self.pool.as_ref()),
        )
        .await?;

        Ok(row.map(|r| AccountCredentials {
            account: account_from_row(&r),
            password_hash: r.get("password_hash"),
        }))
    }

    async fn update_account(
        &self,
        account_id: AccountId,
        name: Option<&str>,
        password_hash: Option<&str>,
    ) -> RosterResult<Account> {
        let row = with_default_timeout(
            sqlx::query(&format!(
                "UPDATE accounts
                 SET name = COALESCE($2, name),
                     password_hash = COALESCE($3, password_hash)
                 WHERE id = $1
                 RETURNING {ACCOUNT_COLUMNS}"
            ))
            .bind(account_id)
            .bind(name)
            .bind(password_hash)
            .fetch_optional(self.pool.as_ref()),
        )
        .await?
        .ok_or(RosterError::not_found(Entity::Account, account_id))?;

        Ok(account_from_row(&row))
    }

    async fn insert_player(&self, account_id: AccountId) -> RosterResult<Player> {
        let result = with_default_timeout(
            sqlx::query(
                "WITH inserted AS (
                     INSERT INTO players (account_id) VALUES ($1) RETURNING id, account_id
                 )
                 SELECT inserted.id, inserted.account_id, accounts.name
                 FROM inserted JOIN accounts ON accounts.id = inserted.account_id",
            )
            .bind(account_id)
            .fetch_one(self.pool.as_ref()),
        )
        .await;

        let row = match result {
            Ok(row) => row,
            Err(super::timeouts::TimeoutError::Database(sqlx::Error::Database(db_err)))
                if db_err.is_unique_violation() =>
            {
                return Err(RosterError::UniqueConstraintViolation(format!(
                    "account {account_id} already has a player"
                )));
            }
            Err(super::timeouts::TimeoutError::Database(e)) => {
                return Err(missing_reference(e, Entity::Account, account_id));
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Player {
            id: row.get("id"),
            account_id: row.get("account_id"),
            name: row.get("name"),
        })
    }

    async fn find_player_by_account(&self, account_id: AccountId) -> RosterResult<Option<Player>> {
        let row = with_default_timeout(
            sqlx::query(
                "SELECT players.id, players.account_id, accounts.name
                 FROM players JOIN accounts ON accounts.id = players.account_id
                 WHERE players.account_id = $1",
            )
            .bind(account_id)
            .fetch_optional(self.pool.as_ref()),
        )
        .await?;

        Ok(row.map(|r| Player {
            id: r.get("id"),
            account_id: r.get("account_id"),
            name: r.get("name"),
        }))
    }
}

#[async_trait]
impl TournamentRepository for PgRepository {
    async fn insert_tournament(&self, new: &NewTournament) -> RosterResult<Tournament> {
        within_transaction_timeout(async {
            let mut tx = self.pool.begin().await?;

            let tournament_id: TournamentId = sqlx::query_scalar(
                "INSERT INTO tournaments (name, description, teams_n)
                 VALUES ($1, $2, $3)
                 RETURNING id",
            )
            .bind(&new.name)
            .bind(&new.description)
            .bind(new.teams_n)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| unique_violation(e, Entity::Tournament, &new.name))?;

            register_in(&mut tx, tournament_id, &new.initial_players).await?;
            let tournament = load_tournament(&mut tx, tournament_id).await?;

            tx.commit().await?;
            Ok(tournament)
        })
        .await
    }

    async fn get_tournament(&self, tournament_id: TournamentId) -> RosterResult<Tournament> {
        let mut conn = self.pool.acquire().await?;
        load_tournament(&mut conn, tournament_id).await
    }

    async fn list_tournaments(&self) -> RosterResult<Vec<Tournament>> {
        let mut conn = self.pool.acquire().await?;
        let ids: Vec<TournamentId> = sqlx::query_scalar("SELECT id FROM tournaments ORDER BY id")
            .fetch_all(&mut *conn)
            .await?;

        let mut tournaments = Vec::with_capacity(ids.len());
        for id in ids {
            tournaments.push(load_tournament(&mut conn, id).await?);
        }
        Ok(tournaments)
    }

    async fn update_tournament(
        &self,
        tournament_id: TournamentId,
        changes: &TournamentChanges,
    ) -> RosterResult<Tournament> {
        within_transaction_timeout(async {
            let mut tx = self.pool.begin().await?;

            let updated = sqlx::query(
                "UPDATE tournaments
                 SET name = COALESCE($2, name),
                     description = COALESCE($3, description),
                     teams_n = COALESCE($4, teams_n)
                 WHERE id = $1",
            )
            .bind(tournament_id)
            .bind(changes.name.as_deref())
            .bind(changes.description.as_deref())
            .bind(changes.teams_n)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                unique_violation(
                    e,
                    Entity::Tournament,
                    changes.name.as_deref().unwrap_or_default(),
                )
            })?;

            if updated.rows_affected() == 0 {
                return Err(RosterError::not_found(Entity::Tournament, tournament_id));
            }

            let tournament = load_tournament(&mut tx, tournament_id).await?;
            tx.commit().await?;
            Ok(tournament)
        })
        .await
    }

    async fn delete_tournament(&self, tournament_id: TournamentId) -> RosterResult<()> {
        let result = with_default_timeout(
            sqlx::query("DELETE FROM tournaments WHERE id = $1")
                .bind(tournament_id)
                .execute(self.pool.as_ref()),
        )
        .await?;

        if result.rows_affected() == 0 {
            return Err(RosterError::not_found(Entity::Tournament, tournament_id));
        }
        Ok(())
    }

    async fn register_players(
        &self,
        tournament_id: TournamentId,
        players: &BTreeSet<PlayerId>,
    ) -> RosterResult<Vec<TournamentPlayer>> {
        within_transaction_timeout(async {
            let mut tx = self.pool.begin().await?;

            let exists: Option<TournamentId> =
                sqlx::query_scalar("SELECT id FROM tournaments WHERE id = $1 FOR SHARE")
                    .bind(tournament_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            if exists.is_none() {
                return Err(RosterError::not_found(Entity::Tournament, tournament_id));
            }

            let records = register_in(&mut tx, tournament_id, players).await?;
            tx.commit().await?;
            Ok(records)
        })
        .await
    }

    async fn roster(&self, tournament_id: TournamentId) -> RosterResult<Vec<Player>> {
        let mut conn = self.pool.acquire().await?;
        // Not-found check
        load_tournament(&mut conn, tournament_id).await?;

        let rows = sqlx::query(
            "SELECT players.id, players.account_id, accounts.name
             FROM tournament_players
             JOIN players ON players.id = tournament_players.player_id
             JOIN accounts ON accounts.id = players.account_id
             WHERE tournament_players.tournament_id = $1
             ORDER BY players.id",
        )
        .bind(tournament_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(rows
            .iter()
            .map(|r| Player {
                id: r.get("id"),
                account_id: r.get("account_id"),
                name: r.get("name"),
            })
            .collect())
    }

    async fn tournament_players(
        &self,
        tournament_id: TournamentId,
    ) -> RosterResult<Vec<TournamentPlayer>> {
        let mut conn = self.pool.acquire().await?;
        load_tournament(&mut conn, tournament_id).await?;

        let rows = sqlx::query(
            "SELECT id, player_id, tournament_id, created_at FROM tournament_players
             WHERE tournament_id = $1 ORDER BY id",
        )
        .bind(tournament_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(rows.iter().map(tournament_player_from_row).collect())
    }

    async fn find_tournament_player(
        &self,
        tournament_id: TournamentId,
        player_id: PlayerId,
    ) -> RosterResult<Option<TournamentPlayer>> {
        let row = with_default_timeout(
            sqlx::query(
                "SELECT id, player_id, tournament_id, created_at FROM tournament_players
                 WHERE tournament_id = $1 AND player_id = $2",
            )
            .bind(tournament_id)
            .bind(player_id)
            .fetch_optional(self.pool.as_ref()),
        )
        .await?;

        Ok(row.as_ref().map(tournament_player_from_row))
    }
}

#[async_trait]
impl EventRepository for PgRepository {
    async fn insert_event(&self, draft: &EventDraft) -> RosterResult<Event> {
        within_transaction_timeout(async {
            let mut tx = self.pool.begin().await?;

            let tournament: Option<TournamentId> =
                sqlx::query_scalar("SELECT id FROM tournaments WHERE id = $1")
                    .bind(draft.tournament_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            if tournament.is_none() {
                return Err(RosterError::not_found(
                    Entity::Tournament,
                    draft.tournament_id,
                ));
            }

            let row = sqlx::query(&format!(
                "INSERT INTO events (tournament_id, name, sport, start_date, end_date, status, created_by)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)
                 RETURNING {EVENT_COLUMNS}"
            ))
            .bind(draft.tournament_id)
            .bind(&draft.name)
            .bind(&draft.sport)
            .bind(draft.start_date)
            .bind(draft.end_date)
            .bind(EventStatus::Open.as_str())
            .bind(draft.created_by)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| match missing_reference(e, Entity::Account, draft.created_by) {
                RosterError::Database(e) => unique_violation(e, Entity::Event, &draft.name),
                err => err,
            })?;

            let event = event_from_row(&row, BTreeSet::new())?;
            tx.commit().await?;
            Ok(event)
        })
        .await
    }

    async fn get_event(&self, event_id: EventId) -> RosterResult<Event> {
        let mut conn = self.pool.acquire().await?;
        load_event(&mut conn, event_id, false).await
    }

    async fn list_events(&self, tournament_id: Option<TournamentId>) -> RosterResult<Vec<Event>> {
        let mut conn = self.pool.acquire().await?;
        let rows = sqlx::query(&format!(
            "SELECT {EVENT_COLUMNS} FROM events
             WHERE $1::BIGINT IS NULL OR tournament_id = $1
             ORDER BY id"
        ))
        .bind(tournament_id)
        .fetch_all(&mut *conn)
        .await?;

        let mut events = Vec::with_capacity(rows.len());
        for row in &rows {
            let players = event_players(&mut conn, row.get("id")).await?;
            events.push(event_from_row(row, players)?);
        }
        Ok(events)
    }

    async fn delete_event(&self, event_id: EventId) -> RosterResult<()> {
        let result = with_default_timeout(
            sqlx::query("DELETE FROM events WHERE id = $1")
                .bind(event_id)
                .execute(self.pool.as_ref()),
        )
        .await?;

        if result.rows_affected() == 0 {
            return Err(RosterError::not_found(Entity::Event, event_id));
        }
        Ok(())
    }

    async fn advance_event(&self, event_id: EventId) -> RosterResult<Event> {
        within_transaction_timeout(async {
            let mut tx = self.pool.begin().await?;

            let mut event = load_event(&mut tx, event_id, true).await?;
            let next = event.status.advance();
            if next != event.status {
                sqlx::query("UPDATE events SET status = $2 WHERE id = $1")
                    .bind(event_id)
                    .bind(next.as_str())
                    .execute(&mut *tx)
                    .await?;
                event.status = next;
            }

            tx.commit().await?;
            Ok(event)
        })
        .await
    }

    async fn toggle_event_players(
        &self,
        event_id: EventId,
        players: &BTreeSet<TournamentPlayerId>,
    ) -> RosterResult<Event> {
        within_transaction_timeout(async {
            let mut tx = self.pool.begin().await?;

            let mut event = load_event(&mut tx, event_id, true).await?;

            let requested: Vec<TournamentPlayerId> = players.iter().copied().collect();
            let in_scope: Vec<TournamentPlayerId> = sqlx::query_scalar(
                "SELECT id FROM tournament_players WHERE tournament_id = $1 AND id = ANY($2)",
            )
            .bind(event.tournament_id)
            .bind(&requested)
            .fetch_all(&mut *tx)
            .await?;
            let in_scope: BTreeSet<TournamentPlayerId> = in_scope.into_iter().collect();
            membership::check_scope(event.tournament_id, &in_scope, players)?;

            let plan = TogglePlan::new(&event.players, players);
            if !plan.release.is_empty() {
                let release: Vec<TournamentPlayerId> = plan.release.iter().copied().collect();
                sqlx::query(
                    "DELETE FROM event_players
                     WHERE event_id = $1 AND tournament_player_id = ANY($2)",
                )
                .bind(event_id)
                .bind(&release)
                .execute(&mut *tx)
                .await?;

                sqlx::query(
                    "DELETE FROM team_players
                     USING teams
                     WHERE team_players.team_id = teams.id
                       AND teams.event_id = $1
                       AND team_players.tournament_player_id = ANY($2)",
                )
                .bind(event_id)
                .bind(&release)
                .execute(&mut *tx)
                .await?;
            }
            if !plan.admit.is_empty() {
                let admit: Vec<TournamentPlayerId> = plan.admit.iter().copied().collect();
                sqlx::query(
                    "INSERT INTO event_players (event_id, tournament_player_id)
                     SELECT $1, id FROM UNNEST($2::BIGINT[]) AS id",
                )
                .bind(event_id)
                .bind(&admit)
                .execute(&mut *tx)
                .await?;
            }
            plan.apply(&mut event.players);

            tx.commit().await?;
            Ok(event)
        })
        .await
    }
}

#[async_trait]
impl TeamRepository for PgRepository {
    async fn insert_teams(&self, event_id: EventId, teams: &[NewTeam]) -> RosterResult<Vec<Team>> {
        within_transaction_timeout(async {
            let mut tx = self.pool.begin().await?;

            let event = load_event(&mut tx, event_id, true).await?;
            let teams_n: i32 = sqlx::query_scalar("SELECT teams_n FROM tournaments WHERE id = $1")
                .bind(event.tournament_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(RosterError::not_found(
                    Entity::Tournament,
                    event.tournament_id,
                ))?;
            let existing = event_teams(&mut tx, event_id).await?;
            assembler::check_groups(event_id, teams_n, &event.players, &existing, teams)?;

            let mut created = Vec::with_capacity(teams.len());
            for group in teams {
                let name = group.name.trim().to_string();
                let team_id: i64 = sqlx::query_scalar(
                    "INSERT INTO teams (event_id, name) VALUES ($1, $2) RETURNING id",
                )
                .bind(event_id)
                .bind(&name)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| unique_violation(e, Entity::Team, &name))?;

                let members: Vec<TournamentPlayerId> = group.players.iter().copied().collect();
                sqlx::query(
                    "INSERT INTO team_players (team_id, tournament_player_id)
                     SELECT $1, id FROM UNNEST($2::BIGINT[]) AS id",
                )
                .bind(team_id)
                .bind(&members)
                .execute(&mut *tx)
                .await?;

                created.push(Team {
                    id: team_id,
                    event_id,
                    name,
                    players: group.players.clone(),
                });
            }

            tx.commit().await?;
            Ok(created)
        })
        .await
    }

    async fn list_teams(&self, event_id: EventId) -> RosterResult<Vec<Team>> {
        let mut conn = self.pool.acquire().await?;
        load_event(&mut conn, event_id, false).await?;
        event_teams(&mut conn, event_id).await
    }
}

#[async_trait]
impl Repository for PgRepository {
    async fn health_check(&self) -> RosterResult<()> {
        with_default_timeout(sqlx::query("SELECT 1").execute(self.pool.as_ref())).await?;
        Ok(())
    }
}

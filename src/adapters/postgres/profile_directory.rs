//! PostgreSQL implementation of the profile directory.
//!
//! Profiles live in three tables, one per kind. Lookups fan out with
//! `try_join!` and are all-or-nothing: a failure in any store fails
//! the whole call rather than silently dropping a profile kind.

use crate::domain::foundation::{DomainError, ErrorCode, SportId, UserId};
use crate::domain::matching::{ContactCard, ProfileSummary, ProfileType};
use crate::ports::ProfileDirectory;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL implementation of the ProfileDirectory port.
pub struct PostgresProfileDirectory {
    pool: PgPool,
}

impl PostgresProfileDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn summary_from(
        &self,
        table: &str,
        profile_type: ProfileType,
        user: &UserId,
    ) -> Result<Option<ProfileSummary>, DomainError> {
        let query = format!(
            "SELECT user_id, display_name, sport_id, location FROM {} WHERE user_id = $1",
            table
        );
        let row: Option<SummaryRow> = sqlx::query_as(&query)
            .bind(user.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to look up profile", e))?;

        row.map(|row| row.into_summary(profile_type)).transpose()
    }

    async fn contact_from(
        &self,
        table: &str,
        user: &UserId,
    ) -> Result<Option<ContactCard>, DomainError> {
        let query = format!(
            "SELECT user_id, display_name, email, phone FROM {} WHERE user_id = $1",
            table
        );
        let row: Option<ContactRow> = sqlx::query_as(&query)
            .bind(user.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to look up contact details", e))?;

        row.map(ContactRow::into_card).transpose()
    }

    async fn candidates_from(
        &self,
        table: &str,
        profile_type: ProfileType,
        exclude: &[String],
        limit: i64,
    ) -> Result<Vec<ProfileSummary>, DomainError> {
        let query = format!(
            r#"
            SELECT user_id, display_name, sport_id, location
            FROM {}
            WHERE user_id <> ALL($1)
            ORDER BY created_at DESC
            LIMIT $2
            "#,
            table
        );
        let rows: Vec<SummaryRow> = sqlx::query_as(&query)
            .bind(exclude)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Failed to list candidates", e))?;

        rows.into_iter()
            .map(|row| row.into_summary(profile_type))
            .collect()
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SummaryRow {
    user_id: String,
    display_name: String,
    sport_id: Option<Uuid>,
    location: Option<String>,
}

impl SummaryRow {
    fn into_summary(self, profile_type: ProfileType) -> Result<ProfileSummary, DomainError> {
        Ok(ProfileSummary {
            user_id: parse_user_id(&self.user_id)?,
            profile_type,
            display_name: self.display_name,
            sport_id: self.sport_id.map(SportId::from_uuid),
            location: self.location,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ContactRow {
    user_id: String,
    display_name: String,
    email: Option<String>,
    phone: Option<String>,
}

impl ContactRow {
    fn into_card(self) -> Result<ContactCard, DomainError> {
        Ok(ContactCard {
            user_id: parse_user_id(&self.user_id)?,
            display_name: self.display_name,
            email: self.email,
            phone: self.phone,
        })
    }
}

fn table_for(kind: ProfileType) -> &'static str {
    match kind {
        ProfileType::Athlete => "athlete_profiles",
        ProfileType::Agent => "agent_profiles",
        ProfileType::Team => "team_profiles",
    }
}

fn parse_user_id(s: &str) -> Result<UserId, DomainError> {
    UserId::new(s).map_err(|e| {
        DomainError::new(ErrorCode::DatabaseError, format!("Invalid user_id: {}", e))
    })
}

fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

#[async_trait]
impl ProfileDirectory for PostgresProfileDirectory {
    async fn resolve(&self, user: &UserId) -> Result<Option<ProfileSummary>, DomainError> {
        let (athlete, agent, team) = tokio::try_join!(
            self.summary_from(table_for(ProfileType::Athlete), ProfileType::Athlete, user),
            self.summary_from(table_for(ProfileType::Agent), ProfileType::Agent, user),
            self.summary_from(table_for(ProfileType::Team), ProfileType::Team, user),
        )?;

        Ok(athlete.or(agent).or(team))
    }

    async fn contact_card(&self, user: &UserId) -> Result<Option<ContactCard>, DomainError> {
        let (athlete, agent, team) = tokio::try_join!(
            self.contact_from(table_for(ProfileType::Athlete), user),
            self.contact_from(table_for(ProfileType::Agent), user),
            self.contact_from(table_for(ProfileType::Team), user),
        )?;

        Ok(athlete.or(agent).or(team))
    }

    async fn list_candidates(
        &self,
        kinds: &[ProfileType],
        exclude: &[UserId],
        limit: u32,
    ) -> Result<Vec<ProfileSummary>, DomainError> {
        let exclude: Vec<String> = exclude.iter().map(|u| u.as_str().to_string()).collect();
        let limit = i64::from(limit);

        let mut candidates = Vec::new();
        for kind in kinds {
            let remaining = limit - candidates.len() as i64;
            if remaining <= 0 {
                break;
            }
            let mut batch = self
                .candidates_from(table_for(*kind), *kind, &exclude, remaining)
                .await?;
            candidates.append(&mut batch);
        }

        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_profile_kind_maps_to_its_table() {
        assert_eq!(table_for(ProfileType::Athlete), "athlete_profiles");
        assert_eq!(table_for(ProfileType::Agent), "agent_profiles");
        assert_eq!(table_for(ProfileType::Team), "team_profiles");
    }

    #[test]
    fn summary_row_keeps_optional_fields() {
        let row = SummaryRow {
            user_id: "user-1".to_string(),
            display_name: "Alex".to_string(),
            sport_id: None,
            location: Some("Oslo".to_string()),
        };
        let summary = row.into_summary(ProfileType::Athlete).unwrap();
        assert_eq!(summary.profile_type, ProfileType::Athlete);
        assert!(summary.sport_id.is_none());
        assert_eq!(summary.location.as_deref(), Some("Oslo"));
    }
}

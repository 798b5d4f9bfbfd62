use crate::dto::candidate_dto::{CandidateChanges, NewCandidate};
use crate::error::{Error, Result};
use crate::models::candidate::{Candidate, CandidateStatus};
use crate::models::skill::Skill;
use sqlx::{PgConnection, PgExecutor, PgPool};
use std::collections::HashMap;
use tracing::{debug, info};

/// Skills are aggregated in link order; candidates without links get `{}`.
const CANDIDATE_SELECT: &str = r#"
    SELECT c.id, c.name, c.position, c.status, c.email, c.phone, c.description,
           c.created_at, c.updated_at,
           COALESCE(
               ARRAY_AGG(s.name ORDER BY cs.id) FILTER (WHERE s.id IS NOT NULL),
               ARRAY[]::TEXT[]
           ) AS skills
    FROM candidates c
    LEFT JOIN candidate_skills cs ON cs.candidate_id = c.id
    LEFT JOIN skills s ON s.id = cs.skill_id
"#;

/// Result of a transactional write. Store failures travel in the `Err`
/// channel instead.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome<T> {
    Applied(T),
    NotFound,
    EmailTaken,
}

impl<T> WriteOutcome<T> {
    pub fn into_result(self) -> Result<T> {
        match self {
            WriteOutcome::Applied(value) => Ok(value),
            WriteOutcome::NotFound => Err(Error::NotFound("Candidate not found".to_string())),
            WriteOutcome::EmailTaken => Err(Error::Conflict("Email already exists".to_string())),
        }
    }
}

#[derive(Clone)]
pub struct CandidateService {
    pool: PgPool,
}

impl CandidateService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_candidates(&self) -> Result<Vec<Candidate>> {
        let query = format!(
            "{} GROUP BY c.id ORDER BY c.created_at DESC, c.id DESC",
            CANDIDATE_SELECT
        );
        let candidates = sqlx::query_as::<_, Candidate>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(candidates)
    }

    pub async fn get_candidate(&self, id: i32) -> Result<Option<Candidate>> {
        fetch_candidate(&self.pool, id).await
    }

    pub async fn list_skill_names(&self) -> Result<Vec<String>> {
        let names = sqlx::query_scalar::<_, String>("SELECT name FROM skills ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(names)
    }

    /// Case-insensitive lookup; `except` skips the candidate being edited.
    pub async fn email_in_use(&self, email: &str, except: Option<i32>) -> Result<bool> {
        let taken = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM candidates
                WHERE LOWER(email) = LOWER($1) AND ($2::INTEGER IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(email)
        .bind(except)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    /// Get-or-create every name in one transaction.
    pub async fn ensure_skills(&self, names: &[String]) -> Result<Vec<Skill>> {
        let mut tx = self.pool.begin().await?;
        let skills = upsert_skills(&mut tx, names).await?;
        tx.commit().await?;
        Ok(skills)
    }

    /// The email pre-check runs outside the transaction. Two concurrent
    /// creates with one email can both pass it; the unique constraint then
    /// fails the loser with a store error.
    pub async fn create_candidate(&self, new: NewCandidate) -> Result<WriteOutcome<Candidate>> {
        if self.email_in_use(&new.email, None).await? {
            return Ok(WriteOutcome::EmailTaken);
        }

        let mut tx = self.pool.begin().await?;
        let skills = upsert_skills(&mut tx, &new.skills).await?;

        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO candidates (name, position, status, email, phone, description)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&new.name)
        .bind(&new.position)
        .bind(new.status)
        .bind(&new.email)
        .bind(&new.phone)
        .bind(&new.description)
        .fetch_one(&mut *tx)
        .await?;

        link_skills(&mut tx, id, &skills).await?;
        let candidate = reload(&mut tx, id).await?;
        tx.commit().await?;

        info!(candidate_id = id, skills = skills.len(), "Candidate created");
        Ok(WriteOutcome::Applied(candidate))
    }

    pub async fn update_candidate(
        &self,
        id: i32,
        changes: CandidateChanges,
    ) -> Result<WriteOutcome<Candidate>> {
        if let Some(email) = changes.email.as_deref() {
            if self.email_in_use(email, Some(id)).await? {
                return Ok(WriteOutcome::EmailTaken);
            }
        }

        let mut tx = self.pool.begin().await?;
        if !candidate_exists(&mut *tx, id).await? {
            return Ok(WriteOutcome::NotFound);
        }

        if let Some(names) = changes.skills.as_deref() {
            sqlx::query("DELETE FROM candidate_skills WHERE candidate_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            let skills = upsert_skills(&mut tx, names).await?;
            link_skills(&mut tx, id, &skills).await?;
        }

        sqlx::query(
            r#"
            UPDATE candidates
            SET
                name = COALESCE($2, name),
                position = COALESCE($3, position),
                status = COALESCE($4, status),
                email = COALESCE($5, email),
                phone = COALESCE($6, phone),
                description = COALESCE($7, description),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(changes.name)
        .bind(changes.position)
        .bind(changes.status)
        .bind(changes.email)
        .bind(changes.phone)
        .bind(changes.description)
        .execute(&mut *tx)
        .await?;

        let candidate = reload(&mut tx, id).await?;
        tx.commit().await?;

        debug!(candidate_id = id, "Candidate updated");
        Ok(WriteOutcome::Applied(candidate))
    }

    pub async fn update_status(
        &self,
        id: i32,
        status: CandidateStatus,
    ) -> Result<WriteOutcome<Candidate>> {
        let mut tx = self.pool.begin().await?;
        if !candidate_exists(&mut *tx, id).await? {
            return Ok(WriteOutcome::NotFound);
        }

        sqlx::query("UPDATE candidates SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(&mut *tx)
            .await?;

        let candidate = reload(&mut tx, id).await?;
        tx.commit().await?;

        debug!(candidate_id = id, %status, "Candidate status changed");
        Ok(WriteOutcome::Applied(candidate))
    }

    /// Skill links go with the row through `ON DELETE CASCADE`.
    pub async fn delete_candidate(&self, id: i32) -> Result<WriteOutcome<()>> {
        let mut tx = self.pool.begin().await?;
        if !candidate_exists(&mut *tx, id).await? {
            return Ok(WriteOutcome::NotFound);
        }

        sqlx::query("DELETE FROM candidates WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!(candidate_id = id, "Candidate deleted");
        Ok(WriteOutcome::Applied(()))
    }
}

async fn fetch_candidate<'e, E>(executor: E, id: i32) -> Result<Option<Candidate>>
where
    E: PgExecutor<'e>,
{
    let query = format!("{} WHERE c.id = $1 GROUP BY c.id", CANDIDATE_SELECT);
    let candidate = sqlx::query_as::<_, Candidate>(&query)
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(candidate)
}

/// Reads back a row written earlier in the same transaction.
async fn reload(conn: &mut PgConnection, id: i32) -> Result<Candidate> {
    fetch_candidate(&mut *conn, id)
        .await?
        .ok_or_else(|| Error::Internal(format!("candidate {} vanished mid-transaction", id)))
}

async fn candidate_exists<'e, E>(executor: E, id: i32) -> Result<bool>
where
    E: PgExecutor<'e>,
{
    let exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM candidates WHERE id = $1)")
            .bind(id)
            .fetch_one(executor)
            .await?;
    Ok(exists)
}

/// Get-or-create for each name. Rows are touched in sorted name order so
/// concurrent writers naming the same skills never wait on each other in a
/// cycle; `DO NOTHING` leaves existing rows unlocked. The result follows the
/// order of `names`, without repeats.
async fn upsert_skills(conn: &mut PgConnection, names: &[String]) -> Result<Vec<Skill>> {
    let mut ordered: Vec<&str> = names.iter().map(String::as_str).collect();
    ordered.sort_unstable();
    ordered.dedup();

    let mut by_name: HashMap<&str, Skill> = HashMap::with_capacity(ordered.len());
    for name in ordered {
        sqlx::query("INSERT INTO skills (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
            .bind(name)
            .execute(&mut *conn)
            .await?;
        let skill = sqlx::query_as::<_, Skill>("SELECT id, name FROM skills WHERE name = $1")
            .bind(name)
            .fetch_one(&mut *conn)
            .await?;
        by_name.insert(name, skill);
    }

    Ok(names
        .iter()
        .filter_map(|name| by_name.remove(name.as_str()))
        .collect())
}

async fn link_skills(conn: &mut PgConnection, candidate_id: i32, skills: &[Skill]) -> Result<()> {
    for skill in skills {
        sqlx::query(
            r#"
            INSERT INTO candidate_skills (candidate_id, skill_id)
            VALUES ($1, $2)
            ON CONFLICT (candidate_id, skill_id) DO NOTHING
            "#,
        )
        .bind(candidate_id)
        .bind(skill.id)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

//! Interval repository
//!
//! Every read returns the interval joined with its owner and its goal
//! names, aggregated in one query. Writes that return the refreshed
//! interval do the write and the re-read in one transaction.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::PgExecutor;
use sqlx::{FromRow, PgPool};

use super::{DbError, IntervalStore};
use crate::models::{DateRange, GoalName, IntervalFilter, NewInterval};

/// Interval joined with owner fields and goal names
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Interval {
    pub id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub user_id: i64,
    pub user_email: String,
    pub user_nome: String,
    pub user_cognome: String,
    pub created_at: DateTime<Utc>,
    #[sqlx(rename = "obiettivi")]
    pub goals: Vec<String>,
}

/// Shared projection; callers append WHERE, GROUP BY and ORDER BY.
const SELECT_INTERVALS: &str = r#"
    SELECT
        i.id,
        i.start_date,
        i.end_date,
        i.user_id,
        u.email AS user_email,
        u.nome AS user_nome,
        u.cognome AS user_cognome,
        i.created_at,
        COALESCE(
            ARRAY_AGG(g.goal_name::TEXT ORDER BY g.id) FILTER (WHERE g.id IS NOT NULL),
            '{}'::TEXT[]
        ) AS obiettivi
    FROM intervals i
    JOIN users u ON u.id = i.user_id
    LEFT JOIN interval_goals g ON g.interval_id = i.id
"#;

/// Interval repository
#[derive(Clone)]
pub struct IntervalRepo {
    pool: PgPool,
}

impl IntervalRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Load one interval with owner and goals.
async fn fetch_interval<'e, E>(executor: E, id: i64) -> Result<Option<Interval>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let sql = format!("{SELECT_INTERVALS} WHERE i.id = $1 GROUP BY i.id, u.id");
    sqlx::query_as(&sql).bind(id).fetch_optional(executor).await
}

#[async_trait]
impl IntervalStore for IntervalRepo {
    async fn insert(&self, interval: &NewInterval) -> Result<Interval, DbError> {
        let created: Interval = sqlx::query_as(
            r#"
            WITH inserted AS (
                INSERT INTO intervals (start_date, end_date, user_id)
                VALUES ($1, $2, $3)
                RETURNING id, start_date, end_date, user_id, created_at
            )
            SELECT
                n.id,
                n.start_date,
                n.end_date,
                n.user_id,
                u.email AS user_email,
                u.nome AS user_nome,
                u.cognome AS user_cognome,
                n.created_at,
                '{}'::TEXT[] AS obiettivi
            FROM inserted n
            JOIN users u ON u.id = n.user_id
            "#,
        )
        .bind(interval.range.start())
        .bind(interval.range.end())
        .bind(interval.user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn list(&self, filter: &IntervalFilter) -> Result<Vec<Interval>, DbError> {
        let sql = format!(
            r#"{SELECT_INTERVALS}
            WHERE ($1::TEXT IS NULL OR EXISTS (
                    SELECT 1 FROM interval_goals m
                    WHERE m.interval_id = i.id AND m.goal_name LIKE $1 ESCAPE '\'
                  ))
              AND ($2::DATE IS NULL OR i.start_date >= $2)
              AND ($3::DATE IS NULL OR i.end_date <= $3)
            GROUP BY i.id, u.id
            ORDER BY i.created_at DESC, i.id DESC
            "#
        );

        let intervals: Vec<Interval> = sqlx::query_as(&sql)
            .bind(filter.goal_pattern())
            .bind(filter.start_from)
            .bind(filter.end_to)
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(count = intervals.len(), ?filter, "listed intervals");
        Ok(intervals)
    }

    async fn find(&self, id: i64) -> Result<Option<Interval>, DbError> {
        Ok(fetch_interval(&self.pool, id).await?)
    }

    async fn update_range(&self, id: i64, range: DateRange) -> Result<Option<Interval>, DbError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("UPDATE intervals SET start_date = $1, end_date = $2 WHERE id = $3")
            .bind(range.start())
            .bind(range.end())
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        let interval = fetch_interval(&mut *tx, id).await?;
        tx.commit().await?;
        Ok(interval)
    }

    async fn delete(&self, id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM intervals WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn add_goal(&self, id: i64, goal: &GoalName) -> Result<Interval, DbError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO interval_goals (interval_id, goal_name) VALUES ($1, $2)")
            .bind(id)
            .bind(goal.as_str())
            .execute(&mut *tx)
            .await?;

        let interval = fetch_interval(&mut *tx, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;

        tx.commit().await?;
        Ok(interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repos::{UserRepo, UserStore};
    use crate::db::schema;
    use crate::models::{IntervalFields, NewUser, UserFields};

    // Integration tests - run with DATABASE_URL set
    // cargo test -p meditactive-server -- --ignored

    async fn pool() -> PgPool {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = PgPool::connect(&url).await.expect("connect failed");
        schema::ensure(&pool).await.expect("schema failed");
        pool
    }

    async fn seed_user(pool: &PgPool) -> i64 {
        let email = format!(
            "interval-{}@example.com",
            Utc::now().timestamp_nanos_opt().unwrap_or_default()
        );
        let user = NewUser::try_from(UserFields {
            email: Some(email),
            nome: Some("Test".into()),
            cognome: Some("User".into()),
        })
        .unwrap();
        UserRepo::new(pool.clone()).insert(&user).await.unwrap().id
    }

    fn new_interval(user_id: i64, start: &str, end: &str) -> NewInterval {
        NewInterval::try_from(IntervalFields {
            data_inizio: Some(start.into()),
            data_fine: Some(end.into()),
            utente_id: Some(user_id),
        })
        .unwrap()
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn insert_returns_owner_and_empty_goals() {
        let pool = pool().await;
        let user_id = seed_user(&pool).await;
        let repo = IntervalRepo::new(pool);

        let interval = repo
            .insert(&new_interval(user_id, "2024-01-01", "2024-01-31"))
            .await
            .unwrap();

        assert_eq!(interval.user_id, user_id);
        assert_eq!(interval.user_nome, "Test");
        assert!(interval.goals.is_empty());
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn insert_for_missing_user_is_a_reference_error() {
        let repo = IntervalRepo::new(pool().await);
        let err = repo
            .insert(&new_interval(i64::MAX, "2024-01-01", "2024-01-31"))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::MissingReference { .. }));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn goal_filter_matches_once_per_interval() {
        let pool = pool().await;
        let user_id = seed_user(&pool).await;
        let repo = IntervalRepo::new(pool);

        // Unique marker so rows from other runs do not interfere
        let marker = format!("Med{}", Utc::now().timestamp_nanos_opt().unwrap_or_default());
        let hit = repo
            .insert(&new_interval(user_id, "2024-01-01", "2024-01-31"))
            .await
            .unwrap();
        let miss = repo
            .insert(&new_interval(user_id, "2024-02-01", "2024-02-28"))
            .await
            .unwrap();

        for goal in [format!("{marker} mattina"), format!("{marker} sera")] {
            repo.add_goal(hit.id, &GoalName::new(goal).unwrap()).await.unwrap();
        }
        repo.add_goal(miss.id, &GoalName::new(marker.to_lowercase()).unwrap())
            .await
            .unwrap();

        let filter = IntervalFilter {
            goal: Some(marker),
            ..IntervalFilter::default()
        };
        let found = repo.list(&filter).await.unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, hit.id);
        assert_eq!(found[0].goals.len(), 2);
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn goal_filter_treats_wildcards_literally() {
        let pool = pool().await;
        let user_id = seed_user(&pool).await;
        let repo = IntervalRepo::new(pool);

        let tag = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let interval = repo
            .insert(&new_interval(user_id, "2024-01-01", "2024-01-31"))
            .await
            .unwrap();
        repo.add_goal(interval.id, &GoalName::new(format!("{tag}-100x")).unwrap())
            .await
            .unwrap();

        let filter = IntervalFilter {
            goal: Some(format!("{tag}-1_0")),
            ..IntervalFilter::default()
        };
        assert!(repo.list(&filter).await.unwrap().is_empty());
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn deleting_user_cascades_to_intervals_and_goals() {
        let pool = pool().await;
        let user_id = seed_user(&pool).await;
        let repo = IntervalRepo::new(pool.clone());

        let interval = repo
            .insert(&new_interval(user_id, "2024-01-01", "2024-01-31"))
            .await
            .unwrap();
        repo.add_goal(interval.id, &GoalName::new("Meditare").unwrap())
            .await
            .unwrap();

        assert!(UserRepo::new(pool.clone()).delete(user_id).await.unwrap());
        assert!(repo.find(interval.id).await.unwrap().is_none());

        let (goals,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM interval_goals WHERE interval_id = $1")
                .bind(interval.id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(goals, 0);
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn update_range_of_missing_interval() {
        let repo = IntervalRepo::new(pool().await);
        let range = new_interval(1, "2024-01-01", "2024-01-02").range;

        assert!(repo.update_range(i64::MAX, range).await.unwrap().is_none());
    }
}

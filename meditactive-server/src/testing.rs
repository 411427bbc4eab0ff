//! In-memory stores for service and HTTP tests
//!
//! Mirrors the PostgreSQL constraints the services rely on: unique email,
//! foreign keys on insert, cascading deletes, newest-first listing.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use crate::db::{DbError, Interval, IntervalStore, User, UserStore};
use crate::models::{DateRange, GoalName, IntervalFilter, NewInterval, NewUser, UserPatch};

struct StoredInterval {
    range: DateRange,
    user_id: i64,
    created_at: chrono::DateTime<Utc>,
}

// One sequence per table, as BIGSERIAL would hand out
#[derive(Default)]
struct State {
    user_seq: i64,
    interval_seq: i64,
    goal_seq: i64,
    users: BTreeMap<i64, User>,
    intervals: BTreeMap<i64, StoredInterval>,
    // (goal id, interval id, name)
    goals: Vec<(i64, i64, String)>,
}

fn next(seq: &mut i64) -> i64 {
    *seq += 1;
    *seq
}

impl State {
    fn project(&self, id: i64) -> Option<Interval> {
        let stored = self.intervals.get(&id)?;
        let owner = self.users.get(&stored.user_id)?;
        Some(Interval {
            id,
            start_date: stored.range.start(),
            end_date: stored.range.end(),
            user_id: owner.id,
            user_email: owner.email.clone(),
            user_nome: owner.nome.clone(),
            user_cognome: owner.cognome.clone(),
            created_at: stored.created_at,
            goals: self.goal_names(id),
        })
    }

    fn goal_names(&self, interval_id: i64) -> Vec<String> {
        self.goals
            .iter()
            .filter(|(_, owner, _)| *owner == interval_id)
            .map(|(_, _, name)| name.clone())
            .collect()
    }

    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.users
            .values()
            .any(|u| u.email == email && Some(u.id) != except)
    }
}

fn duplicate_email() -> DbError {
    DbError::Duplicate {
        constraint: "users_email_key".into(),
    }
}

/// Shared in-memory backend implementing both store traits
#[derive(Clone, Default)]
pub(crate) struct MemoryStore {
    state: Arc<Mutex<State>>,
    broken: bool,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// A store whose every call fails like a lost connection.
    pub(crate) fn broken() -> Self {
        Self {
            broken: true,
            ..Self::default()
        }
    }

    fn state(&self) -> Result<MutexGuard<'_, State>, DbError> {
        if self.broken {
            return Err(DbError::Sqlx(sqlx::Error::PoolTimedOut));
        }
        Ok(self.state.lock().expect("memory store poisoned"))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert(&self, user: &NewUser) -> Result<User, DbError> {
        let mut state = self.state()?;
        if state.email_taken(user.email.as_str(), None) {
            return Err(duplicate_email());
        }

        let id = next(&mut state.user_seq);
        let created = User {
            id,
            email: user.email.as_str().to_owned(),
            nome: user.nome.clone(),
            cognome: user.cognome.clone(),
            created_at: Utc::now(),
        };
        state.users.insert(id, created.clone());
        Ok(created)
    }

    async fn list(&self) -> Result<Vec<User>, DbError> {
        Ok(self.state()?.users.values().cloned().collect())
    }

    async fn find(&self, id: i64) -> Result<Option<User>, DbError> {
        Ok(self.state()?.users.get(&id).cloned())
    }

    async fn update(&self, id: i64, patch: &UserPatch) -> Result<Option<User>, DbError> {
        let mut state = self.state()?;
        if let Some(email) = &patch.email {
            if state.email_taken(email.as_str(), Some(id)) {
                return Err(duplicate_email());
            }
        }

        let Some(user) = state.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(email) = &patch.email {
            user.email = email.as_str().to_owned();
        }
        if let Some(nome) = &patch.nome {
            user.nome = nome.clone();
        }
        if let Some(cognome) = &patch.cognome {
            user.cognome = cognome.clone();
        }
        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, DbError> {
        let mut state = self.state()?;
        if state.users.remove(&id).is_none() {
            return Ok(false);
        }

        let owned: Vec<i64> = state
            .intervals
            .iter()
            .filter(|(_, i)| i.user_id == id)
            .map(|(interval_id, _)| *interval_id)
            .collect();
        for interval_id in owned {
            state.intervals.remove(&interval_id);
            state.goals.retain(|(_, owner, _)| *owner != interval_id);
        }
        Ok(true)
    }
}

#[async_trait]
impl IntervalStore for MemoryStore {
    async fn insert(&self, interval: &NewInterval) -> Result<Interval, DbError> {
        let mut state = self.state()?;
        if !state.users.contains_key(&interval.user_id) {
            return Err(DbError::MissingReference {
                constraint: "intervals_user_id_fkey".into(),
            });
        }

        let id = next(&mut state.interval_seq);
        state.intervals.insert(
            id,
            StoredInterval {
                range: interval.range,
                user_id: interval.user_id,
                created_at: Utc::now(),
            },
        );
        Ok(state.project(id).expect("interval just inserted"))
    }

    async fn list(&self, filter: &IntervalFilter) -> Result<Vec<Interval>, DbError> {
        let state = self.state()?;
        let mut intervals: Vec<Interval> = state
            .intervals
            .keys()
            .filter_map(|id| state.project(*id))
            .filter(|i| filter.start_from.map_or(true, |from| i.start_date >= from))
            .filter(|i| filter.end_to.map_or(true, |to| i.end_date <= to))
            .filter(|i| {
                filter
                    .goal
                    .as_deref()
                    .map_or(true, |needle| i.goals.iter().any(|g| g.contains(needle)))
            })
            .collect();

        intervals.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(intervals)
    }

    async fn find(&self, id: i64) -> Result<Option<Interval>, DbError> {
        Ok(self.state()?.project(id))
    }

    async fn update_range(&self, id: i64, range: DateRange) -> Result<Option<Interval>, DbError> {
        let mut state = self.state()?;
        let Some(stored) = state.intervals.get_mut(&id) else {
            return Ok(None);
        };
        stored.range = range;
        Ok(state.project(id))
    }

    async fn delete(&self, id: i64) -> Result<bool, DbError> {
        let mut state = self.state()?;
        if state.intervals.remove(&id).is_none() {
            return Ok(false);
        }
        state.goals.retain(|(_, owner, _)| *owner != id);
        Ok(true)
    }

    async fn add_goal(&self, id: i64, goal: &GoalName) -> Result<Interval, DbError> {
        let mut state = self.state()?;
        if !state.intervals.contains_key(&id) {
            return Err(DbError::MissingReference {
                constraint: "interval_goals_interval_id_fkey".into(),
            });
        }

        let goal_id = next(&mut state.goal_seq);
        state.goals.push((goal_id, id, goal.as_str().to_owned()));
        Ok(state.project(id).expect("interval checked above"))
    }
}

/// Router over a fresh in-memory store, in development mode
pub(crate) fn test_app() -> axum::Router {
    let store = Arc::new(MemoryStore::new());
    crate::http::build_router(crate::http::AppState::with_stores(
        store.clone(),
        store,
        crate::http::Environment::Development,
    ))
}

/// Send one request through the router; an empty body reads as `Null`.
pub(crate) async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (axum::http::StatusCode, serde_json::Value) {
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use tower::ServiceExt;

    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => request.body(Body::empty()),
    }
    .expect("valid request");

    let response = app.clone().oneshot(request).await.expect("infallible");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("readable body");

    if bytes.is_empty() {
        return (status, serde_json::Value::Null);
    }
    (status, serde_json::from_slice(&bytes).expect("json body"))
}

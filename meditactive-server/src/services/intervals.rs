//! Interval service
//!
//! Dates are validated before any storage access, so an inverted range is a
//! validation failure whether or not the owner exists.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use super::ServiceError;
use crate::db::{Interval, IntervalStore, UserStore};
use crate::models::{
    GoalFields, GoalName, IntervalFields, IntervalFilter, IntervalPatch, IntervalQuery, NewInterval,
};

/// Interval and goal operations
#[derive(Clone)]
pub struct IntervalService {
    intervals: Arc<dyn IntervalStore>,
    users: Arc<dyn UserStore>,
}

impl IntervalService {
    pub fn new(intervals: Arc<dyn IntervalStore>, users: Arc<dyn UserStore>) -> Self {
        Self { intervals, users }
    }

    #[instrument(skip_all)]
    pub async fn create(&self, fields: IntervalFields) -> Result<Interval, ServiceError> {
        let interval = NewInterval::try_from(fields)?;

        if self.users.find(interval.user_id).await?.is_none() {
            return Err(ServiceError::not_found("user", interval.user_id));
        }

        let created = self.intervals.insert(&interval).await?;
        info!(interval_id = created.id, user_id = created.user_id, "interval created");
        Ok(created)
    }

    pub async fn list(&self, query: IntervalQuery) -> Result<Vec<Interval>, ServiceError> {
        let filter = IntervalFilter::try_from(query)?;
        Ok(self.intervals.list(&filter).await?)
    }

    pub async fn get(&self, id: i64) -> Result<Interval, ServiceError> {
        self.find(id).await
    }

    /// Change one or both dates; the merged range must stay ordered.
    #[instrument(skip(self, fields))]
    pub async fn update(&self, id: i64, fields: IntervalFields) -> Result<Interval, ServiceError> {
        let patch = IntervalPatch::try_from(fields)?;
        let current = self.find(id).await?;
        let range = patch.apply(current.start_date, current.end_date)?;

        debug!(start = %range.start(), end = %range.end(), "updating interval range");
        self.intervals
            .update_range(id, range)
            .await?
            .ok_or_else(|| ServiceError::not_found("interval", id))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        if !self.intervals.delete(id).await? {
            return Err(ServiceError::not_found("interval", id));
        }
        info!(interval_id = id, "interval deleted");
        Ok(())
    }

    #[instrument(skip(self, fields))]
    pub async fn add_goal(&self, id: i64, fields: GoalFields) -> Result<Interval, ServiceError> {
        let goal = GoalName::try_from(fields)?;
        self.find(id).await?;

        let interval = self.intervals.add_goal(id, &goal).await?;
        info!(interval_id = id, goals = interval.goals.len(), "goal added");
        Ok(interval)
    }

    async fn find(&self, id: i64) -> Result<Interval, ServiceError> {
        self.intervals
            .find(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("interval", id))
    }
}

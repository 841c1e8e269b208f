//! Account-deletion request state machine and the cascading delete.
//!
//! Requests move pending -> approved -> completed, or pending -> denied.
//! The cascade walks a fixed child-before-parent table order; each table is
//! attempted independently and a partial run is reported, never rolled back.

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::use_cases::{
        notification::NotificationUseCases,
        subscription::{DeletedAccountHistoryRepo, ProfileRepo},
    },
    domain::entities::deletion_request::{AccountDeletionRequest, DeletionRequestStatus},
};

/// Cascade order: children before parents, `profiles` last. Deleting out of
/// order trips foreign-key constraints.
pub const USER_DATA_TABLES: &[(&str, &str)] = &[
    ("event_feedback", "user_id"),
    ("event_checkins", "user_id"),
    ("event_attendees", "user_id"),
    ("event_invitations", "user_id"),
    ("event_announcements", "user_id"),
    ("event_questions", "user_id"),
    ("event_images", "user_id"),
    ("events", "owner_id"),
    ("ai_chat_messages", "user_id"),
    ("ai_chat_sessions", "user_id"),
    ("ai_insights", "user_id"),
    ("ai_usage", "user_id"),
    ("user_ratings", "user_id"),
    ("notifications", "user_id"),
    ("transactions", "user_id"),
    ("user_subscriptions", "user_id"),
    ("user_settings", "user_id"),
    ("user_avatars", "user_id"),
    ("user_sessions", "user_id"),
    ("profiles", "id"),
];

#[async_trait]
pub trait DeletionRequestRepo: Send + Sync {
    async fn create(&self, user_id: Uuid, reason: Option<String>)
        -> AppResult<AccountDeletionRequest>;
    async fn get(&self, id: Uuid) -> AppResult<Option<AccountDeletionRequest>>;
    async fn latest_for_user(&self, user_id: Uuid) -> AppResult<Option<AccountDeletionRequest>>;
    async fn list_pending(&self) -> AppResult<Vec<AccountDeletionRequest>>;
    async fn get_many(&self, ids: &[Uuid]) -> AppResult<Vec<AccountDeletionRequest>>;
    async fn set_approved(&self, id: Uuid, scheduled: NaiveDateTime) -> AppResult<()>;
    async fn set_denied(&self, id: Uuid, cancelled_at: NaiveDateTime) -> AppResult<()>;
    async fn set_completed(&self, id: Uuid, deleted_at: NaiveDateTime) -> AppResult<()>;
}

#[async_trait]
pub trait UserDataRepo: Send + Sync {
    /// Deletes every row in `table` whose `column` equals `user_id`; returns
    /// the row count. `table` and `column` come from [`USER_DATA_TABLES`].
    async fn delete_user_rows(&self, table: &str, column: &str, user_id: Uuid) -> AppResult<u64>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkAction {
    Approve,
    Deny,
}

#[derive(Debug, Clone)]
pub enum BulkSelection {
    Ids(Vec<Uuid>),
    AllPending,
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkUpdateReport {
    pub action: BulkAction,
    pub requested: usize,
    pub updated: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableDeletion {
    pub table: String,
    pub rows_deleted: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CascadeOutcome {
    pub user_id: Uuid,
    pub completed: bool,
    pub total_rows_deleted: u64,
    pub tables: Vec<TableDeletion>,
}

/// Last instant of the month containing `now`, at UTC 23:59:59.999.
pub fn end_of_current_month(now: NaiveDateTime) -> NaiveDateTime {
    let date = now.date();
    let first_of_next = if date.month() == 12 {
        NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
    }
    .expect("first of month is always valid");
    first_of_next
        .pred_opt()
        .expect("month start has a predecessor")
        .and_hms_milli_opt(23, 59, 59, 999)
        .expect("fixed time of day is valid")
}

#[derive(Clone)]
pub struct AccountDeletionUseCases {
    requests: Arc<dyn DeletionRequestRepo>,
    user_data: Arc<dyn UserDataRepo>,
    deleted_history: Arc<dyn DeletedAccountHistoryRepo>,
    profiles: Arc<dyn ProfileRepo>,
    notifications: NotificationUseCases,
}

impl AccountDeletionUseCases {
    pub fn new(
        requests: Arc<dyn DeletionRequestRepo>,
        user_data: Arc<dyn UserDataRepo>,
        deleted_history: Arc<dyn DeletedAccountHistoryRepo>,
        profiles: Arc<dyn ProfileRepo>,
        notifications: NotificationUseCases,
    ) -> Self {
        Self {
            requests,
            user_data,
            deleted_history,
            profiles,
            notifications,
        }
    }

    pub async fn submit(
        &self,
        user_id: Uuid,
        reason: Option<String>,
    ) -> AppResult<AccountDeletionRequest> {
        let request = self.requests.create(user_id, reason).await?;
        self.notifications
            .emit_admin(
                user_id,
                "deletion_requested",
                "Account deletion requested",
                "A user has requested account deletion and is awaiting review.",
            )
            .await;
        Ok(request)
    }

    /// Most recent deletion request for a user, regardless of status.
    pub async fn latest_request_for_user(
        &self,
        user_id: Uuid,
    ) -> AppResult<Option<AccountDeletionRequest>> {
        self.requests.latest_for_user(user_id).await
    }

    /// Approves or denies a batch of pending requests. Each request is
    /// updated independently; a failure is logged and skipped.
    pub async fn bulk_update(
        &self,
        action: BulkAction,
        selection: BulkSelection,
        now: NaiveDateTime,
    ) -> AppResult<BulkUpdateReport> {
        let targets = match selection {
            BulkSelection::AllPending => self.requests.list_pending().await?,
            BulkSelection::Ids(ids) => {
                if ids.is_empty() {
                    return Err(AppError::InvalidInput("No request ids given".into()));
                }
                self.requests.get_many(&ids).await?
            }
        };
        let pending: Vec<&AccountDeletionRequest> = targets
            .iter()
            .filter(|r| r.status == DeletionRequestStatus::Pending)
            .collect();

        let mut updated = 0;
        for request in &pending {
            let result = match action {
                BulkAction::Approve => {
                    self.requests
                        .set_approved(request.id, end_of_current_month(now))
                        .await
                }
                BulkAction::Deny => self.requests.set_denied(request.id, now).await,
            };
            match result {
                Ok(()) => {
                    updated += 1;
                    match action {
                        BulkAction::Approve => {
                            self.notifications
                                .emit_user(
                                    request.user_id,
                                    "deletion_approved",
                                    "Account deletion approved",
                                    "Your account is scheduled for deletion at the end of the month.",
                                )
                                .await;
                        }
                        BulkAction::Deny => {
                            self.notifications
                                .emit_user(
                                    request.user_id,
                                    "deletion_denied",
                                    "Account deletion denied",
                                    "Your account deletion request was denied.",
                                )
                                .await;
                        }
                    }
                }
                Err(err) => {
                    tracing::warn!(
                        request_id = %request.id,
                        action = ?action,
                        error = ?err,
                        "Failed to update deletion request"
                    );
                }
            }
        }

        Ok(BulkUpdateReport {
            action,
            requested: pending.len(),
            updated,
        })
    }

    /// Runs the cascading delete for an approved request. Every table is
    /// attempted even after a failure; the request is marked completed and
    /// the email recorded in deleted-account history only on a clean run.
    /// Re-running a clean cascade deletes zero rows and stays completed.
    pub async fn complete(&self, request_id: Uuid, now: NaiveDateTime) -> AppResult<CascadeOutcome> {
        let request = self
            .requests
            .get(request_id)
            .await?
            .ok_or(AppError::NotFound)?;
        if request.status == DeletionRequestStatus::Denied {
            return Err(AppError::InvalidInput(
                "Cannot delete data for a denied request".into(),
            ));
        }

        // Capture the email before the profiles row goes away. Absent on
        // re-runs where the profile is already deleted.
        let email = self
            .profiles
            .get(request.user_id)
            .await?
            .map(|p| p.email);

        let mut tables = Vec::with_capacity(USER_DATA_TABLES.len());
        let mut total_rows_deleted = 0u64;
        let mut completed = true;
        for (table, column) in USER_DATA_TABLES {
            match self
                .user_data
                .delete_user_rows(table, column, request.user_id)
                .await
            {
                Ok(rows) => {
                    total_rows_deleted += rows;
                    tables.push(TableDeletion {
                        table: (*table).to_string(),
                        rows_deleted: rows,
                        error: None,
                    });
                }
                Err(err) => {
                    completed = false;
                    tracing::error!(
                        user_id = %request.user_id,
                        table = *table,
                        error = ?err,
                        "Cascade deletion failed for table"
                    );
                    tables.push(TableDeletion {
                        table: (*table).to_string(),
                        rows_deleted: 0,
                        error: Some(err.to_string()),
                    });
                }
            }
        }

        if completed {
            if let Some(email) = email {
                self.deleted_history.record(request.user_id, &email).await?;
            }
            self.requests.set_completed(request.id, now).await?;
        }

        Ok(CascadeOutcome {
            user_id: request.user_id,
            completed,
            total_rows_deleted,
            tables,
        })
    }
}

//! Notification service
//!
//! Delivery of side-effect notifications (reactions, follows, comments)
//! and the recipient's inbox operations.

use std::sync::Arc;
use std::time::Duration;

use crate::data::{DELETED_AUTHOR, Database, Notification};
use crate::error::AppError;

/// Upper bound on a single delivery write
const DELIVERY_TIMEOUT: Duration = Duration::from_secs(2);

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 100;

/// One page of a recipient's inbox
#[derive(Debug, Clone)]
pub struct NotificationPage {
    /// Total matching notifications, ignoring pagination
    pub count: i64,
    pub data: Vec<Notification>,
}

/// Notification service
pub struct NotificationService {
    db: Arc<Database>,
}

impl NotificationService {
    /// Create new notification service
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Best-effort delivery
    ///
    /// Never fails: storage errors and timeouts are logged and counted,
    /// and the caller's already-committed mutation stands. Members are
    /// never notified about their own actions, and the deleted-author
    /// sentinel never receives anything.
    ///
    /// # Returns
    /// `true` if a notification row was written
    pub async fn deliver(&self, recipient: &str, actor: &str, title: &str, content: &str) -> bool {
        if recipient == actor || recipient == DELETED_AUTHOR {
            return false;
        }

        let notification = Notification::new(recipient, title, content);
        let status = match tokio::time::timeout(
            DELIVERY_TIMEOUT,
            self.db.insert_notification(&notification),
        )
        .await
        {
            Ok(Ok(())) => {
                tracing::debug!(recipient = %recipient, title = %title, "Notification delivered");
                "delivered"
            }
            Ok(Err(error)) => {
                tracing::warn!(recipient = %recipient, %error, "Notification delivery failed");
                "failed"
            }
            Err(_) => {
                tracing::warn!(
                    recipient = %recipient,
                    timeout_ms = DELIVERY_TIMEOUT.as_millis() as u64,
                    "Notification delivery timed out"
                );
                "timeout"
            }
        };

        crate::metrics::NOTIFICATIONS_TOTAL
            .with_label_values(&[status])
            .inc();
        status == "delivered"
    }

    // =========================================================================
    // Inbox
    // =========================================================================

    /// List the recipient's notifications, newest first
    ///
    /// `limit` defaults to 20 and is clamped to 1..=100; a negative
    /// offset is treated as 0.
    pub async fn list(
        &self,
        recipient: &str,
        limit: Option<i64>,
        offset: Option<i64>,
        unread_only: bool,
    ) -> Result<NotificationPage, AppError> {
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let offset = offset.unwrap_or(0).max(0);

        let count = self.db.count_notifications(recipient, unread_only).await?;
        let data = self
            .db
            .get_notifications(recipient, limit, offset, unread_only)
            .await?;

        Ok(NotificationPage { count, data })
    }

    /// Get one notification; `NotFound` unless the caller is the recipient
    pub async fn get(&self, recipient: &str, id: &str) -> Result<Notification, AppError> {
        self.db
            .get_notification(id, recipient)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn set_read(&self, recipient: &str, id: &str, read: bool) -> Result<(), AppError> {
        if !self.db.set_notification_read(id, recipient, read).await? {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    /// Mark every notification of the recipient; returns rows touched
    pub async fn set_all_read(&self, recipient: &str, read: bool) -> Result<u64, AppError> {
        self.db.set_all_notifications_read(recipient, read).await
    }

    pub async fn delete(&self, recipient: &str, id: &str) -> Result<(), AppError> {
        if !self.db.delete_notification(id, recipient).await? {
            return Err(AppError::NotFound);
        }
        tracing::debug!(recipient = %recipient, id = %id, "Notification deleted");
        Ok(())
    }
}

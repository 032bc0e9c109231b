//! SQLite database operations
//!
//! All database access goes through this module.
//!
//! Multi-row mutations (reaction transitions, member deletion) run in
//! `BEGIN IMMEDIATE` transactions: SQLite's single write lock
//! serializes them, so the read-compute-write of a reaction cannot
//! interleave with another writer. Transactions that lose the race for
//! the lock past `busy_timeout` are retried a bounded number of times.

use std::future::Future;
use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteJournalMode, SqlitePoolOptions};
use sqlx::pool::PoolConnection;
use sqlx::{Pool, Sqlite};

use super::models::*;
use crate::config::DatabaseConfig;
use crate::error::{AppError, ReactionError};

/// Linear backoff step between write retries
const WRITE_RETRY_BACKOFF_MS: u64 = 25;

/// Extended result codes for SQLITE_BUSY and SQLITE_LOCKED
const LOCK_ERROR_CODES: &[&str] = &["5", "6", "261", "262", "517", "773"];

fn is_lock_contention(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db_error) => db_error
            .code()
            .as_deref()
            .is_some_and(|code| LOCK_ERROR_CODES.contains(&code)),
        sqlx::Error::PoolTimedOut => true,
        _ => false,
    }
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db_error) if db_error.is_unique_violation())
}

fn unique_violation_on(error: &sqlx::Error, column: &str) -> bool {
    matches!(
        error,
        sqlx::Error::Database(db_error)
            if db_error.is_unique_violation() && db_error.message().contains(column)
    )
}

fn decode_target_kind(raw: &str) -> Result<TargetKind, AppError> {
    match raw {
        "post" => Ok(TargetKind::Post),
        "comment" => Ok(TargetKind::Comment),
        other => Err(AppError::Internal(anyhow::anyhow!(
            "unknown reaction target kind in storage: {other}"
        ))),
    }
}

fn decode_polarity(raw: &str) -> Result<Polarity, AppError> {
    raw.parse::<Polarity>()
        .map_err(|e| AppError::Internal(anyhow::anyhow!("corrupt reaction row: {e}")))
}

/// A `BEGIN IMMEDIATE` transaction on a pooled connection
///
/// Dropped before `commit` or `rollback` succeeds (a cancelled request,
/// a failed ROLLBACK), the connection is detached from the pool and
/// closed; SQLite rolls back whatever was left open. A pooled connection
/// is never handed out mid-transaction.
struct WriteTransaction {
    conn: Option<PoolConnection<Sqlite>>,
}

impl WriteTransaction {
    async fn begin(pool: &Pool<Sqlite>) -> Result<Self, AppError> {
        let mut tx = Self {
            conn: Some(pool.acquire().await?),
        };
        let begun = sqlx::query("BEGIN IMMEDIATE").execute(tx.conn()?).await;
        if let Err(error) = begun {
            // Nothing is open; the connection can go back to the pool
            tx.release();
            return Err(error.into());
        }
        Ok(tx)
    }

    fn conn(&mut self) -> Result<&mut SqliteConnection, AppError> {
        self.conn
            .as_deref_mut()
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("write transaction already closed")))
    }

    fn release(&mut self) {
        self.conn.take();
    }

    async fn commit(mut self) -> Result<(), AppError> {
        sqlx::query("COMMIT").execute(self.conn()?).await?;
        self.release();
        Ok(())
    }

    async fn rollback(mut self) -> Result<(), AppError> {
        sqlx::query("ROLLBACK").execute(self.conn()?).await?;
        self.release();
        Ok(())
    }

    /// Commit on success, roll back on failure
    async fn finish<T>(self, result: Result<T, AppError>) -> Result<T, AppError> {
        match result {
            Ok(value) => {
                self.commit().await?;
                Ok(value)
            }
            Err(error) => {
                if let Err(rollback_error) = self.rollback().await {
                    tracing::warn!(error = %rollback_error, "Rollback failed, connection discarded");
                }
                Err(error)
            }
        }
    }
}

impl Drop for WriteTransaction {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            tracing::warn!("Write transaction abandoned, closing its connection");
            drop(conn.detach());
        }
    }
}

// =============================================================================
// Relationship edge set
//
// Operate on the connection holding the enclosing transaction. The
// primary key (member, target_kind, target_id) keeps at most one edge per
// member and target, so LIKED and DISLIKED are mutually exclusive.
// =============================================================================

async fn has_edge(
    conn: &mut SqliteConnection,
    member: &str,
    target: &ReactionTarget,
    polarity: Polarity,
) -> Result<bool, AppError> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM reactions
        WHERE member = ? AND target_kind = ? AND target_id = ? AND polarity = ?
        "#,
    )
    .bind(member)
    .bind(target.kind.as_str())
    .bind(&target.id)
    .bind(polarity.as_str())
    .fetch_one(&mut *conn)
    .await?;

    Ok(count > 0)
}

async fn current_state(
    conn: &mut SqliteConnection,
    member: &str,
    target: &ReactionTarget,
) -> Result<ReactionState, AppError> {
    if has_edge(conn, member, target, Polarity::Like).await? {
        return Ok(ReactionState::Liked);
    }
    if has_edge(conn, member, target, Polarity::Dislike).await? {
        return Ok(ReactionState::Disliked);
    }
    Ok(ReactionState::Neutral)
}

async fn add_edge(
    conn: &mut SqliteConnection,
    member: &str,
    target: &ReactionTarget,
    polarity: Polarity,
) -> Result<bool, AppError> {
    let result = sqlx::query(
        r#"
        INSERT OR IGNORE INTO reactions (member, target_kind, target_id, polarity, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(member)
    .bind(target.kind.as_str())
    .bind(&target.id)
    .bind(polarity.as_str())
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

async fn remove_edge(
    conn: &mut SqliteConnection,
    member: &str,
    target: &ReactionTarget,
    polarity: Polarity,
) -> Result<bool, AppError> {
    let result = sqlx::query(
        r#"
        DELETE FROM reactions
        WHERE member = ? AND target_kind = ? AND target_id = ? AND polarity = ?
        "#,
    )
    .bind(member)
    .bind(target.kind.as_str())
    .bind(&target.id)
    .bind(polarity.as_str())
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Move the counter paired with `polarity` by `delta`
///
/// The CHECK constraints on the counter columns abort the transaction
/// rather than let a counter go negative.
async fn adjust_counter(
    conn: &mut SqliteConnection,
    target: &ReactionTarget,
    polarity: Polarity,
    delta: i64,
) -> Result<(), AppError> {
    let column = polarity.counter_column();
    let sql = format!(
        "UPDATE {} SET {column} = {column} + ? WHERE id = ?",
        target.kind.table()
    );
    let result = sqlx::query(&sql)
        .bind(delta)
        .bind(&target.id)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() != 1 {
        return Err(AppError::Internal(anyhow::anyhow!(
            "reaction target {} {} vanished mid-transaction",
            target.kind.as_str(),
            target.id
        )));
    }

    Ok(())
}

async fn load_counts(
    conn: &mut SqliteConnection,
    target: &ReactionTarget,
) -> Result<Option<ReactionCounts>, AppError> {
    let sql = format!(
        "SELECT likes, dislikes FROM {} WHERE id = ?",
        target.kind.table()
    );
    let counts = sqlx::query_as::<_, ReactionCounts>(&sql)
        .bind(&target.id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(counts)
}

/// Author and notification excerpt of a target
async fn load_target_owner(
    conn: &mut SqliteConnection,
    target: &ReactionTarget,
) -> Result<Option<(String, String)>, AppError> {
    let sql = match target.kind {
        TargetKind::Post => "SELECT author, title FROM posts WHERE id = ?",
        TargetKind::Comment => "SELECT author, content FROM comments WHERE id = ?",
    };
    let row = sqlx::query_as::<_, (String, String)>(sql)
        .bind(&target.id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(row)
}

/// Database connection pool wrapper
pub struct Database {
    pool: Pool<Sqlite>,
    write_retries: u32,
}

impl Database {
    // =========================================================================
    // Connection
    // =========================================================================

    /// Connect with default pool settings
    ///
    /// Creates the database file if it doesn't exist.
    /// Runs pending migrations automatically.
    pub async fn connect(path: &Path) -> Result<Self, AppError> {
        Self::connect_with_config(&DatabaseConfig {
            path: path.to_path_buf(),
            max_connections: 5,
            busy_timeout_ms: 5_000,
            write_retries: 3,
        })
        .await
    }

    /// Connect using the `[database]` configuration section
    ///
    /// # Errors
    /// Returns error if connection or migration fails
    pub async fn connect_with_config(config: &DatabaseConfig) -> Result<Self, AppError> {
        if let Some(parent) = config.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AppError::Database(sqlx::Error::Io(e)))?;
        }

        let options = SqliteConnectOptions::new()
            .filename(&config.path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_millis(config.busy_timeout_ms))
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| {
                tracing::error!("Migration failed: {}", e);
                AppError::Internal(anyhow::anyhow!("Migration failed: {}", e))
            })?;

        tracing::info!(
            path = %config.path.display(),
            max_connections = config.max_connections,
            "Database connected and migrated successfully"
        );

        Ok(Self {
            pool,
            write_retries: config.write_retries,
        })
    }

    /// Run a write transaction, retrying when SQLite reports lock contention
    async fn with_write_retry<T, F, Fut>(
        &self,
        operation: &'static str,
        mut attempt: F,
    ) -> Result<T, AppError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
    {
        let mut retries = 0_u32;
        loop {
            match attempt().await {
                Err(AppError::Database(ref error))
                    if is_lock_contention(error) && retries < self.write_retries =>
                {
                    retries += 1;
                    tracing::warn!(operation, retries, "Database locked, retrying write");
                    tokio::time::sleep(Duration::from_millis(
                        WRITE_RETRY_BACKOFF_MS * u64::from(retries),
                    ))
                    .await;
                }
                result => return result,
            }
        }
    }

    // =========================================================================
    // Members
    // =========================================================================

    /// Insert a new member
    ///
    /// # Errors
    /// `Conflict` when the username or email is taken
    pub async fn insert_member(&self, member: &Member) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO members (
                username, email, password_hash, bio,
                session_token_hash, csrf_token_hash, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&member.username)
        .bind(&member.email)
        .bind(&member.password_hash)
        .bind(&member.bio)
        .bind(&member.session_token_hash)
        .bind(&member.csrf_token_hash)
        .bind(member.created_at)
        .bind(member.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if unique_violation_on(&e, "members.email") {
                AppError::Conflict("Email already exists".to_string())
            } else if is_unique_violation(&e) {
                AppError::Conflict("Username already exists".to_string())
            } else {
                e.into()
            }
        })?;

        Ok(())
    }

    pub async fn get_member(&self, username: &str) -> Result<Option<Member>, AppError> {
        let member = sqlx::query_as::<_, Member>("SELECT * FROM members WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(member)
    }

    pub async fn member_exists(&self, username: &str) -> Result<bool, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM members WHERE username = ?")
            .bind(username)
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }

    /// Apply the `Some` fields of `update`
    ///
    /// # Returns
    /// The updated member, or `None` if no such member exists
    pub async fn update_member(
        &self,
        username: &str,
        update: &MemberUpdate,
    ) -> Result<Option<Member>, AppError> {
        if !update.is_empty() {
            sqlx::query(
                r#"
                UPDATE members
                SET email = COALESCE(?, email),
                    bio = COALESCE(?, bio),
                    password_hash = COALESCE(?, password_hash),
                    updated_at = ?
                WHERE username = ?
                "#,
            )
            .bind(&update.email)
            .bind(&update.bio)
            .bind(&update.password_hash)
            .bind(Utc::now())
            .bind(username)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::Conflict("Email already exists".to_string())
                } else {
                    e.into()
                }
            })?;
        }

        self.get_member(username).await
    }

    // =========================================================================
    // Sessions
    // =========================================================================

    /// Usernames whose stored session digest equals `token_hash`
    ///
    /// The column is UNIQUE so at most one row comes back; callers still
    /// treat anything other than exactly one match as "no session".
    pub async fn find_usernames_by_session_hash(
        &self,
        token_hash: &str,
    ) -> Result<Vec<String>, AppError> {
        let usernames = sqlx::query_scalar::<_, String>(
            "SELECT username FROM members WHERE session_token_hash = ? LIMIT 2",
        )
        .bind(token_hash)
        .fetch_all(&self.pool)
        .await?;

        Ok(usernames)
    }

    /// Overwrite the member's session and CSRF digests
    ///
    /// # Errors
    /// `NotFound` for an unknown member, `Conflict` if another member
    /// already holds the same session digest
    pub async fn store_session(
        &self,
        username: &str,
        session_token_hash: &str,
        csrf_token_hash: &str,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE members
            SET session_token_hash = ?, csrf_token_hash = ?
            WHERE username = ?
            "#,
        )
        .bind(session_token_hash)
        .bind(csrf_token_hash)
        .bind(username)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("session token already in use".to_string())
            } else {
                e.into()
            }
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    /// Clear both token digests; succeeds for unknown or logged-out members
    pub async fn clear_session(&self, username: &str) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE members SET session_token_hash = NULL, csrf_token_hash = NULL WHERE username = ?",
        )
        .bind(username)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // =========================================================================
    // Member deletion
    // =========================================================================

    /// Delete a member and detach everything that points at them
    ///
    /// Authored posts and comments are reassigned to [`DELETED_AUTHOR`].
    /// Each of the member's reaction edges is removed together with a
    /// decrement of its counter.
    ///
    /// # Returns
    /// `false` if no such member exists
    pub async fn delete_member(&self, username: &str) -> Result<bool, AppError> {
        self.with_write_retry("delete_member", move || self.try_delete_member(username))
            .await
    }

    async fn try_delete_member(&self, username: &str) -> Result<bool, AppError> {
        let mut tx = WriteTransaction::begin(&self.pool).await?;

        let result: Result<bool, AppError> = async {
            let conn = tx.conn()?;
            let edges = sqlx::query_as::<_, (String, String, String)>(
                "SELECT target_kind, target_id, polarity FROM reactions WHERE member = ?",
            )
            .bind(username)
            .fetch_all(&mut *conn)
            .await?;

            for (kind, id, polarity) in edges {
                let target = ReactionTarget {
                    kind: decode_target_kind(&kind)?,
                    id,
                };
                let polarity = decode_polarity(&polarity)?;
                if remove_edge(conn, username, &target, polarity).await? {
                    adjust_counter(conn, &target, polarity, -1).await?;
                }
            }

            sqlx::query("UPDATE posts SET author = ? WHERE author = ?")
                .bind(DELETED_AUTHOR)
                .bind(username)
                .execute(&mut *conn)
                .await?;
            sqlx::query("UPDATE comments SET author = ? WHERE author = ?")
                .bind(DELETED_AUTHOR)
                .bind(username)
                .execute(&mut *conn)
                .await?;

            sqlx::query("DELETE FROM follows WHERE follower = ? OR followee = ?")
                .bind(username)
                .bind(username)
                .execute(&mut *conn)
                .await?;
            sqlx::query("DELETE FROM notifications WHERE recipient = ?")
                .bind(username)
                .execute(&mut *conn)
                .await?;

            let deleted = sqlx::query("DELETE FROM members WHERE username = ?")
                .bind(username)
                .execute(&mut *conn)
                .await?;

            Ok(deleted.rows_affected() > 0)
        }
        .await;

        tx.finish(result).await
    }

    // =========================================================================
    // Posts and comments
    // =========================================================================

    pub async fn insert_post(&self, post: &Post) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO posts (id, author, title, content, likes, dislikes, views, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&post.id)
        .bind(&post.author)
        .bind(&post.title)
        .bind(&post.content)
        .bind(post.likes)
        .bind(post.dislikes)
        .bind(post.views)
        .bind(post.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_post(&self, id: &str) -> Result<Option<Post>, AppError> {
        let post = sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(post)
    }

    pub async fn insert_comment(&self, comment: &Comment) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO comments (id, post_id, author, content, likes, dislikes, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&comment.id)
        .bind(&comment.post_id)
        .bind(&comment.author)
        .bind(&comment.content)
        .bind(comment.likes)
        .bind(comment.dislikes)
        .bind(comment.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_comment(&self, id: &str) -> Result<Option<Comment>, AppError> {
        let comment = sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(comment)
    }

    // =========================================================================
    // Reactions
    // =========================================================================

    /// Apply one like/dislike action atomically
    ///
    /// Loads the member's current state, computes the transition, and
    /// applies every edge change together with its ±1 counter update in
    /// a single IMMEDIATE transaction. Either all of it commits or none.
    ///
    /// # Errors
    /// `NotFound` if the target does not exist
    pub async fn apply_reaction(
        &self,
        member: &str,
        target: &ReactionTarget,
        action: Polarity,
    ) -> Result<ReactionOutcome, AppError> {
        self.with_write_retry("apply_reaction", move || {
            self.try_apply_reaction(member, target, action)
        })
        .await
    }

    async fn try_apply_reaction(
        &self,
        member: &str,
        target: &ReactionTarget,
        action: Polarity,
    ) -> Result<ReactionOutcome, AppError> {
        let mut tx = WriteTransaction::begin(&self.pool).await?;

        let result: Result<ReactionOutcome, AppError> = async {
            let conn = tx.conn()?;
            let (owner, excerpt) = load_target_owner(conn, target)
                .await?
                .ok_or(ReactionError::NotFound)?;

            let transition = current_state(conn, member, target)
                .await?
                .transition(action);

            if let Some(polarity) = transition.removed() {
                if !remove_edge(conn, member, target, polarity).await? {
                    return Err(AppError::Internal(anyhow::anyhow!(
                        "reaction edge disappeared inside the write lock"
                    )));
                }
                adjust_counter(conn, target, polarity, -1).await?;
            }

            if let Some(polarity) = transition.added() {
                if !add_edge(conn, member, target, polarity).await? {
                    return Err(AppError::Internal(anyhow::anyhow!(
                        "reaction edge appeared inside the write lock"
                    )));
                }
                adjust_counter(conn, target, polarity, 1).await?;
            }

            let counts = load_counts(conn, target)
                .await?
                .ok_or(ReactionError::NotFound)?;

            Ok(ReactionOutcome {
                transition,
                counts,
                owner,
                excerpt,
            })
        }
        .await;

        tx.finish(result).await
    }

    /// Current relation of `member` toward `target`
    pub async fn get_reaction_state(
        &self,
        member: &str,
        target: &ReactionTarget,
    ) -> Result<ReactionState, AppError> {
        let mut conn = self.pool.acquire().await?;
        current_state(&mut conn, member, target).await
    }

    pub async fn get_reaction_counts(
        &self,
        target: &ReactionTarget,
    ) -> Result<Option<ReactionCounts>, AppError> {
        let mut conn = self.pool.acquire().await?;
        load_counts(&mut conn, target).await
    }

    /// Number of edges of one polarity pointing at `target`
    pub async fn count_edges(
        &self,
        target: &ReactionTarget,
        polarity: Polarity,
    ) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM reactions
            WHERE target_kind = ? AND target_id = ? AND polarity = ?
            "#,
        )
        .bind(target.kind.as_str())
        .bind(&target.id)
        .bind(polarity.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// IDs of targets `member` reacted to with `polarity`, newest first
    pub async fn get_reacted_target_ids(
        &self,
        member: &str,
        kind: TargetKind,
        polarity: Polarity,
    ) -> Result<Vec<String>, AppError> {
        let ids = sqlx::query_scalar::<_, String>(
            r#"
            SELECT target_id FROM reactions
            WHERE member = ? AND target_kind = ? AND polarity = ?
            ORDER BY created_at DESC
            "#,
        )
        .bind(member)
        .bind(kind.as_str())
        .bind(polarity.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    // =========================================================================
    // Follows
    // =========================================================================

    /// Insert follow edge when absent
    ///
    /// # Returns
    /// `true` if a new edge was created
    pub async fn insert_follow_if_absent(
        &self,
        follower: &str,
        followee: &str,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO follows (follower, followee, created_at) VALUES (?, ?, ?)",
        )
        .bind(follower)
        .bind(followee)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// # Returns
    /// `true` if an edge was removed
    pub async fn delete_follow(&self, follower: &str, followee: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM follows WHERE follower = ? AND followee = ?")
            .bind(follower)
            .bind(followee)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn is_following(&self, follower: &str, followee: &str) -> Result<bool, AppError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM follows WHERE follower = ? AND followee = ?")
                .bind(follower)
                .bind(followee)
                .fetch_one(&self.pool)
                .await?;

        Ok(count > 0)
    }

    pub async fn get_followers(&self, username: &str) -> Result<Vec<String>, AppError> {
        let followers = sqlx::query_scalar::<_, String>(
            "SELECT follower FROM follows WHERE followee = ? ORDER BY created_at DESC",
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await?;

        Ok(followers)
    }

    pub async fn get_following(&self, username: &str) -> Result<Vec<String>, AppError> {
        let following = sqlx::query_scalar::<_, String>(
            "SELECT followee FROM follows WHERE follower = ? ORDER BY created_at DESC",
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await?;

        Ok(following)
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    /// Insert notification
    pub async fn insert_notification(&self, notification: &Notification) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO notifications (id, recipient, title, content, read, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&notification.id)
        .bind(&notification.recipient)
        .bind(&notification.title)
        .bind(&notification.content)
        .bind(notification.read)
        .bind(notification.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Get a recipient's notifications (paginated, newest first)
    pub async fn get_notifications(
        &self,
        recipient: &str,
        limit: i64,
        offset: i64,
        unread_only: bool,
    ) -> Result<Vec<Notification>, AppError> {
        let sql = if unread_only {
            "SELECT * FROM notifications WHERE recipient = ? AND read = 0 ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?"
        } else {
            "SELECT * FROM notifications WHERE recipient = ? ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?"
        };

        let notifications = sqlx::query_as::<_, Notification>(sql)
            .bind(recipient)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(notifications)
    }

    pub async fn count_notifications(
        &self,
        recipient: &str,
        unread_only: bool,
    ) -> Result<i64, AppError> {
        let sql = if unread_only {
            "SELECT COUNT(*) FROM notifications WHERE recipient = ? AND read = 0"
        } else {
            "SELECT COUNT(*) FROM notifications WHERE recipient = ?"
        };

        let count: i64 = sqlx::query_scalar(sql)
            .bind(recipient)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Get a single notification, only if it belongs to `recipient`
    pub async fn get_notification(
        &self,
        id: &str,
        recipient: &str,
    ) -> Result<Option<Notification>, AppError> {
        let notification = sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE id = ? AND recipient = ?",
        )
        .bind(id)
        .bind(recipient)
        .fetch_optional(&self.pool)
        .await?;

        Ok(notification)
    }

    /// # Returns
    /// `false` if no notification with this id belongs to `recipient`
    pub async fn set_notification_read(
        &self,
        id: &str,
        recipient: &str,
        read: bool,
    ) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE notifications SET read = ? WHERE id = ? AND recipient = ?")
            .bind(read)
            .bind(id)
            .bind(recipient)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Mark all of a recipient's notifications; returns rows touched
    pub async fn set_all_notifications_read(
        &self,
        recipient: &str,
        read: bool,
    ) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE notifications SET read = ? WHERE recipient = ?")
            .bind(read)
            .bind(recipient)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete_notification(&self, id: &str, recipient: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = ? AND recipient = ?")
            .bind(id)
            .bind(recipient)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

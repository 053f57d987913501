use crate::models::{RequestStatus, Team, TeamRequest, MAX_PENDING_REQUESTS, TEAM_CAPACITY};
use crate::services::store::StoreError;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

/// Store operations the assembly controller needs
///
/// Implemented by the document-store client; tests substitute an in-memory
/// store to exercise the membership and request invariants directly.
pub trait AssemblyStore: Send + Sync {
    fn find_open_team(
        &self,
        hackathon_id: &str,
    ) -> impl Future<Output = Result<Option<Team>, StoreError>> + Send;

    fn find_team_for_member(
        &self,
        hackathon_id: &str,
        user_id: &str,
    ) -> impl Future<Output = Result<Option<Team>, StoreError>> + Send;

    fn insert_team(&self, team: &Team) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn update_team(&self, team: &Team) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn get_request(
        &self,
        request_id: &str,
    ) -> impl Future<Output = Result<TeamRequest, StoreError>> + Send;

    fn insert_request(
        &self,
        request: &TeamRequest,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn update_request_status(
        &self,
        request_id: &str,
        status: RequestStatus,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn count_pending_by_sender(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<usize, StoreError>> + Send;

    fn find_pending_pair(
        &self,
        from_user_id: &str,
        to_user_id: &str,
    ) -> impl Future<Output = Result<Option<TeamRequest>, StoreError>> + Send;

    fn list_pending_involving(
        &self,
        user_ids: &[String],
    ) -> impl Future<Output = Result<Vec<TeamRequest>, StoreError>> + Send;
}

/// Errors from team assembly operations
///
/// Invariant violations are always surfaced; nothing here is absorbed into
/// a default.
#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("team is already full")]
    TeamFull,

    #[error("pending request limit reached ({count}/{max})")]
    RequestLimitExceeded { count: usize, max: usize },

    #[error("a pending request to this user already exists")]
    DuplicateRequest,

    #[error("cannot send a team request to yourself")]
    SelfRequest,

    #[error("only the recipient can accept a request")]
    NotRecipient,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("document store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for AssemblyError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(what) => Self::NotFound(what),
            other => Self::Store(other),
        }
    }
}

/// Team Assembly Controller
///
/// Sole writer of Team and TeamRequest records. Join and accept run inside a
/// per-hackathon critical section: the read-then-write on team membership is
/// not atomic at the store, so a lock registry serializes it here.
pub struct TeamAssembly<S> {
    store: Arc<S>,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl<S: AssemblyStore> TeamAssembly<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            locks: Mutex::new(HashMap::new()),
        }
    }

    async fn hackathon_lock(&self, hackathon_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(hackathon_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Join the open team for a hackathon, creating one if none exists
    ///
    /// Idempotent: a user already on a team for this hackathon gets that team
    /// back unchanged.
    pub async fn join_team(&self, hackathon_id: &str, user_id: &str) -> Result<Team, AssemblyError> {
        let lock = self.hackathon_lock(hackathon_id).await;
        let _guard = lock.lock().await;
        self.join_locked(hackathon_id, user_id).await
    }

    /// Join logic; caller must hold the hackathon lock
    async fn join_locked(&self, hackathon_id: &str, user_id: &str) -> Result<Team, AssemblyError> {
        if let Some(team) = self.store.find_team_for_member(hackathon_id, user_id).await? {
            return Ok(team);
        }

        match self.store.find_open_team(hackathon_id).await? {
            None => {
                let team = Team {
                    id: uuid::Uuid::new_v4().to_string(),
                    hackathon_id: hackathon_id.to_string(),
                    members: vec![user_id.to_string()],
                    needed_roles: vec![],
                    is_full: false,
                    name: None,
                    created_at: chrono::Utc::now(),
                };
                self.store.insert_team(&team).await?;
                tracing::info!("Created team {} for hackathon {}", team.id, hackathon_id);
                Ok(team)
            }
            Some(team) => {
                // A stale is_full flag can hand us a team that is actually
                // locked; reject rather than overflow the membership cap.
                if !team.is_open() {
                    return Err(AssemblyError::TeamFull);
                }
                self.add_member(team, user_id).await
            }
        }
    }

    /// Append a member and run the full-team cascade when the cap is reached
    async fn add_member(&self, mut team: Team, user_id: &str) -> Result<Team, AssemblyError> {
        team.members.push(user_id.to_string());
        team.is_full = team.members.len() == TEAM_CAPACITY;
        self.store.update_team(&team).await?;
        tracing::info!(
            "User {} joined team {} ({}/{})",
            user_id,
            team.id,
            team.members.len(),
            TEAM_CAPACITY
        );

        if team.is_full {
            self.cancel_pending_for(&team.members).await?;
        }
        Ok(team)
    }

    /// Cancel every pending request involving any of the given members
    ///
    /// Runs under the same hackathon lock as the membership update that
    /// triggered it, so no join observes the team full with invites live.
    async fn cancel_pending_for(&self, member_ids: &[String]) -> Result<(), AssemblyError> {
        let stale = self.store.list_pending_involving(member_ids).await?;
        let count = stale.len();
        for request in stale {
            self.store
                .update_request_status(&request.id, RequestStatus::Cancelled)
                .await?;
        }
        if count > 0 {
            tracing::info!("Cancelled {} stale requests for a filled team", count);
        }
        Ok(())
    }

    /// Create a team request after enforcing the sender limit and
    /// duplicate-pair checks
    ///
    /// The pending limit is counted globally per sender, not per hackathon.
    pub async fn create_request(
        &self,
        from_user_id: &str,
        to_user_id: &str,
        hackathon_id: &str,
        message: Option<String>,
    ) -> Result<TeamRequest, AssemblyError> {
        if from_user_id == to_user_id {
            return Err(AssemblyError::SelfRequest);
        }

        let count = self.store.count_pending_by_sender(from_user_id).await?;
        if count >= MAX_PENDING_REQUESTS {
            return Err(AssemblyError::RequestLimitExceeded {
                count,
                max: MAX_PENDING_REQUESTS,
            });
        }

        if self
            .store
            .find_pending_pair(from_user_id, to_user_id)
            .await?
            .is_some()
        {
            return Err(AssemblyError::DuplicateRequest);
        }

        let request = TeamRequest {
            id: uuid::Uuid::new_v4().to_string(),
            from_user_id: from_user_id.to_string(),
            to_user_id: to_user_id.to_string(),
            hackathon_id: hackathon_id.to_string(),
            status: RequestStatus::Pending,
            message: message.unwrap_or_default(),
            created_at: chrono::Utc::now(),
        };
        self.store.insert_request(&request).await?;
        tracing::info!(
            "Request {} created: {} -> {}",
            request.id,
            from_user_id,
            to_user_id
        );
        Ok(request)
    }

    /// Accept a request: recipient joins (or creates) the open team, the
    /// sender is added to the same team, and the request leaves the pending
    /// pool
    ///
    /// Idempotent under retry: accepting an already non-pending request
    /// returns the recipient's team without further side effects.
    pub async fn accept_request(
        &self,
        request_id: &str,
        current_user_id: &str,
    ) -> Result<Team, AssemblyError> {
        let request = self.store.get_request(request_id).await?;

        if request.status != RequestStatus::Pending {
            return self
                .store
                .find_team_for_member(&request.hackathon_id, &request.to_user_id)
                .await?
                .ok_or_else(|| {
                    AssemblyError::NotFound(format!(
                        "Request {} is no longer pending and no team exists",
                        request_id
                    ))
                });
        }

        if request.to_user_id != current_user_id {
            return Err(AssemblyError::NotRecipient);
        }

        let lock = self.hackathon_lock(&request.hackathon_id).await;
        let _guard = lock.lock().await;

        let team = self
            .join_locked(&request.hackathon_id, &request.to_user_id)
            .await?;

        // The sender joins the recipient's team specifically; falling back to
        // some other open team would silently split the pair.
        let team = if team.has_member(&request.from_user_id) {
            team
        } else if team.is_open() {
            self.add_member(team, &request.from_user_id).await?
        } else {
            return Err(AssemblyError::TeamFull);
        };

        self.store
            .update_request_status(request_id, RequestStatus::Accepted)
            .await?;
        tracing::info!("Request {} accepted into team {}", request_id, team.id);
        Ok(team)
    }

    /// The sender's current pending-request count
    pub async fn pending_count(&self, user_id: &str) -> Result<usize, AssemblyError> {
        Ok(self.store.count_pending_by_sender(user_id).await?)
    }
}

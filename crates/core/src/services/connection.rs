//! Connection request workflow.
//!
//! ```text
//!   [none] --send(ignore|interested)--> ignore (terminal)
//!                                      interested --review(accepted|rejected)--> terminal
//! ```
//!
//! At most one edge exists per unordered pair of users. The pre-insert lookup
//! produces the friendly conflict; the unique `pair_key` index closes the race
//! between concurrent sends in opposite directions.

use std::collections::HashMap;

use chrono::Utc;
use devlink_common::{AppError, AppResult, IdGenerator};
use devlink_db::{
    entities::{
        connection_request::{self, RequestStatus, pair_key},
        user,
    },
    repositories::{ConnectionRequestRepository, UserRepository},
};
use sea_orm::Set;
use tracing::info;

use crate::validation::parse_user_id;
use crate::views::{PublicProfile, ReceivedRequestView};

/// Status a sender may open a request with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendAction {
    /// Pass on the recipient; the edge is final.
    Ignore,
    /// Ask the recipient to connect.
    Interested,
}

impl SendAction {
    /// Parse a `/requests/send/{status}` path label.
    pub fn parse(label: &str) -> AppResult<Self> {
        match RequestStatus::parse(label) {
            Some(RequestStatus::Ignore) => Ok(Self::Ignore),
            Some(RequestStatus::Interested) => Ok(Self::Interested),
            Some(RequestStatus::Accepted | RequestStatus::Rejected) => Err(AppError::BadRequest(
                format!("Status '{label}' can only be set by reviewing a request"),
            )),
            None => Err(AppError::BadRequest(format!("Invalid status type: {label}"))),
        }
    }

    /// Persisted status.
    #[must_use]
    pub const fn status(self) -> RequestStatus {
        match self {
            Self::Ignore => RequestStatus::Ignore,
            Self::Interested => RequestStatus::Interested,
        }
    }
}

/// Outcome a recipient may review a pending request into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    /// Both users become connections.
    Accepted,
    /// Decline the request.
    Rejected,
}

impl ReviewDecision {
    /// Parse a `/requests/review/{status}` path label.
    pub fn parse(label: &str) -> AppResult<Self> {
        match RequestStatus::parse(label) {
            Some(RequestStatus::Accepted) => Ok(Self::Accepted),
            Some(RequestStatus::Rejected) => Ok(Self::Rejected),
            _ => Err(AppError::BadRequest(format!("Invalid status type: {label}"))),
        }
    }

    /// Persisted status.
    #[must_use]
    pub const fn status(self) -> RequestStatus {
        match self {
            Self::Accepted => RequestStatus::Accepted,
            Self::Rejected => RequestStatus::Rejected,
        }
    }
}

/// A request after a send or review, with its human-readable message.
#[derive(Debug, Clone)]
pub struct ConnectionOutcome {
    /// e.g. "Ada is interested in Bob".
    pub message: String,
    /// The stored edge.
    pub request: connection_request::Model,
}

/// Message for an edge between `sender` and `recipient` in `status`.
#[must_use]
pub fn status_message(status: RequestStatus, sender: &str, recipient: &str) -> String {
    match status {
        RequestStatus::Interested => format!("{sender} is interested in {recipient}"),
        RequestStatus::Ignore => format!("{sender} ignored {recipient}"),
        RequestStatus::Accepted => format!("{recipient} accepted {sender}'s connection request"),
        RequestStatus::Rejected => format!("{recipient} rejected {sender}'s connection request"),
    }
}

/// Connection request service for business logic.
#[derive(Clone)]
pub struct ConnectionService {
    request_repo: ConnectionRequestRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl ConnectionService {
    /// Create a new connection service.
    #[must_use]
    pub const fn new(request_repo: ConnectionRequestRepository, user_repo: UserRepository) -> Self {
        Self {
            request_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Open a request from `actor_id` to `target_id`.
    pub async fn send(
        &self,
        actor_id: &str,
        status: &str,
        target_id: &str,
    ) -> AppResult<ConnectionOutcome> {
        let action = SendAction::parse(status)?;
        let target_id = parse_user_id(target_id)?;

        if actor_id == target_id {
            return Err(AppError::BadRequest(
                "You cannot send a connection request to yourself".to_string(),
            ));
        }

        let target = self
            .user_repo
            .find_by_id(&target_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User to connect not found".to_string()))?;
        let actor = self.user_repo.get_by_id(actor_id).await?;

        if self
            .request_repo
            .find_between(actor_id, &target_id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "Connection Request already exists".to_string(),
            ));
        }

        let now = Utc::now().into();
        let model = connection_request::ActiveModel {
            id: Set(self.id_gen.generate()),
            from_user_id: Set(actor.id.clone()),
            to_user_id: Set(target.id.clone()),
            pair_key: Set(pair_key(&actor.id, &target.id)),
            status: Set(action.status()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let request = self.request_repo.create(model).await?;
        info!(
            request_id = %request.id,
            from = %request.from_user_id,
            to = %request.to_user_id,
            status = %request.status,
            "Connection request sent"
        );

        Ok(ConnectionOutcome {
            message: status_message(request.status, &actor.first_name, &target.first_name),
            request,
        })
    }

    /// Review the pending request that `requester_id` sent to `reviewer_id`.
    pub async fn review(
        &self,
        reviewer_id: &str,
        status: &str,
        requester_id: &str,
    ) -> AppResult<ConnectionOutcome> {
        let decision = ReviewDecision::parse(status)?;
        let requester_id = parse_user_id(requester_id)?;

        let requester = self.user_repo.get_by_id(&requester_id).await?;
        let reviewer = self.user_repo.get_by_id(reviewer_id).await?;

        let request = self
            .request_repo
            .review(&requester.id, &reviewer.id, decision.status(), Utc::now().into())
            .await?
            .ok_or_else(|| AppError::NotFound("Connection request not found".to_string()))?;

        info!(
            request_id = %request.id,
            reviewer = %reviewer.id,
            status = %request.status,
            "Connection request reviewed"
        );

        Ok(ConnectionOutcome {
            message: status_message(request.status, &requester.first_name, &reviewer.first_name),
            request,
        })
    }

    /// Pending inbound requests with senders expanded, newest first.
    pub async fn received(&self, user_id: &str) -> AppResult<Vec<ReceivedRequestView>> {
        let requests = self.request_repo.find_received(user_id).await?;
        let sender_ids: Vec<String> = requests.iter().map(|r| r.from_user_id.clone()).collect();
        let senders = self.profiles_by_id(&sender_ids).await?;

        Ok(requests
            .iter()
            .filter_map(|r| {
                senders
                    .get(&r.from_user_id)
                    .map(|sender| ReceivedRequestView::new(r, PublicProfile::from(sender)))
            })
            .collect())
    }

    /// The other side of every accepted edge touching `user_id`.
    pub async fn connections(&self, user_id: &str) -> AppResult<Vec<PublicProfile>> {
        let requests = self.request_repo.find_accepted_for(user_id).await?;
        let other_ids: Vec<String> = requests
            .iter()
            .map(|r| r.other_party(user_id).to_string())
            .collect();
        let others = self.profiles_by_id(&other_ids).await?;

        Ok(other_ids
            .iter()
            .filter_map(|id| others.get(id).map(PublicProfile::from))
            .collect())
    }

    async fn profiles_by_id(&self, ids: &[String]) -> AppResult<HashMap<String, user::Model>> {
        Ok(self
            .user_repo
            .find_by_ids(ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect())
    }
}

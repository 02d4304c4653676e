//! Conversation turn and call context definitions.
//!
//! A `CallContext` holds everything the conversation pipeline knows about
//! one live phone call: who the customer is, the domain facts injected at
//! call time, and the chronological turn history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Speaker role for a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnRole {
    /// The persona/instruction turn seeded at call creation.
    System,
    /// The voice agent.
    Assistant,
    /// The customer on the phone.
    User,
}

impl TurnRole {
    /// Returns the string label for this role.
    pub fn label(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Assistant => "assistant",
            Self::User => "user",
        }
    }
}

/// One turn of a phone conversation.
///
/// Turns are stored in insertion order; the order is chronological and
/// meaningful to the reply pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub content: String,
}

impl Turn {
    pub fn new(role: TurnRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Per-call conversational state, keyed by an opaque call identifier.
///
/// Created exactly once when a call is dispatched and owned by the call
/// registry. The call id doubles as the correlation token handed to the
/// telephony provider, so it must be unguessable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallContext {
    /// Opaque unguessable identifier, generated at dispatch time.
    pub call_id: String,
    /// Caller-supplied display name of the customer.
    pub customer_name: String,
    /// Free-form domain facts (e.g. property listings) for this call.
    pub domain_context: String,
    /// Chronological turn history, seeded with a single system turn.
    pub history: Vec<Turn>,
    /// When the context was created.
    pub created_at: DateTime<Utc>,
    /// Last time a turn was appended. Drives the idle-expiry sweep.
    pub last_activity: DateTime<Utc>,
}

impl CallContext {
    /// Creates a context seeded with a single system turn.
    pub fn new(
        call_id: impl Into<String>,
        customer_name: impl Into<String>,
        domain_context: impl Into<String>,
        system_prompt: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            call_id: call_id.into(),
            customer_name: customer_name.into(),
            domain_context: domain_context.into(),
            history: vec![Turn::new(TurnRole::System, system_prompt)],
            created_at: now,
            last_activity: now,
        }
    }

    /// Appends a turn and bumps the activity timestamp.
    pub fn push_turn(&mut self, role: TurnRole, content: impl Into<String>) {
        self.history.push(Turn::new(role, content));
        self.last_activity = Utc::now();
    }

    /// Seconds since the last appended turn (or creation).
    pub fn idle_seconds(&self, now: DateTime<Utc>) -> i64 {
        (now - self.last_activity).num_seconds()
    }
}

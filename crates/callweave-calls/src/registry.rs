//! In-memory registry of live call contexts.
//!
//! One context per in-flight phone call, keyed by an unguessable call id.
//! The id doubles as the correlation token handed to the telephony
//! provider, so it is generated from 122 bits of randomness rather than a
//! counter. Contexts are removed either explicitly when a call ends or by
//! the idle-expiry sweep.

use crate::error::CallError;
use callweave_types::{CallContext, TurnRole};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use uuid::Uuid;

/// Persona seeded into every call's opening system turn.
pub const PERSONA_PROMPT: &str = "\
You are 'Purva', an expert and friendly estate agent from the company 'AI Estate Agent'.
You are speaking with a customer on the phone. Your goal is to be helpful, professional, and persuasive.
You have access to a list of properties that match the customer's interest.
Use this information to recommend homes.
Keep your responses CONCISE (1-2 sentences max) as this is a phone conversation.
Speak in a natural, Indian English professional tone.";

/// Registry of per-call conversation contexts.
///
/// Uses `std::sync` locks intentionally: all acquisitions are brief
/// HashMap or context operations that never span `.await` points. Each
/// context sits behind its own mutex, so operations on the same call id
/// serialize while different call ids do not contend beyond the map
/// lookup itself.
#[derive(Debug, Default)]
pub struct CallRegistry {
    contexts: RwLock<HashMap<String, Arc<Mutex<CallContext>>>>,
}

impl CallRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context for a new call and returns its id.
    ///
    /// The context history is seeded with a single system turn combining
    /// the persona prompt and the caller-supplied domain context.
    pub fn create(&self, customer_name: &str, domain_context: &str) -> String {
        let call_id = format!("call_{}", Uuid::new_v4().simple());
        let system_prompt =
            format!("{PERSONA_PROMPT}\n\nContext used for this call:\n{domain_context}");
        let context = CallContext::new(&call_id, customer_name, domain_context, system_prompt);

        let mut contexts = self.contexts.write().unwrap_or_else(|e| e.into_inner());
        contexts.insert(call_id.clone(), Arc::new(Mutex::new(context)));

        tracing::info!(call_id = %call_id, customer = customer_name, "created call context");
        call_id
    }

    /// Returns a snapshot of the context for a call id.
    pub fn get(&self, call_id: &str) -> Option<CallContext> {
        let contexts = self.contexts.read().unwrap_or_else(|e| e.into_inner());
        contexts
            .get(call_id)
            .map(|slot| slot.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    /// Appends a turn to a call's history.
    ///
    /// The append is atomic per call id: concurrent appends to one call
    /// serialize on its context mutex and none are lost.
    pub fn append_turn(
        &self,
        call_id: &str,
        role: TurnRole,
        content: impl Into<String>,
    ) -> Result<(), CallError> {
        let slot = {
            let contexts = self.contexts.read().unwrap_or_else(|e| e.into_inner());
            contexts
                .get(call_id)
                .cloned()
                .ok_or_else(|| CallError::ContextNotFound(call_id.to_string()))?
        };
        let mut context = slot.lock().unwrap_or_else(|e| e.into_inner());
        context.push_turn(role, content);
        Ok(())
    }

    /// Tears down a call's context. Idempotent; returns whether a context
    /// was present.
    pub fn remove(&self, call_id: &str) -> bool {
        let mut contexts = self.contexts.write().unwrap_or_else(|e| e.into_inner());
        let removed = contexts.remove(call_id).is_some();
        if removed {
            tracing::info!(call_id, "removed call context");
        }
        removed
    }

    /// Number of live contexts.
    pub fn len(&self) -> usize {
        self.contexts
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes contexts idle for at least `ttl` and returns how many were
    /// swept.
    pub fn sweep_expired(&self, ttl: Duration) -> usize {
        self.sweep_at(Utc::now(), ttl.as_secs() as i64)
    }

    fn sweep_at(&self, now: DateTime<Utc>, ttl_seconds: i64) -> usize {
        let expired: Vec<String> = {
            let contexts = self.contexts.read().unwrap_or_else(|e| e.into_inner());
            contexts
                .iter()
                .filter(|(_, slot)| {
                    let context = slot.lock().unwrap_or_else(|e| e.into_inner());
                    context.idle_seconds(now) >= ttl_seconds
                })
                .map(|(id, _)| id.clone())
                .collect()
        };
        if expired.is_empty() {
            return 0;
        }

        let mut contexts = self.contexts.write().unwrap_or_else(|e| e.into_inner());
        let mut swept = 0;
        for call_id in expired {
            // Re-check idleness under the write lock: a turn may have
            // landed between the scan and now.
            let still_idle = contexts
                .get(&call_id)
                .map(|slot| {
                    let context = slot.lock().unwrap_or_else(|e| e.into_inner());
                    context.idle_seconds(now) >= ttl_seconds
                })
                .unwrap_or(false);
            if still_idle {
                contexts.remove(&call_id);
                swept += 1;
            }
        }
        if swept > 0 {
            tracing::info!(count = swept, "swept idle call contexts");
        }
        swept
    }
}

//! Registration lookup capability and an in-memory backing store.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::errors::Result;
use crate::events::WebhookEventType;
use crate::registration::{RegistrationId, WebhookRegistration};

/// Read capability the dispatcher is injected with.
///
/// Implementations must be safe for concurrent reads: multiple
/// in-flight dispatches may call [`find_active`](Self::find_active) at
/// the same time.
#[async_trait]
pub trait RegistrationStore: Send + Sync {
    /// Return the registrations that are active and subscribed to
    /// `event_type`. Inactive registrations are never returned.
    async fn find_active(&self, event_type: WebhookEventType) -> Result<Vec<WebhookRegistration>>;
}

/// In-memory registration store backing the CRUD layer and tests.
#[derive(Default)]
pub struct InMemoryRegistrationStore {
    registrations: RwLock<HashMap<RegistrationId, WebhookRegistration>>,
}

impl InMemoryRegistrationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, registration: WebhookRegistration) {
        self.registrations.write().insert(registration.id, registration);
    }

    pub fn get(&self, id: RegistrationId) -> Option<WebhookRegistration> {
        self.registrations.read().get(&id).cloned()
    }

    /// List all registrations, oldest first.
    pub fn list(&self) -> Vec<WebhookRegistration> {
        let mut registrations: Vec<_> = self.registrations.read().values().cloned().collect();
        registrations.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        registrations
    }

    /// Remove a registration. Returns `true` if it existed.
    pub fn remove(&self, id: RegistrationId) -> bool {
        self.registrations.write().remove(&id).is_some()
    }
}

#[async_trait]
impl RegistrationStore for InMemoryRegistrationStore {
    async fn find_active(&self, event_type: WebhookEventType) -> Result<Vec<WebhookRegistration>> {
        let registrations = self.registrations.read();
        Ok(registrations
            .values()
            .filter(|r| r.accepts_event(event_type))
            .cloned()
            .collect())
    }
}

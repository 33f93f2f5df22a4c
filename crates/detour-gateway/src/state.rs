use std::collections::BTreeMap;
use std::sync::Arc;

use detour_admin::{Catalog, FlashMessage, RedirectAdmin};
use detour_core::RedirectStorage;
use parking_lot::Mutex;

use crate::error::{AppError, Result};

/// The controller type every handler works with.
pub type Admin = RedirectAdmin<Arc<dyn RedirectStorage>, Catalog>;

/// Settings the HTTP layer needs besides the controller.
#[derive(Debug, Clone, Default)]
pub struct GatewaySettings {
    /// Account recorded as creator when the request names none.
    pub account: Option<String>,
    /// Token every mutation must echo; `None` disables the check.
    pub csrf_token: Option<String>,
    pub show_hit_count: bool,
    /// Hosts offered in the redirect form in addition to those in use.
    pub hosts: Vec<String>,
}

/// Messages waiting for the page a client is redirected to.
const MAX_PENDING_FLASHES: usize = 64;

/// Flash messages keyed by the ticket handed out with the redirect.
///
/// Only the client holding a ticket sees its messages. At most
/// [`MAX_PENDING_FLASHES`] tickets are kept; the oldest are dropped first.
#[derive(Debug, Default)]
struct FlashStore {
    next_ticket: u64,
    pending: BTreeMap<u64, Vec<FlashMessage>>,
}

impl FlashStore {
    fn push(&mut self, messages: Vec<FlashMessage>) -> u64 {
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.pending.insert(ticket, messages);
        while self.pending.len() > MAX_PENDING_FLASHES {
            self.pending.pop_first();
        }
        ticket
    }

    fn take(&mut self, ticket: u64) -> Vec<FlashMessage> {
        self.pending.remove(&ticket).unwrap_or_default()
    }
}

#[derive(Clone)]
pub struct AppState {
    admin: Admin,
    settings: Arc<GatewaySettings>,
    flash_messages: Arc<Mutex<FlashStore>>,
}

impl AppState {
    pub fn new(admin: Admin, settings: GatewaySettings) -> Self {
        Self {
            admin,
            settings: Arc::new(settings),
            flash_messages: Arc::new(Mutex::new(FlashStore::default())),
        }
    }

    pub fn admin(&self) -> &Admin {
        &self.admin
    }

    pub fn settings(&self) -> &GatewaySettings {
        &self.settings
    }

    /// Picks the creator for a mutation, preferring the per-request account.
    pub fn creator(&self, requested: Option<&str>) -> Option<String> {
        requested
            .map(str::trim)
            .filter(|account| !account.is_empty())
            .map(str::to_string)
            .or_else(|| self.settings.account.clone())
    }

    pub fn verify_csrf(&self, presented: Option<&str>) -> Result<()> {
        match self.settings.csrf_token.as_deref() {
            Some(expected) if presented != Some(expected) => Err(AppError::CsrfMismatch),
            _ => Ok(()),
        }
    }

    /// Parks messages for the next page render and returns their ticket,
    /// or `None` when there is nothing to show.
    pub fn push_flash_messages(&self, messages: Vec<FlashMessage>) -> Option<u64> {
        if messages.is_empty() {
            return None;
        }
        Some(self.flash_messages.lock().push(messages))
    }

    pub fn take_flash_messages(&self, ticket: u64) -> Vec<FlashMessage> {
        self.flash_messages.lock().take(ticket)
    }
}

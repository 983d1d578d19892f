//! Verification Code Store
//!
//! Process-local store of pending one-time codes, keyed by recipient.
//!
//! Every operation goes through a single [`DashMap`] call, so it holds the
//! recipient's shard lock for its whole read-modify-write. Two `issue` calls
//! for the same recipient are serialised and can never leave a code paired
//! with another code's timestamp. Different recipients usually land on
//! different shards and do not contend.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use platform::clock::Clock;
use platform::crypto::{constant_time_eq, random_digits};

use crate::application::config::IdentityConfig;
use crate::domain::entity::pending_code::PendingCode;
use crate::error::{IdentityError, IdentityResult};

type CodeSource = dyn Fn(usize) -> String + Send + Sync;

pub struct VerificationCodeStore {
    codes: DashMap<String, PendingCode>,
    clock: Arc<dyn Clock>,
    code_source: Box<CodeSource>,
    code_length: usize,
    cooldown: Duration,
    ttl: Duration,
}

impl VerificationCodeStore {
    pub fn new(config: &IdentityConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            codes: DashMap::new(),
            clock,
            code_source: Box::new(random_digits),
            code_length: config.code_length,
            cooldown: config.code_cooldown_chrono(),
            ttl: config.code_ttl_chrono(),
        }
    }

    /// Replace the random code generator (tests and fixtures).
    pub fn with_code_source(
        mut self,
        source: impl Fn(usize) -> String + Send + Sync + 'static,
    ) -> Self {
        self.code_source = Box::new(source);
        self
    }

    /// Issue a fresh code for `recipient`, replacing any pending one.
    ///
    /// Fails with [`IdentityError::Throttled`] while the previous code is
    /// inside its cooldown window.
    pub fn issue(&self, recipient: &str) -> IdentityResult<String> {
        let now = self.clock.now();

        match self.codes.entry(recipient.to_owned()) {
            Entry::Occupied(mut entry) => {
                if let Some(remaining) = entry.get().cooldown_remaining(now, self.cooldown) {
                    return Err(IdentityError::Throttled {
                        retry_after_secs: ceil_secs(remaining),
                    });
                }
                let code = (self.code_source)(self.code_length);
                entry.insert(PendingCode::new(code.clone(), now));
                Ok(code)
            }
            Entry::Vacant(entry) => {
                let code = (self.code_source)(self.code_length);
                entry.insert(PendingCode::new(code.clone(), now));
                Ok(code)
            }
        }
    }

    /// True when a pending, unexpired code for `recipient` equals `submitted`.
    /// Does not consume the code.
    pub fn verify(&self, recipient: &str, submitted: &str) -> bool {
        let now = self.clock.now();
        self.codes
            .get(recipient)
            .is_some_and(|pending| self.matches(&pending, submitted, now))
    }

    /// Remove the pending code for `recipient`. No-op when absent.
    pub fn consume(&self, recipient: &str) {
        self.codes.remove(recipient);
    }

    /// Verify and consume in one step. Of two concurrent callers holding the
    /// same valid code, exactly one gets `true`.
    pub fn consume_if_valid(&self, recipient: &str, submitted: &str) -> bool {
        let now = self.clock.now();
        self.codes
            .remove_if(recipient, |_, pending| self.matches(pending, submitted, now))
            .is_some()
    }

    /// Drop codes that are expired and out of their cooldown window.
    /// Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.codes.len();
        self.codes.retain(|_, pending| {
            !pending.is_expired(now, self.ttl)
                || pending.cooldown_remaining(now, self.cooldown).is_some()
        });
        before.saturating_sub(self.codes.len())
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    fn matches(&self, pending: &PendingCode, submitted: &str, now: DateTime<Utc>) -> bool {
        !pending.is_expired(now, self.ttl)
            && constant_time_eq(pending.code.as_bytes(), submitted.as_bytes())
    }
}

fn ceil_secs(duration: Duration) -> u64 {
    let ms = duration.num_milliseconds().max(0) as u64;
    ms.div_ceil(1000).max(1)
}

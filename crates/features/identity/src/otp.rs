use crate::error::IdentityError;
use moka::Entry;
use moka::future::Cache;
use moka::ops::compute::Op;
use platter_domain::config::OtpConfig;
use rand::Rng;
use sha2::{Digest, Sha256};
use std::future;
use std::time::{Duration, Instant};

const MIN_LENGTH: u8 = 4;
const MAX_LENGTH: u8 = 9;

#[derive(Debug, Clone)]
struct PendingOtp {
    digest: String,
    issued_at: Instant,
    expires_at: Instant,
    failed_attempts: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    Missing,
    Matched,
    Wrong,
    Exhausted,
}

/// Outstanding one-time codes, keyed by normalized email.
///
/// Only a SHA-256 digest of each code is kept. Entries leave the cache when
/// used, when they expire, or after `max_attempts` wrong guesses.
#[derive(Debug, Clone)]
pub(crate) struct OtpStore {
    pending: Cache<String, PendingOtp>,
    length: u8,
    ttl: Duration,
    cooldown: Duration,
    max_attempts: u8,
}

impl OtpStore {
    pub(crate) fn new(config: &OtpConfig) -> Self {
        let ttl = Duration::from_secs(config.ttl_seconds.max(1));
        Self {
            pending: Cache::builder()
                .max_capacity(config.cache_capacity.max(1))
                .time_to_live(ttl)
                .build(),
            length: config.length.clamp(MIN_LENGTH, MAX_LENGTH),
            ttl,
            cooldown: Duration::from_secs(config.resend_cooldown_seconds),
            max_attempts: config.max_attempts.max(1),
        }
    }

    pub(crate) const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Generates and stores a fresh code, replacing any older one.
    ///
    /// The cooldown check and the replacement happen under the entry lock, so
    /// concurrent requests for one email issue at most one code per cooldown.
    ///
    /// # Errors
    /// [`IdentityError::RateLimited`] while the previous code is inside the resend cooldown.
    pub(crate) async fn issue(&self, email: &str) -> Result<String, IdentityError> {
        let now = Instant::now();
        let code = self.generate();
        let mut wait = None;

        self.pending
            .entry_by_ref(email)
            .and_compute_with(|current| {
                let op = match current.map(Entry::into_value) {
                    Some(previous)
                        if now < previous.expires_at
                            && now.saturating_duration_since(previous.issued_at) < self.cooldown =>
                    {
                        wait = Some(self.cooldown - now.saturating_duration_since(previous.issued_at));
                        Op::Nop
                    },
                    _ => Op::Put(PendingOtp {
                        digest: digest(email, &code),
                        issued_at: now,
                        expires_at: now + self.ttl,
                        failed_attempts: 0,
                    }),
                };
                future::ready(op)
            })
            .await;

        match wait {
            Some(wait) => Err(IdentityError::RateLimited {
                message: format!("wait {}s before requesting another code", wait.as_secs().max(1))
                    .into(),
                context: None,
            }),
            None => Ok(code),
        }
    }

    /// Consumes the code for `email` when it matches.
    ///
    /// Each call compares and counts under the entry lock; once `max_attempts`
    /// wrong guesses are counted the code is gone, however many requests race.
    ///
    /// # Errors
    /// * [`IdentityError::Auth`] for a missing, expired or wrong code.
    /// * [`IdentityError::RateLimited`] when the wrong guess used up the attempts;
    ///   the code is discarded.
    pub(crate) async fn verify(&self, email: &str, code: &str) -> Result<(), IdentityError> {
        let guess = digest(email, code.trim());
        let mut verdict = Verdict::Missing;

        self.pending
            .entry_by_ref(email)
            .and_compute_with(|current| {
                let op = match current.map(Entry::into_value) {
                    None => Op::Nop,
                    Some(entry) if Instant::now() >= entry.expires_at => Op::Remove,
                    Some(entry) if entry.digest == guess => {
                        verdict = Verdict::Matched;
                        Op::Remove
                    },
                    Some(mut entry) => {
                        entry.failed_attempts = entry.failed_attempts.saturating_add(1);
                        if entry.failed_attempts >= self.max_attempts {
                            verdict = Verdict::Exhausted;
                            Op::Remove
                        } else {
                            verdict = Verdict::Wrong;
                            Op::Put(entry)
                        }
                    },
                };
                future::ready(op)
            })
            .await;

        match verdict {
            Verdict::Matched => Ok(()),
            Verdict::Missing => Err(expired()),
            Verdict::Wrong => Err(IdentityError::Auth {
                message: "verification code is incorrect".into(),
                context: None,
            }),
            Verdict::Exhausted => Err(IdentityError::RateLimited {
                message: "too many wrong codes; request a new one".into(),
                context: None,
            }),
        }
    }

    pub(crate) async fn discard(&self, email: &str) {
        self.pending.invalidate(email).await;
    }

    fn generate(&self) -> String {
        let upper = 10u64.pow(u32::from(self.length));
        let n = rand::rng().random_range(0..upper);
        format!("{n:0width$}", width = usize::from(self.length))
    }
}

fn digest(email: &str, code: &str) -> String {
    hex::encode(Sha256::digest(format!("{email}:{code}").as_bytes()))
}

fn expired() -> IdentityError {
    IdentityError::Auth { message: "verification code expired or was never issued".into(), context: None }
}

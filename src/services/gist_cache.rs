// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory gist cache.
//!
//! One slot holds an account's full gist list, and per-id slots hold single
//! gists. Entries younger than the TTL are served without touching GitHub;
//! older entries are only handed out as a fallback when GitHub rate-limits
//! us.
//!
//! Every mutation updates the list slot and the per-id slot under the same
//! map guard, so the two never disagree after a local write. The cache is
//! private to this process and lost on restart.

use crate::models::Gist;
use dashmap::DashMap;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// A cached value and when it was fetched from GitHub.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub value: T,
    pub fetched_at: Instant,
}

impl<T> CacheEntry<T> {
    fn new(value: T) -> Self {
        Self {
            value,
            fetched_at: Instant::now(),
        }
    }

    /// Fresh while strictly younger than `ttl`.
    pub fn is_fresh(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.fetched_at) < ttl
    }
}

/// Everything cached for one account.
#[derive(Debug, Default)]
struct AccountGists {
    list: Option<CacheEntry<Vec<Gist>>>,
    gists: HashMap<String, CacheEntry<Gist>>,
}

impl AccountGists {
    fn list_position(&self, gist_id: &str) -> Option<usize> {
        self.list
            .as_ref()
            .and_then(|entry| entry.value.iter().position(|g| g.id == gist_id))
    }
}

/// Per-account TTL cache for gist lists and single gists.
pub struct GistCache {
    ttl: Duration,
    accounts: DashMap<String, AccountGists>,
}

impl GistCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            accounts: DashMap::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    // ─── Reads ───────────────────────────────────────────────────────────────

    /// The account's gist list, only if it is still fresh.
    pub fn fresh_list(&self, account_id: &str) -> Option<Vec<Gist>> {
        let now = Instant::now();
        let account = self.accounts.get(account_id)?;
        account
            .list
            .as_ref()
            .filter(|entry| entry.is_fresh(self.ttl, now))
            .map(|entry| entry.value.clone())
    }

    /// The account's gist list regardless of age.
    pub fn any_list(&self, account_id: &str) -> Option<Vec<Gist>> {
        let account = self.accounts.get(account_id)?;
        account.list.as_ref().map(|entry| entry.value.clone())
    }

    /// A single gist, only if it is still fresh.
    pub fn fresh_gist(&self, account_id: &str, gist_id: &str) -> Option<Gist> {
        let now = Instant::now();
        let account = self.accounts.get(account_id)?;
        account
            .gists
            .get(gist_id)
            .filter(|entry| entry.is_fresh(self.ttl, now))
            .map(|entry| entry.value.clone())
    }

    /// A single gist regardless of age.
    pub fn any_gist(&self, account_id: &str, gist_id: &str) -> Option<Gist> {
        let account = self.accounts.get(account_id)?;
        account.gists.get(gist_id).map(|entry| entry.value.clone())
    }

    /// Star status learned from an earlier single-gist read or a star toggle
    /// on a listed gist.
    pub fn known_star(&self, account_id: &str, gist_id: &str) -> Option<bool> {
        let account = self.accounts.get(account_id)?;
        account
            .gists
            .get(gist_id)
            .map(|entry| entry.value.starred)
            .or_else(|| {
                let pos = account.list_position(gist_id)?;
                account.list.as_ref().map(|entry| entry.value[pos].starred)
            })
    }

    // ─── Population ──────────────────────────────────────────────────────────

    /// Store a freshly fetched list. Star flags are carried over from the
    /// single-gist slot, then from the previous list; unknown gists stay
    /// unstarred.
    pub fn store_list(&self, account_id: &str, mut gists: Vec<Gist>) -> Vec<Gist> {
        let mut account = self.accounts.entry(account_id.to_string()).or_default();
        for gist in &mut gists {
            let from_item = account.gists.get(&gist.id).map(|entry| entry.value.starred);
            let from_list = account
                .list
                .as_ref()
                .and_then(|entry| entry.value.iter().find(|g| g.id == gist.id))
                .map(|g| g.starred);
            gist.starred = from_item.or(from_list).unwrap_or(false);
        }
        account.list = Some(CacheEntry::new(gists.clone()));
        gists
    }

    /// Store a freshly fetched single gist, mirroring it into the list.
    pub fn store_gist(&self, account_id: &str, gist: Gist) {
        let mut account = self.accounts.entry(account_id.to_string()).or_default();
        if let Some(pos) = account.list_position(&gist.id) {
            if let Some(list) = account.list.as_mut() {
                list.value[pos] = gist.clone();
            }
        }
        account.gists.insert(gist.id.clone(), CacheEntry::new(gist));
    }

    // ─── Local mutations ─────────────────────────────────────────────────────

    /// A gist was created: cache it and put it at the head of the list.
    pub fn record_created(&self, account_id: &str, gist: Gist) {
        let mut account = self.accounts.entry(account_id.to_string()).or_default();
        if let Some(list) = account.list.as_mut() {
            list.value.retain(|g| g.id != gist.id);
            list.value.insert(0, gist.clone());
        }
        account.gists.insert(gist.id.clone(), CacheEntry::new(gist));
    }

    /// A gist was edited: replace the cached copy and its list element.
    pub fn record_updated(&self, account_id: &str, gist: Gist) {
        self.store_gist(account_id, gist);
    }

    /// A gist was deleted: drop it from both slots.
    pub fn record_deleted(&self, account_id: &str, gist_id: &str) {
        if let Some(mut account) = self.accounts.get_mut(account_id) {
            account.gists.remove(gist_id);
            if let Some(list) = account.list.as_mut() {
                list.value.retain(|g| g.id != gist_id);
            }
        }
    }

    /// Star status changed. The single-gist entry keeps its fetch time.
    pub fn record_starred(&self, account_id: &str, gist_id: &str, starred: bool) {
        if let Some(mut account) = self.accounts.get_mut(account_id) {
            if let Some(entry) = account.gists.get_mut(gist_id) {
                entry.value.starred = starred;
            }
            if let Some(list) = account.list.as_mut() {
                for gist in list.value.iter_mut().filter(|g| g.id == gist_id) {
                    gist.starred = starred;
                }
            }
        }
    }

    /// Drop everything cached for an account.
    pub fn forget_account(&self, account_id: &str) {
        self.accounts.remove(account_id);
    }
}

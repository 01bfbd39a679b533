//! In-process cache for list endpoints
//!
//! Entries are grouped by namespace (one per resource) and keyed by the
//! full paging/sorting/filter tuple of the request. Every mutation of a
//! resource drops its whole namespace; the TTL only bounds staleness from
//! writes that bypass the API. Authorization never reads from here.
//!
//! Each namespace carries a generation counter bumped by `invalidate`. A
//! load that overlaps an invalidation of its namespace is returned to the
//! caller but never cached.

use std::future::Future;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::utils::query::ListQuery;

pub const USERS: &str = "users";
pub const ROLES: &str = "roles";
pub const CMS: &str = "cms";
pub const EMAIL_TEMPLATES: &str = "email_templates";

#[derive(Debug)]
struct Entry {
    value: Value,
    expires_at: Instant,
}

#[derive(Debug)]
pub struct ListCache {
    entries: DashMap<String, Entry>,
    generations: DashMap<String, u64>,
    ttl: Duration,
}

/// Namespace part of a cache key
fn namespace_of(key: &str) -> &str {
    key.split_once(':').map_or(key, |(namespace, _)| namespace)
}

impl ListCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            generations: DashMap::new(),
            ttl,
        }
    }

    /// Deterministic key for one list request
    ///
    /// Filter structs serialize their fields in declaration order, so equal
    /// filters always produce equal keys.
    pub fn key<F: Serialize>(namespace: &str, query: &ListQuery, filter: &F) -> String {
        let filter = serde_json::to_string(filter).unwrap_or_default();
        format!(
            "{namespace}:{}|{}|{}|{}|{filter}",
            query.page, query.page_size, query.order_by, query.descending
        )
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        {
            let entry = self.entries.get(key)?;
            if entry.expires_at > Instant::now() {
                return serde_json::from_value(entry.value.clone()).ok();
            }
        }
        self.entries
            .remove_if(key, |_, entry| entry.expires_at <= Instant::now());
        None
    }

    pub fn insert<T: Serialize>(&self, key: String, value: &T) {
        match serde_json::to_value(value) {
            Ok(value) => {
                self.entries.insert(
                    key,
                    Entry {
                        value,
                        expires_at: Instant::now() + self.ttl,
                    },
                );
            }
            Err(e) => tracing::warn!(error = %e, "Skipping list cache insert"),
        }
    }

    /// Cached value for `key`, or run `load` and cache its success
    ///
    /// The result is not cached when the namespace was invalidated while
    /// `load` was running.
    pub async fn get_or_load<T, E, F, Fut>(&self, key: String, load: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(hit) = self.get(&key) {
            return Ok(hit);
        }
        let namespace = namespace_of(&key).to_string();
        let started = self.generation(&namespace);
        let value = load().await?;

        // Held across the insert so a concurrent invalidate runs before or after it
        let current = self.generations.entry(namespace).or_insert(0);
        if *current == started {
            self.insert(key, &value);
        } else {
            tracing::debug!(key = %key, "Namespace invalidated during load, not caching");
        }
        drop(current);
        Ok(value)
    }

    fn generation(&self, namespace: &str) -> u64 {
        self.generations.get(namespace).map_or(0, |g| *g)
    }

    /// Drop every entry of a namespace
    pub fn invalidate(&self, namespace: &str) {
        *self.generations.entry(namespace.to_string()).or_insert(0) += 1;
        let prefix = format!("{namespace}:");
        self.entries.retain(|key, _| !key.starts_with(&prefix));
        tracing::debug!(namespace, "List cache invalidated");
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::query::{ROLE_SORT, USER_SORT};
    use shared::models::{PageQuery, Paged, RoleFilter, UserFilter};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn query(spec: &crate::utils::query::SortSpec, page: u32) -> ListQuery {
        let raw = PageQuery {
            page: Some(page),
            ..Default::default()
        };
        ListQuery::parse(&raw, spec).unwrap()
    }

    #[test]
    fn key_covers_every_part_of_the_request() {
        let filter = RoleFilter::default();
        let first = ListCache::key(ROLES, &query(&ROLE_SORT, 1), &filter);
        assert_eq!(first, ListCache::key(ROLES, &query(&ROLE_SORT, 1), &filter));
        assert_ne!(first, ListCache::key(ROLES, &query(&ROLE_SORT, 2), &filter));

        let named = RoleFilter {
            name: Some("Admin".into()),
            ..Default::default()
        };
        assert_ne!(first, ListCache::key(ROLES, &query(&ROLE_SORT, 1), &named));
    }

    #[test]
    fn invalidate_only_touches_its_namespace() {
        let cache = ListCache::new(Duration::from_secs(60));
        let page: Paged<i64> = Paged::new(vec![1, 2], 2, 1, 10);
        let role_key = ListCache::key(ROLES, &query(&ROLE_SORT, 1), &RoleFilter::default());
        let user_key = ListCache::key(USERS, &query(&USER_SORT, 1), &UserFilter::default());
        cache.insert(role_key.clone(), &page);
        cache.insert(user_key.clone(), &page);

        cache.invalidate(ROLES);
        assert!(cache.get::<Paged<i64>>(&role_key).is_none());
        let cached: Paged<i64> = cache.get(&user_key).unwrap();
        assert_eq!(cached.items, vec![1, 2]);
    }

    #[tokio::test]
    async fn get_or_load_only_loads_on_miss() {
        let cache = ListCache::new(Duration::from_secs(60));
        let counter = AtomicUsize::new(0);
        let loads = &counter;
        let load = move || async move {
            loads.fetch_add(1, Ordering::SeqCst);
            Ok::<_, ()>(vec![1_i64, 2])
        };

        assert_eq!(cache.get_or_load("cms:a".into(), load).await, Ok(vec![1, 2]));
        assert_eq!(cache.get_or_load("cms:a".into(), load).await, Ok(vec![1, 2]));
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        let failed: Result<Vec<i64>, &str> =
            cache.get_or_load("cms:b".into(), || async { Err("down") }).await;
        assert!(failed.is_err());
        assert!(cache.get::<Vec<i64>>("cms:b").is_none());
    }

    #[tokio::test]
    async fn invalidation_during_load_is_not_overwritten() {
        let cache = ListCache::new(Duration::from_secs(60));
        let cache_ref = &cache;

        let loaded = cache
            .get_or_load("cms:k".into(), || async move {
                // A write lands while the stale page is still being read
                cache_ref.invalidate(CMS);
                Ok::<_, ()>(vec![1_i64])
            })
            .await;
        assert_eq!(loaded, Ok(vec![1]));
        assert!(cache.get::<Vec<i64>>("cms:k").is_none());

        // The next load starts after the invalidation and is cached again
        let reloaded = cache
            .get_or_load("cms:k".into(), || async { Ok::<_, ()>(vec![2_i64]) })
            .await;
        assert_eq!(reloaded, Ok(vec![2]));
        assert_eq!(cache.get::<Vec<i64>>("cms:k"), Some(vec![2]));
    }

    #[tokio::test]
    async fn invalidating_another_namespace_keeps_the_load() {
        let cache = ListCache::new(Duration::from_secs(60));
        let cache_ref = &cache;

        cache
            .get_or_load("cms:k".into(), || async move {
                cache_ref.invalidate(ROLES);
                Ok::<_, ()>(vec![1_i64])
            })
            .await
            .unwrap();
        assert_eq!(cache.get::<Vec<i64>>("cms:k"), Some(vec![1]));
    }

    #[test]
    fn expired_entries_are_dropped() {
        let cache = ListCache::new(Duration::ZERO);
        cache.insert("roles:k".into(), &1_u8);
        assert!(cache.get::<u8>("roles:k").is_none());
        assert!(cache.is_empty());
    }
}

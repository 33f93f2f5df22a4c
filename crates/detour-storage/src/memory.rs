use async_trait::async_trait;
use dashmap::DashMap;
use detour_core::error::{Result, StorageError};
use detour_core::{Host, NewRedirect, ReadRedirectStorage, Redirect, RedirectIdentity, RedirectStorage};
use jiff::Timestamp;
use parking_lot::Mutex;
use tracing::{debug, trace};

/// In-memory implementation of [`RedirectStorage`] using DashMap.
///
/// Reads go straight to the sharded map. Writes take a store-wide lock so a
/// chain rewrite, which touches several entries, is applied as a whole.
/// Every write is immediately visible, so [`RedirectStorage::persist_all`]
/// has nothing to flush.
#[derive(Debug, Default)]
pub struct InMemoryRedirectStorage {
    entries: DashMap<RedirectIdentity, Redirect>,
    write_lock: Mutex<()>,
}

impl InMemoryRedirectStorage {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-filled with `redirects`.
    ///
    /// Later entries replace earlier ones with the same identity.
    pub fn with_redirects(redirects: impl IntoIterator<Item = Redirect>) -> Self {
        let storage = Self::new();
        for redirect in redirects {
            storage.entries.insert(redirect.identity(), redirect);
        }
        storage
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Points every redirect that ends at `created.source_uri_path` to the
    /// new target, so no request has to follow two hops.
    fn rewrite_chain(&self, created: &Redirect) -> Vec<Redirect> {
        let dependents: Vec<RedirectIdentity> = self
            .entries
            .iter()
            .filter(|entry| {
                entry.host == created.host && entry.target_uri_path == created.source_uri_path
            })
            .map(|entry| entry.key().clone())
            .collect();

        let mut rewritten = Vec::with_capacity(dependents.len());
        for identity in dependents {
            if identity.source_uri_path == created.target_uri_path {
                // Would become a loop onto itself.
                self.entries.remove(&identity);
                debug!(redirect = %identity, "removed redirect that would loop");
                continue;
            }
            if let Some(mut entry) = self.entries.get_mut(&identity) {
                entry.target_uri_path = created.target_uri_path.clone();
                debug!(
                    redirect = %identity,
                    target_uri_path = %entry.target_uri_path,
                    "rewrote redirect chain"
                );
                rewritten.push(entry.value().clone());
            }
        }
        rewritten
    }
}

#[async_trait]
impl ReadRedirectStorage for InMemoryRedirectStorage {
    async fn get_one_by_source_uri_path_and_host(
        &self,
        source_uri_path: &str,
        host: Option<&Host>,
        include_inactive: bool,
    ) -> Result<Option<Redirect>> {
        let key = RedirectIdentity::new(source_uri_path, host.cloned());

        let Some(entry) = self.entries.get(&key) else {
            trace!(redirect = %key, "redirect not found");
            return Ok(None);
        };

        if !include_inactive && !entry.is_active_at(Timestamp::now()) {
            trace!(redirect = %key, "redirect is inactive");
            return Ok(None);
        }

        Ok(Some(entry.value().clone()))
    }

    async fn get_all(&self, host: Option<&Host>) -> Result<Vec<Redirect>> {
        let mut redirects: Vec<Redirect> = self
            .entries
            .iter()
            .filter(|entry| host.is_none() || entry.host.as_ref() == host)
            .map(|entry| entry.value().clone())
            .collect();
        redirects.sort_by(|a, b| {
            a.host
                .cmp(&b.host)
                .then_with(|| a.source_uri_path.cmp(&b.source_uri_path))
        });
        Ok(redirects)
    }
}

#[async_trait]
impl RedirectStorage for InMemoryRedirectStorage {
    async fn add_redirect(&self, redirect: NewRedirect) -> Result<Vec<Redirect>> {
        if redirect.source_uri_path.is_empty() {
            return Err(StorageError::InvalidData(
                "source uri path must not be empty".to_string(),
            ));
        }

        let _guard = self.write_lock.lock();
        let now = Timestamp::now();
        let hosts = if redirect.hosts.is_empty() {
            vec![None]
        } else {
            redirect.hosts.clone()
        };

        let mut created = Vec::with_capacity(hosts.len());
        let mut rewritten = Vec::new();
        for host in hosts {
            let new = redirect.to_redirect(host, now);

            // The new redirect replaces whatever started at its source, and
            // anything starting at its target would turn it into a chain.
            self.entries.remove(&new.identity());
            self.entries.remove(&RedirectIdentity::new(
                new.target_uri_path.clone(),
                new.host.clone(),
            ));

            rewritten.extend(self.rewrite_chain(&new));
            self.entries.insert(new.identity(), new.clone());
            debug!(redirect = %new.identity(), target_uri_path = %new.target_uri_path, "added redirect");
            created.push(new);
        }

        created.extend(rewritten);
        Ok(created)
    }

    async fn remove_one_by_source_uri_path_and_host(
        &self,
        source_uri_path: &str,
        host: Option<&Host>,
    ) -> Result<()> {
        let _guard = self.write_lock.lock();
        let key = RedirectIdentity::new(source_uri_path, host.cloned());
        if self.entries.remove(&key).is_some() {
            debug!(redirect = %key, "removed redirect");
        }
        Ok(())
    }

    async fn persist_all(&self) -> Result<()> {
        trace!("in-memory storage has nothing to persist");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::SignedDuration;

    fn host(name: &str) -> Option<Host> {
        Host::parse(name)
    }

    fn new_redirect(source: &str, target: &str, host: Option<Host>) -> NewRedirect {
        NewRedirect::builder()
            .source_uri_path(source)
            .target_uri_path(target)
            .status_code(301)
            .hosts(vec![host])
            .build()
    }

    #[tokio::test]
    async fn add_and_get() {
        let storage = InMemoryRedirectStorage::new();

        let changed = storage
            .add_redirect(new_redirect("/new", "/dest", host("a.com")))
            .await
            .unwrap();
        assert_eq!(changed.len(), 1);
        assert_eq!(changed[0].source_uri_path, "/new");

        let found = storage
            .get_one_by_source_uri_path_and_host("/new", host("a.com").as_ref(), true)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.target_uri_path, "/dest");
        assert_eq!(found.hit_counter, 0);
    }

    #[tokio::test]
    async fn hosts_are_part_of_the_identity() {
        let storage = InMemoryRedirectStorage::new();
        storage
            .add_redirect(new_redirect("/x", "/y", host("a.com")))
            .await
            .unwrap();

        let other_host = storage
            .get_one_by_source_uri_path_and_host("/x", host("b.com").as_ref(), true)
            .await
            .unwrap();
        assert!(other_host.is_none());

        let all_hosts = storage
            .get_one_by_source_uri_path_and_host("/x", None, true)
            .await
            .unwrap();
        assert!(all_hosts.is_none());
    }

    #[tokio::test]
    async fn one_redirect_per_host() {
        let storage = InMemoryRedirectStorage::new();
        let request = NewRedirect::builder()
            .source_uri_path("/x")
            .target_uri_path("/y")
            .status_code(302)
            .hosts(vec![host("a.com"), host("b.com")])
            .build();

        let changed = storage.add_redirect(request).await.unwrap();
        assert_eq!(changed.len(), 2);
        assert_eq!(storage.len(), 2);
    }

    #[tokio::test]
    async fn chain_is_rewritten_to_the_new_target() {
        let storage = InMemoryRedirectStorage::new();
        storage
            .add_redirect(new_redirect("/a", "/b", None))
            .await
            .unwrap();

        let changed = storage
            .add_redirect(new_redirect("/b", "/c", None))
            .await
            .unwrap();

        assert_eq!(changed.len(), 2);
        assert_eq!(changed[0].source_uri_path, "/b");
        assert_eq!(changed[1].source_uri_path, "/a");
        assert_eq!(changed[1].target_uri_path, "/c");
    }

    #[tokio::test]
    async fn loops_are_removed() {
        let storage = InMemoryRedirectStorage::new();
        storage
            .add_redirect(new_redirect("/a", "/b", None))
            .await
            .unwrap();

        let changed = storage
            .add_redirect(new_redirect("/b", "/a", None))
            .await
            .unwrap();

        assert_eq!(changed.len(), 1);
        let all = storage.get_all(None).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].source_uri_path, "/b");
    }

    #[tokio::test]
    async fn chain_rewrite_stays_within_host() {
        let storage = InMemoryRedirectStorage::new();
        storage
            .add_redirect(new_redirect("/a", "/b", host("a.com")))
            .await
            .unwrap();

        let changed = storage
            .add_redirect(new_redirect("/b", "/c", host("b.com")))
            .await
            .unwrap();
        assert_eq!(changed.len(), 1);
    }

    #[tokio::test]
    async fn inactive_redirects_are_hidden_on_request() {
        let past = Timestamp::now() - SignedDuration::from_hours(1);
        let redirect = Redirect::builder()
            .source_uri_path("/old")
            .target_uri_path("/new")
            .status_code(301)
            .end_date_time(Some(past))
            .build();
        let storage = InMemoryRedirectStorage::with_redirects([redirect]);

        assert!(storage
            .get_one_by_source_uri_path_and_host("/old", None, false)
            .await
            .unwrap()
            .is_none());
        assert!(storage
            .get_one_by_source_uri_path_and_host("/old", None, true)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn remove_existing_and_missing() {
        let storage = InMemoryRedirectStorage::new();
        storage
            .add_redirect(new_redirect("/x", "/y", None))
            .await
            .unwrap();

        storage
            .remove_one_by_source_uri_path_and_host("/x", None)
            .await
            .unwrap();
        storage
            .remove_one_by_source_uri_path_and_host("/missing", None)
            .await
            .unwrap();
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn get_all_filters_by_exact_host_and_sorts() {
        let storage = InMemoryRedirectStorage::new();
        for (source, h) in [("/b", host("a.com")), ("/a", host("a.com")), ("/c", None)] {
            storage
                .add_redirect(new_redirect(source, "/target", h))
                .await
                .unwrap();
        }

        let all = storage.get_all(None).await.unwrap();
        let sources: Vec<_> = all.iter().map(|r| r.source_uri_path.as_str()).collect();
        assert_eq!(sources, ["/c", "/a", "/b"]);

        let scoped = storage.get_all(host("a.com").as_ref()).await.unwrap();
        assert_eq!(scoped.len(), 2);
    }

    #[tokio::test]
    async fn concurrent_adds() {
        use std::sync::Arc;

        let storage = Arc::new(InMemoryRedirectStorage::new());
        let mut handles = vec![];

        for i in 0..10u64 {
            let storage = Arc::clone(&storage);
            handles.push(tokio::spawn(async move {
                storage
                    .add_redirect(new_redirect(&format!("/source-{i}"), "/target", None))
                    .await
                    .unwrap();
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(storage.len(), 10);
    }
}

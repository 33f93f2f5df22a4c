use crate::error::Result;
use crate::host::Host;
use crate::redirect::{NewRedirect, Redirect};
use async_trait::async_trait;
use std::sync::Arc;

/// A read-only view of a redirect store.
#[async_trait]
pub trait ReadRedirectStorage: Send + Sync + 'static {
    /// Looks up the redirect occupying `(source_uri_path, host)`.
    ///
    /// With `include_inactive == false`, redirects outside their start/end
    /// window are treated as absent.
    async fn get_one_by_source_uri_path_and_host(
        &self,
        source_uri_path: &str,
        host: Option<&Host>,
        include_inactive: bool,
    ) -> Result<Option<Redirect>>;

    /// Returns every redirect, or only those scoped exactly to `host`.
    async fn get_all(&self, host: Option<&Host>) -> Result<Vec<Redirect>>;
}

/// A redirect store that can be mutated.
///
/// Mutations become durable once [`RedirectStorage::persist_all`] returns.
#[async_trait]
pub trait RedirectStorage: ReadRedirectStorage {
    /// Creates one redirect per host in `redirect.hosts`.
    ///
    /// Returns every redirect changed by the call: the created redirects
    /// first, followed by redirects the store rewrote to keep redirect chains
    /// short. Returns `Err(Conflict)` if the uniqueness constraint is violated.
    async fn add_redirect(&self, redirect: NewRedirect) -> Result<Vec<Redirect>>;

    /// Removes the redirect at `(source_uri_path, host)`, if any.
    async fn remove_one_by_source_uri_path_and_host(
        &self,
        source_uri_path: &str,
        host: Option<&Host>,
    ) -> Result<()>;

    /// Flushes pending changes of the current unit of work.
    async fn persist_all(&self) -> Result<()>;
}

#[async_trait]
impl<S: ReadRedirectStorage + ?Sized> ReadRedirectStorage for Arc<S> {
    async fn get_one_by_source_uri_path_and_host(
        &self,
        source_uri_path: &str,
        host: Option<&Host>,
        include_inactive: bool,
    ) -> Result<Option<Redirect>> {
        (**self)
            .get_one_by_source_uri_path_and_host(source_uri_path, host, include_inactive)
            .await
    }

    async fn get_all(&self, host: Option<&Host>) -> Result<Vec<Redirect>> {
        (**self).get_all(host).await
    }
}

#[async_trait]
impl<S: RedirectStorage + ?Sized> RedirectStorage for Arc<S> {
    async fn add_redirect(&self, redirect: NewRedirect) -> Result<Vec<Redirect>> {
        (**self).add_redirect(redirect).await
    }

    async fn remove_one_by_source_uri_path_and_host(
        &self,
        source_uri_path: &str,
        host: Option<&Host>,
    ) -> Result<()> {
        (**self)
            .remove_one_by_source_uri_path_and_host(source_uri_path, host)
            .await
    }

    async fn persist_all(&self) -> Result<()> {
        (**self).persist_all().await
    }
}

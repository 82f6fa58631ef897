use super::action::CheckoutAction;
use super::state::CheckoutState;
use crate::error::Result;
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// The application's state store.
///
/// `dispatch` applies one action and resolves with the state after it has
/// propagated; `state` is a synchronous read of the current snapshot.
#[async_trait]
pub trait CheckoutStore: Send + Sync {
    async fn dispatch(&self, action: CheckoutAction) -> Result<CheckoutState>;
    fn state(&self) -> CheckoutState;
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PostRequest {
    pub headers: BTreeMap<String, String>,
    pub body: BTreeMap<String, String>,
}

impl PostRequest {
    /// Headers used for the legacy `/checkout.php` form endpoints.
    pub fn form_encoded() -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Accept".to_string(), "text/html".to_string());
        headers.insert(
            "Content-Type".to_string(),
            "application/x-www-form-urlencoded".to_string(),
        );
        Self {
            headers,
            body: BTreeMap::new(),
        }
    }

    pub fn field(mut self, key: &str, value: impl Into<String>) -> Self {
        self.body.insert(key.to_string(), value.into());
        self
    }
}

#[async_trait]
pub trait RequestSender: Send + Sync {
    async fn post(&self, path: &str, request: PostRequest) -> Result<()>;
}

/// Submits a full-page form, navigating away from the current page.
pub trait FormPoster: Send + Sync {
    fn post_form(&self, path: &str, request: PostRequest);
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub String);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A vendor-rendered button ready to be mounted into a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletButton {
    pub label: String,
}

/// A click handler bound once and reused for both attach and detach.
///
/// Listeners compare by pointer identity, so removing a listener only works
/// with the same `ClickListener` (or a clone of it) that was added.
#[derive(Clone)]
pub struct ClickListener(Arc<dyn Fn() -> BoxFuture<'static, Result<()>> + Send + Sync>);

impl ClickListener {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn() -> BoxFuture<'static, Result<()>> + Send + Sync + 'static,
    {
        Self(Arc::new(handler))
    }

    pub fn call(&self) -> BoxFuture<'static, Result<()>> {
        (self.0)()
    }

    pub fn same_as(&self, other: &ClickListener) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ClickListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClickListener").finish()
    }
}

pub trait Document: Send + Sync {
    /// Looks up an element that already exists on the page.
    fn find_element(&self, id: &str) -> Option<ElementId>;
    /// Appends `button` to the container, failing with `InvalidArgument` if
    /// the container does not exist.
    fn mount(&self, container_id: &str, button: WalletButton) -> Result<ElementId>;
    /// Removes a mounted node. Returns false if it was already gone.
    fn unmount(&self, element: &ElementId) -> bool;
    fn add_click_listener(&self, element: &ElementId, listener: ClickListener);
    fn remove_click_listener(&self, element: &ElementId, listener: &ClickListener);
}

pub type CheckoutStoreRef = Arc<dyn CheckoutStore>;
pub type RequestSenderRef = Arc<dyn RequestSender>;
pub type FormPosterRef = Arc<dyn FormPoster>;
pub type DocumentRef = Arc<dyn Document>;

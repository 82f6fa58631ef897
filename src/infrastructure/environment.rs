use crate::application::queue::SerializedQueue;
use crate::application::registries::{Collaborators, StrategyRegistries};
use crate::config::SandboxConfig;
use crate::error::Result;
use crate::infrastructure::document::InMemoryDocument;
use crate::infrastructure::in_memory::{InMemoryCheckoutStore, RecordingFormPoster};
use crate::infrastructure::sandbox::{SandboxGooglePay, SandboxSquare};
use std::sync::Arc;

/// Every sandbox adapter built from one [`SandboxConfig`].
///
/// Concrete handles are kept so callers can inspect what the strategies did.
pub struct SandboxEnvironment {
    pub store: Arc<InMemoryCheckoutStore>,
    pub document: Arc<InMemoryDocument>,
    pub form_poster: Arc<RecordingFormPoster>,
    pub google_pay: Arc<SandboxGooglePay>,
    pub square: Arc<SandboxSquare>,
    pub queue: Arc<SerializedQueue>,
}

impl SandboxEnvironment {
    pub fn new(config: &SandboxConfig) -> Self {
        Self {
            store: Arc::new(InMemoryCheckoutStore::from_config(config)),
            document: Arc::new(InMemoryDocument::new(config.containers.iter().cloned())),
            form_poster: Arc::new(RecordingFormPoster::new()),
            google_pay: Arc::new(SandboxGooglePay::new(config.google_pay.clone())),
            square: Arc::new(SandboxSquare::new(config.square.clone())),
            queue: Arc::new(SerializedQueue::new()),
        }
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            store: self.store.clone(),
            request_sender: self.store.clone(),
            form_poster: self.form_poster.clone(),
            document: self.document.clone(),
            google_pay_loader: self.google_pay.clone(),
            google_pay_initializer: self.google_pay.clone(),
            square_loader: self.square.clone(),
            queue: self.queue.clone(),
        }
    }

    pub fn registries(&self) -> Result<StrategyRegistries> {
        StrategyRegistries::new(&self.collaborators())
    }
}

//! Initialize/deinitialize state machine shared by every strategy.
//!
//! `Lifecycle` tracks a single initialized flag; `ContainerLifecycle` tracks
//! one flag per bound container for strategies that render into several
//! containers at once. Overlapping initialize calls on the same instance are
//! serialized so vendor setup runs once. A deinitialize that arrives while
//! setup is still suspended on the vendor abandons that setup: the setup
//! future is dropped and its caller gets `Timeout { Abandoned }`.

use crate::error::{CheckoutError, NotInitializedKind, Result};
use std::collections::BTreeSet;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::{Mutex, Notify};
use tracing::debug;

pub struct Lifecycle {
    kind: NotInitializedKind,
    gate: Mutex<()>,
    initialized: AtomicBool,
    epoch: AtomicU64,
    abandon: Notify,
}

impl Lifecycle {
    pub fn new(kind: NotInitializedKind) -> Self {
        Self {
            kind,
            gate: Mutex::new(()),
            initialized: AtomicBool::new(false),
            epoch: AtomicU64::new(0),
            abandon: Notify::new(),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    pub fn ensure_initialized(&self) -> Result<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(CheckoutError::NotInitialized(self.kind))
        }
    }

    /// Runs `setup` unless already initialized.
    ///
    /// Resolves `Ok(false)` for a redundant call. On failure the flag stays
    /// down so the caller can retry; `setup` owns undoing its own partial work,
    /// including when it is dropped at a suspension point by a concurrent
    /// [`deinitialize`](Lifecycle::deinitialize).
    pub async fn initialize<F, Fut>(&self, setup: F) -> Result<bool>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        let epoch = self.epoch.load(Ordering::Acquire);
        let _gate = self.gate.lock().await;
        if self.is_initialized() {
            debug!(kind = %self.kind, "initialize skipped, already initialized");
            return Ok(false);
        }

        let abandoned = self.abandon.notified();
        if self.epoch.load(Ordering::Acquire) != epoch {
            debug!(kind = %self.kind, "initialize abandoned before setup");
            return Err(CheckoutError::abandoned());
        }

        tokio::select! {
            outcome = setup() => outcome?,
            _ = abandoned => {
                debug!(kind = %self.kind, "initialize abandoned during setup");
                return Err(CheckoutError::abandoned());
            }
        }
        self.initialized.store(true, Ordering::Release);
        Ok(true)
    }

    /// Runs `teardown` if initialized and always leaves the flag down.
    ///
    /// Pending initialize calls are abandoned first, so this never waits on a
    /// vendor that stopped responding. A teardown error is still reported, but
    /// the strategy is considered uninitialized afterwards since its handles
    /// have been released.
    pub async fn deinitialize<F, Fut>(&self, teardown: F) -> Result<bool>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        self.epoch.fetch_add(1, Ordering::AcqRel);
        self.abandon.notify_waiters();

        let _gate = self.gate.lock().await;
        if !self.is_initialized() {
            debug!(kind = %self.kind, "deinitialize skipped, not initialized");
            return Ok(false);
        }

        self.initialized.store(false, Ordering::Release);
        teardown().await?;
        Ok(true)
    }
}

pub struct ContainerLifecycle {
    bound: Mutex<BTreeSet<String>>,
    in_flight: std::sync::Mutex<Option<String>>,
    epoch: AtomicU64,
    abandon: Notify,
}

impl Default for ContainerLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerLifecycle {
    pub fn new() -> Self {
        Self {
            bound: Mutex::new(BTreeSet::new()),
            in_flight: std::sync::Mutex::new(None),
            epoch: AtomicU64::new(0),
            abandon: Notify::new(),
        }
    }

    pub async fn bound_containers(&self) -> Vec<String> {
        self.bound.lock().await.iter().cloned().collect()
    }

    fn set_in_flight(&self, container_id: Option<&str>) {
        *self.in_flight.lock().unwrap_or_else(|e| e.into_inner()) =
            container_id.map(str::to_string);
    }

    /// Binds `container_id` by running `setup`, which learns whether this is
    /// the first bound container.
    ///
    /// Releasing the same container (or every container) while `setup` is
    /// suspended drops it and fails this call with `Timeout { Abandoned }`.
    pub async fn initialize<F, Fut>(&self, container_id: &str, setup: F) -> Result<bool>
    where
        F: FnOnce(bool) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        let epoch = self.epoch.load(Ordering::Acquire);
        let mut bound = self.bound.lock().await;
        if bound.contains(container_id) {
            debug!(container_id, "initialize skipped, container already bound");
            return Ok(false);
        }

        let abandoned = self.abandon.notified();
        self.set_in_flight(Some(container_id));
        if self.epoch.load(Ordering::Acquire) != epoch {
            self.set_in_flight(None);
            debug!(container_id, "initialize abandoned before setup");
            return Err(CheckoutError::abandoned());
        }

        let outcome = tokio::select! {
            outcome = setup(bound.is_empty()) => outcome,
            _ = abandoned => {
                debug!(container_id, "initialize abandoned during setup");
                Err(CheckoutError::abandoned())
            }
        };
        self.set_in_flight(None);
        outcome?;

        bound.insert(container_id.to_string());
        Ok(true)
    }

    /// Releases one container, or every container when `container_id` is
    /// `None`. `teardown` receives the released ids and whether nothing is
    /// left bound. Unbound ids are a no-op.
    pub async fn deinitialize<F, Fut>(&self, container_id: Option<&str>, teardown: F) -> Result<Vec<String>>
    where
        F: FnOnce(Vec<String>, bool) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        let abandons_in_flight = {
            let in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
            match container_id {
                None => true,
                Some(id) => in_flight.as_deref() == Some(id),
            }
        };
        if container_id.is_none() {
            self.epoch.fetch_add(1, Ordering::AcqRel);
        }
        if abandons_in_flight {
            self.abandon.notify_waiters();
        }

        let mut bound = self.bound.lock().await;
        let released: Vec<String> = match container_id {
            Some(id) => bound.take(id).into_iter().collect(),
            None => std::mem::take(&mut *bound).into_iter().collect(),
        };

        if released.is_empty() {
            debug!(?container_id, "deinitialize skipped, nothing bound");
            return Ok(released);
        }

        teardown(released.clone(), bound.is_empty()).await?;
        Ok(released)
    }
}

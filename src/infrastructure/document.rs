use crate::domain::ports::{ClickListener, Document, ElementId, WalletButton};
use crate::error::{CheckoutError, Result};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex};
use tracing::debug;

#[derive(Debug, Default)]
struct Page {
    containers: BTreeSet<String>,
    /// Mounted element to the container holding it.
    mounted: BTreeMap<ElementId, String>,
    listeners: HashMap<ElementId, Vec<ClickListener>>,
    next_id: u64,
}

/// A page with a fixed set of containers that buttons can be mounted into.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDocument {
    page: Arc<Mutex<Page>>,
}

impl InMemoryDocument {
    pub fn new<I, S>(containers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let page = Page {
            containers: containers.into_iter().map(Into::into).collect(),
            ..Default::default()
        };
        Self {
            page: Arc::new(Mutex::new(page)),
        }
    }

    pub fn mounted_in(&self, container_id: &str) -> Vec<ElementId> {
        let page = self.page.lock().unwrap_or_else(|e| e.into_inner());
        page.mounted
            .iter()
            .filter(|(_, container)| container.as_str() == container_id)
            .map(|(element, _)| element.clone())
            .collect()
    }

    pub fn listener_count(&self, element_id: &str) -> usize {
        let page = self.page.lock().unwrap_or_else(|e| e.into_inner());
        page.listeners
            .get(&ElementId(element_id.to_string()))
            .map_or(0, Vec::len)
    }

    /// Clicks `target`: a mounted element, or every element inside a
    /// container. Returns how many listeners ran; the first error wins.
    pub async fn click(&self, target: &str) -> Result<usize> {
        let listeners: Vec<ClickListener> = {
            let page = self.page.lock().unwrap_or_else(|e| e.into_inner());
            let target_id = ElementId(target.to_string());
            if !page.containers.contains(target) && !page.mounted.contains_key(&target_id) {
                return Err(CheckoutError::InvalidArgument(format!(
                    "no element \"{target}\" on the page"
                )));
            }

            page.listeners
                .iter()
                .filter(|(element, _)| {
                    **element == target_id
                        || page.mounted.get(*element).map(String::as_str) == Some(target)
                })
                .flat_map(|(_, listeners)| listeners.iter().cloned())
                .collect()
        };

        debug!(target, listeners = listeners.len(), "click");
        for listener in &listeners {
            listener.call().await?;
        }
        Ok(listeners.len())
    }
}

impl Document for InMemoryDocument {
    fn find_element(&self, id: &str) -> Option<ElementId> {
        let page = self.page.lock().unwrap_or_else(|e| e.into_inner());
        let element = ElementId(id.to_string());
        (page.containers.contains(id) || page.mounted.contains_key(&element)).then_some(element)
    }

    fn mount(&self, container_id: &str, button: WalletButton) -> Result<ElementId> {
        let mut page = self.page.lock().unwrap_or_else(|e| e.into_inner());
        if !page.containers.contains(container_id) {
            return Err(CheckoutError::InvalidArgument(format!(
                "Unable to mount \"{}\" because container \"{container_id}\" does not exist.",
                button.label
            )));
        }

        page.next_id += 1;
        let element = ElementId(format!("{container_id}-button-{}", page.next_id));
        page.mounted.insert(element.clone(), container_id.to_string());
        Ok(element)
    }

    fn unmount(&self, element: &ElementId) -> bool {
        let mut page = self.page.lock().unwrap_or_else(|e| e.into_inner());
        page.listeners.remove(element);
        page.mounted.remove(element).is_some()
    }

    fn add_click_listener(&self, element: &ElementId, listener: ClickListener) {
        let mut page = self.page.lock().unwrap_or_else(|e| e.into_inner());
        page.listeners
            .entry(element.clone())
            .or_default()
            .push(listener);
    }

    fn remove_click_listener(&self, element: &ElementId, listener: &ClickListener) {
        let mut page = self.page.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(listeners) = page.listeners.get_mut(element) {
            listeners.retain(|existing| !existing.same_as(listener));
        }
    }
}

use std::time::{SystemTime, UNIX_EPOCH};

use uuid::Uuid;

use crate::types::errors::TabError;
use crate::types::tab::Tab;

/// Trait defining the tab tracking interface.
pub trait TabManagerTrait {
    fn create_tab(&mut self, url: Option<&str>, active: bool) -> String;
    fn close_tab(&mut self, tab_id: &str) -> Result<(), TabError>;
    fn switch_tab(&mut self, tab_id: &str) -> Result<(), TabError>;
    fn get_tab(&self, tab_id: &str) -> Option<&Tab>;
    fn get_all_tabs(&self) -> Vec<&Tab>;
    fn get_active_tab(&self) -> Option<&Tab>;
    fn tab_count(&self) -> usize;
    fn update_tab_url(&mut self, tab_id: &str, url: Option<&str>) -> Result<(), TabError>;
}

/// In-memory record of the window's tabs, in tab strip order.
pub struct TabManager {
    tabs: Vec<Tab>,
    active_tab_id: Option<String>,
}

impl TabManager {
    pub fn new() -> Self {
        Self {
            tabs: Vec::new(),
            active_tab_id: None,
        }
    }

    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64
    }

    fn find_tab_index(&self, tab_id: &str) -> Option<usize> {
        self.tabs.iter().position(|t| t.id == tab_id)
    }
}

impl Default for TabManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TabManagerTrait for TabManager {
    /// Create a new tab and return its ID. The first tab always becomes active.
    fn create_tab(&mut self, url: Option<&str>, active: bool) -> String {
        let id = Uuid::new_v4().to_string();
        self.tabs.push(Tab {
            id: id.clone(),
            url: url.map(str::to_string),
            title: "New Tab".to_string(),
            created_at: Self::now(),
        });
        if active || self.active_tab_id.is_none() {
            self.active_tab_id = Some(id.clone());
        }
        id
    }

    /// Close a tab. If it was active, its right neighbour (or the new last
    /// tab) becomes active.
    fn close_tab(&mut self, tab_id: &str) -> Result<(), TabError> {
        let idx = self
            .find_tab_index(tab_id)
            .ok_or_else(|| TabError::NotFound(tab_id.to_string()))?;
        self.tabs.remove(idx);

        if self.active_tab_id.as_deref() == Some(tab_id) {
            self.active_tab_id = if self.tabs.is_empty() {
                None
            } else {
                Some(self.tabs[idx.min(self.tabs.len() - 1)].id.clone())
            };
        }
        Ok(())
    }

    fn switch_tab(&mut self, tab_id: &str) -> Result<(), TabError> {
        if self.find_tab_index(tab_id).is_none() {
            return Err(TabError::NotFound(tab_id.to_string()));
        }
        self.active_tab_id = Some(tab_id.to_string());
        Ok(())
    }

    fn get_tab(&self, tab_id: &str) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.id == tab_id)
    }

    fn get_all_tabs(&self) -> Vec<&Tab> {
        self.tabs.iter().collect()
    }

    fn get_active_tab(&self) -> Option<&Tab> {
        self.active_tab_id.as_deref().and_then(|id| self.get_tab(id))
    }

    fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    /// Record a navigation. `None` hides the URL from the extension.
    fn update_tab_url(&mut self, tab_id: &str, url: Option<&str>) -> Result<(), TabError> {
        let idx = self
            .find_tab_index(tab_id)
            .ok_or_else(|| TabError::NotFound(tab_id.to_string()))?;
        self.tabs[idx].url = url.map(str::to_string);
        Ok(())
    }
}

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A ticket category domain with its own numbering prefix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketModule {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub prefix: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl TicketModule {
    /// Modules without a category list accept any category
    pub fn accepts_category(&self, category: &str) -> bool {
        self.categories.is_empty()
            || self
                .categories
                .iter()
                .any(|c| c.eq_ignore_ascii_case(category))
    }
}

/// Lookup table of configured modules
#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    modules: HashMap<String, TicketModule>,
}

impl ModuleRegistry {
    pub fn new(modules: impl IntoIterator<Item = TicketModule>) -> Self {
        Self {
            modules: modules.into_iter().map(|m| (m.id.clone(), m)).collect(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&TicketModule> {
        self.modules.get(id)
    }

    /// Active modules sorted by name, as offered on module selection
    pub fn active(&self) -> Vec<&TicketModule> {
        let mut active: Vec<_> = self.modules.values().filter(|m| m.active).collect();
        active.sort_by(|a, b| a.name.cmp(&b.name));
        active
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

//! Group Registry Module
//!
//! Name-to-group mapping shared by the node: created once, read many times,
//! never deleted.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use crate::error::{CacheError, Result};
use crate::group::{Group, GroupOptions, Loader};

// == Group Registry ==
/// Registry of cache namespaces.
///
/// Construct one per node and share it (for example behind an `Arc`) with
/// every component that resolves groups by name. Tests build their own.
#[derive(Debug, Default)]
pub struct GroupRegistry {
    groups: RwLock<HashMap<String, Arc<Group>>>,
}

impl GroupRegistry {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Create Group ==
    /// Builds an LRU group with no TTL and registers it under `name`.
    pub fn create_group<L: Loader>(
        &self,
        name: impl Into<String>,
        max_bytes: usize,
        loader: L,
    ) -> Result<Arc<Group>> {
        self.create_group_with(GroupOptions::new(name, max_bytes), Arc::new(loader))
    }

    /// Builds a group from options and registers it.
    ///
    /// A name can be registered once; a second registration is rejected and
    /// the original group stays in place.
    pub fn create_group_with(
        &self,
        options: GroupOptions,
        loader: Arc<dyn Loader>,
    ) -> Result<Arc<Group>> {
        let mut groups = self.groups.write();
        if groups.contains_key(&options.name) {
            return Err(CacheError::DuplicateGroup(options.name));
        }

        info!(
            group = %options.name,
            max_bytes = options.max_bytes,
            policy = %options.policy,
            "registering cache group"
        );
        let name = options.name.clone();
        let group = Arc::new(Group::new(options, loader));
        groups.insert(name, Arc::clone(&group));
        Ok(group)
    }

    // == Get Group ==
    /// Looks up a group without creating it.
    pub fn get_group(&self, name: &str) -> Option<Arc<Group>> {
        self.groups.read().get(name).cloned()
    }

    /// Registered group names, sorted.
    pub fn group_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.groups.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.groups.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.read().is_empty()
    }
}

use std::sync::Arc;

use storage::DisplayNameStore;
use tracing::info;

use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameChange {
    Unchanged,
    Registered,
}

/// Remembers the last name each user submitted.
///
/// The name in a command always wins; the registry only attributes image
/// uploads and notices renames.
#[derive(Clone)]
pub struct NameRegistry {
    store: Arc<dyn DisplayNameStore>,
}

impl NameRegistry {
    pub fn new(store: Arc<dyn DisplayNameStore>) -> Self {
        Self { store }
    }

    pub async fn resolve(&self, user_id: &str) -> Result<Option<String>> {
        Ok(self
            .store
            .get_display_name(user_id)
            .await?
            .map(|display_name| display_name.name))
    }

    pub async fn register(&self, user_id: &str, name: &str) -> Result<()> {
        self.store.put_display_name(user_id, name).await?;
        Ok(())
    }

    /// Store `name` for `user_id` unless it is already the registered one.
    pub async fn sync(&self, user_id: &str, name: &str) -> Result<NameChange> {
        if self.resolve(user_id).await?.as_deref() == Some(name) {
            return Ok(NameChange::Unchanged);
        }

        info!("Registering name '{}' for user {}", name, user_id);
        self.register(user_id, name).await?;
        Ok(NameChange::Registered)
    }
}

pub fn name_set_message(name: &str) -> String {
    format!(
        "Your name was set to {}.\nBot always uses your latest submitted name. To change your name, type 'Name+0'",
        name
    )
}

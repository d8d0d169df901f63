//! Named factories with a configured selection.
//!
//! The [`FactoryOwner`] keeps constructors by [`FactoryId`] and remembers
//! which one configuration selected, so callers can build an instance from an
//! id and a setup payload without knowing the concrete type.
//!
//! ```text
//! FactoryOwner
//! ├── factories: HashMap<FactoryId, Factory>
//! └── selected: Option<FactoryId>
//! ```

use std::collections::HashMap;

use crate::error::{ErrorSeverity, GameError};
use crate::types::{ControllerId, FactoryId};

/// Constructor taking the new instance's id and its setup payload.
pub type Factory<T, S> = Box<dyn Fn(&ControllerId, &S) -> T + Send>;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FactoryError {
    #[error("no factory has been selected")]
    NoFactorySelected,

    #[error("factory `{id}` is not registered")]
    UnknownFactory { id: FactoryId },

    #[error("factory `{id}` is already registered")]
    DuplicateFactory { id: FactoryId },
}

impl GameError for FactoryError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NoFactorySelected | Self::UnknownFactory { .. } => ErrorSeverity::Fatal,
            Self::DuplicateFactory { .. } => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NoFactorySelected => "FACTORY_NOT_SELECTED",
            Self::UnknownFactory { .. } => "FACTORY_UNKNOWN",
            Self::DuplicateFactory { .. } => "FACTORY_DUPLICATE",
        }
    }
}

pub struct FactoryOwner<T, S> {
    factories: HashMap<FactoryId, Factory<T, S>>,
    selected: Option<FactoryId>,
}

impl<T, S> FactoryOwner<T, S> {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
            selected: None,
        }
    }

    /// Registers a factory under `id`.
    pub fn register<F>(&mut self, id: impl Into<FactoryId>, factory: F) -> Result<(), FactoryError>
    where
        F: Fn(&ControllerId, &S) -> T + Send + 'static,
    {
        let id = id.into();
        if self.factories.contains_key(&id) {
            return Err(FactoryError::DuplicateFactory { id });
        }
        self.factories.insert(id, Box::new(factory));
        Ok(())
    }

    /// Removes a factory. A selection naming it is left in place and fails
    /// on the next [`create`](Self::create).
    pub fn unregister(&mut self, id: &FactoryId) -> Option<Factory<T, S>> {
        self.factories.remove(id)
    }

    /// Selects the factory used by [`create`](Self::create).
    pub fn select(&mut self, id: impl Into<FactoryId>) -> Result<(), FactoryError> {
        let id = id.into();
        if !self.factories.contains_key(&id) {
            return Err(FactoryError::UnknownFactory { id });
        }
        self.selected = Some(id);
        Ok(())
    }

    pub fn selected(&self) -> Option<&FactoryId> {
        self.selected.as_ref()
    }

    pub fn contains(&self, id: &FactoryId) -> bool {
        self.factories.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Builds an instance with the selected factory.
    pub fn create(&self, id: &ControllerId, setup: &S) -> Result<T, FactoryError> {
        let selected = self.selected.as_ref().ok_or(FactoryError::NoFactorySelected)?;
        let factory = self
            .factories
            .get(selected)
            .ok_or_else(|| FactoryError::UnknownFactory {
                id: selected.clone(),
            })?;
        Ok(factory(id, setup))
    }
}

impl<T, S> Default for FactoryOwner<T, S> {
    fn default() -> Self {
        Self::new()
    }
}

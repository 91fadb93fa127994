//! In-memory [`Database`] implementation.

use std::{collections::HashMap, sync::Arc};

use common::operations::{By, Commit, Insert, Select, Transact};
use tokio::sync::RwLock;
use tracerr::Traced;

use crate::{
    domain::{user, User},
    infra::{database, Database},
};

/// In-memory [`Database`] keeping [`User`]s until dropped.
///
/// Clones share the same storage. [`Transact`] hands out the same storage as
/// well, so every [`Insert`] is visible immediately and [`Commit`] does
/// nothing.
#[derive(Clone, Debug, Default)]
pub struct Memory {
    /// Stored [`User`]s indexed by their [`user::Username`].
    users: Arc<RwLock<HashMap<user::Username, User>>>,
}

impl Memory {
    /// Creates a new empty [`Memory`] storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored [`User`]s.
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    /// Indicates whether no [`User`]s are stored.
    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

impl Database<Select<By<Option<User>, user::Username>>> for Memory {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Username>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.users.read().await.get(&by.into_inner()).cloned())
    }
}

impl Database<Insert<User>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        use std::collections::hash_map::Entry;

        match self.users.write().await.entry(user.username.clone()) {
            Entry::Occupied(e) => Err(tracerr::new!(
                database::Error::DuplicateUsername(e.key().clone())
            )),
            Entry::Vacant(e) => {
                _ = e.insert(user);
                Ok(())
            }
        }
    }
}

impl Database<Transact> for Memory {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Database<Commit> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

//! Accounts and favorites, persisted as one JSON document.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::domain::{Mode, UserId};

use super::error::StoreError;

/// Per-user settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card: Option<String>,
    /// Whether looked-up card numbers are remembered.
    #[serde(default)]
    pub save_card: bool,
}

/// A saved stop. Keyed by `(user, mode, external_id)`; only `name` changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favorite {
    pub user: UserId,
    pub mode: Mode,
    pub external_id: String,
    pub name: String,
}

impl Favorite {
    fn is(&self, user: UserId, mode: Mode, external_id: &str) -> bool {
        self.user == user && self.mode == mode && self.external_id == external_id
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Document {
    #[serde(default)]
    users: BTreeMap<UserId, Account>,
    /// Every mode that has ever held a favorite.
    #[serde(default)]
    modes: BTreeSet<Mode>,
    /// In insertion order.
    #[serde(default)]
    favorites: Vec<Favorite>,
}

impl Document {
    fn account_mut(&mut self, user: UserId) -> Result<&mut Account, StoreError> {
        self.users.get_mut(&user).ok_or(StoreError::UnknownUser(user))
    }
}

/// File-backed user store.
///
/// Every mutation is applied to a copy, written to disk (temp file, then
/// rename) and only then published, so the in-memory view never runs ahead
/// of the file. Writers are serialized by the lock.
#[derive(Debug)]
pub struct UserStore {
    path: PathBuf,
    doc: Mutex<Document>,
}

impl UserStore {
    /// Open the store at `path`, starting empty if the file does not exist.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let doc = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "no user store yet, starting empty");
                Document::default()
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            doc: Mutex::new(doc),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, doc: &Document) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(dir).await?;
        }
        let json = serde_json::to_vec_pretty(doc)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    /// Apply a mutation, persist, publish. Returns the closure's result.
    async fn update<T>(
        &self,
        f: impl FnOnce(&mut Document) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut guard = self.doc.lock().await;
        let mut next = guard.clone();
        let out = f(&mut next)?;
        self.persist(&next).await?;
        *guard = next;
        Ok(out)
    }

    async fn read<T>(&self, f: impl FnOnce(&Document) -> T) -> T {
        f(&*self.doc.lock().await)
    }

    // ------------------------------------------------------------------------
    // Accounts
    // ------------------------------------------------------------------------

    /// Create an account. Returns `false` if it already existed.
    pub async fn add_user(&self, user: UserId) -> Result<bool, StoreError> {
        if self.has_user(user).await {
            return Ok(false);
        }
        self.update(|doc| Ok(doc.users.insert(user, Account::default()).is_none()))
            .await
            .inspect(|_| debug!(user, "account created"))
    }

    pub async fn has_user(&self, user: UserId) -> bool {
        self.read(|doc| doc.users.contains_key(&user)).await
    }

    /// Remove an account and all its favorites. Returns `false` if there
    /// was nothing to remove.
    pub async fn delete_user(&self, user: UserId) -> Result<bool, StoreError> {
        if !self.has_user(user).await {
            return Ok(false);
        }
        self.update(|doc| {
            doc.favorites.retain(|f| f.user != user);
            Ok(doc.users.remove(&user).is_some())
        })
        .await
        .inspect(|_| info!(user, "account deleted"))
    }

    // ------------------------------------------------------------------------
    // Card
    // ------------------------------------------------------------------------

    pub async fn card(&self, user: UserId) -> Option<String> {
        self.read(|doc| doc.users.get(&user).and_then(|a| a.card.clone()))
            .await
    }

    pub async fn saves_card(&self, user: UserId) -> bool {
        self.read(|doc| doc.users.get(&user).is_some_and(|a| a.save_card))
            .await
    }

    pub async fn set_card(&self, user: UserId, number: &str) -> Result<(), StoreError> {
        self.update(|doc| {
            doc.account_mut(user)?.card = Some(number.to_string());
            Ok(())
        })
        .await
    }

    /// Forget the stored card. Returns `false` if none was stored.
    pub async fn clear_card(&self, user: UserId) -> Result<bool, StoreError> {
        self.update(|doc| Ok(doc.account_mut(user)?.card.take().is_some()))
            .await
    }

    /// Flip card saving. Returns the new setting.
    pub async fn toggle_save(&self, user: UserId) -> Result<bool, StoreError> {
        self.update(|doc| {
            let account = doc.account_mut(user)?;
            account.save_card = !account.save_card;
            Ok(account.save_card)
        })
        .await
    }

    // ------------------------------------------------------------------------
    // Favorites
    // ------------------------------------------------------------------------

    /// A user's favorites, oldest first.
    pub async fn favorites(&self, user: UserId) -> Vec<Favorite> {
        self.read(|doc| {
            doc.favorites
                .iter()
                .filter(|f| f.user == user)
                .cloned()
                .collect()
        })
        .await
    }

    pub async fn is_favorite(&self, user: UserId, mode: Mode, external_id: &str) -> bool {
        self.read(|doc| doc.favorites.iter().any(|f| f.is(user, mode, external_id)))
            .await
    }

    /// Save a stop. Returns `false` if it was already saved; the stored name
    /// is left untouched in that case.
    pub async fn add_favorite(
        &self,
        user: UserId,
        mode: Mode,
        external_id: &str,
        name: &str,
    ) -> Result<bool, StoreError> {
        if self.is_favorite(user, mode, external_id).await {
            return Ok(false);
        }
        self.update(|doc| {
            doc.account_mut(user)?;
            if doc.favorites.iter().any(|f| f.is(user, mode, external_id)) {
                return Ok(false);
            }
            doc.modes.insert(mode);
            doc.favorites.push(Favorite {
                user,
                mode,
                external_id: external_id.to_string(),
                name: name.to_string(),
            });
            Ok(true)
        })
        .await
    }

    /// Change a favorite's display name. Returns `false` if no such favorite.
    pub async fn rename_favorite(
        &self,
        user: UserId,
        mode: Mode,
        external_id: &str,
        name: &str,
    ) -> Result<bool, StoreError> {
        self.update(|doc| {
            match doc.favorites.iter_mut().find(|f| f.is(user, mode, external_id)) {
                Some(fav) => {
                    fav.name = name.to_string();
                    Ok(true)
                }
                None => Ok(false),
            }
        })
        .await
    }

    /// Remove a favorite. Returns `false` if it was not saved.
    pub async fn remove_favorite(
        &self,
        user: UserId,
        mode: Mode,
        external_id: &str,
    ) -> Result<bool, StoreError> {
        if !self.is_favorite(user, mode, external_id).await {
            return Ok(false);
        }
        self.update(|doc| {
            let before = doc.favorites.len();
            doc.favorites.retain(|f| !f.is(user, mode, external_id));
            Ok(doc.favorites.len() != before)
        })
        .await
    }

    /// Modes that have ever held a favorite.
    pub async fn modes(&self) -> Vec<Mode> {
        self.read(|doc| doc.modes.iter().copied().collect()).await
    }
}

//! Persistence gateway: entity collections to and from the blob store.
//!
//! Both collections are written in one batch together with a SHA-256
//! digest over the pair. On load, a digest that does not match the blobs
//! means they were not written by the same commit; the pair is then
//! treated as malformed.
//!
//! Loading fails soft: missing or malformed data yields empty collections.

use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use tracing::warn;

use meal_train_kernel::{JoinRequest, MealTrain};

use crate::blob_store::BlobStore;
use crate::error::PersistenceError;

pub const MEAL_TRAINS_KEY: &str = "mealTrains";
pub const JOIN_REQUESTS_KEY: &str = "joinRequests";
pub const COMMIT_DIGEST_KEY: &str = "commitDigest";
pub const CURRENT_USER_KEY: &str = "currentUser";

#[derive(Debug, thiserror::Error)]
enum LoadFailure {
    #[error("blob store read failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("blob {key:?} is not valid: {source}")]
    Decode {
        key: &'static str,
        source: serde_json::Error,
    },

    #[error("commit digest does not match stored collections")]
    DigestMismatch,
}

pub struct PersistenceGateway<S> {
    blobs: S,
}

impl<S: BlobStore> PersistenceGateway<S> {
    pub fn new(blobs: S) -> Self {
        Self { blobs }
    }

    pub fn blobs(&self) -> &S {
        &self.blobs
    }

    pub fn into_inner(self) -> S {
        self.blobs
    }

    /// Load both collections. Never fails; problems are logged and yield
    /// empty collections.
    pub fn load(&self) -> (Vec<MealTrain>, Vec<JoinRequest>) {
        match self.try_load() {
            Ok(collections) => collections,
            Err(failure) => {
                warn!("starting from empty state: {failure}");
                (Vec::new(), Vec::new())
            }
        }
    }

    /// Persist both collections and their digest in one batch.
    pub fn save(
        &mut self,
        meals: &[MealTrain],
        requests: &[JoinRequest],
    ) -> Result<(), PersistenceError> {
        let meals_json = serde_json::to_string(meals)?;
        let requests_json = serde_json::to_string(requests)?;
        let digest = commit_digest(&meals_json, &requests_json);

        self.blobs.put_batch(&[
            (MEAL_TRAINS_KEY, meals_json),
            (JOIN_REQUESTS_KEY, requests_json),
            (COMMIT_DIGEST_KEY, digest),
        ])?;
        Ok(())
    }

    /// The remembered login, if any. Unreadable values count as logged out.
    pub fn load_current_user(&self) -> Option<String> {
        match self.blobs.get(CURRENT_USER_KEY) {
            Ok(user) => user,
            Err(e) => {
                warn!("ignoring unreadable current user: {e}");
                None
            }
        }
    }

    pub fn save_current_user(&mut self, user: Option<&str>) -> Result<(), PersistenceError> {
        match user {
            Some(user) => self
                .blobs
                .put_batch(&[(CURRENT_USER_KEY, user.to_string())])?,
            None => self.blobs.remove(CURRENT_USER_KEY)?,
        }
        Ok(())
    }

    fn try_load(&self) -> Result<(Vec<MealTrain>, Vec<JoinRequest>), LoadFailure> {
        let meals_json = self.blobs.get(MEAL_TRAINS_KEY)?;
        let requests_json = self.blobs.get(JOIN_REQUESTS_KEY)?;

        // Stores written without a digest are accepted as-is.
        if let Some(expected) = self.blobs.get(COMMIT_DIGEST_KEY)? {
            let actual = commit_digest(
                meals_json.as_deref().unwrap_or_default(),
                requests_json.as_deref().unwrap_or_default(),
            );
            if actual != expected {
                return Err(LoadFailure::DigestMismatch);
            }
        }

        let meals = decode(MEAL_TRAINS_KEY, meals_json.as_deref())?;
        let requests = decode(JOIN_REQUESTS_KEY, requests_json.as_deref())?;
        Ok((meals, requests))
    }
}

fn decode<T: DeserializeOwned>(key: &'static str, blob: Option<&str>) -> Result<Vec<T>, LoadFailure> {
    let Some(blob) = blob else {
        return Ok(Vec::new());
    };
    serde_json::from_str(blob).map_err(|source| LoadFailure::Decode { key, source })
}

/// Lowercase hex SHA-256 over both serialized collections.
fn commit_digest(meals_json: &str, requests_json: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(meals_json.as_bytes());
    hasher.update(b"\n");
    hasher.update(requests_json.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

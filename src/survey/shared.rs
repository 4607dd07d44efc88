//! A survey store shared between the threads serving many contributors.
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use crate::error::{ColaggError, Result};
use crate::primitives::vector::CipherVector;
use crate::survey::{keys::RawKey, store::SurveyStore, ClientResponse, DeliverableRecord};

/// Serializes every call on one [`SurveyStore`] behind a single lock.
#[derive(Clone, Debug)]
pub struct SharedSurveyStore {
    inner: Arc<Mutex<SurveyStore>>,
}

impl SharedSurveyStore {
    pub fn new(store: SurveyStore) -> SharedSurveyStore {
        SharedSurveyStore { inner: Arc::new(Mutex::new(store)) }
    }

    /// Runs `f` with exclusive access to the store.
    pub fn with<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut SurveyStore) -> Result<T>,
    {
        let mut store = self.inner.lock().map_err(|_| ColaggError::LockPoisoned)?;
        f(&mut store)
    }

    pub fn insert_client_response(&self, response: ClientResponse) -> Result<()> {
        self.with(|store| store.insert_client_response(response))
    }

    pub fn poll_locally_aggregated_responses(&self) -> Result<BTreeMap<RawKey, CipherVector>> {
        self.with(|store| Ok(store.poll_locally_aggregated_responses()))
    }

    pub fn poll_deliverable_results(&self) -> Result<Vec<DeliverableRecord>> {
        self.with(|store| Ok(store.poll_deliverable_results()))
    }

    /// Takes the store back out, if this is the last handle to it.
    pub fn into_inner(self) -> Option<SurveyStore> {
        Arc::try_unwrap(self.inner).ok().and_then(|m| m.into_inner().ok())
    }
}

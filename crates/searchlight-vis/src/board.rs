//! The card registry: one driver per algorithm plus the tag filter.

use std::collections::BTreeMap;

use rand::Rng;
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use searchlight_steps::{AlgorithmId, Catalog, InputKind, MismatchError, ALL_TAG};

use crate::driver::{CardSnapshot, Driver};
use crate::error::{Error, Result};
use crate::playback::PlaybackConfig;
use crate::simulation::{Params, Selection};

/// Capacity of the card update channel.
const UPDATE_CAPACITY: usize = 256;

/// All cards of one session.
pub struct Board {
    catalog: Catalog,
    drivers: BTreeMap<AlgorithmId, Driver>,
    filter: RwLock<String>,
    updates: broadcast::Sender<CardSnapshot>,
}

impl Board {
    /// One card per catalog entry, each loaded with its fixture.
    pub fn new(catalog: Catalog, config: PlaybackConfig) -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CAPACITY);
        let drivers = catalog
            .entries()
            .iter()
            .map(|info| {
                let driver = Driver::new(Selection::from_fixture(info), config, updates.clone());
                (info.id, driver)
            })
            .collect();
        Self {
            catalog,
            drivers,
            filter: RwLock::new(ALL_TAG.to_owned()),
            updates,
        }
    }

    /// A board over the built-in catalog.
    pub fn builtin(config: PlaybackConfig) -> Self {
        Self::new(Catalog::builtin(), config)
    }

    /// Get the catalog the cards were built from.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Get the driver for one card.
    pub fn card(&self, id: AlgorithmId) -> Result<&Driver> {
        self.drivers.get(&id).ok_or(Error::UnknownCard(id))
    }

    /// Get all drivers, in algorithm order.
    pub fn drivers(&self) -> impl Iterator<Item = &Driver> {
        self.drivers.values()
    }

    /// Every card update, from any driver.
    pub fn subscribe(&self) -> broadcast::Receiver<CardSnapshot> {
        self.updates.subscribe()
    }

    /// Get a snapshot of every card.
    pub async fn snapshots(&self) -> Vec<CardSnapshot> {
        let mut snapshots = Vec::with_capacity(self.drivers.len());
        for driver in self.drivers.values() {
            snapshots.push(driver.snapshot().await);
        }
        snapshots
    }

    /// Get the active tag filter.
    pub async fn filter(&self) -> String {
        self.filter.read().await.clone()
    }

    /// Select `tag`, or fall back to showing everything when `tag` is
    /// already active or unknown. Returns the active filter.
    pub async fn toggle_filter(&self, tag: &str) -> String {
        let mut filter = self.filter.write().await;
        let known = self.catalog.tags().iter().any(|&known| known == tag);
        *filter = if *filter == tag || !known {
            ALL_TAG.to_owned()
        } else {
            tag.to_owned()
        };
        debug!(filter = %filter, "filter changed");
        filter.clone()
    }

    /// Cards passing the active filter, in catalog order.
    pub async fn visible(&self) -> Vec<AlgorithmId> {
        let filter = self.filter.read().await;
        self.catalog.matching(&filter).map(|info| info.id).collect()
    }

    /// Point a sequence card at a new target, and optionally new data, then
    /// prepare it.
    pub async fn set_target(
        &self,
        id: AlgorithmId,
        target: Option<String>,
        data: Option<Vec<i64>>,
    ) -> Result<CardSnapshot> {
        self.card(id)?
            .update_selection(|params| match params {
                Params::Sequence { data: current, target: sought } => {
                    *sought = target;
                    if let Some(data) = data {
                        *current = data;
                    }
                    Ok(())
                }
                Params::Graph(_) => Err(sequence_only(id)),
            })
            .await
    }

    /// Load a sequence card with random sorted data and a target drawn from it.
    pub async fn shuffle<R: Rng + ?Sized>(&self, id: AlgorithmId, rng: &mut R) -> Result<CardSnapshot> {
        let driver = self.card(id)?;
        if id.input_kind() != InputKind::Sequence {
            return Err(sequence_only(id));
        }
        let shuffled = Selection::shuffled(id, rng).params;
        driver
            .update_selection(|params| {
                *params = shuffled;
                Ok(())
            })
            .await
    }
}

fn sequence_only(algorithm: AlgorithmId) -> Error {
    Error::InputMismatch(MismatchError {
        algorithm,
        expected: algorithm.input_kind(),
    })
}

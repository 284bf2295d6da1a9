//! Collection passes.
//!
//! Each pass drives the fetcher over one or more pages, normalizes every
//! entity and writes the results:
//! - `summary`: platform totals, one document per run
//! - `channels`: one page of live streams, channel upserts plus a batch of
//!   stream snapshots
//! - `games`: every page of the top-games list, game upserts plus one
//!   statistic per entry, written as they are read

use std::{collections::BTreeMap, fmt};

use crate::config::PassKind;
use crate::db::Collection;

pub mod channels;
pub mod games;
pub mod summary;

/// What one pass fetched and wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassReport {
    pub pass: PassKind,
    pub pages: usize,
    pub written: BTreeMap<Collection, u64>,
    /// Data was expected but the API returned none; writes were skipped
    pub anomaly: bool,
}

impl PassReport {
    pub fn new(pass: PassKind) -> Self {
        Self {
            pass,
            pages: 0,
            written: BTreeMap::new(),
            anomaly: false,
        }
    }

    pub fn record(&mut self, collection: Collection, count: u64) {
        *self.written.entry(collection).or_insert(0) += count;
    }

    pub fn written(&self, collection: Collection) -> u64 {
        self.written.get(&collection).copied().unwrap_or(0)
    }
}

impl fmt::Display for PassReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} pass: {} page(s)", self.pass, self.pages)?;
        for (collection, count) in &self.written {
            write!(f, ", {}={}", collection, count)?;
        }
        if self.anomaly {
            f.write_str(" (anomaly: nothing written)")?;
        }
        Ok(())
    }
}

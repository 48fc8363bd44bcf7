// ─────────────────────────────────────────────────────────────────────
// Machina — Process-wide Catalog
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Process-wide read-only catalog.
//!
//! Installed once at startup. Readers take an `Arc<CatalogSnapshot>`
//! and never touch the lock again, so worker threads share it without
//! synchronisation. `reset` exists for test isolation only.

use crate::catalog::Catalog;
use machina_types::error::{MachinaError, MachinaResult};
use machina_types::state::CatalogStamp;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// Immutable catalog plus the identity recorded in compliance reports.
#[derive(Debug)]
pub struct CatalogSnapshot {
    pub catalog: Catalog,
    pub version: u64,
    pub fingerprint: String,
}

impl CatalogSnapshot {
    /// Wrap a catalog that is not installed globally (explicit injection).
    pub fn new(catalog: Catalog, version: u64) -> MachinaResult<Self> {
        let fingerprint = catalog.fingerprint()?;
        Ok(CatalogSnapshot {
            catalog,
            version,
            fingerprint,
        })
    }

    pub fn stamp(&self) -> CatalogStamp {
        CatalogStamp {
            version: self.version,
            fingerprint: self.fingerprint.clone(),
        }
    }
}

static CURRENT: RwLock<Option<Arc<CatalogSnapshot>>> = RwLock::new(None);
static NEXT_VERSION: AtomicU64 = AtomicU64::new(1);

/// Install the process catalog. Fails if one is already installed.
pub fn install(catalog: Catalog) -> MachinaResult<Arc<CatalogSnapshot>> {
    let mut slot = CURRENT.write().unwrap_or_else(|e| e.into_inner());
    if slot.is_some() {
        return Err(MachinaError::Configuration(
            "catalog already installed; call reset() first".to_string(),
        ));
    }
    let version = NEXT_VERSION.fetch_add(1, Ordering::SeqCst);
    let snapshot = Arc::new(CatalogSnapshot::new(catalog, version)?);
    *slot = Some(Arc::clone(&snapshot));
    Ok(snapshot)
}

/// The installed catalog.
pub fn current() -> MachinaResult<Arc<CatalogSnapshot>> {
    CURRENT
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .as_ref()
        .map(Arc::clone)
        .ok_or_else(|| MachinaError::Configuration("catalog not installed".to_string()))
}

/// Drop the installed catalog. Outstanding snapshots stay valid.
pub fn reset() {
    let mut slot = CURRENT.write().unwrap_or_else(|e| e.into_inner());
    *slot = None;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::period::period_catalog;
    use std::sync::Mutex;

    // The slot is process-wide; serialise the tests that touch it.
    static GUARD: Mutex<()> = Mutex::new(());

    #[test]
    fn test_install_current_reset_cycle() {
        let _g = GUARD.lock().unwrap_or_else(|e| e.into_inner());
        reset();
        assert!(current().is_err());

        let installed = install(period_catalog().unwrap()).unwrap();
        let seen = current().unwrap();
        assert_eq!(installed.version, seen.version);
        assert_eq!(installed.fingerprint, seen.fingerprint);

        assert!(install(Catalog::new()).is_err(), "second install must fail");

        reset();
        assert!(current().is_err());
        // Snapshot taken before reset is still usable
        assert!(seen.catalog.contains("power.human.sustained"));
    }

    #[test]
    fn test_versions_increase_across_installs() {
        let _g = GUARD.lock().unwrap_or_else(|e| e.into_inner());
        reset();
        let a = install(Catalog::new()).unwrap().version;
        reset();
        let b = install(Catalog::new()).unwrap().version;
        reset();
        assert!(b > a);
    }

    #[test]
    fn test_snapshot_shared_across_threads() {
        let snapshot = Arc::new(CatalogSnapshot::new(period_catalog().unwrap(), 0).unwrap());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let s = Arc::clone(&snapshot);
                std::thread::spawn(move || s.catalog.nominal("power.human.sustained").unwrap())
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), 75.0);
        }
    }
}

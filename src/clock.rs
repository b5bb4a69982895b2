//! Horloge du moteur
//!
//! Tous les horodatages du moteur sont exprimés en secondes Unix entières.
//! La résolution est volontairement la seconde : le crédit de suspicion
//! pour "re-scan instantané" ne se déclenche que lorsque deux scans
//! tombent dans la même seconde indivisible, comme l'horodatage de bloc
//! du contrat de référence.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Source de temps injectable du moteur
pub trait Clock: Send + Sync {
    /// Secondes Unix courantes
    fn now_secs(&self) -> u64;
}

/// Horloge système
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_secs(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Horloge pilotée manuellement, pour les tests et la simulation
#[derive(Debug)]
pub struct ManualClock {
    secs: AtomicU64,
}

impl ManualClock {
    pub fn new(start: u64) -> Self {
        Self {
            secs: AtomicU64::new(start),
        }
    }

    /// Fixe l'heure courante
    pub fn set(&self, secs: u64) {
        self.secs.store(secs, Ordering::SeqCst);
    }

    /// Avance l'heure courante de `delta` secondes
    pub fn advance(&self, delta: u64) {
        self.secs.fetch_add(delta, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_secs(&self) -> u64 {
        self.secs.load(Ordering::SeqCst)
    }
}

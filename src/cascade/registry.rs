//! At-most-one cascade per stack

use crate::error::{Error, Result};
use std::collections::HashSet;
use std::sync::Mutex;

/// Tracks which stacks have a cascade in flight
#[derive(Debug, Default)]
pub struct CascadeRegistry {
    in_flight: Mutex<HashSet<String>>,
}

impl CascadeRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `stack_name` for a cascade.
    ///
    /// Fails with `CascadeInProgress` if another cascade holds it. The claim
    /// is released when the guard drops.
    pub fn begin(&self, stack_name: &str) -> Result<CascadeGuard<'_>> {
        let mut in_flight = self
            .in_flight
            .lock()
            .map_err(|_| Error::Internal("cascade registry poisoned".to_string()))?;
        if !in_flight.insert(stack_name.to_string()) {
            return Err(Error::CascadeInProgress(stack_name.to_string()));
        }
        Ok(CascadeGuard {
            registry: self,
            stack_name: stack_name.to_string(),
        })
    }

    /// Whether a cascade is running for `stack_name`
    pub fn is_running(&self, stack_name: &str) -> bool {
        self.in_flight
            .lock()
            .is_ok_and(|set| set.contains(stack_name))
    }
}

/// Releases a stack's cascade claim on drop
#[derive(Debug)]
pub struct CascadeGuard<'a> {
    registry: &'a CascadeRegistry,
    stack_name: String,
}

impl Drop for CascadeGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut set) = self.registry.in_flight.lock() {
            set.remove(&self.stack_name);
        }
    }
}

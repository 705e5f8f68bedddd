use std::sync::OnceLock;

/// Write-once holder for the process-wide scoring backend.
///
/// Starts empty while the model loads in the background; [`BackendSlot::install`]
/// succeeds exactly once. Readers only ever get shared references.
pub struct BackendSlot<B> {
    backend: OnceLock<B>,
}

impl<B> Default for BackendSlot<B> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<B> std::fmt::Debug for BackendSlot<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendSlot")
            .field("ready", &self.is_ready())
            .finish()
    }
}

impl<B> BackendSlot<B> {
    pub fn empty() -> Self {
        Self {
            backend: OnceLock::new(),
        }
    }

    pub fn ready(backend: B) -> Self {
        let slot = Self::empty();
        let _ = slot.backend.set(backend);
        slot
    }

    /// Installs the backend. Returns it back if the slot was already filled.
    pub fn install(&self, backend: B) -> Result<(), B> {
        self.backend.set(backend)
    }

    pub fn get(&self) -> Option<&B> {
        self.backend.get()
    }

    pub fn is_ready(&self) -> bool {
        self.backend.get().is_some()
    }
}

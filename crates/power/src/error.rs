//! Registration errors.

/// Why a listener could not be added to a [`Registry`](crate::Registry).
///
/// Both names are `&'static str` so the error is `Copy` and can be logged
/// without formatting machinery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegistryError {
    /// The registry already holds its compile-time maximum of listeners.
    Full {
        /// Registry name.
        registry: &'static str,
        /// Listener that was rejected.
        id: &'static str,
    },
    /// Registration was attempted from inside a handler while the same
    /// registry was delivering an event.
    Busy {
        /// Registry name.
        registry: &'static str,
        /// Listener that was rejected.
        id: &'static str,
    },
    /// The listener subscribed to no event bits and could never fire.
    EmptyMask {
        /// Registry name.
        registry: &'static str,
        /// Listener that was rejected.
        id: &'static str,
    },
}

impl RegistryError {
    /// Name of the registry that rejected the listener.
    pub fn registry(&self) -> &'static str {
        match *self {
            Self::Full { registry, .. }
            | Self::Busy { registry, .. }
            | Self::EmptyMask { registry, .. } => registry,
        }
    }

    /// Id of the rejected listener.
    pub fn id(&self) -> &'static str {
        match *self {
            Self::Full { id, .. } | Self::Busy { id, .. } | Self::EmptyMask { id, .. } => id,
        }
    }

    /// Short reason string for log lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full { .. } => "registry full",
            Self::Busy { .. } => "registry busy delivering",
            Self::EmptyMask { .. } => "empty event mask",
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for RegistryError {}

impl core::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "cannot register '{}' on '{}': {}",
            self.id(),
            self.registry(),
            self.as_str()
        )
    }
}

//! Settings storage
//!
//! Settings records are small opaque blobs addressed by a short key. The
//! backing store may be NVS flash, a file, or RAM in tests; encoding and
//! integrity checks belong to the caller.

/// Key/value store for persisted settings.
pub trait ConfigStore {
    /// Error type
    type Error: core::fmt::Debug;

    /// Read the record stored under `key` into `buf`.
    ///
    /// Returns the record length, or `None` if nothing is stored. A record
    /// longer than `buf` is an error.
    fn read(&mut self, key: &str, buf: &mut [u8]) -> Result<Option<usize>, Self::Error>;

    /// Replace the record stored under `key`.
    fn write(&mut self, key: &str, data: &[u8]) -> Result<(), Self::Error>;
}

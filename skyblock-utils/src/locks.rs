//! Lock aliases used across the workspace.
//!
//! Everything goes through `parking_lot` so guards are never poisoned and the
//! lock types stay small.

/// A blocking mutex for short critical sections.
pub type SyncMutex<T> = parking_lot::Mutex<T>;
/// Guard returned by [`SyncMutex::lock`].
pub type SyncMutexGuard<'a, T> = parking_lot::MutexGuard<'a, T>;

/// A blocking reader-writer lock for read-mostly state.
pub type SyncRwLock<T> = parking_lot::RwLock<T>;
/// Shared guard returned by [`SyncRwLock::read`].
pub type SyncRwLockReadGuard<'a, T> = parking_lot::RwLockReadGuard<'a, T>;
/// Exclusive guard returned by [`SyncRwLock::write`].
pub type SyncRwLockWriteGuard<'a, T> = parking_lot::RwLockWriteGuard<'a, T>;

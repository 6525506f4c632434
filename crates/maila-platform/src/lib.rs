//! Platform abstraction layer for maila.
//!
//! The dialogue core never touches the OS directly. Downloads go through
//! [`fs::FileSystem`], configuration discovery reads [`env::Environment`],
//! and both are bundled behind the [`Platform`] trait so tests can swap in
//! in-memory implementations.

pub mod config_loader;
pub mod env;
pub mod fs;

use async_trait::async_trait;

/// Bundle of the platform capabilities maila needs.
#[async_trait]
pub trait Platform: Send + Sync {
    /// Filesystem operations.
    fn fs(&self) -> &dyn fs::FileSystem;

    /// Environment variable access.
    fn env(&self) -> &dyn env::Environment;
}

/// Native platform backed by `tokio::fs` and `std::env`.
#[cfg(feature = "native")]
pub struct NativePlatform {
    fs: fs::NativeFileSystem,
    env: env::NativeEnvironment,
}

#[cfg(feature = "native")]
impl NativePlatform {
    pub fn new() -> Self {
        Self {
            fs: fs::NativeFileSystem,
            env: env::NativeEnvironment,
        }
    }
}

#[cfg(feature = "native")]
impl Default for NativePlatform {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "native")]
#[async_trait]
impl Platform for NativePlatform {
    fn fs(&self) -> &dyn fs::FileSystem {
        &self.fs
    }

    fn env(&self) -> &dyn env::Environment {
        &self.env
    }
}

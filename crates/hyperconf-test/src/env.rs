//! Scoped environment variables.
//!
//! Args read their environment binding at construction, so tests that set
//! variables must not run concurrently with tests that construct the same
//! Args. Every [`EnvGuard`] holds one process-wide lock for its lifetime.

use std::env;
use std::ffi::OsString;

use parking_lot::{Mutex, MutexGuard};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Sets environment variables and restores their previous values on drop.
///
/// ```
/// use hyperconf_test::EnvGuard;
///
/// {
///     let _env = EnvGuard::set("HYPERCONF_DOC_GUARD", "1");
///     assert_eq!(std::env::var("HYPERCONF_DOC_GUARD").unwrap(), "1");
/// }
/// assert!(std::env::var("HYPERCONF_DOC_GUARD").is_err());
/// ```
pub struct EnvGuard {
    saved: Vec<(String, Option<OsString>)>,
    _lock: MutexGuard<'static, ()>,
}

impl EnvGuard {
    /// Takes the environment lock without changing anything.
    pub fn new() -> Self {
        Self {
            saved: Vec::new(),
            _lock: ENV_LOCK.lock(),
        }
    }

    /// Takes the environment lock and sets `key` to `value`.
    pub fn set(key: &str, value: &str) -> Self {
        let mut guard = Self::new();
        guard.put(key, value);
        guard
    }

    /// Sets `key` to `value` until the guard drops.
    pub fn put(&mut self, key: &str, value: &str) -> &mut Self {
        self.save(key);
        env::set_var(key, value);
        self
    }

    /// Removes `key` until the guard drops.
    pub fn unset(&mut self, key: &str) -> &mut Self {
        self.save(key);
        env::remove_var(key);
        self
    }

    fn save(&mut self, key: &str) {
        if !self.saved.iter().any(|(saved, _)| saved == key) {
            self.saved.push((key.to_string(), env::var_os(key)));
        }
    }
}

impl Default for EnvGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, previous) in self.saved.drain(..).rev() {
            match previous {
                Some(value) => env::set_var(&key, value),
                None => env::remove_var(&key),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restores_previous_values() {
        {
            let mut env = EnvGuard::set("HYPERCONF_TEST_GUARD_A", "1");
            env.put("HYPERCONF_TEST_GUARD_A", "2")
                .unset("HYPERCONF_TEST_GUARD_B");
            assert_eq!(env::var("HYPERCONF_TEST_GUARD_A").unwrap(), "2");
        }
        assert!(env::var_os("HYPERCONF_TEST_GUARD_A").is_none());
        assert!(env::var_os("HYPERCONF_TEST_GUARD_B").is_none());
    }
}

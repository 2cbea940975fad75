//! Schema migration registry
//!
//! A migrator upgrades a serialized payload by exactly one schema version.
//! Migrators are registered per `(type tag, source version)` and chained to
//! bridge any gap:
//!
//! ```text
//! stored v1 ──(player,1)──▶ v2 ──(player,2)──▶ v3 = Player::SCHEMA_VERSION
//! ```
//!
//! Migrators work on the serialized text, not the typed value, so they can
//! add, rename or remove fields without the old type definition existing in
//! code. A version is never skipped: a missing step fails the whole chain.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tessera_core::{MigrationError, Persistable};
use tracing::debug;

/// One-step payload upgrade: text at version `n` to text at version `n + 1`.
pub type Migrator = Arc<dyn Fn(&str) -> Result<String, String> + Send + Sync>;

/// Registry of per-type, per-version migrators.
#[derive(Default)]
pub struct MigrationManager {
    migrators: RwLock<HashMap<(String, u32), Migrator>>,
}

impl MigrationManager {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the migrator upgrading `type_tag` from `from_version` to
    /// `from_version + 1`. Replaces any migrator already registered for
    /// that step.
    pub fn register<F>(&self, type_tag: impl Into<String>, from_version: u32, migrator: F)
    where
        F: Fn(&str) -> Result<String, String> + Send + Sync + 'static,
    {
        let type_tag = type_tag.into();
        debug!(type_tag = %type_tag, from_version, "registering migrator");
        self.migrators
            .write()
            .insert((type_tag, from_version), Arc::new(migrator));
    }

    /// Register a text migrator for `T`.
    pub fn register_for<T, F>(&self, from_version: u32, migrator: F)
    where
        T: Persistable,
        F: Fn(&str) -> Result<String, String> + Send + Sync + 'static,
    {
        self.register(T::TYPE_TAG, from_version, migrator);
    }

    /// Register a structural migrator for a JSON payload of `T`.
    ///
    /// The payload is parsed into a `serde_json::Value`, edited in place, and
    /// written back compactly.
    ///
    /// ```
    /// use serde::{Deserialize, Serialize};
    /// use tessera_core::Persistable;
    /// use tessera_engine::MigrationManager;
    ///
    /// #[derive(Serialize, Deserialize)]
    /// struct Player { name: String, hp: u32 }
    ///
    /// impl Persistable for Player {
    ///     const TYPE_TAG: &'static str = "player";
    ///     const SCHEMA_VERSION: u32 = 2;
    /// }
    ///
    /// let migrations = MigrationManager::new();
    /// migrations.register_json::<Player, _>(1, |doc| {
    ///     // v1 stored "health"; v2 calls it "hp"
    ///     let health = doc.as_object_mut().and_then(|o| o.remove("health"));
    ///     doc["hp"] = health.unwrap_or(serde_json::json!(100));
    ///     Ok(())
    /// });
    ///
    /// let migrated = migrations
    ///     .migrate("player", r#"{"name":"Hero","health":80}"#, 1, 2)
    ///     .unwrap();
    /// assert_eq!(migrated, r#"{"hp":80,"name":"Hero"}"#);
    /// ```
    pub fn register_json<T, F>(&self, from_version: u32, edit: F)
    where
        T: Persistable,
        F: Fn(&mut serde_json::Value) -> Result<(), String> + Send + Sync + 'static,
    {
        self.register(T::TYPE_TAG, from_version, move |text: &str| {
            let mut doc: serde_json::Value =
                serde_json::from_str(text).map_err(|e| format!("payload is not JSON: {}", e))?;
            edit(&mut doc)?;
            serde_json::to_string(&doc).map_err(|e| e.to_string())
        });
    }

    /// True if a migrator is registered for `(type_tag, from_version)`
    pub fn has_migrator(&self, type_tag: &str, from_version: u32) -> bool {
        self.migrators
            .read()
            .contains_key(&(type_tag.to_string(), from_version))
    }

    /// Source versions with a registered migrator for `type_tag`, ascending
    pub fn registered_versions(&self, type_tag: &str) -> Vec<u32> {
        let mut versions: Vec<u32> = self
            .migrators
            .read()
            .keys()
            .filter(|(tag, _)| tag == type_tag)
            .map(|(_, version)| *version)
            .collect();
        versions.sort_unstable();
        versions
    }

    /// True if every step from `from` to `to` has a migrator
    pub fn can_migrate(&self, type_tag: &str, from: u32, to: u32) -> bool {
        (from..to).all(|version| self.has_migrator(type_tag, version))
    }

    /// Upgrade `payload` of `type_tag` from version `from` to version `to`.
    ///
    /// Applies the registered migrators in order. `from >= to` returns the
    /// payload unchanged.
    ///
    /// # Errors
    ///
    /// - `MigrationError::MissingStep` naming the first unmet step
    /// - `MigrationError::StepFailed` if a migrator returns an error
    pub fn migrate(
        &self,
        type_tag: &str,
        payload: &str,
        from: u32,
        to: u32,
    ) -> Result<String, MigrationError> {
        // Resolve the whole chain first so the registry lock is not held
        // while user code runs.
        let chain: Vec<(u32, Migrator)> = {
            let migrators = self.migrators.read();
            (from..to)
                .map(|version| {
                    migrators
                        .get(&(type_tag.to_string(), version))
                        .cloned()
                        .map(|m| (version, m))
                        .ok_or_else(|| MigrationError::MissingStep {
                            type_tag: type_tag.to_string(),
                            from: version,
                            to: version + 1,
                        })
                })
                .collect::<Result<_, _>>()?
        };

        chain
            .into_iter()
            .try_fold(payload.to_string(), |text, (version, migrator)| {
                debug!(type_tag, from = version, to = version + 1, "applying migrator");
                (*migrator)(&text).map_err(|reason| MigrationError::StepFailed {
                    type_tag: type_tag.to_string(),
                    from: version,
                    to: version + 1,
                    reason,
                })
            })
    }
}

impl std::fmt::Debug for MigrationManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut steps: Vec<(String, u32)> = self.migrators.read().keys().cloned().collect();
        steps.sort();
        f.debug_struct("MigrationManager")
            .field("steps", &steps)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize)]
    struct Player {
        name: String,
    }

    impl Persistable for Player {
        const TYPE_TAG: &'static str = "player";
        const SCHEMA_VERSION: u32 = 3;
    }

    fn append(suffix: &'static str) -> impl Fn(&str) -> Result<String, String> {
        move |text: &str| Ok(format!("{}{}", text, suffix))
    }

    #[test]
    fn test_single_step() {
        let m = MigrationManager::new();
        m.register("player", 1, append("+v2"));

        assert_eq!(m.migrate("player", "v1", 1, 2).unwrap(), "v1+v2");
    }

    #[test]
    fn test_chain_applies_in_order() {
        let m = MigrationManager::new();
        m.register("player", 2, append("+v3"));
        m.register("player", 1, append("+v2"));
        m.register("player", 3, append("+v4"));

        assert_eq!(m.migrate("player", "v1", 1, 4).unwrap(), "v1+v2+v3+v4");
        assert_eq!(m.migrate("player", "v2", 2, 3).unwrap(), "v2+v3");
    }

    #[test]
    fn test_no_op_when_current() {
        let m = MigrationManager::new();
        assert_eq!(m.migrate("player", "same", 3, 3).unwrap(), "same");
        assert_eq!(m.migrate("player", "newer", 4, 3).unwrap(), "newer");
    }

    #[test]
    fn test_missing_step_names_gap() {
        let m = MigrationManager::new();
        m.register("player", 1, append("+v2"));

        let err = m.migrate("player", "v1", 1, 3).unwrap_err();
        assert_eq!(
            err,
            MigrationError::MissingStep {
                type_tag: "player".to_string(),
                from: 2,
                to: 3,
            }
        );
        assert!(err.to_string().contains("from version 2 to 3"));
    }

    #[test]
    fn test_missing_step_runs_nothing() {
        let m = MigrationManager::new();
        let calls = Arc::new(parking_lot::Mutex::new(0));
        let counter = Arc::clone(&calls);
        m.register("player", 1, move |t: &str| {
            *counter.lock() += 1;
            Ok(t.to_string())
        });

        assert!(m.migrate("player", "v1", 1, 3).is_err());
        assert_eq!(*calls.lock(), 0);
    }

    #[test]
    fn test_migrators_are_per_type() {
        let m = MigrationManager::new();
        m.register("monster", 1, append("+monster"));

        assert!(matches!(
            m.migrate("player", "v1", 1, 2),
            Err(MigrationError::MissingStep { .. })
        ));
    }

    #[test]
    fn test_step_failure() {
        let m = MigrationManager::new();
        m.register("player", 1, append("+v2"));
        m.register("player", 2, |_: &str| Err("field 'hp' missing".to_string()));

        match m.migrate("player", "v1", 1, 3) {
            Err(MigrationError::StepFailed {
                type_tag,
                from,
                to,
                reason,
            }) => {
                assert_eq!(type_tag, "player");
                assert_eq!((from, to), (2, 3));
                assert_eq!(reason, "field 'hp' missing");
            }
            other => panic!("expected StepFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_register_replaces() {
        let m = MigrationManager::new();
        m.register("player", 1, append("+old"));
        m.register("player", 1, append("+new"));

        assert_eq!(m.migrate("player", "v1", 1, 2).unwrap(), "v1+new");
    }

    #[test]
    fn test_register_for_uses_type_tag() {
        let m = MigrationManager::new();
        m.register_for::<Player, _>(1, append("+v2"));

        assert!(m.has_migrator("player", 1));
        assert!(!m.has_migrator("player", 2));
    }

    #[test]
    fn test_register_json() {
        let m = MigrationManager::new();
        m.register_json::<Player, _>(1, |doc| {
            doc["level"] = serde_json::json!(1);
            Ok(())
        });

        let migrated = m.migrate("player", r#"{"name":"Hero"}"#, 1, 2).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&migrated).unwrap();
        assert_eq!(doc["name"], "Hero");
        assert_eq!(doc["level"], 1);
    }

    #[test]
    fn test_register_json_rejects_non_json() {
        let m = MigrationManager::new();
        m.register_json::<Player, _>(1, |_| Ok(()));

        assert!(matches!(
            m.migrate("player", "not json", 1, 2),
            Err(MigrationError::StepFailed { .. })
        ));
    }

    #[test]
    fn test_registered_versions_and_can_migrate() {
        let m = MigrationManager::new();
        m.register("player", 2, append(""));
        m.register("player", 1, append(""));
        m.register("monster", 5, append(""));

        assert_eq!(m.registered_versions("player"), vec![1, 2]);
        assert!(m.can_migrate("player", 1, 3));
        assert!(!m.can_migrate("player", 1, 4));
        assert!(m.can_migrate("player", 3, 3));
    }

    #[test]
    fn test_debug_lists_steps() {
        let m = MigrationManager::new();
        m.register("player", 1, append(""));
        assert!(format!("{:?}", m).contains("player"));
    }
}

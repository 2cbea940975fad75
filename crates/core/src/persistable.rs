//! Declared type identity and schema version
//!
//! Both are associated constants, resolved without constructing a value.

use serde::de::DeserializeOwned;
use serde::Serialize;

/// A value that can travel through the persistence pipeline.
///
/// # Example
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use tessera_core::Persistable;
///
/// #[derive(Serialize, Deserialize)]
/// struct Player {
///     name: String,
///     hp: u32,
/// }
///
/// impl Persistable for Player {
///     const TYPE_TAG: &'static str = "game.player";
///     const SCHEMA_VERSION: u32 = 3;
/// }
///
/// assert_eq!(Player::SCHEMA_VERSION, 3);
/// ```
pub trait Persistable: Serialize + DeserializeOwned {
    /// Stable type identity.
    ///
    /// Recorded in every envelope, used to look up migrators, and used as
    /// the default key. Changing it orphans existing records.
    const TYPE_TAG: &'static str;

    /// Current schema version of the serialized form (defaults to 1).
    const SCHEMA_VERSION: u32 = 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Serialize, Deserialize)]
    struct Undeclared;

    impl Persistable for Undeclared {
        const TYPE_TAG: &'static str = "undeclared";
    }

    #[derive(Serialize, Deserialize)]
    struct Declared;

    impl Persistable for Declared {
        const TYPE_TAG: &'static str = "declared";
        const SCHEMA_VERSION: u32 = 4;
    }

    #[test]
    fn test_schema_version_defaults_to_one() {
        assert_eq!(Undeclared::SCHEMA_VERSION, 1);
    }

    #[test]
    fn test_declared_schema_version() {
        assert_eq!(Declared::SCHEMA_VERSION, 4);
        assert_eq!(Declared::TYPE_TAG, "declared");
    }
}

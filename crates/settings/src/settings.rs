use serde::{Serialize, de::DeserializeOwned};

/// A value that can be defined as a user setting.
///
/// Each implementor owns one top-level table of the TOML settings file,
/// named by [`SECTION`](Self::SECTION). Keys missing from the file fall back
/// to the values of `Default`.
pub trait Settings: Default + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Name of the TOML table this setting is read from.
    const SECTION: &'static str;

    fn name() -> &'static str {
        Self::SECTION
    }
}

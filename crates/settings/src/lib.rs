mod errors;
pub(crate) mod settings;
pub(crate) mod store;

pub use errors::SettingsError;
pub use settings::Settings;
pub use store::{SettingsStore, SettingsStoreBuilder};

// Plain data types shared across the crate: versions, platform keys and the
// user settings read from `config.yaml`.

pub mod platform;
pub mod settings;
pub mod version;

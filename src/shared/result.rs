/// Result alias used by the application and adapter layers.
///
/// Registry calls use the typed `RegistryError` instead so that the loader can
/// tell a missing package apart from a transport failure.
pub type Result<T> = std::result::Result<T, anyhow::Error>;

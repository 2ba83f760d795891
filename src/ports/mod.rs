/// Ports module defining interfaces for hexagonal architecture
///
/// The core only drives outbound ports: the package registry, the metadata
/// cache, and the reporting/presentation sinks.
pub mod outbound;

//! Repository implementations.

#[cfg(feature = "azure-repo")]
pub mod azure;
#[cfg(feature = "local-repo")]
pub mod local;

#[cfg(feature = "azure-repo")]
pub use azure::AzureRepository;
#[cfg(feature = "local-repo")]
pub use local::LocalRepository;

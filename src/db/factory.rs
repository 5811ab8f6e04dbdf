//! Repository factory: selects the backend at startup.

use log::info;

use crate::db::config::DbConfig;
use crate::db::repository::{RepositoryError, RepositoryResult, TrafficRepository};

#[cfg(feature = "azure-repo")]
use crate::db::repositories::AzureRepository;
#[cfg(feature = "local-repo")]
use crate::db::repositories::LocalRepository;

/// Which repository backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryType {
    /// SQL Server backend (requires the `azure-repo` feature).
    Azure,
    /// In-memory backend (requires the `local-repo` feature).
    Local,
}

impl RepositoryType {
    /// Parse from a configuration string. Case-insensitive.
    pub fn from_str(s: &str) -> RepositoryResult<Self> {
        match s.to_lowercase().as_str() {
            "azure" | "mssql" | "sqlserver" => Ok(RepositoryType::Azure),
            "local" | "memory" => Ok(RepositoryType::Local),
            other => Err(RepositoryError::ConfigurationError(format!(
                "unknown repository type '{other}' (expected 'azure' or 'local')"
            ))),
        }
    }

    /// Read `REPOSITORY_TYPE` from the environment, defaulting to `Local`.
    pub fn from_env() -> RepositoryResult<Self> {
        match std::env::var("REPOSITORY_TYPE") {
            Ok(value) => Self::from_str(&value),
            Err(_) => Ok(RepositoryType::Local),
        }
    }
}

/// Creates repository instances for the configured backend.
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create a repository of the given type.
    ///
    /// `db_config` is required for the Azure backend and ignored by the
    /// local one.
    pub async fn create(
        repo_type: RepositoryType,
        db_config: Option<&DbConfig>,
    ) -> RepositoryResult<Box<dyn TrafficRepository>> {
        match repo_type {
            RepositoryType::Azure => {
                #[cfg(feature = "azure-repo")]
                {
                    let config = db_config.ok_or_else(|| {
                        RepositoryError::ConfigurationError(
                            "Azure repository requires database settings".to_string(),
                        )
                    })?;
                    info!("Creating Azure repository");
                    let repo = AzureRepository::connect(config).await?;
                    Ok(Box::new(repo))
                }
                #[cfg(not(feature = "azure-repo"))]
                {
                    let _ = db_config;
                    Err(RepositoryError::ConfigurationError(
                        "Azure repository requested but the 'azure-repo' feature is disabled"
                            .to_string(),
                    ))
                }
            }
            RepositoryType::Local => {
                #[cfg(feature = "local-repo")]
                {
                    let _ = db_config;
                    info!("Creating local repository");
                    Ok(Box::new(LocalRepository::new()))
                }
                #[cfg(not(feature = "local-repo"))]
                {
                    Err(RepositoryError::ConfigurationError(
                        "Local repository requested but the 'local-repo' feature is disabled"
                            .to_string(),
                    ))
                }
            }
        }
    }

    /// Create a local repository directly, bypassing type selection.
    #[cfg(feature = "local-repo")]
    pub fn create_local() -> LocalRepository {
        LocalRepository::new()
    }

    /// Create an Azure repository directly, bypassing type selection.
    #[cfg(feature = "azure-repo")]
    pub async fn create_azure(config: &DbConfig) -> RepositoryResult<AzureRepository> {
        AzureRepository::connect(config).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_type_strings() {
        assert_eq!(RepositoryType::from_str("Azure").unwrap(), RepositoryType::Azure);
        assert_eq!(RepositoryType::from_str("LOCAL").unwrap(), RepositoryType::Local);
        assert!(RepositoryType::from_str("postgres").is_err());
    }

    #[cfg(feature = "local-repo")]
    #[tokio::test]
    async fn creates_local_repository() {
        let repo = RepositoryFactory::create(RepositoryType::Local, None)
            .await
            .unwrap();
        assert!(repo.health_check().await.is_ok());
    }
}

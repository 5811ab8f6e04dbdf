//! SQL Server connection configuration.

/// Connection settings for the SQL Server backend.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub server: String,
    pub database: String,
    pub username: String,
    pub password: String,
    pub port: u16,
    pub trust_cert: bool,
}

impl DbConfig {
    /// Read connection settings from the environment.
    ///
    /// Recognized variables: `MSSQL_SERVER`, `MSSQL_DATABASE`, `MSSQL_UID`,
    /// `MSSQL_PWD`, `MSSQL_PORT`. Server and database must be present;
    /// credentials default to empty (integrated auth setups supply them via
    /// the config file instead).
    pub fn from_env() -> Result<Self, String> {
        let server = std::env::var("MSSQL_SERVER")
            .map_err(|_| "MSSQL_SERVER is not set".to_string())?;
        let database = std::env::var("MSSQL_DATABASE")
            .map_err(|_| "MSSQL_DATABASE is not set".to_string())?;
        let username = std::env::var("MSSQL_UID").unwrap_or_default();
        let password = std::env::var("MSSQL_PWD").unwrap_or_default();
        let port = std::env::var("MSSQL_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(1433);

        Ok(Self {
            server,
            database,
            username,
            password,
            port,
            trust_cert: true,
        })
    }
}

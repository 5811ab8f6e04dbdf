//! SQL Server repository implementation.
//!
//! Sector geography lives in `StaticAirspace`, trajectories in
//! `FlightTrajectory` joined with `Flight`. Geometry is reduced server-side
//! (`Reduce(@tol)`) and returned as WKT text (`STAsText()`); the sector
//! intersection, window overlap, flight level filter, row cap, and
//! active/cancelled exclusions are all evaluated in the query.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info};
use tiberius::{AuthMethod, Config, Query, Row};

use crate::core::FlightTimes;
use crate::db::config::DbConfig;
use crate::db::models::{SectorRow, TrajectoryQuery, TrajectoryRow};
use crate::db::repository::{RepositoryError, RepositoryResult, TrafficRepository};

type Pool = bb8::Pool<bb8_tiberius::ConnectionManager>;

const SQL_SECTORS: &str = r#"
SELECT [Id], [Name], [LowerLimitFt], [UpperLimitFt], [Geography].STAsText() AS WKT
FROM [StaticAirspace]
ORDER BY [Name]
"#;

const SQL_SECTOR_BY_ID: &str = r#"
SELECT TOP 1 [Id], [Name], [LowerLimitFt], [UpperLimitFt], [Geography].STAsText() AS WKT
FROM [StaticAirspace]
WHERE [Id] = @P1
"#;

const SQL_TRAJECTORIES_BY_SECTOR: &str = r#"
SELECT TOP (@P7)
  ft.[Id] AS TrajectoryId,
  ft.[FlightId],
  ft.[StartTime],
  ft.[EndTime],
  ft.[AltitudeFt],
  ft.[SpeedKn],
  ft.[Heading],
  ft.[PositionLine].Reduce(@P8).STAsText() AS WKT,
  f.[Callsign], f.[AirportDeparture], f.[AirportArrival],
  f.[ETOT], f.[ELDT], f.[CTOT], f.[CLDT], f.[ATOT], f.[ALDT]
FROM [FlightTrajectory] ft
JOIN [Flight] f ON f.[Id] = ft.[FlightId]
CROSS JOIN (
  SELECT [Geography] AS g FROM [StaticAirspace] WHERE [Id] = @P1
) s
WHERE ft.[IsActive] = 1
  AND ft.[StartTime] <  @P3
  AND ft.[EndTime]   >= @P2
  AND (f.[IsCancelled] = 0 OR f.[IsCancelled] IS NULL)
  AND ft.[PositionLine].STIntersects(s.g) = 1
  AND (
        @P4 = 0 OR EXISTS (
            SELECT 1
            FROM STRING_SPLIT(ft.[AltitudeFt], ',') AS ss
            CROSS APPLY (SELECT TRY_CAST(ss.value AS INT) AS AltFt) AS a
            WHERE a.AltFt BETWEEN @P5 AND @P6
        )
  )
ORDER BY ft.[StartTime] ASC
"#;

/// SQL Server backed repository with a bb8 connection pool.
pub struct AzureRepository {
    pool: Pool,
}

impl AzureRepository {
    /// Connect and build the connection pool.
    pub async fn connect(config: &DbConfig) -> RepositoryResult<Self> {
        let mut tib = Config::new();
        tib.host(&config.server);
        tib.port(config.port);
        tib.database(&config.database);
        tib.authentication(AuthMethod::sql_server(&config.username, &config.password));
        if config.trust_cert {
            tib.trust_cert();
        }

        let manager = bb8_tiberius::ConnectionManager::build(tib)
            .map_err(|e| RepositoryError::ConnectionError(e.to_string()))?;
        let pool = bb8::Pool::builder()
            .max_size(8)
            .build(manager)
            .await
            .map_err(|e| RepositoryError::ConnectionError(e.to_string()))?;

        info!("Connected to SQL Server at {}", config.server);
        Ok(Self { pool })
    }

    async fn run_query(&self, query: Query<'_>) -> RepositoryResult<Vec<Row>> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| RepositoryError::ConnectionError(e.to_string()))?;
        let stream = query
            .query(&mut *conn)
            .await
            .map_err(|e| RepositoryError::QueryError(e.to_string()))?;
        stream
            .into_first_result()
            .await
            .map_err(|e| RepositoryError::QueryError(e.to_string()))
    }
}

fn opt_string(row: &Row, idx: usize) -> Option<String> {
    row.get::<&str, _>(idx)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn parse_sector_row(row: &Row) -> RepositoryResult<SectorRow> {
    Ok(SectorRow {
        id: row
            .get::<i64, _>(0)
            .ok_or_else(|| RepositoryError::QueryError("sector Id is NULL".to_string()))?,
        name: opt_string(row, 1).unwrap_or_default(),
        lower_limit_ft: row.get::<i32, _>(2).unwrap_or(0),
        upper_limit_ft: row.get::<i32, _>(3).unwrap_or(0),
        wkt: opt_string(row, 4).unwrap_or_default(),
    })
}

fn parse_trajectory_row(row: &Row) -> RepositoryResult<TrajectoryRow> {
    Ok(TrajectoryRow {
        trajectory_id: row
            .get::<i64, _>(0)
            .ok_or_else(|| RepositoryError::QueryError("TrajectoryId is NULL".to_string()))?,
        flight_id: row
            .get::<i64, _>(1)
            .ok_or_else(|| RepositoryError::QueryError("FlightId is NULL".to_string()))?,
        start_time: row.get::<DateTime<Utc>, _>(2),
        end_time: row.get::<DateTime<Utc>, _>(3),
        altitude_profile: opt_string(row, 4),
        speed_profile: opt_string(row, 5),
        heading_profile: opt_string(row, 6),
        wkt: opt_string(row, 7).unwrap_or_default(),
        callsign: opt_string(row, 8),
        airport_departure: opt_string(row, 9),
        airport_arrival: opt_string(row, 10),
        times: FlightTimes {
            etot: row.get::<DateTime<Utc>, _>(11),
            eldt: row.get::<DateTime<Utc>, _>(12),
            ctot: row.get::<DateTime<Utc>, _>(13),
            cldt: row.get::<DateTime<Utc>, _>(14),
            atot: row.get::<DateTime<Utc>, _>(15),
            aldt: row.get::<DateTime<Utc>, _>(16),
        },
    })
}

#[async_trait]
impl TrafficRepository for AzureRepository {
    async fn list_sectors(&self) -> RepositoryResult<Vec<SectorRow>> {
        let rows = self.run_query(Query::new(SQL_SECTORS)).await?;
        rows.iter().map(parse_sector_row).collect()
    }

    async fn fetch_sector(&self, sector_id: i64) -> RepositoryResult<Option<SectorRow>> {
        let mut query = Query::new(SQL_SECTOR_BY_ID);
        query.bind(sector_id);

        let rows = self.run_query(query).await?;
        rows.first().map(parse_sector_row).transpose()
    }

    async fn fetch_trajectories(
        &self,
        params: &TrajectoryQuery,
    ) -> RepositoryResult<Vec<TrajectoryRow>> {
        debug!(
            "Fetching trajectories for sector {} in [{}, {})",
            params.sector_id, params.window_start, params.window_end
        );

        let (apply_fl, min_ft, max_ft) = match params.level_filter {
            Some(range) => (1i32, range.min_ft, range.max_ft),
            None => (0i32, 0, 99_999),
        };

        let mut query = Query::new(SQL_TRAJECTORIES_BY_SECTOR);
        query.bind(params.sector_id);
        query.bind(params.window_start);
        query.bind(params.window_end);
        query.bind(apply_fl);
        query.bind(min_ft);
        query.bind(max_ft);
        query.bind(params.max_rows as i32);
        query.bind(params.tolerance_deg);

        let rows = self.run_query(query).await?;
        debug!("Fetched {} trajectory rows", rows.len());
        rows.iter().map(parse_trajectory_row).collect()
    }

    async fn health_check(&self) -> RepositoryResult<()> {
        self.run_query(Query::new("SELECT 1")).await.map(|_| ())
    }
}

//! SQLite Repository

use crate::records::{
    BioRecognitionLayer, ImmobilizationLayer, MemristiveLayer, Page, Passport, SensorCombination,
    TableCounts, TargetAnalyte,
};
use crate::repository::{Repository, StorageResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{
    Sqlite, SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteRow,
};
use sqlx::{Executor, Row};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

const SCHEMA: [&str; 5] = [
    "CREATE TABLE IF NOT EXISTS analytes (
        ta_id TEXT PRIMARY KEY NOT NULL,
        ta_name TEXT NOT NULL,
        ph_min REAL NOT NULL,
        ph_max REAL NOT NULL,
        t_max INTEGER NOT NULL,
        stability INTEGER NOT NULL,
        half_life INTEGER NOT NULL,
        power_consumption INTEGER NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS bio_recognition (
        bre_id TEXT PRIMARY KEY NOT NULL,
        bre_name TEXT NOT NULL,
        ph_min REAL NOT NULL,
        ph_max REAL NOT NULL,
        t_min INTEGER NOT NULL,
        t_max INTEGER NOT NULL,
        dr_min REAL NOT NULL,
        dr_max REAL NOT NULL,
        sensitivity INTEGER NOT NULL,
        reproducibility INTEGER NOT NULL,
        response_time INTEGER NOT NULL,
        stability INTEGER NOT NULL,
        lod INTEGER NOT NULL,
        durability INTEGER NOT NULL,
        power_consumption INTEGER NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS immobilization (
        im_id TEXT PRIMARY KEY NOT NULL,
        im_name TEXT NOT NULL,
        ph_min REAL NOT NULL,
        ph_max REAL NOT NULL,
        t_min INTEGER NOT NULL,
        t_max INTEGER NOT NULL,
        young_modulus INTEGER NOT NULL,
        adhesion TEXT NOT NULL,
        solubility TEXT NOT NULL,
        loss_coefficient REAL NOT NULL,
        reproducibility INTEGER NOT NULL,
        response_time INTEGER NOT NULL,
        stability INTEGER NOT NULL,
        durability INTEGER NOT NULL,
        power_consumption INTEGER NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS memristive (
        mem_id TEXT PRIMARY KEY NOT NULL,
        mem_name TEXT NOT NULL,
        ph_min REAL NOT NULL,
        ph_max REAL NOT NULL,
        t_min INTEGER NOT NULL,
        t_max INTEGER NOT NULL,
        dr_min REAL NOT NULL,
        dr_max REAL NOT NULL,
        young_modulus INTEGER NOT NULL,
        sensitivity INTEGER NOT NULL,
        reproducibility INTEGER NOT NULL,
        response_time INTEGER NOT NULL,
        stability INTEGER NOT NULL,
        lod INTEGER NOT NULL,
        durability INTEGER NOT NULL,
        power_consumption INTEGER NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS sensor_combinations (
        combination_id TEXT PRIMARY KEY NOT NULL,
        ta_id TEXT NOT NULL,
        bre_id TEXT NOT NULL,
        im_id TEXT NOT NULL,
        mem_id TEXT NOT NULL,
        score REAL NOT NULL,
        created_at TEXT NOT NULL,
        UNIQUE (ta_id, bre_id, im_id, mem_id)
    )",
];

/// Repository backed by a SQLite database
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Open (creating if missing) the database at `url` and apply the schema
    pub async fn connect(url: &str, max_connections: u32) -> StorageResult<Self> {
        info!(url, "Opening SQLite repository");
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await?;

        let repo = Self { pool };
        repo.migrate().await?;
        Ok(repo)
    }

    /// Private in-memory database. Pinned to a single connection that is
    /// never recycled, since each SQLite memory connection is its own database.
    pub async fn in_memory() -> StorageResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(options)
            .await?;

        let repo = Self { pool };
        repo.migrate().await?;
        Ok(repo)
    }

    async fn migrate(&self) -> StorageResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        debug!("SQLite schema ready");
        Ok(())
    }
}

fn page_bounds(page: Page) -> (i64, i64) {
    // LIMIT -1 is "no limit" in SQLite.
    let limit = page.limit.map(|l| l as i64).unwrap_or(-1);
    (limit, page.offset as i64)
}

fn decode_err(message: String) -> sqlx::Error {
    sqlx::Error::Decode(message.into())
}

fn analyte_from_row(row: &SqliteRow) -> Result<TargetAnalyte, sqlx::Error> {
    Ok(TargetAnalyte {
        ta_id: row.try_get("ta_id")?,
        ta_name: row.try_get("ta_name")?,
        ph_min: row.try_get("ph_min")?,
        ph_max: row.try_get("ph_max")?,
        t_max: row.try_get("t_max")?,
        stability: row.try_get("stability")?,
        half_life: row.try_get("half_life")?,
        power_consumption: row.try_get("power_consumption")?,
    })
}

fn bio_recognition_from_row(row: &SqliteRow) -> Result<BioRecognitionLayer, sqlx::Error> {
    Ok(BioRecognitionLayer {
        bre_id: row.try_get("bre_id")?,
        bre_name: row.try_get("bre_name")?,
        ph_min: row.try_get("ph_min")?,
        ph_max: row.try_get("ph_max")?,
        t_min: row.try_get("t_min")?,
        t_max: row.try_get("t_max")?,
        dr_min: row.try_get("dr_min")?,
        dr_max: row.try_get("dr_max")?,
        sensitivity: row.try_get("sensitivity")?,
        reproducibility: row.try_get("reproducibility")?,
        response_time: row.try_get("response_time")?,
        stability: row.try_get("stability")?,
        lod: row.try_get("lod")?,
        durability: row.try_get("durability")?,
        power_consumption: row.try_get("power_consumption")?,
    })
}

fn immobilization_from_row(row: &SqliteRow) -> Result<ImmobilizationLayer, sqlx::Error> {
    let adhesion: String = row.try_get("adhesion")?;
    let solubility: String = row.try_get("solubility")?;
    Ok(ImmobilizationLayer {
        im_id: row.try_get("im_id")?,
        im_name: row.try_get("im_name")?,
        ph_min: row.try_get("ph_min")?,
        ph_max: row.try_get("ph_max")?,
        t_min: row.try_get("t_min")?,
        t_max: row.try_get("t_max")?,
        young_modulus: row.try_get("young_modulus")?,
        adhesion: adhesion.parse().map_err(decode_err)?,
        solubility: solubility.parse().map_err(decode_err)?,
        loss_coefficient: row.try_get("loss_coefficient")?,
        reproducibility: row.try_get("reproducibility")?,
        response_time: row.try_get("response_time")?,
        stability: row.try_get("stability")?,
        durability: row.try_get("durability")?,
        power_consumption: row.try_get("power_consumption")?,
    })
}

fn memristive_from_row(row: &SqliteRow) -> Result<MemristiveLayer, sqlx::Error> {
    Ok(MemristiveLayer {
        mem_id: row.try_get("mem_id")?,
        mem_name: row.try_get("mem_name")?,
        ph_min: row.try_get("ph_min")?,
        ph_max: row.try_get("ph_max")?,
        t_min: row.try_get("t_min")?,
        t_max: row.try_get("t_max")?,
        dr_min: row.try_get("dr_min")?,
        dr_max: row.try_get("dr_max")?,
        young_modulus: row.try_get("young_modulus")?,
        sensitivity: row.try_get("sensitivity")?,
        reproducibility: row.try_get("reproducibility")?,
        response_time: row.try_get("response_time")?,
        stability: row.try_get("stability")?,
        lod: row.try_get("lod")?,
        durability: row.try_get("durability")?,
        power_consumption: row.try_get("power_consumption")?,
    })
}

fn combination_from_row(row: &SqliteRow) -> Result<SensorCombination, sqlx::Error> {
    let created_at: String = row.try_get("created_at")?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| decode_err(format!("invalid created_at '{}': {}", created_at, e)))?
        .with_timezone(&Utc);

    Ok(SensorCombination {
        combination_id: row.try_get("combination_id")?,
        ta_id: row.try_get("ta_id")?,
        bre_id: row.try_get("bre_id")?,
        im_id: row.try_get("im_id")?,
        mem_id: row.try_get("mem_id")?,
        score: row.try_get("score")?,
        created_at,
    })
}

async fn insert_analyte<'e, E>(executor: E, r: &TargetAnalyte) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        "INSERT INTO analytes (ta_id, ta_name, ph_min, ph_max, t_max, stability, half_life, \
         power_consumption) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&r.ta_id)
    .bind(&r.ta_name)
    .bind(r.ph_min)
    .bind(r.ph_max)
    .bind(r.t_max)
    .bind(r.stability)
    .bind(r.half_life)
    .bind(r.power_consumption)
    .execute(executor)
    .await?;
    Ok(())
}

async fn insert_bio_recognition<'e, E>(
    executor: E,
    r: &BioRecognitionLayer,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        "INSERT INTO bio_recognition (bre_id, bre_name, ph_min, ph_max, t_min, t_max, dr_min, \
         dr_max, sensitivity, reproducibility, response_time, stability, lod, durability, \
         power_consumption) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&r.bre_id)
    .bind(&r.bre_name)
    .bind(r.ph_min)
    .bind(r.ph_max)
    .bind(r.t_min)
    .bind(r.t_max)
    .bind(r.dr_min)
    .bind(r.dr_max)
    .bind(r.sensitivity)
    .bind(r.reproducibility)
    .bind(r.response_time)
    .bind(r.stability)
    .bind(r.lod)
    .bind(r.durability)
    .bind(r.power_consumption)
    .execute(executor)
    .await?;
    Ok(())
}

async fn insert_immobilization<'e, E>(
    executor: E,
    r: &ImmobilizationLayer,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        "INSERT INTO immobilization (im_id, im_name, ph_min, ph_max, t_min, t_max, \
         young_modulus, adhesion, solubility, loss_coefficient, reproducibility, response_time, \
         stability, durability, power_consumption) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&r.im_id)
    .bind(&r.im_name)
    .bind(r.ph_min)
    .bind(r.ph_max)
    .bind(r.t_min)
    .bind(r.t_max)
    .bind(r.young_modulus)
    .bind(r.adhesion.as_str())
    .bind(r.solubility.as_str())
    .bind(r.loss_coefficient)
    .bind(r.reproducibility)
    .bind(r.response_time)
    .bind(r.stability)
    .bind(r.durability)
    .bind(r.power_consumption)
    .execute(executor)
    .await?;
    Ok(())
}

async fn insert_memristive<'e, E>(executor: E, r: &MemristiveLayer) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        "INSERT INTO memristive (mem_id, mem_name, ph_min, ph_max, t_min, t_max, dr_min, dr_max, \
         young_modulus, sensitivity, reproducibility, response_time, stability, lod, durability, \
         power_consumption) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&r.mem_id)
    .bind(&r.mem_name)
    .bind(r.ph_min)
    .bind(r.ph_max)
    .bind(r.t_min)
    .bind(r.t_max)
    .bind(r.dr_min)
    .bind(r.dr_max)
    .bind(r.young_modulus)
    .bind(r.sensitivity)
    .bind(r.reproducibility)
    .bind(r.response_time)
    .bind(r.stability)
    .bind(r.lod)
    .bind(r.durability)
    .bind(r.power_consumption)
    .execute(executor)
    .await?;
    Ok(())
}

impl SqliteRepository {
    async fn fetch_page<T>(
        &self,
        table: &str,
        page: Page,
        map: fn(&SqliteRow) -> Result<T, sqlx::Error>,
    ) -> StorageResult<Vec<T>> {
        let (limit, offset) = page_bounds(page);
        let sql = format!("SELECT * FROM {} ORDER BY rowid LIMIT ? OFFSET ?", table);
        let rows = sqlx::query(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let records = rows.iter().map(map).collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    async fn count(&self, table: &str) -> StorageResult<usize> {
        let sql = format!("SELECT COUNT(*) FROM {}", table);
        let count = sqlx::query_scalar::<_, i64>(&sql).fetch_one(&self.pool).await?;
        Ok(count as usize)
    }
}

#[async_trait]
impl Repository for SqliteRepository {
    async fn list_analytes(&self, page: Page) -> StorageResult<Vec<TargetAnalyte>> {
        self.fetch_page("analytes", page, analyte_from_row).await
    }

    async fn create_analyte(&self, record: TargetAnalyte) -> StorageResult<()> {
        insert_analyte(&self.pool, &record).await?;
        Ok(())
    }

    async fn list_bio_recognition(&self, page: Page) -> StorageResult<Vec<BioRecognitionLayer>> {
        self.fetch_page("bio_recognition", page, bio_recognition_from_row)
            .await
    }

    async fn create_bio_recognition(&self, record: BioRecognitionLayer) -> StorageResult<()> {
        insert_bio_recognition(&self.pool, &record).await?;
        Ok(())
    }

    async fn list_immobilization(&self, page: Page) -> StorageResult<Vec<ImmobilizationLayer>> {
        self.fetch_page("immobilization", page, immobilization_from_row)
            .await
    }

    async fn create_immobilization(&self, record: ImmobilizationLayer) -> StorageResult<()> {
        insert_immobilization(&self.pool, &record).await?;
        Ok(())
    }

    async fn list_memristive(&self, page: Page) -> StorageResult<Vec<MemristiveLayer>> {
        self.fetch_page("memristive", page, memristive_from_row).await
    }

    async fn create_memristive(&self, record: MemristiveLayer) -> StorageResult<()> {
        insert_memristive(&self.pool, &record).await?;
        Ok(())
    }

    async fn create_passport(&self, passport: Passport) -> StorageResult<()> {
        let mut tx = self.pool.begin().await?;
        insert_analyte(&mut *tx, &passport.analyte).await?;
        insert_bio_recognition(&mut *tx, &passport.bio_recognition).await?;
        insert_immobilization(&mut *tx, &passport.immobilization).await?;
        insert_memristive(&mut *tx, &passport.memristive).await?;
        tx.commit().await?;
        debug!(ta_id = %passport.analyte.ta_id, "Inserted passport");
        Ok(())
    }

    async fn list_combinations(&self, page: Page) -> StorageResult<Vec<SensorCombination>> {
        self.fetch_page("sensor_combinations", page, combination_from_row)
            .await
    }

    async fn create_combinations(&self, records: Vec<SensorCombination>) -> StorageResult<usize> {
        let mut tx = self.pool.begin().await?;
        for record in &records {
            sqlx::query(
                "INSERT INTO sensor_combinations (combination_id, ta_id, bre_id, im_id, mem_id, \
                 score, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&record.combination_id)
            .bind(&record.ta_id)
            .bind(&record.bre_id)
            .bind(&record.im_id)
            .bind(&record.mem_id)
            .bind(record.score)
            .bind(record.created_at.to_rfc3339())
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        debug!(written = records.len(), "Appended combinations");
        Ok(records.len())
    }

    async fn table_counts(&self) -> StorageResult<TableCounts> {
        Ok(TableCounts {
            analytes: self.count("analytes").await?,
            bio_recognition: self.count("bio_recognition").await?,
            immobilization: self.count("immobilization").await?,
            memristive: self.count("memristive").await?,
            combinations: self.count("sensor_combinations").await?,
        })
    }
}

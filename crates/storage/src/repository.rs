//! Repository Interface and In-Memory Implementation

use crate::records::{
    BioRecognitionLayer, Catalog, Component, ImmobilizationLayer, MemristiveLayer, Page,
    Passport, SensorCombination, TableCounts, TargetAnalyte,
};
use crate::StorageError;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Data access for components and combinations.
///
/// List operations return records in insertion order. Create operations
/// never overwrite: an existing identifier yields [`StorageError::Conflict`].
#[async_trait]
pub trait Repository: Send + Sync {
    async fn list_analytes(&self, page: Page) -> StorageResult<Vec<TargetAnalyte>>;

    async fn create_analyte(&self, record: TargetAnalyte) -> StorageResult<()>;

    async fn list_bio_recognition(&self, page: Page) -> StorageResult<Vec<BioRecognitionLayer>>;

    async fn create_bio_recognition(&self, record: BioRecognitionLayer) -> StorageResult<()>;

    async fn list_immobilization(&self, page: Page) -> StorageResult<Vec<ImmobilizationLayer>>;

    async fn create_immobilization(&self, record: ImmobilizationLayer) -> StorageResult<()>;

    async fn list_memristive(&self, page: Page) -> StorageResult<Vec<MemristiveLayer>>;

    async fn create_memristive(&self, record: MemristiveLayer) -> StorageResult<()>;

    /// Insert all four components of a passport, or none of them
    async fn create_passport(&self, passport: Passport) -> StorageResult<()>;

    async fn list_combinations(&self, page: Page) -> StorageResult<Vec<SensorCombination>>;

    /// Append a batch of combinations, or none of them.
    ///
    /// Returns the number of records written.
    async fn create_combinations(&self, records: Vec<SensorCombination>) -> StorageResult<usize>;

    async fn table_counts(&self) -> StorageResult<TableCounts>;

    /// Load the four full component collections
    async fn load_catalog(&self) -> StorageResult<Catalog> {
        Ok(Catalog {
            analytes: self.list_analytes(Page::all()).await?,
            bio_recognition: self.list_bio_recognition(Page::all()).await?,
            immobilization: self.list_immobilization(Page::all()).await?,
            memristive: self.list_memristive(Page::all()).await?,
        })
    }
}

/// Repository backed by process memory
pub struct MemoryRepository {
    analytes: Mutex<Vec<TargetAnalyte>>,
    bio_recognition: Mutex<Vec<BioRecognitionLayer>>,
    immobilization: Mutex<Vec<ImmobilizationLayer>>,
    memristive: Mutex<Vec<MemristiveLayer>>,
    combinations: Mutex<Vec<SensorCombination>>,
}

impl MemoryRepository {
    /// Create a new empty in-memory repository
    pub fn new() -> Self {
        info!("Creating in-memory repository");
        Self {
            analytes: Mutex::new(Vec::new()),
            bio_recognition: Mutex::new(Vec::new()),
            immobilization: Mutex::new(Vec::new()),
            memristive: Mutex::new(Vec::new()),
            combinations: Mutex::new(Vec::with_capacity(1024)),
        }
    }
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> StorageResult<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|e| StorageError::DatabaseError(format!("Lock error: {}", e)))
}

fn ensure_absent<T: Component>(table: &[T], id: &str) -> StorageResult<()> {
    if table.iter().any(|r| r.id() == id) {
        return Err(StorageError::Conflict(format!(
            "{} '{}' already exists",
            T::KIND,
            id
        )));
    }
    Ok(())
}

fn insert_component<T: Component>(table: &Mutex<Vec<T>>, record: T) -> StorageResult<()> {
    let mut table = lock(table)?;
    ensure_absent(&table, record.id())?;
    debug!(kind = %T::KIND, id = record.id(), "Inserted component");
    table.push(record);
    Ok(())
}

fn list_page<T: Clone>(table: &Mutex<Vec<T>>, page: Page) -> StorageResult<Vec<T>> {
    let table = lock(table)?;
    Ok(page.slice(&table))
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn list_analytes(&self, page: Page) -> StorageResult<Vec<TargetAnalyte>> {
        list_page(&self.analytes, page)
    }

    async fn create_analyte(&self, record: TargetAnalyte) -> StorageResult<()> {
        insert_component(&self.analytes, record)
    }

    async fn list_bio_recognition(&self, page: Page) -> StorageResult<Vec<BioRecognitionLayer>> {
        list_page(&self.bio_recognition, page)
    }

    async fn create_bio_recognition(&self, record: BioRecognitionLayer) -> StorageResult<()> {
        insert_component(&self.bio_recognition, record)
    }

    async fn list_immobilization(&self, page: Page) -> StorageResult<Vec<ImmobilizationLayer>> {
        list_page(&self.immobilization, page)
    }

    async fn create_immobilization(&self, record: ImmobilizationLayer) -> StorageResult<()> {
        insert_component(&self.immobilization, record)
    }

    async fn list_memristive(&self, page: Page) -> StorageResult<Vec<MemristiveLayer>> {
        list_page(&self.memristive, page)
    }

    async fn create_memristive(&self, record: MemristiveLayer) -> StorageResult<()> {
        insert_component(&self.memristive, record)
    }

    async fn create_passport(&self, passport: Passport) -> StorageResult<()> {
        // Locks are always taken in TA, BRE, IM, MEM order.
        let mut analytes = lock(&self.analytes)?;
        let mut bio = lock(&self.bio_recognition)?;
        let mut immobilization = lock(&self.immobilization)?;
        let mut memristive = lock(&self.memristive)?;

        ensure_absent(&analytes, passport.analyte.id())?;
        ensure_absent(&bio, passport.bio_recognition.id())?;
        ensure_absent(&immobilization, passport.immobilization.id())?;
        ensure_absent(&memristive, passport.memristive.id())?;

        debug!(ta_id = passport.analyte.id(), "Inserted passport");
        analytes.push(passport.analyte);
        bio.push(passport.bio_recognition);
        immobilization.push(passport.immobilization);
        memristive.push(passport.memristive);
        Ok(())
    }

    async fn list_combinations(&self, page: Page) -> StorageResult<Vec<SensorCombination>> {
        list_page(&self.combinations, page)
    }

    async fn create_combinations(&self, records: Vec<SensorCombination>) -> StorageResult<usize> {
        let mut combinations = lock(&self.combinations)?;

        let mut ids: HashSet<String> = combinations
            .iter()
            .map(|c| c.combination_id.clone())
            .collect();
        let mut keys: HashSet<_> = combinations.iter().map(|c| c.key()).collect();

        for record in &records {
            if !ids.insert(record.combination_id.clone()) {
                return Err(StorageError::Conflict(format!(
                    "combination '{}' already exists",
                    record.combination_id
                )));
            }
            let key = record.key();
            if !keys.insert(key.clone()) {
                return Err(StorageError::Conflict(format!(
                    "combination {} already exists",
                    key
                )));
            }
        }

        let written = records.len();
        combinations.extend(records);
        debug!(written, total = combinations.len(), "Appended combinations");
        Ok(written)
    }

    async fn table_counts(&self) -> StorageResult<TableCounts> {
        Ok(TableCounts {
            analytes: lock(&self.analytes)?.len(),
            bio_recognition: lock(&self.bio_recognition)?.len(),
            immobilization: lock(&self.immobilization)?.len(),
            memristive: lock(&self.memristive)?.len(),
            combinations: lock(&self.combinations)?.len(),
        })
    }
}

//! The data directory: `master.csv`, `central.csv` and the optional
//! `service_prices.csv`.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use tiredesk_inventory::{InventoryStore, Table, csv_io};
use tiredesk_pricing::ServicePrices;

use crate::config::AppConfig;
use crate::session::Session;

pub const SERVICE_PRICES_FILE: &str = "service_prices.csv";

#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn table_path(&self, table: Table) -> PathBuf {
        self.root.join(format!("{table}.csv"))
    }

    pub fn prices_path(&self) -> PathBuf {
        self.root.join(SERVICE_PRICES_FILE)
    }

    /// Load both tables. A missing file is an empty table; a malformed one
    /// is an error.
    pub fn load_store(&self) -> Result<InventoryStore> {
        let mut store = InventoryStore::new();
        for table in [Table::Master, Table::Central] {
            let path = self.table_path(table);
            if !path.exists() {
                tracing::debug!(path = %path.display(), "table file absent, starting empty");
                continue;
            }
            let file = File::open(&path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            store
                .import_table(file, table)
                .with_context(|| format!("failed to load {}", path.display()))?;
        }
        Ok(store)
    }

    /// `base` with the fees from `service_prices.csv` applied, if present.
    pub fn load_prices(&self, base: &ServicePrices) -> Result<ServicePrices> {
        let mut prices = base.clone();
        let path = self.prices_path();
        if path.exists() {
            let file = File::open(&path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            prices
                .apply_csv(file)
                .with_context(|| format!("failed to load {}", path.display()))?;
        }
        Ok(prices)
    }

    pub fn open_session(&self, config: &AppConfig) -> Result<Session> {
        let store = self.load_store()?;
        let prices = self.load_prices(&config.service_prices)?;
        Ok(Session::new(config, store, prices))
    }

    /// Write one table back, header only when empty.
    pub fn save_table(&self, store: &InventoryStore, table: Table) -> Result<()> {
        let bytes = csv_io::write_csv(store.table(table))?;
        self.write(&self.table_path(table), &bytes)
    }

    pub fn save_prices(&self, prices: &ServicePrices) -> Result<()> {
        let bytes = prices.to_csv()?;
        self.write(&self.prices_path(), &bytes)
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        std::fs::create_dir_all(&self.root)
            .with_context(|| format!("failed to create {}", self.root.display()))?;
        std::fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), bytes = bytes.len(), "file written");
        Ok(())
    }
}

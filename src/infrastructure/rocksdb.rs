use crate::domain::payment::{Payment, TransactionId};
use crate::domain::ports::PaymentStore;
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family for storing payment records.
pub const CF_PAYMENTS: &str = "payments";

/// A persistent store implementation using RocksDB.
///
/// Payments are stored as JSON under their transaction id in the `payments`
/// column family. Writes go through a single async lock so the version
/// check and the put happen as one step.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    write_lock: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the `payments` column family exists.
    ///
    /// # Arguments
    ///
    /// * `path` - The filesystem path where the database will be stored.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_payments = ColumnFamilyDescriptor::new(CF_PAYMENTS, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_payments])?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    fn read(&self, id: &TransactionId) -> Result<Option<Payment>> {
        let cf = self.payments_cf()?;
        match self.db.get_pinned_cf(&cf, id.as_str().as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn write(&self, payment: &Payment) -> Result<()> {
        let cf = self.payments_cf()?;
        let value = serde_json::to_vec(payment)?;
        self.db
            .put_cf(&cf, payment.transaction_id.as_str().as_bytes(), value)?;
        Ok(())
    }

    fn payments_cf(&self) -> Result<&rocksdb::ColumnFamily> {
        self.db.cf_handle(CF_PAYMENTS).ok_or_else(|| {
            PaymentError::InternalError(Box::new(std::io::Error::other(
                "Payments column family not found",
            )))
        })
    }
}

#[async_trait]
impl PaymentStore for RocksDBStore {
    async fn insert(&self, payment: Payment) -> Result<Payment> {
        let _guard = self.write_lock.lock().await;
        if self.read(&payment.transaction_id)?.is_some() {
            return Err(PaymentError::Duplicate(payment.transaction_id));
        }
        self.write(&payment)?;
        Ok(payment)
    }

    async fn load(&self, id: &TransactionId) -> Result<Option<Payment>> {
        self.read(id)
    }

    async fn save(&self, mut payment: Payment) -> Result<Payment> {
        let _guard = self.write_lock.lock().await;
        let stored = self
            .read(&payment.transaction_id)?
            .ok_or_else(|| PaymentError::NotFound(payment.transaction_id.clone()))?;

        if stored.version != payment.version {
            return Err(PaymentError::Conflict {
                transaction_id: payment.transaction_id,
                expected: payment.version,
                found: stored.version,
            });
        }

        payment.version += 1;
        self.write(&payment)?;
        Ok(payment)
    }

    async fn all(&self) -> Result<Vec<Payment>> {
        let cf = self.payments_cf()?;
        let mut payments = Vec::new();

        for item in self.db.iterator_cf(&cf, rocksdb::IteratorMode::Start) {
            let (_key, value) = item?;
            payments.push(serde_json::from_slice(&value)?);
        }

        Ok(payments)
    }
}

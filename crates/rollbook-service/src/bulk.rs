//! [`BulkMapper`] — the batched-insert primitive of the import pipeline.

use rollbook_core::{
  bulk::{BulkTarget, ColumnValue, InsertOptions},
  store::EnrollmentStore,
};
use tracing::debug;

use crate::{Error, Result};

/// A thin batching adapter over one insert target of a store.
///
/// The mapper performs no row-level validation — it exists so that an
/// import of N rows costs one store round trip instead of N. Constraint
/// violations from the backend propagate uncaught; validating rows is the
/// caller's responsibility.
pub struct BulkMapper<'a, S: EnrollmentStore> {
  store:           &'a S,
  target:          BulkTarget,
  default_options: InsertOptions,
}

impl<'a, S: EnrollmentStore> BulkMapper<'a, S> {
  pub fn new(store: &'a S, target: BulkTarget, default_options: InsertOptions) -> Self {
    Self { store, target, default_options }
  }

  /// The insert target this mapper writes.
  pub fn target(&self) -> BulkTarget { self.target }

  /// Submit `rows` as one bulk insert. Per-call `options` take precedence
  /// over the mapper's defaults. Returns the submitted rows unchanged so
  /// callers can chain or inspect what went out.
  ///
  /// An empty batch still issues the (no-op) insert call and succeeds.
  pub async fn insert(
    &self,
    rows: Vec<Vec<ColumnValue>>,
    options: InsertOptions,
  ) -> Result<Vec<Vec<ColumnValue>>> {
    let options = options.merged_over(self.default_options);
    debug!(
      table = self.target.table,
      rows = rows.len(),
      conflict = ?options.conflict(),
      "bulk insert"
    );

    self
      .store
      .bulk_insert(self.target, rows.clone(), options)
      .await
      .map_err(|e| Error::Store(Box::new(e)))?;

    Ok(rows)
  }
}

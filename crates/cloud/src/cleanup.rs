//! Removal of every stored image belonging to a drink.

use bartender_core::images::{optimized_key, original_prefix, ImageSize};
use bartender_core::types::DbId;

use crate::{DeleteReport, ObjectStorage, StorageError};

/// Delete the raw uploads under `original/{drink_id}/` and all optimized
/// variants of a drink.
///
/// Per-key failures are reported in the returned [`DeleteReport`] and logged;
/// only a failure to talk to the store at all is returned as an error.
pub async fn delete_drink_images(
    storage: &dyn ObjectStorage,
    drink_id: DbId,
) -> Result<DeleteReport, StorageError> {
    let mut keys = storage.list_keys(&original_prefix(drink_id)).await?;
    keys.extend(ImageSize::ALL.iter().map(|size| optimized_key(*size, drink_id)));

    let report = storage.delete_objects(&keys).await?;
    for (key, reason) in &report.failed {
        tracing::warn!(%drink_id, key = %key, reason = %reason, "Failed to delete drink image");
    }
    tracing::info!(
        %drink_id,
        deleted = report.deleted.len(),
        failed = report.failed.len(),
        "Drink images deleted"
    );
    Ok(report)
}

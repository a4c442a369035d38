//! Draft service - applies save and rename requests to the draft store.

use crate::{error::AppError, models::draft::DraftWrite, store::DraftStore};

/// Apply a classified save/rename body to `(user_name, draft_name)`.
///
/// Every variant is exactly one store write.
///
/// # Process
///
/// - `Save`: one upsert
/// - `Rename` without params: one rename; missing source is `DraftNotFound`
/// - `Rename` with params: one rename that also replaces the params
///
/// # Errors
///
/// - `DraftNotFound`: rename source does not exist
/// - `DraftConflict`: rename target already exists
/// - `Database`: the store failed
pub async fn apply_write(
    store: &dyn DraftStore,
    user_name: &str,
    draft_name: &str,
    write: DraftWrite,
) -> Result<(), AppError> {
    match write {
        DraftWrite::Save(params) => store.save(user_name, draft_name, &params).await,
        DraftWrite::Rename { new_name, params } => {
            let renamed = match params {
                Some(params) => {
                    store
                        .rename_and_save(user_name, draft_name, &new_name, &params)
                        .await?
                }
                None => store.rename(user_name, draft_name, &new_name).await?,
            };

            if !renamed {
                return Err(AppError::DraftNotFound);
            }

            tracing::debug!(user_name, from = draft_name, to = %new_name, "Draft renamed");

            Ok(())
        }
    }
}

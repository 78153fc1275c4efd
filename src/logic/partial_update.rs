use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use validator::Validate;

use crate::error::ApiError;
use crate::logic::apply_patch;
use crate::model::{PatchOperation, Villa, VillaNumber, VillaNumberUpdateDto, VillaUpdateDto};
use crate::store::{Entity, Repository};

/// An aggregate that can be edited through its update representation.
pub trait Patchable: Entity {
    type Update: Serialize + DeserializeOwned + Validate + Send + Sync;

    fn to_update(&self) -> Self::Update;
    fn from_update(update: Self::Update) -> Self;
    fn update_key(update: &Self::Update) -> i32;
}

impl Patchable for Villa {
    type Update = VillaUpdateDto;

    fn to_update(&self) -> VillaUpdateDto {
        VillaUpdateDto::from(self)
    }

    fn from_update(update: VillaUpdateDto) -> Self {
        Villa::from(update)
    }

    fn update_key(update: &VillaUpdateDto) -> i32 {
        update.id
    }
}

impl Patchable for VillaNumber {
    type Update = VillaNumberUpdateDto;

    fn to_update(&self) -> VillaNumberUpdateDto {
        VillaNumberUpdateDto::from(self)
    }

    fn from_update(update: VillaNumberUpdateDto) -> Self {
        VillaNumber::from(update)
    }

    fn update_key(update: &VillaNumberUpdateDto) -> i32 {
        update.villa_no
    }
}

/// Loads the aggregate, applies the patch to its update representation and
/// checks the field constraints.
///
/// Nothing is written. Callers run their aggregate specific checks
/// (uniqueness, references) on the returned value and then hand it to
/// [`commit`].
pub async fn prepare<T: Patchable>(
    repository: &dyn Repository<T>,
    key: i32,
    operations: &[PatchOperation],
) -> Result<T::Update, ApiError> {
    let current = repository
        .find_by_key(key, false, None)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("{} {} does not exist", T::NAME, key)))?;

    let merged = apply_patch(&current.to_update(), operations)?;
    merged.validate()?;

    if T::update_key(&merged) != key {
        return Err(ApiError::Validation(format!(
            "{} key cannot be changed by a patch",
            T::NAME
        )));
    }

    debug!(
        "Prepared patch of {} {} with {} operation(s)",
        T::NAME,
        key,
        operations.len()
    );
    Ok(merged)
}

/// Persists a prepared update through the repository.
pub async fn commit<T: Patchable>(
    repository: &dyn Repository<T>,
    merged: T::Update,
) -> Result<T, ApiError> {
    Ok(repository.update(T::from_update(merged)).await?)
}

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    response::Json,
};
use log::info;
use validator::Validate;

use crate::api::handlers::{path_key, required_body, respond, AppState};
use crate::error::ApiError;
use crate::logic::partial_update;
use crate::model::{
    ApiResponse, PatchOperation, Villa, VillaCreateDto, VillaDto, VillaUpdateDto,
};
use crate::store::{villa_repository, VillaStore};

type IdPath = Result<Path<i32>, PathRejection>;
type Body<T> = Result<Json<Option<T>>, JsonRejection>;

pub async fn get_villas<S: VillaStore>(
    State(store): State<AppState<S>>,
) -> ApiResponse<Vec<VillaDto>> {
    respond("GET /api/villas", list(&*store).await)
}

pub async fn get_villa<S: VillaStore>(
    State(store): State<AppState<S>>,
    path: IdPath,
) -> ApiResponse<VillaDto> {
    respond("GET /api/villas/:id", fetch(&*store, path).await)
}

pub async fn create_villa<S: VillaStore>(
    State(store): State<AppState<S>>,
    body: Body<VillaCreateDto>,
) -> ApiResponse<VillaDto> {
    respond("POST /api/villas", create(&*store, body).await)
}

pub async fn update_villa<S: VillaStore>(
    State(store): State<AppState<S>>,
    path: IdPath,
    body: Body<VillaUpdateDto>,
) -> ApiResponse<()> {
    respond("PUT /api/villas/:id", update(&*store, path, body).await)
}

pub async fn patch_villa<S: VillaStore>(
    State(store): State<AppState<S>>,
    path: IdPath,
    body: Body<Vec<PatchOperation>>,
) -> ApiResponse<()> {
    respond("PATCH /api/villas/:id", patch(&*store, path, body).await)
}

pub async fn delete_villa<S: VillaStore>(
    State(store): State<AppState<S>>,
    path: IdPath,
) -> ApiResponse<()> {
    respond("DELETE /api/villas/:id", delete(&*store, path).await)
}

async fn list<S: VillaStore>(store: &S) -> Result<ApiResponse<Vec<VillaDto>>, ApiError> {
    let villas = villa_repository(store).get_all(None, None).await?;
    Ok(ApiResponse::ok(villas.into_iter().map(VillaDto::from).collect()))
}

async fn fetch<S: VillaStore>(store: &S, path: IdPath) -> Result<ApiResponse<VillaDto>, ApiError> {
    let id = path_key(path, "Villa")?;
    let villa = find(store, id).await?;
    Ok(ApiResponse::ok(villa.into()))
}

async fn create<S: VillaStore>(
    store: &S,
    body: Body<VillaCreateDto>,
) -> Result<ApiResponse<VillaDto>, ApiError> {
    let dto = required_body(body)?;
    dto.validate()?;
    ensure_name_available(store, &dto.name, None).await?;

    let villa = villa_repository(store).create(Villa::from(dto)).await?;
    info!("Created villa {} ({})", villa.id, villa.name);
    Ok(ApiResponse::created(villa.into()))
}

async fn update<S: VillaStore>(
    store: &S,
    path: IdPath,
    body: Body<VillaUpdateDto>,
) -> Result<ApiResponse<()>, ApiError> {
    let id = path_key(path, "Villa")?;
    let dto = required_body(body)?;
    if dto.id != id {
        return Err(ApiError::Validation(format!(
            "Villa id {} in the body does not match {} in the path",
            dto.id, id
        )));
    }
    dto.validate()?;
    ensure_name_available(store, &dto.name, Some(id)).await?;

    villa_repository(store).update(Villa::from(dto)).await?;
    Ok(ApiResponse::no_content())
}

async fn patch<S: VillaStore>(
    store: &S,
    path: IdPath,
    body: Body<Vec<PatchOperation>>,
) -> Result<ApiResponse<()>, ApiError> {
    let id = path_key(path, "Villa")?;
    let operations = required_body(body)?;

    let merged = partial_update::prepare(villa_repository(store), id, &operations).await?;
    ensure_name_available(store, &merged.name, Some(id)).await?;

    partial_update::commit(villa_repository(store), merged).await?;
    Ok(ApiResponse::no_content())
}

async fn delete<S: VillaStore>(store: &S, path: IdPath) -> Result<ApiResponse<()>, ApiError> {
    let id = path_key(path, "Villa")?;
    let villa = find(store, id).await?;

    villa_repository(store).remove(villa).await?;
    info!("Deleted villa {}", id);
    Ok(ApiResponse::no_content())
}

async fn find<S: VillaStore>(store: &S, id: i32) -> Result<Villa, ApiError> {
    villa_repository(store)
        .find_by_key(id, true, None)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Villa {} does not exist", id)))
}

/// Villa names are unique ignoring case. `except` skips the villa being edited.
async fn ensure_name_available<S: VillaStore>(
    store: &S,
    name: &str,
    except: Option<i32>,
) -> Result<(), ApiError> {
    let taken = villa_repository(store)
        .get(
            &|villa: &Villa| villa.has_name(name) && Some(villa.id) != except,
            false,
            None,
        )
        .await?;

    match taken {
        Some(_) => Err(ApiError::Conflict("Villa already exists!".to_string())),
        None => Ok(()),
    }
}

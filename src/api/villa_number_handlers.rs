use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    response::Json,
};
use log::info;
use validator::Validate;

use crate::api::handlers::{include_param, path_key, required_body, respond, AppState, IncludeQuery};
use crate::error::ApiError;
use crate::logic::partial_update;
use crate::model::{
    ApiResponse, PatchOperation, VillaNumber, VillaNumberCreateDto, VillaNumberDto,
    VillaNumberUpdateDto,
};
use crate::store::{villa_number_repository, villa_repository, VillaStore};

type NoPath = Result<Path<i32>, PathRejection>;
type Body<T> = Result<Json<Option<T>>, JsonRejection>;
type IncludeArg = Result<Query<IncludeQuery>, QueryRejection>;

const INVALID_VILLA: &str = "Villa Id is Invalid!";

pub async fn get_villa_numbers<S: VillaStore>(
    State(store): State<AppState<S>>,
    query: IncludeArg,
) -> ApiResponse<Vec<VillaNumberDto>> {
    respond("GET /api/villa-numbers", list(&*store, query).await)
}

pub async fn get_villa_number<S: VillaStore>(
    State(store): State<AppState<S>>,
    path: NoPath,
    query: IncludeArg,
) -> ApiResponse<VillaNumberDto> {
    respond(
        "GET /api/villa-numbers/:villa_no",
        fetch(&*store, path, query).await,
    )
}

pub async fn create_villa_number<S: VillaStore>(
    State(store): State<AppState<S>>,
    body: Body<VillaNumberCreateDto>,
) -> ApiResponse<VillaNumberDto> {
    respond("POST /api/villa-numbers", create(&*store, body).await)
}

pub async fn update_villa_number<S: VillaStore>(
    State(store): State<AppState<S>>,
    path: NoPath,
    body: Body<VillaNumberUpdateDto>,
) -> ApiResponse<()> {
    respond(
        "PUT /api/villa-numbers/:villa_no",
        update(&*store, path, body).await,
    )
}

pub async fn patch_villa_number<S: VillaStore>(
    State(store): State<AppState<S>>,
    path: NoPath,
    body: Body<Vec<PatchOperation>>,
) -> ApiResponse<()> {
    respond(
        "PATCH /api/villa-numbers/:villa_no",
        patch(&*store, path, body).await,
    )
}

pub async fn delete_villa_number<S: VillaStore>(
    State(store): State<AppState<S>>,
    path: NoPath,
) -> ApiResponse<()> {
    respond(
        "DELETE /api/villa-numbers/:villa_no",
        delete(&*store, path).await,
    )
}

async fn list<S: VillaStore>(
    store: &S,
    query: IncludeArg,
) -> Result<ApiResponse<Vec<VillaNumberDto>>, ApiError> {
    let include = include_param(query)?;
    let numbers = villa_number_repository(store)
        .get_all(None, include.as_deref())
        .await?;
    Ok(ApiResponse::ok(
        numbers.into_iter().map(VillaNumberDto::from).collect(),
    ))
}

async fn fetch<S: VillaStore>(
    store: &S,
    path: NoPath,
    query: IncludeArg,
) -> Result<ApiResponse<VillaNumberDto>, ApiError> {
    let villa_no = path_key(path, "VillaNumber")?;
    let include = include_param(query)?;
    let number = find(store, villa_no, include.as_deref()).await?;
    Ok(ApiResponse::ok(number.into()))
}

async fn create<S: VillaStore>(
    store: &S,
    body: Body<VillaNumberCreateDto>,
) -> Result<ApiResponse<VillaNumberDto>, ApiError> {
    let dto = required_body(body)?;
    dto.validate()?;

    let existing = villa_number_repository(store)
        .find_by_key(dto.villa_no, false, None)
        .await?;
    if existing.is_some() {
        return Err(ApiError::Conflict("Villa Number already exists!".to_string()));
    }
    ensure_villa_exists(store, dto.villa_id).await?;

    let number = villa_number_repository(store)
        .create(VillaNumber::from(dto))
        .await?;
    info!("Created villa number {} for villa {}", number.villa_no, number.villa_id);
    Ok(ApiResponse::created(number.into()))
}

async fn update<S: VillaStore>(
    store: &S,
    path: NoPath,
    body: Body<VillaNumberUpdateDto>,
) -> Result<ApiResponse<()>, ApiError> {
    let villa_no = path_key(path, "VillaNumber")?;
    let dto = required_body(body)?;
    if dto.villa_no != villa_no {
        return Err(ApiError::Validation(format!(
            "Villa number {} in the body does not match {} in the path",
            dto.villa_no, villa_no
        )));
    }
    dto.validate()?;
    ensure_villa_exists(store, dto.villa_id).await?;
    find(store, villa_no, None).await?;

    villa_number_repository(store)
        .update(VillaNumber::from(dto))
        .await?;
    Ok(ApiResponse::no_content())
}

async fn patch<S: VillaStore>(
    store: &S,
    path: NoPath,
    body: Body<Vec<PatchOperation>>,
) -> Result<ApiResponse<()>, ApiError> {
    let villa_no = path_key(path, "VillaNumber")?;
    let operations = required_body(body)?;

    let merged =
        partial_update::prepare(villa_number_repository(store), villa_no, &operations).await?;
    ensure_villa_exists(store, merged.villa_id).await?;

    partial_update::commit(villa_number_repository(store), merged).await?;
    Ok(ApiResponse::no_content())
}

async fn delete<S: VillaStore>(store: &S, path: NoPath) -> Result<ApiResponse<()>, ApiError> {
    let villa_no = path_key(path, "VillaNumber")?;
    let number = find(store, villa_no, None).await?;

    villa_number_repository(store).remove(number).await?;
    info!("Deleted villa number {}", villa_no);
    Ok(ApiResponse::no_content())
}

async fn find<S: VillaStore>(
    store: &S,
    villa_no: i32,
    include: Option<&str>,
) -> Result<VillaNumber, ApiError> {
    villa_number_repository(store)
        .find_by_key(villa_no, true, include)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("VillaNumber {} does not exist", villa_no)))
}

async fn ensure_villa_exists<S: VillaStore>(store: &S, villa_id: i32) -> Result<(), ApiError> {
    let villa = villa_repository(store)
        .find_by_key(villa_id, false, None)
        .await?;

    match villa {
        Some(_) => Ok(()),
        None => Err(ApiError::Validation(INVALID_VILLA.to_string())),
    }
}

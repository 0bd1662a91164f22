//! Person CRUD endpoints
//!
//! - `PUT /`        enrich a name and store the record
//! - `GET /`        list records matching query filters
//! - `POST /:id`    overwrite a stored record
//! - `DELETE /:id`  delete a stored record

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use persona_common::{PersonFilter, PersonInfo};
use serde::Deserialize;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Body of `PUT /`
#[derive(Debug, Deserialize)]
pub struct AddPersonRequest {
    pub name: String,
    #[serde(default)]
    pub surname: String,
}

/// PUT /
///
/// Returns the stored record including its new id.
pub async fn add_person(
    State(state): State<AppState>,
    payload: Result<Json<AddPersonRequest>, JsonRejection>,
) -> ApiResult<Json<PersonInfo>> {
    let Json(request) = payload?;
    let ctx = state.request_context();

    let person = state
        .service
        .add(&ctx, &request.name, &request.surname)
        .await?;

    Ok(Json(person))
}

/// GET /?id=&name=&surname=&age=&gender=&country=&count=&offset=
///
/// A key given more than once keeps its last value; unknown keys are ignored.
pub async fn get_persons(
    State(state): State<AppState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> ApiResult<Json<Vec<PersonInfo>>> {
    let Query(pairs) = query?;
    let filter = filter_from_query(pairs)?;
    debug!(?filter, "Listing persons");

    let ctx = state.request_context();
    let persons = state.service.find(&ctx, &filter).await?;
    Ok(Json(persons))
}

fn filter_from_query(pairs: Vec<(String, String)>) -> ApiResult<PersonFilter> {
    let mut filter = PersonFilter::default();

    for (key, value) in pairs {
        match key.as_str() {
            "id" => filter.id = Some(parse_int(&key, &value)?),
            "name" => filter.name = Some(value),
            "surname" => filter.surname = Some(value),
            "age" => filter.age = Some(parse_int(&key, &value)?),
            "gender" => filter.gender = Some(value),
            "country" => filter.country = Some(value),
            "count" => filter.count = Some(parse_int(&key, &value)?),
            "offset" => filter.offset = Some(parse_int(&key, &value)?),
            _ => {}
        }
    }

    Ok(filter)
}

fn parse_int(key: &str, value: &str) -> ApiResult<i64> {
    value
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("failed to read query: {}={}", key, value)))
}

/// POST /:id
///
/// Overwrites every field; fields missing from the body are stored as zero
/// or empty. The id in the path wins over any id in the body.
pub async fn update_person(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<PersonInfo>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = id?;
    let Json(mut info) = payload?;
    info.id = id;

    let ctx = state.request_context();
    state.service.update(&ctx, &info).await?;
    Ok(StatusCode::OK)
}

/// DELETE /:id
pub async fn delete_person(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = id?;

    let ctx = state.request_context();
    state.service.delete(&ctx, id).await?;
    Ok(StatusCode::OK)
}

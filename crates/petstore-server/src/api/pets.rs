// ABOUTME: Pet CRUD API handlers: list, create, read, update, and delete.
// ABOUTME: Validates requests and ids, then delegates to the configured PetStore.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use petstore_core::Pet;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::app_state::SharedState;

/// Request body for creating or replacing a pet. Missing fields decode as
/// empty strings so they are reported by validation rather than the decoder.
#[derive(Debug, Deserialize)]
pub struct PetRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub race: String,
    #[serde(default, rename = "mod")]
    pub modifier: String,
}

impl PetRequest {
    fn validate(&self) -> Result<(), ApiError> {
        let mut message = Vec::new();
        if self.name.is_empty() {
            message.push("pet name cannot be empty".to_string());
        }
        if self.race.is_empty() {
            message.push("pet race cannot be empty".to_string());
        }
        if self.modifier.is_empty() {
            message.push("pet mod cannot be empty".to_string());
        }

        if message.is_empty() {
            Ok(())
        } else {
            Err(ApiError::InvalidResource(message))
        }
    }
}

/// Decode and validate a request body. The content type is not checked;
/// any body that parses as a pet request is accepted.
fn valid_body(body: &[u8]) -> Result<PetRequest, ApiError> {
    let req: PetRequest = serde_json::from_slice(body).map_err(|e| {
        tracing::debug!("rejected pet body: {}", e);
        ApiError::InvalidResource(Vec::new())
    })?;
    req.validate()?;
    Ok(req)
}

/// Ids in paths are plain non-negative decimal integers.
fn parse_id(raw: &str) -> Result<i64, ApiError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::InvalidUrl);
    }
    raw.parse::<i64>().map_err(|_| ApiError::InvalidUrl)
}

/// GET /pets - List every pet, ascending by id.
pub async fn list_pets(State(state): State<SharedState>) -> Result<Json<Vec<Pet>>, ApiError> {
    let pets = state.with_store(|store| store.get_all_pets()).await?;
    Ok(Json(pets))
}

/// POST /pets - Create a pet and point at it with a Location header.
pub async fn create_pet(
    State(state): State<SharedState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let req = valid_body(&body)?;
    let id = state
        .with_store(move |store| store.add_pet(&req.name, &req.race, &req.modifier))
        .await?;

    Ok((
        StatusCode::OK,
        [(header::LOCATION, format!("/pets/{}", id))],
        Json(serde_json::json!({ "id": id })),
    ))
}

/// GET /pets/{id} - Fetch a single pet.
pub async fn get_pet(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Pet>, ApiError> {
    let id = parse_id(&id)?;
    let pet = state.with_store(move |store| store.get_pet(id)).await?;
    Ok(Json(pet))
}

/// PUT /pets/{id} - Replace a pet. Answers 304 when nothing changed.
pub async fn update_pet(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    let req = valid_body(&body)?;

    let changed = state
        .with_store(move |store| store.update_pet(id, &req.name, &req.race, &req.modifier))
        .await?;

    Ok(if changed {
        StatusCode::OK
    } else {
        StatusCode::NOT_MODIFIED
    })
}

/// DELETE /pets/{id} - Remove a pet.
pub async fn delete_pet(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    state.with_store(move |store| store.delete_pet(id)).await?;
    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_state::AppState;
    use crate::routes::create_router;
    use axum::body::Body;
    use http::Request;
    use petstore_store::{MemoryPetStore, PetStore};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_state() -> SharedState {
        let store = MemoryPetStore::new();
        store.add_pet("Fluffy", "dog", "happy").unwrap();
        Arc::new(AppState::new(Arc::new(store)))
    }

    async fn send(state: &SharedState, req: Request<Body>) -> axum::response::Response {
        create_router(Arc::clone(state)).oneshot(req).await.unwrap()
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap()
    }

    async fn json_body(resp: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[test]
    fn parse_id_accepts_only_digits() {
        assert_eq!(parse_id("42"), Ok(42));
        assert_eq!(parse_id(""), Err(ApiError::InvalidUrl));
        assert_eq!(parse_id("-1"), Err(ApiError::InvalidUrl));
        assert_eq!(parse_id("abc"), Err(ApiError::InvalidUrl));
        assert_eq!(parse_id("99999999999999999999"), Err(ApiError::InvalidUrl));
    }

    #[tokio::test]
    async fn get_existing_pet_returns_json() {
        let state = test_state();
        let resp = send(&state, Request::get("/pets/1").body(Body::empty()).unwrap()).await;

        assert_eq!(resp.status(), 200);
        let json = json_body(resp).await;
        assert_eq!(
            json,
            serde_json::json!({ "id": 1, "name": "Fluffy", "race": "dog", "mod": "happy" })
        );
    }

    #[tokio::test]
    async fn get_missing_pet_returns_404() {
        let state = test_state();
        let resp = send(&state, Request::get("/pets/5").body(Body::empty()).unwrap()).await;

        assert_eq!(resp.status(), 404);
        let json = json_body(resp).await;
        assert_eq!(json["error"], "resource not found");
        assert!(json.get("message").is_none());
    }

    #[tokio::test]
    async fn get_with_invalid_id_returns_400() {
        let state = test_state();
        let resp = send(&state, Request::get("/pets/abc").body(Body::empty()).unwrap()).await;

        assert_eq!(resp.status(), 400);
        assert_eq!(json_body(resp).await["error"], "invalid url");
    }

    #[tokio::test]
    async fn create_pet_sets_location() {
        let state = test_state();
        let body = serde_json::json!({ "name": "Lion", "race": "cat", "mod": "brave" });
        let resp = send(&state, json_request("POST", "/pets", body)).await;

        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["location"], "/pets/2");
        assert_eq!(json_body(resp).await["id"], 2);
        assert_eq!(
            state.store.get_pet(2).unwrap(),
            Pet::new(2, "Lion", "cat", "brave")
        );
    }

    #[tokio::test]
    async fn create_pet_without_content_type_is_accepted() {
        let state = test_state();
        let req = Request::post("/pets")
            .body(Body::from(r#"{"name":"Lion","race":"cat","mod":"brave"}"#))
            .unwrap();
        let resp = send(&state, req).await;

        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["location"], "/pets/2");
        assert_eq!(
            state.store.get_pet(2).unwrap(),
            Pet::new(2, "Lion", "cat", "brave")
        );
    }

    #[tokio::test]
    async fn update_pet_with_plain_text_content_type_is_accepted() {
        let state = test_state();
        let req = Request::put("/pets/1")
            .header("content-type", "text/plain")
            .body(Body::from(r#"{"name":"a","race":"b","mod":"c"}"#))
            .unwrap();
        let resp = send(&state, req).await;

        assert_eq!(resp.status(), 200);
        assert_eq!(state.store.get_pet(1).unwrap(), Pet::new(1, "a", "b", "c"));
    }

    #[tokio::test]
    async fn unsupported_method_returns_400() {
        let state = test_state();
        let req = Request::patch("/pets/1").body(Body::empty()).unwrap();
        let resp = send(&state, req).await;

        assert_eq!(resp.status(), 400);
        assert_eq!(json_body(resp).await["error"], "bad request");
        assert_eq!(state.store.get_pet(1).unwrap(), Pet::new(1, "Fluffy", "dog", "happy"));
    }

    #[tokio::test]
    async fn create_pet_with_empty_fields_lists_every_problem() {
        let state = test_state();
        let body = serde_json::json!({ "name": "", "race": "" });
        let resp = send(&state, json_request("POST", "/pets", body)).await;

        assert_eq!(resp.status(), 422);
        let json = json_body(resp).await;
        assert_eq!(json["error"], "invalid resource");
        assert_eq!(
            json["message"],
            serde_json::json!([
                "pet name cannot be empty",
                "pet race cannot be empty",
                "pet mod cannot be empty"
            ])
        );
        assert_eq!(state.store.get_all_pets().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn create_pet_with_malformed_json_returns_422() {
        let state = test_state();
        let req = Request::post("/pets")
            .header("content-type", "application/json")
            .body(Body::from("{ not json"))
            .unwrap();
        let resp = send(&state, req).await;

        assert_eq!(resp.status(), 422);
        assert_eq!(json_body(resp).await["error"], "invalid resource");
    }

    #[tokio::test]
    async fn update_pet_reports_change_or_not_modified() {
        let state = test_state();
        let same = serde_json::json!({ "name": "Fluffy", "race": "dog", "mod": "happy" });
        let resp = send(&state, json_request("PUT", "/pets/1", same)).await;
        assert_eq!(resp.status(), 304);

        let changed = serde_json::json!({ "name": "a", "race": "b", "mod": "c" });
        let resp = send(&state, json_request("PUT", "/pets/1", changed)).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(state.store.get_pet(1).unwrap(), Pet::new(1, "a", "b", "c"));
    }

    #[tokio::test]
    async fn update_missing_pet_returns_404() {
        let state = test_state();
        let body = serde_json::json!({ "name": "a", "race": "b", "mod": "c" });
        let resp = send(&state, json_request("PUT", "/pets/8", body)).await;

        assert_eq!(resp.status(), 404);
    }

    #[tokio::test]
    async fn delete_pet_then_delete_again_returns_404() {
        let state = test_state();
        let resp = send(&state, Request::delete("/pets/1").body(Body::empty()).unwrap()).await;
        assert_eq!(resp.status(), 200);

        let resp = send(&state, Request::delete("/pets/1").body(Body::empty()).unwrap()).await;
        assert_eq!(resp.status(), 404);
    }

    #[tokio::test]
    async fn list_pets_returns_all_in_order() {
        let state = test_state();
        state.store.add_pet("Lion", "cat", "brave").unwrap();

        let resp = send(&state, Request::get("/pets").body(Body::empty()).unwrap()).await;
        assert_eq!(resp.status(), 200);
        let json = json_body(resp).await;
        let names: Vec<&str> = json
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Fluffy", "Lion"]);
    }
}

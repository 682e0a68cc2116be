// ABOUTME: End-to-end smoke test for the full petstore CRUD flow.
// ABOUTME: Resolves each default provider from the registry and drives it through the router.

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use http::Request;
use petstore_core::{Config, SqliteConfig, StoreConfig};
use petstore_server::{AppState, create_router};
use petstore_store::{PetStore, ProviderRegistry};
use tower::ServiceExt;

/// Helper to extract JSON body from a response.
async fn json_body(resp: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

async fn crud_lifecycle(store: Arc<dyn PetStore>) {
    store.open().unwrap();
    let state = Arc::new(AppState::new(Arc::clone(&store)));

    // 1. Empty store lists nothing
    let app = create_router(Arc::clone(&state));
    let resp = app
        .oneshot(Request::get("/pets").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(json_body(resp).await, serde_json::json!([]));

    // 2. Create two pets
    for (name, race, modifier, id) in [("Fluff", "dog", "happy", 1), ("Lion", "cat", "brave", 2)] {
        let app = create_router(Arc::clone(&state));
        let body = serde_json::json!({ "name": name, "race": race, "mod": modifier });
        let resp = app.oneshot(json_request("POST", "/pets", body)).await.unwrap();
        assert_eq!(resp.status(), 200, "create {name} should return 200");
        assert_eq!(resp.headers()["location"], format!("/pets/{}", id));
    }

    // 3. List returns both in id order
    let app = create_router(Arc::clone(&state));
    let resp = app
        .oneshot(Request::get("/pets").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(
        json_body(resp).await,
        serde_json::json!([
            { "id": 1, "name": "Fluff", "race": "dog", "mod": "happy" },
            { "id": 2, "name": "Lion", "race": "cat", "mod": "brave" }
        ])
    );

    // 4. Identical update is not a modification; a different one is
    let app = create_router(Arc::clone(&state));
    let same = serde_json::json!({ "name": "Fluff", "race": "dog", "mod": "happy" });
    let resp = app.oneshot(json_request("PUT", "/pets/1", same)).await.unwrap();
    assert_eq!(resp.status(), 304);

    let app = create_router(Arc::clone(&state));
    let changed = serde_json::json!({ "name": "a", "race": "b", "mod": "c" });
    let resp = app.oneshot(json_request("PUT", "/pets/1", changed)).await.unwrap();
    assert_eq!(resp.status(), 200);

    let app = create_router(Arc::clone(&state));
    let resp = app
        .oneshot(Request::get("/pets/1").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(
        json_body(resp).await,
        serde_json::json!({ "id": 1, "name": "a", "race": "b", "mod": "c" })
    );

    // 5. Delete, then the pet is gone
    let app = create_router(Arc::clone(&state));
    let resp = app
        .oneshot(Request::delete("/pets/2").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let app = create_router(Arc::clone(&state));
    let resp = app
        .oneshot(Request::get("/pets/2").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    store.close().unwrap();
}

#[tokio::test]
async fn smoke_test_in_memory_provider() {
    let registry = ProviderRegistry::with_defaults();
    let store = registry.resolve(&StoreConfig::named("in-memory")).unwrap();
    crud_lifecycle(store).await;
}

#[tokio::test]
async fn smoke_test_sqlite_provider() {
    let registry = ProviderRegistry::with_defaults();
    let cfg = StoreConfig {
        name: "sqlite".to_string(),
        sqlite: Some(SqliteConfig::in_memory()),
    };
    let store = registry.resolve(&cfg).unwrap();
    crud_lifecycle(store).await;
}

#[test]
fn shipped_configs_load_and_resolve() {
    let registry = ProviderRegistry::with_defaults();
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("config");

    for file in ["default.json", "sqlite.json"] {
        let config = Config::load(&root.join(file)).unwrap();
        assert!(
            registry.resolve(&config.store).is_ok(),
            "{file} should name a registered provider"
        );
    }
}

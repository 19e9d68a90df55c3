use credential_gate::api;
use credential_gate::application_impl::*;
use credential_gate::application_port::*;
use credential_gate::domain_port::*;
use credential_gate::infra_memory::MemoryDocumentStore;
use credential_gate::settings::Http;
use serde_json::{Value, json};
use std::sync::Arc;
use warp::http::StatusCode;

fn http_settings() -> Http {
    Http {
        address: "127.0.0.1:0".to_string(),
        static_dir: concat!(env!("CARGO_MANIFEST_DIR"), "/public").to_string(),
        views_dir: concat!(env!("CARGO_MANIFEST_DIR"), "/views").to_string(),
        cert_path: None,
        key_path: None,
    }
}

fn service_over(store: Arc<dyn DocumentStore>) -> Arc<RealCredentialService> {
    Arc::new(RealCredentialService::new(
        store,
        Arc::new(BcryptPasswordHasher::new(4).unwrap()),
        UserCollection::default(),
        Diagnostics::Quiet,
    ))
}

async fn post(
    service: Arc<dyn CredentialService>,
    path: &str,
    body: Value,
) -> (StatusCode, Value) {
    let app = api::app(service, http_settings());
    let res = warp::test::request()
        .method("POST")
        .path(path)
        .json(&body)
        .reply(&app)
        .await;
    let json = serde_json::from_slice(res.body()).unwrap();
    (res.status(), json)
}

async fn get(service: Arc<dyn CredentialService>, path: &str) -> (StatusCode, String) {
    let app = api::app(service, http_settings());
    let res = warp::test::request().method("GET").path(path).reply(&app).await;
    (res.status(), String::from_utf8_lossy(res.body()).into_owned())
}

struct DownStore;

#[async_trait::async_trait]
impl DocumentStore for DownStore {
    async fn find_one(
        &self,
        _collection: &str,
        _field: &str,
        _value: &str,
    ) -> Result<Option<Document>, DocumentStoreError> {
        Err(DocumentStoreError::Unavailable("connection refused".into()))
    }

    async fn insert(&self, _collection: &str, _fields: Fields) -> Result<String, DocumentStoreError> {
        Err(DocumentStoreError::Unavailable("connection refused".into()))
    }

    async fn update_fields(
        &self,
        _collection: &str,
        _id: &str,
        _fields: Fields,
    ) -> Result<(), DocumentStoreError> {
        Err(DocumentStoreError::Unavailable("connection refused".into()))
    }

    async fn list_all(&self, _collection: &str) -> Result<Vec<Document>, DocumentStoreError> {
        Err(DocumentStoreError::Unavailable("connection refused".into()))
    }
}

#[tokio::test]
async fn register_login_wrong_password_scenario() {
    let service = service_over(Arc::new(MemoryDocumentStore::new()));
    let creds = json!({ "username": "ana", "password": "12345" });

    let (status, body) = post(service.clone(), "/api/register", creds.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], json!(true));
    assert_eq!(body["user"]["username"], json!("ana"));
    let id = body["user"]["id"].as_str().unwrap().to_string();
    assert!(body["user"].get("password").is_none());

    let (status, body) = post(service.clone(), "/api/login", creds).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true, "user": { "id": id, "username": "ana" } }));

    let (status, body) = post(
        service,
        "/api/login",
        json!({ "username": "ana", "password": "wrong" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["ok"], json!(false));
}

#[tokio::test]
async fn duplicate_registration_is_conflict() {
    let service = service_over(Arc::new(MemoryDocumentStore::new()));

    let (status, _) = post(
        service.clone(),
        "/api/register",
        json!({ "username": "ana", "password": "12345" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post(
        service,
        "/api/register",
        json!({ "username": "ana", "password": "other" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["ok"], json!(false));
}

#[tokio::test]
async fn unknown_user_and_wrong_password_are_indistinguishable() {
    let service = service_over(Arc::new(MemoryDocumentStore::new()));
    post(
        service.clone(),
        "/api/register",
        json!({ "username": "ana", "password": "12345" }),
    )
    .await;

    let wrong = post(
        service.clone(),
        "/api/login",
        json!({ "username": "ana", "password": "nope" }),
    )
    .await;
    let unknown = post(
        service,
        "/api/login",
        json!({ "username": "nobody", "password": "nope" }),
    )
    .await;

    assert_eq!(wrong.0, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong, unknown);
}

#[tokio::test]
async fn missing_or_empty_fields_are_bad_requests() {
    let service = service_over(Arc::new(MemoryDocumentStore::new()));

    for body in [
        json!({}),
        json!({ "username": "ana" }),
        json!({ "password": "12345" }),
        json!({ "username": "", "password": "12345" }),
        json!({ "username": null, "password": "12345" }),
    ] {
        for path in ["/api/register", "/api/login"] {
            let (status, reply) = post(service.clone(), path, body.clone()).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{} {}", path, body);
            assert_eq!(reply["ok"], json!(false));
        }
    }
}

#[tokio::test]
async fn non_json_body_is_a_bad_request() {
    let service = service_over(Arc::new(MemoryDocumentStore::new()));
    let app = api::app(service, http_settings());

    let res = warp::test::request()
        .method("POST")
        .path("/api/login")
        .header("content-type", "application/json")
        .body("username=ana")
        .reply(&app)
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn legacy_plaintext_login_migrates_the_record() {
    let store = Arc::new(MemoryDocumentStore::new());
    let service = service_over(store.clone());
    store
        .insert(
            "users",
            json!({ "username": "user", "password": "12345" })
                .as_object()
                .cloned()
                .unwrap(),
        )
        .await
        .unwrap();
    let creds = json!({ "username": "user", "password": "12345" });

    let (status, body) = post(service.clone(), "/api/login", creds.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body.to_string().contains("12345"));
    service.settle().await;

    let doc = store.find_one("users", "username", "user").await.unwrap().unwrap();
    let migrated = doc.str_field("password").unwrap().to_string();
    assert!(migrated.starts_with("$2") && migrated.len() >= 60);

    let (status, _) = post(service.clone(), "/api/login", creds).await;
    assert_eq!(status, StatusCode::OK);
    service.settle().await;

    let doc = store.find_one("users", "username", "user").await.unwrap().unwrap();
    assert_eq!(doc.str_field("password"), Some(migrated.as_str()));
}

#[tokio::test]
async fn store_outage_is_service_unavailable() {
    let service = service_over(Arc::new(DownStore));
    let creds = json!({ "username": "ana", "password": "12345" });

    let (status, body) = post(service.clone(), "/api/login", creds.clone()).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(!body.to_string().contains("refused"));

    let (status, _) = post(service, "/api/register", creds).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn serves_views_and_assets() {
    let service = service_over(Arc::new(MemoryDocumentStore::new()));

    let (status, root) = get(service.clone(), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(root.contains("id=\"login\""));

    let (status, index) = get(service.clone(), "/index.html").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(index, root);

    let (status, inicio) = get(service.clone(), "/inicio.html").await;
    assert_eq!(status, StatusCode::OK);
    assert!(inicio.contains("Bienvenido"));

    let (status, css) = get(service, "/styles.css").await;
    assert_eq!(status, StatusCode::OK);
    assert!(css.contains("font-family"));
}

#[tokio::test]
async fn unmatched_paths_are_plain_404() {
    let service = service_over(Arc::new(MemoryDocumentStore::new()));

    for path in ["/nope", "/views/missing.html", "/api/login"] {
        let (status, body) = get(service.clone(), path).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", path);
        assert_eq!(body, "404 - No encontrado");
    }
}

fn assert_static<T: 'static>(_: &T) {}

#[tokio::test]
async fn app_does_not_borrow_its_settings() {
    let service = service_over(Arc::new(MemoryDocumentStore::new()));
    let app = {
        let http = http_settings();
        api::app(service, http)
    };
    assert_static(&app);

    let res = warp::test::request()
        .method("POST")
        .path("/api/register")
        .json(&json!({ "username": "ana", "password": "12345" }))
        .reply(&app)
        .await;
    assert_eq!(res.status(), StatusCode::OK);
}

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use reqwest::Url;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// 上传时收到的一个 multipart 字段
#[derive(Debug, Clone)]
pub struct UploadedPart {
    pub name: String,
    pub file_name: Option<String>,
    pub data: Vec<u8>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FakeOptions {
    /// 以 `{"ids": [...]}` 而不是数组返回上传结果
    pub wrap_ids: bool,
    /// 少返回一个 ID
    pub drop_last_id: bool,
    /// `/health` 在响应前等待的时间
    pub health_delay: Option<Duration>,
}

#[derive(Default)]
pub struct FakeState {
    pub options: FakeOptions,
    pub uploads: Vec<UploadedPart>,
    pub images: HashMap<String, Vec<u8>>,
    pub classes: HashMap<String, Value>,
    pub objects: Vec<Value>,
    pub queries: Vec<String>,
    pub captioned: Vec<Vec<u8>>,
}

type Shared = Arc<Mutex<FakeState>>;

/// 在本地端口上同时模拟图片服务、描述服务和 Weaviate
pub struct FakeServer {
    pub url: Url,
    pub state: Shared,
}

impl FakeServer {
    pub fn state(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }
}

pub async fn spawn(options: FakeOptions) -> FakeServer {
    let state: Shared = Arc::new(Mutex::new(FakeState { options, ..Default::default() }));

    let app = Router::new()
        .route("/health", get(health))
        .route("/upload_raw", post(upload_raw))
        .route("/fetch_jpg", get(fetch_jpg))
        .route("/fetch_png", get(fetch_png))
        .route("/fetch_raw", get(fetch_raw))
        .route("/near_text", get(near_text))
        .route("/model/predict", post(predict))
        .route("/v1/.well-known/live", get(|| async { StatusCode::OK }))
        .route("/v1/schema", post(create_class))
        .route("/v1/schema/{class}", get(get_class).delete(delete_class))
        .route("/v1/objects", post(create_object))
        .route("/v1/batch/objects", post(batch_create).delete(batch_delete))
        .route("/v1/graphql", post(graphql))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

    FakeServer { url: Url::parse(&format!("http://{}", addr)).unwrap(), state }
}

/// 只回应一次的原始 HTTP 服务，声明的 `content-length` 远大于实际正文
pub async fn inflated_length_url() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 4096];
        let _ = socket.read(&mut buf).await;
        let _ = socket
            .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 1000000000000000\r\n\r\nabc")
            .await;
        let _ = socket.shutdown().await;
    });
    Url::parse(&format!("http://{}", addr)).unwrap()
}

/// 一个没有服务监听的地址
pub async fn closed_url() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    Url::parse(&format!("http://{}", addr)).unwrap()
}

async fn health(State(state): State<Shared>) -> &'static str {
    let delay = state.lock().unwrap().options.health_delay;
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    "success"
}

async fn upload_raw(State(state): State<Shared>, mut multipart: Multipart) -> Response {
    let mut parts = vec![];
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let data = field.bytes().await.unwrap().to_vec();
        parts.push(UploadedPart { name, file_name, data });
    }

    let mut state = state.lock().unwrap();
    let mut ids = vec![];
    for part in parts {
        let id = format!("id-{}", state.images.len());
        state.images.insert(id.clone(), part.data.clone());
        state.uploads.push(part);
        ids.push(id);
    }
    if state.options.drop_last_id {
        ids.pop();
    }
    if state.options.wrap_ids {
        Json(json!({ "ids": ids })).into_response()
    } else {
        Json(json!(ids)).into_response()
    }
}

#[derive(Deserialize)]
struct FetchParams {
    id: String,
    width: Option<u32>,
    height: Option<u32>,
    quality: Option<u8>,
}

fn rendition(state: &Shared, params: &FetchParams, kind: &str) -> Response {
    let state = state.lock().unwrap();
    let Some(data) = state.images.get(&params.id) else {
        return (StatusCode::NOT_FOUND, "image with id not found").into_response();
    };
    let mut body = format!(
        "{}:{}x{}:q{}:",
        kind,
        params.width.unwrap_or(0),
        params.height.unwrap_or(0),
        params.quality.unwrap_or(0)
    )
    .into_bytes();
    body.extend_from_slice(data);
    ([(header::CONTENT_TYPE, format!("image/{}", kind))], body).into_response()
}

async fn fetch_jpg(State(state): State<Shared>, Query(params): Query<FetchParams>) -> Response {
    rendition(&state, &params, "jpeg")
}

async fn fetch_png(State(state): State<Shared>, Query(params): Query<FetchParams>) -> Response {
    rendition(&state, &params, "png")
}

async fn fetch_raw(State(state): State<Shared>, Query(params): Query<FetchParams>) -> Response {
    match state.lock().unwrap().images.get(&params.id) {
        Some(data) => data.clone().into_response(),
        None => (StatusCode::NOT_FOUND, "image with id not found").into_response(),
    }
}

async fn near_text(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    Json(json!({ "text": params.get("text") }))
}

async fn predict(State(state): State<Shared>, mut multipart: Multipart) -> Response {
    let mut image = None;
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("image") {
            image = Some(field.bytes().await.unwrap().to_vec());
        }
    }
    let Some(image) = image else {
        return (StatusCode::BAD_REQUEST, "missing image").into_response();
    };
    let caption = format!("a bird in a tree ({} bytes)", image.len());
    state.lock().unwrap().captioned.push(image);
    Json(json!({
        "status": "ok",
        "predictions": [
            { "index": "0", "caption": caption, "probability": 0.02 },
            { "index": "1", "caption": "a small bird .", "probability": 0.01 }
        ]
    }))
    .into_response()
}

async fn create_class(State(state): State<Shared>, Json(definition): Json<Value>) -> Response {
    let class = definition["class"].as_str().unwrap_or_default().to_string();
    let mut state = state.lock().unwrap();
    if state.classes.contains_key(&class) {
        let error = json!({ "error": [{ "message": format!("class name {} already exists", class) }] });
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(error)).into_response();
    }
    state.classes.insert(class, definition.clone());
    Json(definition).into_response()
}

async fn get_class(State(state): State<Shared>, Path(class): Path<String>) -> Response {
    match state.lock().unwrap().classes.get(&class) {
        Some(definition) => Json(definition.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn delete_class(State(state): State<Shared>, Path(class): Path<String>) -> Response {
    let mut state = state.lock().unwrap();
    if state.classes.remove(&class).is_none() {
        let error = json!({ "error": [{ "message": format!("could not find class {}", class) }] });
        return (StatusCode::BAD_REQUEST, Json(error)).into_response();
    }
    state.objects.retain(|o| o["class"] != class.as_str());
    StatusCode::OK.into_response()
}

fn insert_object(state: &mut FakeState, object: Value) -> Result<(), String> {
    let class = object["class"].as_str().unwrap_or_default();
    if !state.classes.contains_key(class) {
        return Err(format!("class {} not found", class));
    }
    if object["properties"]["image"].as_str().unwrap_or_default().is_empty() {
        return Err("image must not be empty".to_string());
    }
    state.objects.push(object);
    Ok(())
}

async fn create_object(State(state): State<Shared>, Json(object): Json<Value>) -> Response {
    let mut state = state.lock().unwrap();
    match insert_object(&mut state, object.clone()) {
        Ok(()) => Json(object).into_response(),
        Err(message) => {
            (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "error": [{ "message": message }] })))
                .into_response()
        }
    }
}

async fn batch_create(State(state): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    let mut state = state.lock().unwrap();
    let objects = body["objects"].as_array().cloned().unwrap_or_default();
    let results = objects
        .into_iter()
        .map(|object| {
            let id = object["id"].clone();
            match insert_object(&mut state, object) {
                Ok(()) => json!({ "id": id, "result": {} }),
                Err(message) => {
                    json!({ "id": id, "result": { "errors": { "error": [{ "message": message }] } } })
                }
            }
        })
        .collect::<Vec<_>>();
    Json(json!(results))
}

fn collect_ids(where_: &Value, ids: &mut Vec<String>) {
    if let Some(operands) = where_["operands"].as_array() {
        for operand in operands {
            collect_ids(operand, ids);
        }
    } else if let Some(id) = where_["valueText"].as_str().or(where_["valueString"].as_str()) {
        ids.push(id.to_string());
    }
}

async fn batch_delete(State(state): State<Shared>, body: Bytes) -> Json<Value> {
    let body: Value = serde_json::from_slice(&body).unwrap();
    let class = body["match"]["class"].as_str().unwrap_or_default().to_string();
    let mut ids = vec![];
    collect_ids(&body["match"]["where"], &mut ids);
    let dry_run = body["dryRun"].as_bool().unwrap_or(false);

    let mut state = state.lock().unwrap();
    let matches = |o: &Value| o["class"] == class.as_str() && ids.iter().any(|id| o["id"] == id.as_str());
    let count = state.objects.iter().filter(|o| matches(o)).count();
    if !dry_run {
        state.objects.retain(|o| !matches(o));
    }
    Json(json!({
        "match": body["match"],
        "dryRun": dry_run,
        "results": { "matches": count, "successful": if dry_run { 0 } else { count }, "failed": 0 }
    }))
}

async fn graphql(State(state): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    let query = body["query"].as_str().unwrap_or_default().to_string();
    let mut state = state.lock().unwrap();
    state.queries.push(query.clone());

    let Some(class) = state.classes.keys().find(|class| query.contains(&format!("{}(", class))).cloned()
    else {
        return Json(json!({ "data": null, "errors": [{ "message": "Cannot query field" }] }));
    };
    let with_image = query.contains(" image ");
    let hits = state
        .objects
        .iter()
        .filter(|o| o["class"] == class.as_str())
        .enumerate()
        .map(|(i, o)| {
            let mut hit = json!({ "_additional": { "certainty": 0.9 - 0.1 * i as f64, "id": o["id"] } });
            if with_image {
                hit["image"] = o["properties"]["image"].clone();
            }
            hit
        })
        .collect::<Vec<_>>();
    Json(json!({ "data": { "Get": { (class): hits } } }))
}

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{AppendHeaders, IntoResponse},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};

/// What the server saw of one request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    /// Header names are lower-case; repeated headers appear once per value.
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Echo {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    pub age: u32,
}

pub type Log = Arc<RwLock<Vec<Echo>>>;

pub fn app() -> Router {
    let log: Log = Arc::new(RwLock::new(Vec::new()));
    Router::new()
        .route("/echo", any(echo))
        .route("/echo/{*rest}", any(echo))
        .route("/requests", get(list_requests))
        .route("/people/{name}", get(person_json))
        .route("/xml/people/{name}", get(person_xml))
        .route("/multi", get(multi_header))
        .route("/status/{code}", any(status))
        .with_state(log)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn echo(State(log): State<Log>, method: Method, uri: Uri, headers: HeaderMap, body: String) -> Json<Echo> {
    let echo = Echo {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        headers: headers
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect(),
        body,
    };
    log.write().await.push(echo.clone());
    Json(echo)
}

async fn list_requests(State(log): State<Log>) -> Json<Vec<Echo>> {
    Json(log.read().await.clone())
}

fn person(name: String) -> Person {
    Person { name, age: 36 }
}

async fn person_json(Path(name): Path<String>) -> Json<Person> {
    Json(person(name))
}

async fn person_xml(Path(name): Path<String>) -> Result<impl IntoResponse, StatusCode> {
    let body = quick_xml::se::to_string(&person(name)).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(([(header::CONTENT_TYPE, "application/xml; charset=utf-8")], body))
}

async fn multi_header() -> impl IntoResponse {
    (
        AppendHeaders([("x-multi", "one"), ("x-multi", "two"), ("set-cookie", "a=1"), ("set-cookie", "b=2")]),
        "ok",
    )
}

async fn status(Path(code): Path<u16>) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST)
}

use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Echo, Person};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

// --- echo ---

#[tokio::test]
async fn echo_reports_method_path_query_headers_and_body() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/echo/items/7?page=2&q=a%20b")
                .header(http::header::CONTENT_TYPE, "application/x-www-form-encoded")
                .header("X-Api-Key", "secret")
                .body("name=Ada".to_string())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let echo: Echo = body_json(resp).await;
    assert_eq!(echo.method, "POST");
    assert_eq!(echo.path, "/echo/items/7");
    assert_eq!(echo.query.as_deref(), Some("page=2&q=a%20b"));
    assert_eq!(echo.header("content-type"), Some("application/x-www-form-encoded"));
    assert_eq!(echo.header("x-api-key"), Some("secret"));
    assert_eq!(echo.body, "name=Ada");
}

#[tokio::test]
async fn echo_accepts_non_standard_methods() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("made-up-method")
                .uri("/echo")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let echo: Echo = body_json(resp).await;
    assert_eq!(echo.method, "made-up-method");
    assert_eq!(echo.query, None);
}

#[tokio::test]
async fn requests_are_logged_in_order() {
    let app = app();
    app.clone().oneshot(get("/echo/first")).await.unwrap();
    app.clone().oneshot(get("/echo/second")).await.unwrap();

    let resp = app.oneshot(get("/requests")).await.unwrap();
    let log: Vec<Echo> = body_json(resp).await;
    let paths: Vec<&str> = log.iter().map(|echo| echo.path.as_str()).collect();
    assert_eq!(paths, vec!["/echo/first", "/echo/second"]);
}

// --- documents ---

#[tokio::test]
async fn person_is_served_as_json() {
    let resp = app().oneshot(get("/people/Ada")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[http::header::CONTENT_TYPE], "application/json");
    let person: Person = body_json(resp).await;
    assert_eq!(person.name, "Ada");
    assert_eq!(person.age, 36);
}

#[tokio::test]
async fn person_is_served_as_xml() {
    let resp = app().oneshot(get("/xml/people/Ada")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()[http::header::CONTENT_TYPE],
        "application/xml; charset=utf-8"
    );
    let body = body_bytes(resp).await;
    assert_eq!(&body[..], b"<Person><name>Ada</name><age>36</age></Person>");
}

#[tokio::test]
async fn xml_person_name_is_escaped() {
    let resp = app().oneshot(get("/xml/people/A%26B")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_bytes(resp).await;
    assert_eq!(&body[..], b"<Person><name>A&amp;B</name><age>36</age></Person>");
}

#[tokio::test]
async fn multi_valued_headers_are_sent_separately() {
    let resp = app().oneshot(get("/multi")).await.unwrap();

    let values: Vec<&str> = resp
        .headers()
        .get_all("x-multi")
        .iter()
        .map(|value| value.to_str().unwrap())
        .collect();
    assert_eq!(values, vec!["one", "two"]);
    assert_eq!(resp.headers().get_all(http::header::SET_COOKIE).iter().count(), 2);
}

// --- status ---

#[tokio::test]
async fn status_route_returns_requested_code() {
    let resp = app().oneshot(get("/status/404")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(body_bytes(resp).await.is_empty());
}

#[tokio::test]
async fn status_route_rejects_non_numeric_code() {
    let resp = app().oneshot(get("/status/teapot")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

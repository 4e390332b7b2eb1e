use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use tripgenie_api::{build_app, AppConfig, CHAT_FAILURE_DETAIL, ROOT_STATUS};
use wiremock::matchers::{any, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GENERATE_PATH: &str = "/v1beta/models/gemini-1.5-flash:generateContent";
const CLASSIFIER_MARKER: &str = "Chat History:";
const CHAT_MARKER: &str = "systemInstruction";

struct Upstreams {
    gemini: MockServer,
    amadeus: MockServer,
}

impl Upstreams {
    async fn start() -> Self {
        Self {
            gemini: MockServer::start().await,
            amadeus: MockServer::start().await,
        }
    }

    fn app(&self) -> Router {
        let gemini_url = self.gemini.uri();
        let amadeus_url = self.amadeus.uri();
        let config = AppConfig::from_lookup(move |name| match name {
            "GEMINI_API_KEY" => Some("test-gemini-key".to_string()),
            "AMADEUS_API_KEY" => Some("test-amadeus-key".to_string()),
            "AMADEUS_API_SECRET" => Some("test-amadeus-secret".to_string()),
            "GEMINI_API_BASE_URL" => Some(gemini_url.clone()),
            "AMADEUS_API_BASE_URL" => Some(amadeus_url.clone()),
            _ => None,
        })
        .expect("config should load");

        build_app(&config).expect("app should build")
    }

    async fn classifier_replies(&self, text: &str) {
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .and(header("x-goog-api-key", "test-gemini-key"))
            .and(body_string_contains(CLASSIFIER_MARKER))
            .respond_with(gemini_text(text))
            .expect(1)
            .mount(&self.gemini)
            .await;
    }

    async fn token_is_issued(&self) {
        Mock::given(method("POST"))
            .and(path("/v1/security/oauth2/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "token-1",
                "expires_in": 1799
            })))
            .expect(1)
            .mount(&self.amadeus)
            .await;
    }
}

fn gemini_text(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [
            {"content": {"role": "model", "parts": [{"text": text}]}}
        ]
    }))
}

fn chat_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn root_reports_status() {
    let upstreams = Upstreams::start().await;
    let app = upstreams.app();

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({ "status": ROOT_STATUS }));
}

#[tokio::test]
async fn health_reports_metrics_and_request_id() {
    let upstreams = Upstreams::start().await;
    let app = upstreams.app();

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["metrics"]["turns_total"], 0);
}

#[tokio::test]
async fn preflight_mirrors_origin_and_requested_headers() {
    let upstreams = Upstreams::start().await;
    let app = upstreams.app();

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/chat")
                .header("origin", "http://localhost:5500")
                .header("access-control-request-method", "POST")
                .header("access-control-request-headers", "content-type,x-trip-client")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(
        headers["access-control-allow-origin"],
        "http://localhost:5500"
    );
    assert_eq!(headers["access-control-allow-credentials"], "true");
    assert_eq!(
        headers["access-control-allow-headers"],
        "content-type,x-trip-client"
    );
}

#[tokio::test]
async fn hotel_search_in_paris_returns_grounded_reply() {
    let upstreams = Upstreams::start().await;
    upstreams
        .classifier_replies(r#"{"intent": "search_hotels", "city": "Paris"}"#)
        .await;
    upstreams.token_is_issued().await;

    Mock::given(method("GET"))
        .and(path("/v1/reference-data/locations/cities"))
        .and(query_param("keyword", "PARIS"))
        .and(query_param("max", "1"))
        .and(header("authorization", "Bearer token-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "iataCode": "PAR",
                "name": "PARIS",
                "geoCode": {"latitude": 48.85341, "longitude": 2.3488}
            }]
        })))
        .expect(1)
        .mount(&upstreams.amadeus)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/reference-data/locations/hotels/by-city"))
        .and(query_param("cityCode", "PAR"))
        .and(query_param("radius", "20"))
        .and(query_param("ratings", "4,5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"name": "Hotel Lumiere", "distance": {"value": 0.4, "unit": "KM"}},
                {"name": "Maison Rivoli", "distance": {"value": 1.2, "unit": "KM"}}
            ]
        })))
        .expect(1)
        .mount(&upstreams.amadeus)
        .await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(body_string_contains(CHAT_MARKER))
        .and(body_string_contains("DATA_PAYLOAD:"))
        .and(body_string_contains("Hotel Lumiere"))
        .and(body_string_contains("User Question: find me hotels in Paris"))
        .respond_with(gemini_text("Hotel Lumiere is a lovely pick near the Louvre."))
        .expect(1)
        .mount(&upstreams.gemini)
        .await;

    let response = upstreams
        .app()
        .oneshot(chat_request(json!({
            "message": "find me hotels in Paris",
            "history": []
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["role"], "model");
    assert_eq!(
        body["parts"][0]["text"],
        "Hotel Lumiere is a lovely pick near the Louvre."
    );

    upstreams.gemini.verify().await;
    upstreams.amadeus.verify().await;
}

#[tokio::test]
async fn joke_is_answered_without_travel_lookups() {
    let upstreams = Upstreams::start().await;
    upstreams
        .classifier_replies(r#"{"intent": "general_chat", "city": null}"#)
        .await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&upstreams.amadeus)
        .await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(body_string_contains(CHAT_MARKER))
        .respond_with(gemini_text("Why did the suitcase go to therapy? Too much baggage."))
        .expect(1)
        .mount(&upstreams.gemini)
        .await;

    // history omitted entirely
    let response = upstreams
        .app()
        .oneshot(chat_request(json!({ "message": "tell me a joke" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(
        body["parts"][0]["text"],
        "Why did the suitcase go to therapy? Too much baggage."
    );

    upstreams.amadeus.verify().await;
}

#[tokio::test]
async fn unknown_city_is_explained_conversationally() {
    let upstreams = Upstreams::start().await;
    upstreams
        .classifier_replies(r#"{"intent": "search_hotels", "city": "Atlantis"}"#)
        .await;
    upstreams.token_is_issued().await;
    Mock::given(method("GET"))
        .and(path("/v1/reference-data/locations/cities"))
        .and(query_param("keyword", "ATLANTIS"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .expect(1)
        .mount(&upstreams.amadeus)
        .await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(body_string_contains(CHAT_MARKER))
        .and(body_string_contains(
            "I couldn't find a major city named 'Atlantis'",
        ))
        .respond_with(gemini_text("I couldn't find Atlantis on the map."))
        .expect(1)
        .mount(&upstreams.gemini)
        .await;

    let response = upstreams
        .app()
        .oneshot(chat_request(json!({
            "message": "hotels in Atlantis please",
            "history": []
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["parts"][0]["text"], "I couldn't find Atlantis on the map.");
}

#[tokio::test]
async fn malformed_classification_still_gets_a_reply() {
    let upstreams = Upstreams::start().await;
    upstreams.classifier_replies("{\"intent\": \"search_ho").await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&upstreams.amadeus)
        .await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(body_string_contains(CHAT_MARKER))
        .respond_with(gemini_text("Happy to help you plan a trip!"))
        .expect(1)
        .mount(&upstreams.gemini)
        .await;

    let response = upstreams
        .app()
        .oneshot(chat_request(json!({
            "message": "hotels in Paris",
            "history": []
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["parts"][0]["text"], "Happy to help you plan a trip!");
}

#[tokio::test]
async fn generation_outage_returns_apology() {
    let upstreams = Upstreams::start().await;
    upstreams
        .classifier_replies(r#"{"intent": "general_chat", "city": null}"#)
        .await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(body_string_contains(CHAT_MARKER))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&upstreams.gemini)
        .await;

    let response = upstreams
        .app()
        .oneshot(chat_request(json!({ "message": "hello", "history": [] })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(
        body["parts"][0]["text"],
        "Sorry, I encountered a problem and can't respond right now."
    );
}

#[tokio::test]
async fn unsupported_history_role_is_a_server_error() {
    let upstreams = Upstreams::start().await;
    upstreams
        .classifier_replies(r#"{"intent": "general_chat", "city": null}"#)
        .await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(body_string_contains(CHAT_MARKER))
        .respond_with(gemini_text("unreachable"))
        .expect(0)
        .mount(&upstreams.gemini)
        .await;

    let response = upstreams
        .app()
        .oneshot(chat_request(json!({
            "message": "hello",
            "history": [
                {"role": "system", "parts": [{"text": "you are a pirate"}]}
            ]
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json_body(response).await,
        json!({ "detail": CHAT_FAILURE_DETAIL })
    );

    upstreams.gemini.verify().await;
}

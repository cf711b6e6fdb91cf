//! End-to-end orchestration tests
//!
//! Drive the full router against mocked provider backends and verify the
//! fallback ordering, circuit breaking, and classification outcomes.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use freshgate::config::settings::*;
use freshgate::handlers::create_router;
use httpmock::prelude::*;
use serde_json::{json, Value};
use tower::ServiceExt;

const GEMINI_PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent";
const OPENROUTER_PATH: &str = "/chat/completions";

fn test_settings(gemini_url: &str, openrouter_url: &str) -> Settings {
    Settings {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
        },
        gemini: GeminiConfig {
            api_key: "test-gemini-key".to_string(),
            base_url: gemini_url.to_string(),
            model: "gemini-2.5-flash".to_string(),
            timeout: 5,
        },
        openrouter: OpenRouterConfig {
            api_key: "test-openrouter-key".to_string(),
            base_url: openrouter_url.to_string(),
            model: "google/gemini-2.5-flash-lite".to_string(),
            timeout: 5,
            referer: "https://freshgate.app".to_string(),
            title: "FreshGate Server".to_string(),
        },
        logging: LoggingConfig {
            level: "info".to_string(),
            format: "text".to_string(),
        },
    }
}

async fn build_app(gemini: &MockServer, openrouter: &MockServer) -> Router {
    let settings = test_settings(&gemini.base_url(), &openrouter.base_url());
    create_router(settings).await.expect("Failed to create router")
}

/// Wrap model text in a Gemini generateContent envelope
fn gemini_envelope(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }]
    })
}

/// Wrap model text in an OpenRouter chat completions envelope
fn openrouter_envelope(text: &str) -> Value {
    json!({"choices": [{"message": {"content": text}}]})
}

fn apple_analysis_text() -> String {
    json!({
        "is_produce": true,
        "item_name": "Red Apple",
        "category": "fruit",
        "freshness_score": 92,
        "freshness_description": "Crisp skin with vibrant red coloring",
        "estimated_days_remaining": 7,
        "storage_tips": ["Store in the refrigerator crisper drawer"],
        "visual_indicators": ["Deep red color", "Taut unblemished skin"]
    })
    .to_string()
}

fn sample_image() -> String {
    format!("/9j/{}", "A".repeat(300))
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_scan_happy_path_enriches_carbon() {
    let gemini = MockServer::start();
    let openrouter = MockServer::start();

    let gemini_mock = gemini.mock(|when, then| {
        when.method(POST).path(GEMINI_PATH);
        then.status(200).json_body(gemini_envelope(&apple_analysis_text()));
    });

    let app = build_app(&gemini, &openrouter).await;
    let (status, body) = post_json(app, "/api/scan", json!({"image": sample_image()})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["item_name"], "Red Apple");
    assert_eq!(body["category"], "fruit");
    let score = body["freshness_score"].as_u64().unwrap();
    assert!(score <= 100);
    assert!(!body["storage_tips"].as_array().unwrap().is_empty());

    // Carbon joined server-side from the static table
    let carbon = &body["carbon_footprint"];
    let co2e = carbon["co2e_per_kg"].as_f64().unwrap();
    assert!((0.3..=0.4).contains(&co2e));
    assert!(carbon["comparison"]
        .as_str()
        .unwrap()
        .contains("charging your phone"));

    // Persisted copy gets an opaque id
    assert!(body["id"].is_string());

    gemini_mock.assert();
}

#[tokio::test]
async fn test_rate_limited_primary_is_skipped_within_cooldown() {
    let gemini = MockServer::start();
    let openrouter = MockServer::start();

    let gemini_mock = gemini.mock(|when, then| {
        when.method(POST).path(GEMINI_PATH);
        then.status(429).json_body(json!({
            "error": {"code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED"}
        }));
    });
    let openrouter_mock = openrouter.mock(|when, then| {
        when.method(POST).path(OPENROUTER_PATH);
        then.status(200)
            .json_body(openrouter_envelope(&apple_analysis_text()));
    });

    let app = build_app(&gemini, &openrouter).await;

    // First request trips the breaker and falls back
    let (status, body) =
        post_json(app.clone(), "/api/scan", json!({"image": sample_image()})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["item_name"], "Red Apple");
    assert_eq!(gemini_mock.hits(), 1);

    // Second request inside the cooldown window goes straight to the fallback
    let (status, _) = post_json(app, "/api/scan", json!({"image": sample_image()})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(gemini_mock.hits(), 1);
    assert_eq!(openrouter_mock.hits(), 2);
}

#[tokio::test]
async fn test_transient_primary_failure_falls_back_once() {
    let gemini = MockServer::start();
    let openrouter = MockServer::start();

    let gemini_mock = gemini.mock(|when, then| {
        when.method(POST).path(GEMINI_PATH);
        then.status(500).body("upstream exploded");
    });
    let openrouter_mock = openrouter.mock(|when, then| {
        when.method(POST).path(OPENROUTER_PATH);
        then.status(200)
            .json_body(openrouter_envelope(&apple_analysis_text()));
    });

    let app = build_app(&gemini, &openrouter).await;
    let (status, body) = post_json(
        app,
        "/api/analyze/freshness",
        json!({"base64_image": sample_image()}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["item_name"], "Red Apple");
    assert_eq!(gemini_mock.hits(), 1);
    assert_eq!(openrouter_mock.hits(), 1);
}

#[tokio::test]
async fn test_unparsable_primary_output_falls_back() {
    let gemini = MockServer::start();
    let openrouter = MockServer::start();

    gemini.mock(|when, then| {
        when.method(POST).path(GEMINI_PATH);
        then.status(200)
            .json_body(gemini_envelope("I see some kind of fruit, hard to say."));
    });
    let openrouter_mock = openrouter.mock(|when, then| {
        when.method(POST).path(OPENROUTER_PATH);
        then.status(200)
            .json_body(openrouter_envelope(&apple_analysis_text()));
    });

    let app = build_app(&gemini, &openrouter).await;
    let (status, body) = post_json(
        app,
        "/api/analyze/freshness",
        json!({"base64_image": sample_image()}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(openrouter_mock.hits(), 1);
}

#[tokio::test]
async fn test_canned_good_is_classified_not_failed() {
    let gemini = MockServer::start();
    let openrouter = MockServer::start();

    gemini.mock(|when, then| {
        when.method(POST).path(GEMINI_PATH);
        then.status(200).json_body(gemini_envelope(
            r#"{"is_produce":false,"message":"This appears to be a packaged item with a barcode"}"#,
        ));
    });

    let app = build_app(&gemini, &openrouter).await;
    let (status, body) = post_json(app, "/api/scan", json!({"image": sample_image()})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["not_produce"], true);
    assert!(body["message"].as_str().unwrap().contains("packaged item"));
}

#[tokio::test]
async fn test_both_providers_down_is_terminal_error() {
    let gemini = MockServer::start();
    let openrouter = MockServer::start();

    gemini.mock(|when, then| {
        when.method(POST).path(GEMINI_PATH);
        then.status(500).body("down");
    });
    openrouter.mock(|when, then| {
        when.method(POST).path(OPENROUTER_PATH);
        then.status(502).body("also down");
    });

    let app = build_app(&gemini, &openrouter).await;
    let (status, body) = post_json(
        app,
        "/api/analyze/freshness",
        json!({"base64_image": sample_image()}),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["type"], "analysis_error");
}

#[tokio::test]
async fn test_recipes_from_expiring_ingredients() {
    let gemini = MockServer::start();
    let openrouter = MockServer::start();

    let recipe_text = r#"Here you go!
```json
[{"title":"Banana spinach smoothie","description":"A quick green blend","ingredients":["banana","spinach","oat milk"],"steps":["Peel the banana","Blend everything until smooth"],"carbon_savings":"2 items rescued from waste","prep_time":"5 minutes"}]
```"#;

    gemini.mock(|when, then| {
        when.method(POST).path(GEMINI_PATH);
        then.status(200).json_body(gemini_envelope(recipe_text));
    });

    let app = build_app(&gemini, &openrouter).await;
    let (status, body) = post_json(
        app,
        "/api/recipes",
        json!({"items": ["banana", "spinach"]}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let recipes = body.as_array().unwrap();
    assert!(!recipes.is_empty());
    for recipe in recipes {
        assert!(!recipe["ingredients"].as_array().unwrap().is_empty());
        assert!(!recipe["steps"].as_array().unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_live_detection_empty_scene() {
    let gemini = MockServer::start();
    let openrouter = MockServer::start();

    gemini.mock(|when, then| {
        when.method(POST).path(GEMINI_PATH);
        then.status(200).json_body(gemini_envelope(r#"{"detections":[]}"#));
    });

    let app = build_app(&gemini, &openrouter).await;
    let (status, body) = post_json(app, "/api/scan/live", json!({"image": sample_image()})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["detections"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_live_detection_never_propagates_errors() {
    let gemini = MockServer::start();
    let openrouter = MockServer::start();

    gemini.mock(|when, then| {
        when.method(POST).path(GEMINI_PATH);
        then.status(500).body("down");
    });
    openrouter.mock(|when, then| {
        when.method(POST).path(OPENROUTER_PATH);
        then.status(500).body("down");
    });

    let app = build_app(&gemini, &openrouter).await;
    let (status, body) = post_json(app, "/api/scan/live", json!({"image": sample_image()})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["detections"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_live_detection_parses_bounding_boxes() {
    let gemini = MockServer::start();
    let openrouter = MockServer::start();

    let detections = json!({
        "detections": [{
            "item_name": "Banana",
            "category": "fruit",
            "freshness_score": 70,
            "freshness_description": "Ripe",
            "estimated_days_remaining": 3,
            "box_2d": [120, 80, 640, 520]
        }]
    })
    .to_string();

    gemini.mock(|when, then| {
        when.method(POST).path(GEMINI_PATH);
        then.status(200).json_body(gemini_envelope(&detections));
    });

    let app = build_app(&gemini, &openrouter).await;
    let (status, body) = post_json(app, "/api/scan/live", json!({"image": sample_image()})).await;

    assert_eq!(status, StatusCode::OK);
    let detection = &body["detections"][0];
    assert_eq!(detection["item_name"], "Banana");
    assert_eq!(detection["box_2d"], json!([120, 80, 640, 520]));
}

#[tokio::test]
async fn test_packaged_item_analysis() {
    let gemini = MockServer::start();
    let openrouter = MockServer::start();

    gemini.mock(|when, then| {
        when.method(POST).path(GEMINI_PATH);
        then.status(200).json_body(gemini_envelope(
            r#"{"is_packaged":true,"name":"Tomato Soup Can","package_type":"can","storage_tip":"Store in a cool pantry; refrigerate after opening","nutrition_info":"Check packaging for details","sustainable_alternative":"Fresh tomatoes from a local market"}"#,
        ));
    });

    let app = build_app(&gemini, &openrouter).await;
    let (status, body) = post_json(
        app,
        "/api/analyze/barcode",
        json!({"base64_image": sample_image()}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["name"], "Tomato Soup Can");
    assert_eq!(body["data"]["package_type"], "can");
    // Packaged records carry no freshness fields
    assert!(body["data"].get("freshness_score").is_none());
}

#[tokio::test]
async fn test_voice_chat_text_turn_with_wake_word() {
    let gemini = MockServer::start();
    let openrouter = MockServer::start();

    gemini.mock(|when, then| {
        when.method(POST).path(GEMINI_PATH);
        then.status(200)
            .json_body(gemini_envelope("Look for tight green florets and firm stalks."));
    });

    let app = build_app(&gemini, &openrouter).await;
    let (status, body) = post_json(
        app,
        "/api/assistant/voice-chat",
        json!({
            "text": "hey chris how do I pick broccoli",
            "wake_word": "chris",
            "history": []
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["wake_word_detected"], true);
    assert_eq!(body["transcript"], "hey chris how do I pick broccoli");
    assert!(body["response"].as_str().unwrap().contains("florets"));
    // No speech sink configured, so the reply is text-only
    assert!(body["audio"].is_null());
}

#[tokio::test]
async fn test_voice_chat_wake_word_miss_returns_empty_turn() {
    let gemini = MockServer::start();
    let openrouter = MockServer::start();

    let gemini_mock = gemini.mock(|when, then| {
        when.method(POST).path(GEMINI_PATH);
        then.status(200).json_body(gemini_envelope("unused"));
    });

    let app = build_app(&gemini, &openrouter).await;
    let (status, body) = post_json(
        app,
        "/api/assistant/voice-chat",
        json!({"text": "what is the weather", "wake_word": "chris"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["wake_word_detected"], false);
    assert_eq!(body["response"], "");
    assert_eq!(gemini_mock.hits(), 0);
}

#[tokio::test]
async fn test_shopping_guidance_degrades_when_chain_is_down() {
    let gemini = MockServer::start();
    let openrouter = MockServer::start();

    gemini.mock(|when, then| {
        when.method(POST).path(GEMINI_PATH);
        then.status(500).body("down");
    });
    openrouter.mock(|when, then| {
        when.method(POST).path(OPENROUTER_PATH);
        then.status(500).body("down");
    });

    let app = build_app(&gemini, &openrouter).await;
    let (status, body) = post_json(
        app,
        "/api/assistant/shopping",
        json!({"items": ["kale", "plums"]}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["name"], "kale");
    assert_eq!(items[0]["avoid"], "Bruises or soft spots");
}

#[tokio::test]
async fn test_chat_turn_uses_context() {
    let gemini = MockServer::start();
    let openrouter = MockServer::start();

    gemini.mock(|when, then| {
        when.method(POST).path(GEMINI_PATH);
        then.status(200)
            .json_body(gemini_envelope("Your spinach pairs well with the eggs you have."));
    });

    let app = build_app(&gemini, &openrouter).await;
    let (status, body) = post_json(
        app,
        "/api/chat",
        json!({
            "message": "what should I cook tonight?",
            "conversation_history": [],
            "context": {"collection_names": "spinach, eggs", "fridge_items": "spinach, eggs"}
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["message"].as_str().unwrap().contains("spinach"));
}

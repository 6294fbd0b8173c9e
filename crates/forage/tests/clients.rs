//! Wire-level tests against mock services.

use forage::{AssetStore, AudioFetcher, ForageError, GenerationClient};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn pack_payload() -> serde_json::Value {
    json!({
        "status": "success",
        "data": [
            {
                "name": "River",
                "type": "LOOP",
                "variations": [
                    "https://cdn.example/river_155.wav",
                    "https://cdn.example/river_255.wav"
                ],
                "metadata": {
                    "name": "River",
                    "type": "LOOP",
                    "start": 0,
                    "duration": 10,
                    "audio_prompt": "slow water over stones"
                }
            },
            {
                "name": "Heron",
                "type": "EMITTER",
                "variations": ["https://cdn.example/heron_155.wav"],
                "metadata": {"start": 3.5, "duration": 2}
            }
        ]
    })
}

#[tokio::test]
async fn request_asset_pack_sends_request_and_parses_events() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/process"))
        .and(body_json(json!({
            "video_url": "https://store.example/clip.mp4",
            "user_prompt": "riverbank at dawn"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(pack_payload()))
        .expect(1)
        .mount(&server)
        .await;

    let client = GenerationClient::new(&server.uri());
    let events = client
        .request_asset_pack("https://store.example/clip.mp4", "riverbank at dawn")
        .await
        .unwrap();

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].name, "River");
    assert!(events[0].kind.is_loop());
    assert_eq!(events[1].timing.start, 3.5);
}

#[tokio::test]
async fn request_asset_pack_surfaces_http_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/process"))
        .respond_with(ResponseTemplate::new(500).set_body_string("exploded"))
        .mount(&server)
        .await;

    let client = GenerationClient::new(&server.uri());
    let err = client
        .request_asset_pack("https://store.example/clip.mp4", "anything")
        .await
        .unwrap_err();

    match err {
        ForageError::Http { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "exploded");
        }
        other => panic!("expected Http error, got {other:?}"),
    }
}

#[tokio::test]
async fn request_asset_pack_rejects_failure_status_in_200() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/process"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"status": "error", "data": null})),
        )
        .mount(&server)
        .await;

    let client = GenerationClient::new(&server.uri());
    let err = client
        .request_asset_pack("https://store.example/clip.mp4", "anything")
        .await
        .unwrap_err();

    assert!(matches!(err, ForageError::Generation(status) if status == "error"));
}

#[tokio::test]
async fn request_asset_pack_rejects_garbage_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/process"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json at all"))
        .mount(&server)
        .await;

    let client = GenerationClient::new(&server.uri());
    let err = client
        .request_asset_pack("https://store.example/clip.mp4", "anything")
        .await
        .unwrap_err();

    assert!(matches!(err, ForageError::Protocol(_)));
}

#[tokio::test]
async fn upload_video_posts_bytes_and_returns_url() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload"))
        .and(header("content-type", "application/octet-stream"))
        .and(header("x-file-name", "clip.mp4"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"url": "https://store.example/clip.mp4"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let video = dir.path().join("clip.mp4");
    std::fs::write(&video, b"fake mp4 bytes").unwrap();

    let store = AssetStore::new(&server.uri());
    let url = store.upload_video(&video).await.unwrap();
    assert_eq!(url, "https://store.example/clip.mp4");
}

#[tokio::test]
async fn upload_missing_file_fails_before_any_request() {
    let server = MockServer::start().await;
    // No mock mounted: a request would 404 and fail differently.

    let store = AssetStore::new(&server.uri());
    let err = store
        .upload_video(std::path::Path::new("/nonexistent/clip.mp4"))
        .await
        .unwrap_err();

    assert!(matches!(err, ForageError::Io { .. }));
}

#[tokio::test]
async fn fetch_returns_body_bytes() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/audio/wind.wav"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"RIFFdata".to_vec()))
        .mount(&server)
        .await;

    let fetcher = AudioFetcher::new();
    let bytes = fetcher
        .fetch(&format!("{}/audio/wind.wav", server.uri()))
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"RIFFdata");
}

#[tokio::test]
async fn fetch_missing_audio_is_http_error() {
    let server = MockServer::start().await;

    let fetcher = AudioFetcher::new();
    let err = fetcher
        .fetch(&format!("{}/audio/gone.wav", server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(err, ForageError::Http { status: 404, .. }));
}

//! End-to-end runs of the understory binary against mock services.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn understory() -> Command {
    Command::cargo_bin("understory").unwrap()
}

/// Write a session manifest the way `generate` would.
fn write_session(
    path: &Path,
    video_url: &str,
    duration_secs: Option<f64>,
    events: serde_json::Value,
    selections: serde_json::Value,
) {
    let manifest = json!({
        "session_id": "5f8b0f2e-7f3a-4e46-9f11-9a51be2a7b63",
        "created_at": "2026-08-22T10:00:00Z",
        "video_url": video_url,
        "video_duration_secs": duration_secs,
        "prompt": "mystical forest with wind and birds",
        "events": events,
        "selections": selections,
    });
    std::fs::write(path, serde_json::to_string_pretty(&manifest).unwrap()).unwrap();
}

fn two_event_session(path: &Path, server_uri: &str, complete: bool) {
    let events = json!([
        {
            "name": "Wind",
            "type": "LOOP",
            "variations": [
                format!("{server_uri}/audio/wind_0.wav"),
                format!("{server_uri}/audio/wind_1.wav"),
            ],
            "metadata": { "start": 0.0, "duration": 0.2 }
        },
        {
            "name": "Door",
            "type": "EMITTER",
            "variations": [format!("{server_uri}/audio/door_0.wav")],
            "metadata": { "start": 0.2, "duration": 0.2 }
        }
    ]);
    let selections = if complete {
        json!({
            "Wind": format!("{server_uri}/audio/wind_0.wav"),
            "Door": format!("{server_uri}/audio/door_0.wav"),
        })
    } else {
        json!({ "Wind": format!("{server_uri}/audio/wind_0.wav") })
    };
    write_session(path, &format!("{server_uri}/clip.mp4"), Some(1.0), events, selections);
}

async fn serve_audio(server: &MockServer, route: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"RIFFfake".as_slice()))
        .mount(server)
        .await;
}

#[test]
fn landing_screen_without_a_subcommand() {
    understory()
        .assert()
        .success()
        .stdout(predicate::str::contains("Game Audio Asset Pack Generator"))
        .stdout(predicate::str::contains("QUICKSTART"));
}

#[tokio::test]
async fn generate_creates_a_session_from_mock_services() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "url": format!("{}/videos/clip.mp4", server.uri())
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/process"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "data": [
                {
                    "name": "Wind",
                    "type": "LOOP",
                    "variations": ["http://cdn.test/wind_0.wav", "http://cdn.test/wind_1.wav"],
                    "metadata": { "start": 0.0, "duration": 10.0 }
                },
                {
                    "name": "Door Slam",
                    "type": "EMITTER",
                    "variations": ["http://cdn.test/door_0.wav"],
                    "metadata": { "start": 4.5, "duration": 2.0 }
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let video = dir.path().join("clip.mp4");
    std::fs::write(&video, b"not really an mp4").unwrap();
    let session = dir.path().join("session.json");

    understory()
        .env("UNDERSTORY_GENERATION_URL", server.uri())
        .env("UNDERSTORY_ASSET_STORE_URL", server.uri())
        .arg("--session")
        .arg(&session)
        .arg("generate")
        .arg("--video")
        .arg(&video)
        .arg("--prompt")
        .arg("mystical forest with wind and birds")
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated"))
        .stdout(predicate::str::contains("Wind"))
        .stdout(predicate::str::contains("Door Slam"))
        .stdout(predicate::str::contains("ready to export"));

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&session).unwrap()).unwrap();
    assert_eq!(saved["selections"]["Wind"], "http://cdn.test/wind_0.wav");
    assert_eq!(saved["selections"]["Door Slam"], "http://cdn.test/door_0.wav");
    // Junk bytes probe as no duration.
    assert!(saved["video_duration_secs"].is_null());
}

#[test]
fn generate_requires_an_existing_video() {
    let dir = tempfile::tempdir().unwrap();

    understory()
        .arg("--session")
        .arg(dir.path().join("session.json"))
        .arg("generate")
        .arg("--video")
        .arg(dir.path().join("missing.mp4"))
        .arg("--prompt")
        .arg("forest")
        .assert()
        .failure()
        .stderr(predicate::str::contains("video file not found"));
}

#[test]
fn generate_rejects_a_blank_prompt() {
    let dir = tempfile::tempdir().unwrap();
    let video = dir.path().join("clip.mp4");
    std::fs::write(&video, b"x").unwrap();

    understory()
        .arg("--session")
        .arg(dir.path().join("session.json"))
        .arg("generate")
        .arg("--video")
        .arg(&video)
        .arg("--prompt")
        .arg("   ")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Please provide both a video and a prompt",
        ));
}

#[tokio::test]
async fn generate_surfaces_a_failure_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "url": format!("{}/videos/clip.mp4", server.uri()) })),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/process"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "status": "error", "data": null })),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let video = dir.path().join("clip.mp4");
    std::fs::write(&video, b"x").unwrap();

    understory()
        .env("UNDERSTORY_GENERATION_URL", server.uri())
        .env("UNDERSTORY_ASSET_STORE_URL", server.uri())
        .arg("--session")
        .arg(dir.path().join("session.json"))
        .arg("generate")
        .arg("--video")
        .arg(&video)
        .arg("--prompt")
        .arg("forest")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error processing video"));
}

#[test]
fn events_without_a_session_points_at_generate() {
    let dir = tempfile::tempdir().unwrap();

    understory()
        .arg("--session")
        .arg(dir.path().join("nope.json"))
        .arg("events")
        .assert()
        .failure()
        .stderr(predicate::str::contains("understory generate"));
}

#[test]
fn events_lists_the_pack_and_its_gaps() {
    let dir = tempfile::tempdir().unwrap();
    let session = dir.path().join("session.json");
    two_event_session(&session, "http://cdn.test", false);

    understory()
        .arg("--session")
        .arg(&session)
        .arg("events")
        .assert()
        .success()
        .stdout(predicate::str::contains("Wind"))
        .stdout(predicate::str::contains("Door"))
        .stdout(predicate::str::contains("no selection"))
        .stdout(predicate::str::contains("pack export needs one per event"));
}

#[test]
fn select_updates_the_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let session = dir.path().join("session.json");
    two_event_session(&session, "http://cdn.test", true);

    understory()
        .arg("--session")
        .arg(&session)
        .arg("select")
        .arg("Wind")
        .arg("2")
        .assert()
        .success()
        .stdout(predicate::str::contains("Selected"));

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&session).unwrap()).unwrap();
    assert_eq!(saved["selections"]["Wind"], "http://cdn.test/audio/wind_1.wav");
}

#[test]
fn select_rejects_an_out_of_range_variation() {
    let dir = tempfile::tempdir().unwrap();
    let session = dir.path().join("session.json");
    two_event_session(&session, "http://cdn.test", true);

    understory()
        .arg("--session")
        .arg(&session)
        .arg("select")
        .arg("Wind")
        .arg("9")
        .assert()
        .failure()
        .stderr(predicate::str::contains("available"));
}

#[test]
fn select_names_the_known_events_on_a_typo() {
    let dir = tempfile::tempdir().unwrap();
    let session = dir.path().join("session.json");
    two_event_session(&session, "http://cdn.test", true);

    understory()
        .arg("--session")
        .arg(&session)
        .arg("select")
        .arg("Wimd")
        .arg("1")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no event named 'Wimd'"))
        .stderr(predicate::str::contains("Wind"));
}

#[test]
fn deselect_blocks_the_pack_export() {
    let dir = tempfile::tempdir().unwrap();
    let session = dir.path().join("session.json");
    two_event_session(&session, "http://cdn.test", true);

    understory()
        .arg("--session")
        .arg(&session)
        .arg("deselect")
        .arg("Door")
        .assert()
        .success()
        .stdout(predicate::str::contains("Still unselected: Door"));

    understory()
        .arg("--session")
        .arg(&session)
        .arg("export")
        .arg("--out")
        .arg(dir.path().join("pack"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Still unselected: Door"));
}

#[tokio::test]
async fn export_writes_the_pack() {
    let server = MockServer::start().await;
    serve_audio(&server, "/audio/wind_0.wav").await;
    serve_audio(&server, "/audio/door_0.wav").await;

    let dir = tempfile::tempdir().unwrap();
    let session = dir.path().join("session.json");
    two_event_session(&session, &server.uri(), true);
    let out = dir.path().join("pack");

    understory()
        .arg("--session")
        .arg(&session)
        .arg("export")
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Pack ready"));

    assert_eq!(std::fs::read(out.join("Wind_LOOP.wav")).unwrap(), b"RIFFfake");
    assert_eq!(std::fs::read(out.join("Door_EMITTER.wav")).unwrap(), b"RIFFfake");
}

#[tokio::test]
async fn export_continues_past_a_dead_url() {
    let server = MockServer::start().await;
    serve_audio(&server, "/audio/wind_0.wav").await;
    // door_0.wav is not mounted; the store answers 404.

    let dir = tempfile::tempdir().unwrap();
    let session = dir.path().join("session.json");
    two_event_session(&session, &server.uri(), true);
    let out = dir.path().join("pack");

    understory()
        .arg("--session")
        .arg(&session)
        .arg("export")
        .arg("--out")
        .arg(&out)
        .assert()
        .failure()
        .stdout(predicate::str::contains("Wind_LOOP.wav"))
        .stdout(predicate::str::contains("Door_EMITTER.wav"))
        .stderr(predicate::str::contains("failed to export"));

    assert!(out.join("Wind_LOOP.wav").exists());
    assert!(!out.join("Door_EMITTER.wav").exists());
}

#[tokio::test]
async fn download_ignores_the_selection_gate() {
    let server = MockServer::start().await;
    serve_audio(&server, "/audio/wind_1.wav").await;

    let dir = tempfile::tempdir().unwrap();
    let session = dir.path().join("session.json");
    // Wind selected, Door not: the pack is incomplete but downloads still work.
    two_event_session(&session, &server.uri(), false);
    let out = dir.path().join("downloads");

    understory()
        .arg("--session")
        .arg(&session)
        .arg("download")
        .arg("Wind")
        .arg("2")
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wind_variation_2.wav"));

    assert_eq!(
        std::fs::read(out.join("Wind_variation_2.wav")).unwrap(),
        b"RIFFfake"
    );
}

#[test]
fn play_requires_complete_selections() {
    let dir = tempfile::tempdir().unwrap();
    let session = dir.path().join("session.json");
    two_event_session(&session, "http://cdn.test", false);

    understory()
        .arg("--session")
        .arg(&session)
        .arg("play")
        .arg("--mute")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Please select one variation for each event",
        ));
}

#[test]
fn play_without_a_session_points_at_generate() {
    let dir = tempfile::tempdir().unwrap();

    understory()
        .arg("--session")
        .arg(dir.path().join("nope.json"))
        .arg("play")
        .arg("--mute")
        .assert()
        .failure()
        .stderr(predicate::str::contains("understory generate"));
}

#[tokio::test]
async fn play_mute_runs_to_the_end_of_the_video() {
    let server = MockServer::start().await;
    serve_audio(&server, "/audio/wind_0.wav").await;
    serve_audio(&server, "/audio/door_0.wav").await;

    let dir = tempfile::tempdir().unwrap();
    let session = dir.path().join("session.json");
    two_event_session(&session, &server.uri(), true);

    understory()
        .arg("--session")
        .arg(&session)
        .arg("play")
        .arg("--mute")
        .timeout(std::time::Duration::from_secs(30))
        .assert()
        .success()
        .stdout(predicate::str::contains("Playing"))
        .stdout(predicate::str::contains("Reached the end of the video"));
}

#[tokio::test]
async fn audition_mute_plays_the_selected_variation() {
    let server = MockServer::start().await;
    serve_audio(&server, "/audio/wind_0.wav").await;

    let dir = tempfile::tempdir().unwrap();
    let session = dir.path().join("session.json");
    two_event_session(&session, &server.uri(), true);

    understory()
        .arg("--session")
        .arg(&session)
        .arg("audition")
        .arg("Wind")
        .arg("--mute")
        .timeout(std::time::Duration::from_secs(30))
        .assert()
        .success()
        .stdout(predicate::str::contains("Wind"))
        .stdout(predicate::str::contains("variation 1"));
}

#[test]
fn audition_without_a_selection_asks_for_a_number() {
    let dir = tempfile::tempdir().unwrap();
    let session = dir.path().join("session.json");
    two_event_session(&session, "http://cdn.test", false);

    understory()
        .arg("--session")
        .arg(&session)
        .arg("audition")
        .arg("Door")
        .arg("--mute")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no selected variation"));
}

#[tokio::test]
async fn preview_mute_stops_after_the_event_window() {
    let server = MockServer::start().await;
    serve_audio(&server, "/audio/wind_0.wav").await;

    let dir = tempfile::tempdir().unwrap();
    let session = dir.path().join("session.json");
    two_event_session(&session, &server.uri(), true);

    understory()
        .arg("--session")
        .arg(&session)
        .arg("preview")
        .arg("Wind")
        .arg("--mute")
        .timeout(std::time::Duration::from_secs(30))
        .assert()
        .success()
        .stdout(predicate::str::contains("Preview"));
}

#[test]
fn preview_requires_a_selection() {
    let dir = tempfile::tempdir().unwrap();
    let session = dir.path().join("session.json");
    two_event_session(&session, "http://cdn.test", false);

    understory()
        .arg("--session")
        .arg(&session)
        .arg("preview")
        .arg("Door")
        .arg("--mute")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Please select a variation for this event first",
        ));
}

//! Export queue behavior against a real HTTP server.

use std::time::{Duration, Instant};

use forage::AudioFetcher;
use packrat::{ExportItem, ExportQueue};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn item(file_name: &str, url: String) -> ExportItem {
    ExportItem {
        file_name: file_name.to_string(),
        url,
    }
}

async fn serve_wav(server: &MockServer, route: &str, body: &'static [u8]) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn a_clean_run_writes_every_file() {
    let server = MockServer::start().await;
    serve_wav(&server, "/wind.wav", b"RIFFwind").await;
    serve_wav(&server, "/door.wav", b"RIFFdoor").await;

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("pack");
    let queue = ExportQueue::new(AudioFetcher::new(), Duration::ZERO);

    let report = queue
        .run(
            vec![
                item("Wind_LOOP.wav", format!("{}/wind.wav", server.uri())),
                item("Door_EMITTER.wav", format!("{}/door.wav", server.uri())),
            ],
            &dest,
        )
        .await
        .unwrap();

    assert!(report.is_clean());
    assert_eq!(report.saved.len(), 2);
    assert_eq!(std::fs::read(dest.join("Wind_LOOP.wav")).unwrap(), b"RIFFwind");
    assert_eq!(std::fs::read(dest.join("Door_EMITTER.wav")).unwrap(), b"RIFFdoor");
}

#[tokio::test]
async fn a_dead_url_does_not_sink_the_rest() {
    let server = MockServer::start().await;
    serve_wav(&server, "/first.wav", b"RIFF1").await;
    serve_wav(&server, "/third.wav", b"RIFF3").await;
    // /gone.wav is not mounted, so the store answers 404.

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("pack");
    let queue = ExportQueue::new(AudioFetcher::new(), Duration::ZERO);

    let report = queue
        .run(
            vec![
                item("First_LOOP.wav", format!("{}/first.wav", server.uri())),
                item("Gone_EMITTER.wav", format!("{}/gone.wav", server.uri())),
                item("Third_LOOP.wav", format!("{}/third.wav", server.uri())),
            ],
            &dest,
        )
        .await
        .unwrap();

    assert!(!report.is_clean());
    assert_eq!(report.saved.len(), 2);
    assert!(dest.join("First_LOOP.wav").exists());
    assert!(dest.join("Third_LOOP.wav").exists());
    assert!(!dest.join("Gone_EMITTER.wav").exists());

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].file_name, "Gone_EMITTER.wav");
    assert!(report.failures[0].reason.contains("404"));
}

#[tokio::test]
async fn items_are_spaced_by_the_configured_delay() {
    let server = MockServer::start().await;
    serve_wav(&server, "/a.wav", b"RIFFa").await;

    let dir = tempfile::tempdir().unwrap();
    let queue = ExportQueue::new(AudioFetcher::new(), Duration::from_millis(50));

    let started = Instant::now();
    let report = queue
        .run(
            vec![
                item("a1.wav", format!("{}/a.wav", server.uri())),
                item("a2.wav", format!("{}/a.wav", server.uri())),
                item("a3.wav", format!("{}/a.wav", server.uri())),
            ],
            dir.path(),
        )
        .await
        .unwrap();

    // Two gaps of 50ms each; sleeps never finish early.
    assert!(started.elapsed() >= Duration::from_millis(100));
    assert!(report.is_clean());
}

#[tokio::test]
async fn nested_output_directories_are_created() {
    let server = MockServer::start().await;
    serve_wav(&server, "/a.wav", b"RIFFa").await;

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("out").join("pack");
    let queue = ExportQueue::new(AudioFetcher::new(), Duration::ZERO);

    let report = queue
        .run(vec![item("a.wav", format!("{}/a.wav", server.uri()))], &dest)
        .await
        .unwrap();

    assert!(report.is_clean());
    assert!(dest.join("a.wav").exists());
}

#[tokio::test]
async fn unusable_output_directory_aborts_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("pack");
    std::fs::write(&blocker, b"not a directory").unwrap();

    let queue = ExportQueue::new(AudioFetcher::new(), Duration::ZERO);
    let err = queue
        .run(vec![item("a.wav", "http://unused".to_string())], &blocker)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("output directory"));
}

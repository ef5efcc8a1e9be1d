//! Full-run tests: a temp directory of equation files, a real TCP
//! listener standing in for the solver server, and a complete
//! discover-dispatch-send cycle in between.

use equsend::config::Settings;
use equsend::network::protocol::{FrameHeader, HEADER_SIZE};
use equsend::service::EqusendClient;
use equsend::EqusendError;
use std::collections::HashMap;
use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;

fn settings_for(port: u16) -> Settings {
    let mut settings = Settings::default();
    settings.network.port = port;
    settings.network.timeout_seconds = 5;
    settings.transfer.workers = 4;
    settings
}

/// Accept `count` connections and return each frame's payload keyed by
/// the name declared in its header.
async fn receive_frames(listener: TcpListener, count: usize) -> HashMap<String, Vec<u8>> {
    let mut frames = HashMap::new();
    for _ in 0..count {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut bytes = Vec::new();
        socket.read_to_end(&mut bytes).await.unwrap();

        let header = FrameHeader::decode(&bytes).unwrap();
        let name = header.name().unwrap().to_string();
        let payload = bytes[HEADER_SIZE..].to_vec();
        assert_eq!(payload.len() as u64, header.payload_len());
        frames.insert(name, payload);
    }
    frames
}

#[tokio::test]
async fn run_sends_every_file_exactly_once() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let dir = tempfile::tempdir().unwrap();
    let mut expected = HashMap::new();
    for i in 0..10 {
        let name = format!("set_{:02}.equ", i);
        let payload = format!("{} + {} =", i, i * 3).into_bytes();
        fs::write(dir.path().join(&name), &payload).unwrap();
        expected.insert(name, payload);
    }
    // Non-matching entries must not be picked up.
    fs::write(dir.path().join("readme.txt"), b"no").unwrap();

    let server = tokio::spawn(receive_frames(listener, 10));

    let client = EqusendClient::new(settings_for(port));
    let report = client.run(dir.path()).await.unwrap();

    assert!(report.is_success());
    assert_eq!(report.sent_count(), 10);
    assert_eq!(report.failed_count(), 0);

    let frames = server.await.unwrap();
    assert_eq!(frames, expected);
}

#[tokio::test]
async fn run_single_file_frame_layout() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.equ"), b"0123456789").unwrap();

    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut bytes = Vec::new();
        socket.read_to_end(&mut bytes).await.unwrap();
        bytes
    });

    let client = EqusendClient::new(settings_for(port));
    let report = client.run(dir.path()).await.unwrap();
    assert!(report.is_success());

    let bytes = server.await.unwrap();
    assert_eq!(bytes.len(), 58);

    let header = FrameHeader::decode(&bytes).unwrap();
    assert_eq!(header.header_size, 48);
    assert_eq!(header.name_length, 5);
    assert_eq!(header.stream_size, 15);
    assert_eq!(header.name().unwrap(), "a.equ");
    assert!(header.name_field[5..].iter().all(|&b| b == 0));
    assert_eq!(&bytes[48..], b"0123456789");
}

#[tokio::test]
async fn oversized_name_fails_that_file_only() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("ok.equ"), b"1+1").unwrap();
    // 21-char stem plus ".equ" puts the name at 25 bytes.
    fs::write(dir.path().join("abcdefghijklmnopqrstu.equ"), b"2+2").unwrap();

    let server = tokio::spawn(receive_frames(listener, 1));

    let client = EqusendClient::new(settings_for(port));
    let report = client.run(dir.path()).await.unwrap();

    assert!(!report.is_success());
    assert_eq!(report.sent_count(), 1);
    assert_eq!(report.failed_count(), 1);

    let failed = report.outcomes.iter().find(|o| !o.is_ok()).unwrap();
    assert!(matches!(
        failed.error,
        Some(EqusendError::NameTooLong { len: 25, .. })
    ));

    let frames = server.await.unwrap();
    assert_eq!(frames["ok.equ"], b"1+1");
}

#[tokio::test]
async fn empty_input_dir_fails_without_connecting() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let connections = Arc::new(AtomicUsize::new(0));
    let counter = connections.clone();
    tokio::spawn(async move {
        loop {
            let _ = listener.accept().await;
            counter.fetch_add(1, Ordering::SeqCst);
        }
    });

    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("not_an_equation.txt"), b"x").unwrap();

    let client = EqusendClient::new(settings_for(port));
    let err = client.run(dir.path()).await.unwrap_err();

    assert!(matches!(err, EqusendError::NoInputFiles(_)));
    assert_eq!(connections.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_input_dir_is_discovery_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent");

    let client = EqusendClient::new(settings_for(1));
    let err = client.run(&missing).await.unwrap_err();
    assert!(matches!(err, EqusendError::Discovery(_)));
}

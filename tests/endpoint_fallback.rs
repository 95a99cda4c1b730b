//! Endpoint fallback tests - one run across several candidate addresses.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};

use veles::config::{Config, IdentityConfig};
use veles::error::{Error, ProtocolError};
use veles::wire::{
    compute_checksum, FrameHeader, LoginRequest, LoginResponse, LogoutRequest, LogoutResponse,
    SubmissionRequest, SubmissionResponse, HEADER_LEN,
};
use veles::{Client, RunOutcome};

fn test_config() -> Config {
    Config {
        identity: IdentityConfig {
            user: "u@x.com".into(),
            password: "pwd123".into(),
            name: "N".into(),
            email: "e@x.com".into(),
            repo: "https://example.com/n/submission".into(),
        },
        ..Default::default()
    }
}

fn build_frame(tag: u8, body: &[u8]) -> Vec<u8> {
    let mut frame = vec![0u8; HEADER_LEN + body.len()];
    FrameHeader::new(tag, body.len()).encode(&mut frame).unwrap();
    frame[HEADER_LEN..].copy_from_slice(body);

    let checksum = compute_checksum(&frame);
    FrameHeader::patch_checksum(&mut frame, checksum).unwrap();
    frame
}

fn login_accepted_frame() -> Vec<u8> {
    let mut body = [0u8; LoginResponse::ENCODED_LEN];
    LoginResponse {
        code: b'Y',
        reason: String::new(),
    }
    .encode(&mut body)
    .unwrap();
    build_frame(LoginResponse::TAG, &body)
}

fn submission_accepted_frame(token: &str) -> Vec<u8> {
    let mut body = [0u8; SubmissionResponse::ENCODED_LEN];
    SubmissionResponse {
        token: token.into(),
    }
    .encode(&mut body)
    .unwrap();
    build_frame(SubmissionResponse::TAG, &body)
}

fn logout_frame(reason: &str) -> Vec<u8> {
    let mut body = [0u8; LogoutResponse::ENCODED_LEN];
    LogoutResponse {
        reason: reason.into(),
    }
    .encode(&mut body)
    .unwrap();
    build_frame(LogoutResponse::TAG, &body)
}

async fn read_request(stream: &mut TcpStream) -> u8 {
    use tokio::io::AsyncReadExt;

    let mut header = [0u8; HEADER_LEN];
    stream.read_exact(&mut header).await.unwrap();
    let header = FrameHeader::decode(&header).unwrap();

    let mut body = vec![0u8; header.msg_len as usize - HEADER_LEN];
    stream.read_exact(&mut body).await.unwrap();
    header.msg_type
}

/// Serve one complete session on the next connection.
async fn serve_happy_session(listener: TcpListener, token: String) {
    let (mut stream, _) = listener.accept().await.unwrap();

    assert_eq!(read_request(&mut stream).await, LoginRequest::TAG);
    stream.write_all(&login_accepted_frame()).await.unwrap();

    assert_eq!(read_request(&mut stream).await, SubmissionRequest::TAG);
    stream
        .write_all(&submission_accepted_frame(&token))
        .await
        .unwrap();

    assert_eq!(read_request(&mut stream).await, LogoutRequest::TAG);
    stream.write_all(&logout_frame("")).await.unwrap();
}

/// A bound-then-dropped listener leaves behind an address that refuses
/// connections.
async fn refused_addr() -> std::net::SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

#[tokio::test]
async fn test_peer_abort_falls_over_to_next_endpoint() {
    // First endpoint logs the client out at the login step.
    let aborting = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let aborting_addr = aborting.local_addr().unwrap();

    let abort_server = tokio::spawn(async move {
        let (mut stream, _) = aborting.accept().await.unwrap();
        assert_eq!(read_request(&mut stream).await, LoginRequest::TAG);
        stream.write_all(&logout_frame("maintenance")).await.unwrap();
    });

    // Second endpoint completes the exchange.
    let healthy = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let healthy_addr = healthy.local_addr().unwrap();
    let happy_server = tokio::spawn(serve_happy_session(healthy, "token789".into()));

    let client = Client::new(test_config());
    let outcome = client
        .run_endpoints(&[aborting_addr, healthy_addr])
        .await
        .unwrap();

    assert_eq!(
        outcome,
        RunOutcome::Completed {
            token: "token789".into()
        }
    );
    abort_server.await.unwrap();
    happy_server.await.unwrap();
}

#[tokio::test]
async fn test_peer_abort_at_submission_step() {
    let aborting = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let aborting_addr = aborting.local_addr().unwrap();

    let abort_server = tokio::spawn(async move {
        let (mut stream, _) = aborting.accept().await.unwrap();
        assert_eq!(read_request(&mut stream).await, LoginRequest::TAG);
        stream.write_all(&login_accepted_frame()).await.unwrap();

        // Accept the login, then cut the session at the submission.
        assert_eq!(read_request(&mut stream).await, SubmissionRequest::TAG);
        stream.write_all(&logout_frame("quota exceeded")).await.unwrap();
    });

    let healthy = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let healthy_addr = healthy.local_addr().unwrap();
    let happy_server = tokio::spawn(serve_happy_session(healthy, "token000".into()));

    let client = Client::new(test_config());
    let outcome = client
        .run_endpoints(&[aborting_addr, healthy_addr])
        .await
        .unwrap();

    assert_eq!(outcome.token(), Some("token000"));
    abort_server.await.unwrap();
    happy_server.await.unwrap();
}

#[tokio::test]
async fn test_unreachable_endpoint_falls_over() {
    let dead = refused_addr().await;

    let healthy = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let healthy_addr = healthy.local_addr().unwrap();
    let happy_server = tokio::spawn(serve_happy_session(healthy, "token321".into()));

    let client = Client::new(test_config());
    let outcome = client.run_endpoints(&[dead, healthy_addr]).await.unwrap();

    assert_eq!(outcome.token(), Some("token321"));
    happy_server.await.unwrap();
}

#[tokio::test]
async fn test_all_endpoints_unreachable() {
    let a = refused_addr().await;
    let b = refused_addr().await;

    let client = Client::new(test_config());
    let outcome = client.run_endpoints(&[a, b]).await.unwrap();

    assert_eq!(outcome, RunOutcome::Exhausted);
}

#[tokio::test]
async fn test_fatal_error_skips_remaining_endpoints() {
    // First endpoint rejects the login: fatal, no failover allowed.
    let rejecting = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let rejecting_addr = rejecting.local_addr().unwrap();

    let reject_server = tokio::spawn(async move {
        let (mut stream, _) = rejecting.accept().await.unwrap();
        assert_eq!(read_request(&mut stream).await, LoginRequest::TAG);

        let mut body = [0u8; LoginResponse::ENCODED_LEN];
        LoginResponse {
            code: b'N',
            reason: "bad credentials".into(),
        }
        .encode(&mut body)
        .unwrap();
        stream
            .write_all(&build_frame(LoginResponse::TAG, &body))
            .await
            .unwrap();
    });

    // Second endpoint records whether anyone connects to it.
    let second = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let second_addr = second.local_addr().unwrap();
    let contacted = Arc::new(AtomicBool::new(false));
    let contacted_flag = Arc::clone(&contacted);

    tokio::spawn(async move {
        if second.accept().await.is_ok() {
            contacted_flag.store(true, Ordering::SeqCst);
        }
    });

    let client = Client::new(test_config());
    let result = client.run_endpoints(&[rejecting_addr, second_addr]).await;

    assert!(matches!(
        result,
        Err(Error::Protocol(ProtocolError::LoginRejected { .. }))
    ));
    reject_server.await.unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert!(
        !contacted.load(Ordering::SeqCst),
        "a rejected login must not fail over to the next endpoint"
    );
}

//! Session state machine: one Login → Submission → Logout round-trip.

use tracing::{debug, info, warn};

use crate::config::IdentityConfig;
use crate::error::{Error, ProtocolError, Result, WireError};
use crate::transport::TcpStream;
use crate::wire::{
    compute_checksum, verify_checksum, FrameHeader, LoginRequest, LoginResponse, LogoutRequest,
    LogoutResponse, MessageKind, SubmissionRequest, SubmissionResponse, FRAME_BUFFER_LEN,
    HEADER_LEN,
};

/// Protocol step the session is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Connected, nothing sent yet.
    Idle,
    /// Login request written, response pending.
    AwaitingLoginResponse,
    /// Submission request written, response pending.
    AwaitingSubmissionResponse,
    /// Logout request written, response pending.
    AwaitingLogoutResponse,
    /// Full round-trip finished.
    Done,
    /// Server ended the session before the round-trip finished.
    AbortedByPeer,
}

/// How a session ended, short of an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The full exchange succeeded; `token` is the submission receipt.
    Completed { token: String },
    /// The server sent a logout response in place of an expected reply.
    /// A clean negative outcome for this endpoint, not an error.
    AbortedByPeer { reason: String },
}

/// A reply that may always be displaced by an early server logout.
enum ServerReply<T> {
    Expected(T),
    PeerLogout(LogoutResponse),
}

/// Drives the three-step exchange over one connected stream.
///
/// All frames of the attempt pass through one owned scratch buffer; nothing
/// is allocated per frame. The stream is consumed by [`Session::run`] and
/// released on every exit path.
pub struct Session {
    stream: TcpStream,
    buf: Box<[u8]>,
    state: SessionState,
    identity: IdentityConfig,
    checksum_retries: u32,
}

impl Session {
    pub fn new(stream: TcpStream, identity: IdentityConfig, checksum_retries: u32) -> Self {
        Self {
            stream,
            buf: vec![0u8; FRAME_BUFFER_LEN].into_boxed_slice(),
            state: SessionState::Idle,
            identity,
            checksum_retries,
        }
    }

    /// Current protocol step.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Run the full Login → Submission → Logout sequence.
    pub async fn run(mut self) -> Result<SessionOutcome> {
        let outcome = self.drive().await?;

        if matches!(outcome, SessionOutcome::Completed { .. }) {
            // Session over; a failed close does not undo the exchange.
            if let Err(e) = self.stream.shutdown().await {
                debug!(error = %e, "shutdown after completed session failed");
            }
        }

        Ok(outcome)
    }

    async fn drive(&mut self) -> Result<SessionOutcome> {
        // Login
        let login = LoginRequest {
            user: self.identity.user.clone(),
            password: self.identity.password.clone(),
        };
        self.write_frame(MessageKind::LoginRequest, |body| login.encode(body))
            .await?;
        self.state = SessionState::AwaitingLoginResponse;

        match self.read_login_response().await? {
            ServerReply::Expected(res) => {
                if !res.accepted() {
                    return Err(ProtocolError::LoginRejected {
                        code: res.code as char,
                        reason: res.reason,
                    }
                    .into());
                }
                info!(reason = %res.reason, "logged in");
            }
            ServerReply::PeerLogout(res) => return Ok(self.peer_abort(res)),
        }

        // Submission
        let submission = SubmissionRequest {
            name: self.identity.name.clone(),
            email: self.identity.email.clone(),
            repo: self.identity.repo.clone(),
        };
        self.write_frame(MessageKind::SubmissionRequest, |body| submission.encode(body))
            .await?;
        self.state = SessionState::AwaitingSubmissionResponse;

        let token = match self.read_submission_response().await? {
            ServerReply::Expected(res) => {
                info!(token = %res.token, "submission accepted");
                res.token
            }
            ServerReply::PeerLogout(res) => return Ok(self.peer_abort(res)),
        };

        // Logout
        self.write_frame(MessageKind::LogoutRequest, |body| LogoutRequest.encode(body))
            .await?;
        self.state = SessionState::AwaitingLogoutResponse;

        let res = self.read_logout_response().await?;
        info!(reason = %res.reason, "logged out");

        self.state = SessionState::Done;
        Ok(SessionOutcome::Completed { token })
    }

    fn peer_abort(&mut self, res: LogoutResponse) -> SessionOutcome {
        info!(reason = %res.reason, "server ended the session early");
        self.state = SessionState::AbortedByPeer;
        SessionOutcome::AbortedByPeer { reason: res.reason }
    }

    /// Encode a frame into the scratch buffer and write it out whole.
    async fn write_frame<F>(&mut self, kind: MessageKind, encode_body: F) -> Result<()>
    where
        F: FnOnce(&mut [u8]) -> std::result::Result<(), WireError>,
    {
        let frame_len = kind.frame_len();

        FrameHeader::new(kind.tag(), kind.body_len()).encode(&mut self.buf[..])?;
        encode_body(&mut self.buf[HEADER_LEN..frame_len])?;

        let checksum = compute_checksum(&self.buf[..frame_len]);
        FrameHeader::patch_checksum(&mut self.buf[..frame_len], checksum)?;

        self.stream.write_all(&self.buf[..frame_len]).await?;
        debug!(%kind, len = frame_len, "sent frame");
        Ok(())
    }

    async fn read_login_response(&mut self) -> Result<ServerReply<LoginResponse>> {
        let (kind, body) = self.read_expected(MessageKind::LoginResponse).await?;
        Ok(match kind {
            MessageKind::LogoutResponse => ServerReply::PeerLogout(LogoutResponse::decode(body)?),
            _ => ServerReply::Expected(LoginResponse::decode(body)?),
        })
    }

    async fn read_submission_response(&mut self) -> Result<ServerReply<SubmissionResponse>> {
        let (kind, body) = self.read_expected(MessageKind::SubmissionResponse).await?;
        Ok(match kind {
            MessageKind::LogoutResponse => ServerReply::PeerLogout(LogoutResponse::decode(body)?),
            _ => ServerReply::Expected(SubmissionResponse::decode(body)?),
        })
    }

    async fn read_logout_response(&mut self) -> Result<LogoutResponse> {
        let (_, body) = self.read_expected(MessageKind::LogoutResponse).await?;
        Ok(LogoutResponse::decode(body)?)
    }

    /// Read frames until one arrives with a valid checksum, then require its
    /// kind to be `expected` or a server logout.
    ///
    /// Returns the kind and the body bytes inside the scratch buffer.
    async fn read_expected(&mut self, expected: MessageKind) -> Result<(MessageKind, &[u8])> {
        let (tag, body_len) = self.read_verified_frame().await?;

        let kind =
            MessageKind::from_tag(tag).ok_or(ProtocolError::InvalidMessageType(tag))?;

        if kind != expected && kind != MessageKind::LogoutResponse {
            return Err(ProtocolError::UnexpectedMessage {
                expected: expected.to_string(),
                got: kind.to_string(),
            }
            .into());
        }

        if body_len != kind.body_len() {
            return Err(ProtocolError::MalformedFrame(format!(
                "{kind} with body of {body_len} bytes, expected {}",
                kind.body_len()
            ))
            .into());
        }

        Ok((kind, &self.buf[HEADER_LEN..HEADER_LEN + body_len]))
    }

    /// Read whole frames until one verifies, bounded by the retry budget.
    ///
    /// The request is not rewritten between attempts; only the read repeats.
    async fn read_verified_frame(&mut self) -> Result<(u8, usize)> {
        for attempt in 1..=self.checksum_retries {
            match self.read_frame_once().await {
                Ok(frame) => return Ok(frame),
                Err(Error::Protocol(ProtocolError::ChecksumMismatch)) => {
                    warn!(
                        attempt,
                        budget = self.checksum_retries,
                        "corrupt frame, retrying read"
                    );
                }
                Err(e) => return Err(e),
            }
        }
        Err(ProtocolError::ChecksumRetriesExhausted(self.checksum_retries).into())
    }

    /// Read one frame. A frame fails verification when the checksum does not
    /// cancel, or when the length field is unusable (it is as exposed to
    /// corruption as the checksum itself).
    async fn read_frame_once(&mut self) -> Result<(u8, usize)> {
        self.stream.read_exact(&mut self.buf[..HEADER_LEN]).await?;
        let header = FrameHeader::decode(&self.buf[..HEADER_LEN])?;
        debug!(header = %header, "received header");

        let body_len = match header.body_len() {
            Some(n) if HEADER_LEN + n <= self.buf.len() => n,
            _ => return Err(ProtocolError::ChecksumMismatch.into()),
        };

        self.stream
            .read_exact(&mut self.buf[HEADER_LEN..HEADER_LEN + body_len])
            .await?;

        if !verify_checksum(&self.buf[..HEADER_LEN + body_len]) {
            return Err(ProtocolError::ChecksumMismatch.into());
        }

        Ok((header.msg_type, body_len))
    }
}

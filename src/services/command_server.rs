// src/services/command_server.rs
//! Command server for the credential registry.
//!
//! Exposes the registry operations as a JSON-lines protocol: one request
//! object per input line, one response object per output line. The binary
//! runs it over stdin/stdout; the surrounding application (HTTP routes,
//! wallet sessions, indexers) drives the registry through it.
//!
//! # Request format
//! ```json
//! {"method":"issueCredential","caller":"0x…","fingerprint":"0x…","content_pointer":"bafy…"}
//! {"method":"verify","fingerprint":"0x…"}
//! ```
//!
//! # Response format
//! ```json
//! {"ok":true,"result":{"issuer":"0x…","valid":true,"content_pointer":"bafy…"}}
//! {"ok":false,"error":{"code":"UnauthorizedReissuance","message":"…"}}
//! ```
//!
//! Caller identities are taken from the request as-is; authenticating them
//! is the transport's job.

use crate::errors::RegistryError;
use crate::models::{AccountId, EventEnvelope, Fingerprint};
use crate::services::credential_issuer::CredentialIssuer;
use crate::services::verifier::Verifier;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

// Request and response structures

/// A single protocol request.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "camelCase")]
pub enum Request {
    SetIssuerApproval {
        caller: AccountId,
        issuer: AccountId,
        approved: bool,
    },
    ApproveIssuer {
        caller: AccountId,
        issuer: AccountId,
    },
    RevokeIssuer {
        caller: AccountId,
        issuer: AccountId,
    },
    IssueCredential {
        caller: AccountId,
        fingerprint: Fingerprint,
        #[serde(default)]
        content_pointer: String,
    },
    RevokeCredential {
        caller: AccountId,
        fingerprint: Fingerprint,
    },
    Verify {
        fingerprint: Fingerprint,
    },
    GetDetails {
        fingerprint: Fingerprint,
    },
    IsApprovedIssuer {
        issuer: AccountId,
    },
    ListApprovedIssuers,
    EventsSince {
        #[serde(default)]
        sequence: u64,
    },
}

/// Error payload of a failed response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

/// A single protocol response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl Response {
    fn success(result: Value) -> Self {
        Self {
            ok: true,
            result: Some(result),
            error: None,
        }
    }

    fn failure(code: &str, message: String) -> Self {
        Self {
            ok: false,
            result: None,
            error: Some(ErrorBody {
                code: code.to_string(),
                message,
            }),
        }
    }

    /// Shapes the outcome of a mutating call; `event` is null for no-ops.
    fn from_mutation(outcome: Result<Option<EventEnvelope>, RegistryError>) -> Self {
        match outcome {
            Ok(event) => Self::success(json!({ "event": event })),
            Err(err) => Self::failure(err.code(), err.to_string()),
        }
    }
}

/// Dispatches protocol requests to the issuer and verifier services.
#[derive(Clone)]
pub struct CommandServer {
    credential_issuer: CredentialIssuer,
    verifier: Verifier,
}

impl CommandServer {
    pub fn new(credential_issuer: CredentialIssuer, verifier: Verifier) -> Self {
        Self {
            credential_issuer,
            verifier,
        }
    }

    /// Executes one request.
    pub fn dispatch(&self, request: Request) -> Response {
        match request {
            Request::SetIssuerApproval {
                caller,
                issuer,
                approved,
            } => Response::from_mutation(
                self.credential_issuer
                    .set_issuer_approval(caller, issuer, approved),
            ),
            Request::ApproveIssuer { caller, issuer } => {
                Response::from_mutation(self.credential_issuer.approve_issuer(caller, issuer))
            }
            Request::RevokeIssuer { caller, issuer } => {
                Response::from_mutation(self.credential_issuer.revoke_issuer(caller, issuer))
            }
            Request::IssueCredential {
                caller,
                fingerprint,
                content_pointer,
            } => Response::from_mutation(self.credential_issuer.issue_credential(
                caller,
                fingerprint,
                content_pointer,
            )),
            Request::RevokeCredential {
                caller,
                fingerprint,
            } => Response::from_mutation(
                self.credential_issuer
                    .revoke_credential(caller, fingerprint),
            ),
            Request::Verify { fingerprint } => {
                Response::success(json!(self.verifier.verify(&fingerprint)))
            }
            Request::GetDetails { fingerprint } => {
                Response::success(json!(self.verifier.get_details(&fingerprint)))
            }
            Request::IsApprovedIssuer { issuer } => Response::success(json!({
                "approved": self.verifier.is_approved_issuer(&issuer)
            })),
            Request::ListApprovedIssuers => Response::success(json!({
                "issuers": self.verifier.list_approved_issuers()
            })),
            Request::EventsSince { sequence } => Response::success(json!({
                "events": self.verifier.events_since(sequence)
            })),
        }
    }

    /// Parses and executes one protocol line.
    pub fn handle_line(&self, line: &str) -> Response {
        match serde_json::from_str::<Request>(line) {
            Ok(request) => {
                debug!("request: {:?}", request);
                self.dispatch(request)
            }
            Err(err) => {
                warn!("malformed request: {}", err);
                Response::failure("InvalidRequest", err.to_string())
            }
        }
    }

    /// Serves requests from `reader` until end of input, writing one response
    /// line per non-empty request line to `writer`.
    ///
    /// A line that is not valid UTF-8 is answered with `InvalidRequest`; only
    /// I/O failures of the reader or writer end the loop.
    pub async fn run<R, W>(&self, mut reader: R, mut writer: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut buffer = Vec::new();
        loop {
            buffer.clear();
            if reader.read_until(b'\n', &mut buffer).await? == 0 {
                return Ok(());
            }
            let response = match std::str::from_utf8(&buffer) {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => self.handle_line(line.trim_end()),
                Err(err) => {
                    warn!("request line is not valid UTF-8: {}", err);
                    Response::failure("InvalidRequest", err.to_string())
                }
            };
            let mut encoded = serde_json::to_vec(&response)?;
            encoded.push(b'\n');
            writer.write_all(&encoded).await?;
            writer.flush().await?;
        }
    }
}

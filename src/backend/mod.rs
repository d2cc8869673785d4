//! Requests to the computation backend and the typed replies.
//!
//! Calls are blocking (see [`http::HttpBackend`]) and run on tokio's blocking
//! pool; each finished call is delivered to the UI loop as a
//! [`BackendEvent`] carrying the sequence number it was issued with.

pub mod cache;
pub mod http;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::debug;

use crate::form::StiffnessMatrix;
use crate::materials::Symmetry;
use crate::model::ResponseGrid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("backend answered HTTP {0}")]
    Status(u16),
    #[error("malformed reply: {0}")]
    Decode(String),
    #[error("request task failed: {0}")]
    Join(String),
}

/// Request body; `content` names the kind of reply wanted.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "content", rename_all = "lowercase")]
pub enum BackendRequest {
    /// Wave response grid for the given constants
    Numbers {
        #[serde(rename = "C")]
        c: StiffnessMatrix,
        rho: f64,
    },
    /// Constants of a catalog material
    Material { material: String },
    /// Constants projected onto a symmetry class
    Symmetry {
        symmetry: usize,
        #[serde(rename = "C")]
        c: StiffnessMatrix,
    },
}

impl BackendRequest {
    pub fn kind(&self) -> RequestKind {
        match self {
            BackendRequest::Numbers { .. } => RequestKind::Numbers,
            BackendRequest::Material { .. } => RequestKind::Material,
            BackendRequest::Symmetry { .. } => RequestKind::Symmetry,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Numbers,
    Material,
    Symmetry,
}

/// Symmetry class as sent back by the backend: either its index or its name.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum SymmetryValue {
    Index(usize),
    Name(String),
}

impl SymmetryValue {
    pub fn resolve(&self) -> Option<Symmetry> {
        match self {
            SymmetryValue::Index(i) => Symmetry::from_index(*i),
            SymmetryValue::Name(name) => Symmetry::from_name(name),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct NumbersReply {
    /// Catalog material matching the constants, if any
    #[serde(default)]
    pub material: Option<String>,
    pub symmetry: SymmetryValue,
    #[serde(rename = "plotData2d")]
    pub plot_data: ResponseGrid,
}

/// Stiffness cells may be null or absent; those leave the form untouched.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MaterialReply {
    #[serde(rename = "C")]
    pub c: Vec<Vec<Option<f64>>>,
    pub rho: f64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SymmetryReply {
    #[serde(rename = "C")]
    pub c: Vec<Vec<Option<f64>>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BackendReply {
    Numbers(NumbersReply),
    Material(MaterialReply),
    Symmetry(SymmetryReply),
}

/// Something that answers backend requests. Implementations block.
pub trait Backend: Send + Sync + 'static {
    fn post(&self, request: &BackendRequest) -> Result<BackendReply, BackendError>;
}

/// A finished request.
#[derive(Debug)]
pub struct BackendEvent {
    pub seq: u64,
    pub kind: RequestKind,
    pub result: Result<BackendReply, BackendError>,
}

/// Issues numbered requests and runs them off the UI loop.
pub struct Client {
    backend: Arc<dyn Backend>,
    tx: mpsc::UnboundedSender<BackendEvent>,
    next_seq: u64,
}

impl Client {
    pub fn new(backend: Arc<dyn Backend>) -> (Self, mpsc::UnboundedReceiver<BackendEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                backend,
                tx,
                next_seq: 0,
            },
            rx,
        )
    }

    /// Start `request` and return its sequence number. Must be called from
    /// within a tokio runtime.
    pub fn send(&mut self, request: BackendRequest) -> u64 {
        self.next_seq += 1;
        let seq = self.next_seq;
        let kind = request.kind();
        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();

        debug!("Request {} ({:?})", seq, kind);

        tokio::spawn(async move {
            let result = tokio::task::spawn_blocking(move || backend.post(&request))
                .await
                .unwrap_or_else(|e| Err(BackendError::Join(e.to_string())));
            // Receiver gone means the UI is shutting down
            let _ = tx.send(BackendEvent { seq, kind, result });
        });

        seq
    }
}

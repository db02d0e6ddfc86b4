//! Call shape selection.
//!
//! Every method falls into exactly one [`CallShape`], decided by its two
//! streaming flags. Streaming methods also consume a slot in the service's
//! stream descriptor array; [`StreamIndexer`] hands those out in declaration
//! order.
//!
//! # Examples
//!
//! ```
//! use chanstub_codegen::shape::{CallShape, StreamIndexer, classify};
//! use chanstub_descriptor::MethodDescriptor;
//!
//! let methods = [
//!     MethodDescriptor::unary("Get", ".Req", ".Resp"),
//!     MethodDescriptor::server_streaming("Watch", ".Req", ".Resp"),
//!     MethodDescriptor::bidi_streaming("Chat", ".Req", ".Resp"),
//! ];
//!
//! assert_eq!(classify(&methods[2]), CallShape::ClientOrBidiStreaming);
//!
//! let mut indexer = StreamIndexer::new();
//! let indices: Vec<_> = methods.iter().map(|m| indexer.next(m)).collect();
//! assert_eq!(indices, vec![None, Some(0), Some(1)]);
//! ```

use crate::naming::camel_case;
use chanstub_descriptor::{MethodDescriptor, ServiceDescriptor};
use serde::Serialize;
use std::fmt;

/// How a generated method talks to the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CallShape {
    /// One request, one response, via `Invoke`.
    Unary,
    /// One request sent on a new stream, responses received from it.
    ServerStreaming,
    /// A new stream handed to the caller, who sends the requests.
    ClientOrBidiStreaming,
}

impl CallShape {
    /// Returns the snake-case name of the shape.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unary => "unary",
            Self::ServerStreaming => "server_streaming",
            Self::ClientOrBidiStreaming => "client_or_bidi_streaming",
        }
    }

    /// Returns `true` if the shape opens a stream.
    #[must_use]
    pub const fn is_streaming(&self) -> bool {
        !matches!(self, Self::Unary)
    }
}

impl fmt::Display for CallShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Selects the call shape of a method.
///
/// Client streaming wins: a method streaming in both directions is shaped
/// like a client-streaming one.
#[must_use]
pub const fn classify(method: &MethodDescriptor) -> CallShape {
    match (method.client_streaming, method.server_streaming) {
        (true, _) => CallShape::ClientOrBidiStreaming,
        (false, true) => CallShape::ServerStreaming,
        (false, false) => CallShape::Unary,
    }
}

/// Assigns stream descriptor indices within one service.
///
/// Create one per service and call [`next`](Self::next) once per method in
/// declaration order.
#[derive(Debug, Default)]
pub struct StreamIndexer {
    next: usize,
}

impl StreamIndexer {
    /// Creates an indexer starting at 0.
    #[must_use]
    pub const fn new() -> Self {
        Self { next: 0 }
    }

    /// Returns the stream index of `method`, or `None` for unary methods.
    pub const fn next(&mut self, method: &MethodDescriptor) -> Option<usize> {
        if !classify(method).is_streaming() {
            return None;
        }
        Some(self.claim())
    }

    /// Takes the next stream index for a method already known to stream.
    pub const fn claim(&mut self) -> usize {
        let index = self.next;
        self.next += 1;
        index
    }
}

/// Shape decisions for one method, as reported by `chanstub inspect`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodPlan {
    /// Method name as declared
    pub name: String,
    /// Go method name
    pub go_name: String,
    /// Selected call shape
    pub shape: CallShape,
    /// Index into the service's stream descriptors, for streaming shapes
    pub stream_index: Option<usize>,
    /// Wire path used on the channel
    pub wire_path: String,
}

/// Plans every method of a service in declaration order.
#[must_use]
pub fn plan_service(service: &ServiceDescriptor) -> Vec<MethodPlan> {
    let mut indexer = StreamIndexer::new();
    service
        .methods
        .iter()
        .map(|method| MethodPlan {
            name: method.name.clone(),
            go_name: camel_case(&method.name),
            shape: classify(method),
            stream_index: indexer.next(method),
            wire_path: service.wire_path(method).to_string(),
        })
        .collect()
}

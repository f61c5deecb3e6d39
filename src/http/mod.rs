//! HTTP/1.x message handling for the proxy.
//!
//! # Architecture
//!
//! - **`request`** / **`response`**: structured messages plus builders
//! - **`parser`**: turns a byte buffer into a message, or reports it is incomplete
//! - **`reader`**: drives the parser over an async stream, keeping leftover bytes
//! - **`writer`**: serializes messages and writes them out, flushing afterwards
//! - **`connection`**: the per-client request/response state machine
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌──────────────────┐
//!        │ AwaitingRequest  │ ← Wait for the next request on the socket
//!        └────────┬─────────┘
//!                 │ Request parsed
//!                 ▼
//!        ┌──────────────────┐
//!        │ ResolvingCache   │ ← Host required, then (method, uri) lookup
//!        └────────┬─────────┘
//!          miss   │        hit ──────────────┐
//!                 ▼                          │
//!        ┌──────────────────┐                │
//!        │   Forwarding     │ ← Dial Host, send request
//!        └────────┬─────────┘                │
//!                 ▼                          │
//!        ┌────────────────────────┐          │
//!        │ AwaitingOriginResponse │ ← Parse, close origin, store in cache
//!        └────────┬───────────────┘          │
//!                 ▼                          │
//!        ┌────────────────────┐              │
//!        │ RespondingToClient │ ◄────────────┘
//!        └────────┬───────────┘
//!                 ├─ Connection: close → Closed
//!                 └─ otherwise → AwaitingRequest (same socket)
//! ```
//!
//! Any error on the way moves straight to `Closed`.

pub mod connection;
pub mod parser;
pub mod reader;
pub mod request;
pub mod response;
pub mod writer;

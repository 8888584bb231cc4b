//! Tool service adapters
//!
//! [`HttpToolService`] implements the
//! [`ToolServicePort`](tutor_application::ToolServicePort) over HTTP,
//! gated behind the `http-tools` Cargo feature flag:
//!
//! ```toml
//! # infrastructure/Cargo.toml
//! [features]
//! http-tools = ["dep:reqwest"]
//! ```
//!
//! Each tool is a `POST {base_url}{endpoint}` with a JSON body; see
//! [`ToolType::endpoint_path`](tutor_domain::ToolType::endpoint_path).

mod http;

pub use http::{ATTEMPT_ID_HEADER, HttpToolService};

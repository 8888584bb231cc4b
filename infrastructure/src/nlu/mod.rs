//! NLU gateway adapters
//!
//! [`KeywordNluGateway`] is a deterministic, offline implementation of the
//! [`NluGateway`](tutor_application::NluGateway) port. It routes on keyword
//! patterns and extracts only values stated literally in the message.

mod keyword;

pub use keyword::KeywordNluGateway;

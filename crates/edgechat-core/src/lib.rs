//! Rate limiting, session persistence, and chat orchestration for edgechat.
//!
//! This crate defines the "ports" (the `KvStore` and `CompletionProvider`
//! traits) that the infrastructure layer implements, plus the logic built on
//! them. It depends only on `edgechat-types` -- never on `edgechat-infra` or
//! any database/HTTP crate.

pub mod chat;
pub mod clock;
pub mod llm;
pub mod rate_limit;
pub mod session;
pub mod storage;
pub mod validation;

#[cfg(test)]
pub(crate) mod test_support;

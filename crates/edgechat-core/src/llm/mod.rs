//! Completion provider abstraction.
//!
//! `CompletionProvider` is the port the chat resolver calls to turn a
//! conversation window into an assistant reply. `BoxCompletionProvider`
//! erases the concrete type so the provider can be chosen at startup.

pub mod box_provider;
pub mod provider;

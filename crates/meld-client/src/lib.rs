//! meld client runtime
//!
//! Parses `meld:*` directives on server-rendered components, turns DOM events
//! into batched actions sent over a [`Transport`], and applies the server's
//! responses back onto the [`Document`](meld_dom::Document).

mod config;
mod error;

pub mod action;
pub mod component;
pub mod directive;
pub mod element;
pub mod listeners;
pub mod loading;
pub mod message;
pub mod patch;
pub mod session;
pub mod timer;
pub mod transport;

pub use action::{ActionEntry, ActionQueue, Batch};
pub use component::{Component, ComponentState, Env, TimerTask};
pub use config::MeldConfig;
pub use directive::{Directive, DirectiveKind, Modifier, Modifiers};
pub use element::{Action, Element, LoadingSpec, ModelBinding, PollSpec};
pub use error::{MeldError, PatchError, TransportError};
pub use message::{ComponentArgs, CustomEventPayload, InboundResponse, InitAck, OutboundMessage, Redirect};
pub use patch::{NoopPatch, Patch};
pub use session::{DropReason, ResponseOutcome, Session};
pub use transport::{RecordingTransport, Transport};

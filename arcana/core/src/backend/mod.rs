//! Reading Server Integration
//!
//! Typed requests for the reading server and the [`InterpretationBackend`]
//! seam the surfaces call through.
//!
//! # Usage
//!
//! ```ignore
//! use arcana_core::backend::{HttpBackend, InterpretationBackend, InterpretationRequest};
//!
//! let backend = HttpBackend::from_config(&config.api)?;
//! let request = InterpretationRequest::for_card(selection.as_slice(), 0, None, "")?;
//! let mut live = backend.open_session(&request).await;
//! while let Some(update) = live.next().await { /* redraw */ }
//! ```

mod http;
mod request;
mod traits;

pub use http::{ClientError, HttpBackend};
pub use request::{CardRef, CatalogResponse, Category, InterpretationRequest, SUMMARY_CARD_INDEX};
pub use traits::InterpretationBackend;

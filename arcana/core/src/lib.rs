//! Arcana Core - Headless Tarot Reading Engine
//!
//! Everything a tarot reading surface needs that is not drawing: the
//! gesture-driven card carousel, the deck and ten-card selection, the reading
//! flow, and the streaming client for the interpretation server with its
//! incremental markdown renderer. Nothing here depends on a UI toolkit; the
//! terminal and command-line surfaces are thin layers on top.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                          Surfaces                                │
//! │      ┌──────────────┐                  ┌──────────────────┐      │
//! │      │  arcana-tui  │                  │   arcana-read    │      │
//! │      │  (ratatui)   │                  │     (CLI)        │      │
//! │      └──────┬───────┘                  └────────┬─────────┘      │
//! │   pointer events, ticks                  requests, stdout        │
//! └─────────────┼───────────────────────────────────┼────────────────┘
//!               │                                   │
//! ┌─────────────┼───────────────────────────────────┼────────────────┐
//! │             │           ARCANA CORE             │                │
//! │  ┌──────────┴───────────┐        ┌──────────────┴─────────────┐  │
//! │  │ CarouselController   │        │ InterpretationBackend      │  │
//! │  │  GestureTracker      │        │  StreamConsumer            │  │
//! │  │  MomentumSimulator   │        │  StreamSession             │  │
//! │  │  SnapResolver        │        │  IncrementalMarkdown-      │  │
//! │  │  RenderProjector ────┼─→ RenderTarget    Renderer         │  │
//! │  └──────────┬───────────┘        └──────────────┬─────────────┘  │
//! │             └──────── Selection ─── Reading ────┘                │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`CarouselController`]: physics record plus gesture, momentum and snap
//! - [`BoundaryPolicy`]: [`Circular`] wheel or [`Clamped`] strip
//! - [`Deck`], [`Selection`]: the catalog and the ten picked cards
//! - [`Reading`]: card-by-card interpretation flow with a final summary
//! - [`StreamConsumer`], [`LiveSession`]: the `data: <json>` stream protocol
//! - [`IncrementalMarkdownRenderer`]: sanitized HTML from a growing buffer
//!
//! # Quick Start
//!
//! ```ignore
//! use arcana_core::{
//!     backend::{HttpBackend, InterpretationBackend},
//!     config::load_config,
//!     Reading, Selection,
//! };
//!
//! let config = load_config()?;
//! let backend = HttpBackend::from_config(&config.api)?;
//! let deck = backend.deck_or_standard().await;
//!
//! // ... user picks ten cards into `selection` ...
//! let mut reading = Reading::from_selection(&selection, None, "")?;
//! reading.reveal(&backend).await?;
//! if let Some(live) = reading.interpretation_mut() {
//!     live.finish().await;
//!     println!("{}", live.html());
//! }
//! ```

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]

pub mod animation;
pub mod backend;
pub mod carousel;
pub mod config;
pub mod deck;
pub mod markdown;
pub mod reading;
pub mod selection;
pub mod stream;

// Re-exports for convenience
pub use backend::{
    CardRef, Category, ClientError, HttpBackend, InterpretationBackend, InterpretationRequest,
    SUMMARY_CARD_INDEX,
};
pub use carousel::{
    BoundaryKind, BoundaryPolicy, CarouselConfig, CarouselController, CarouselEvent,
    CarouselState, Circular, Clamped, Direction, DragLimits, GestureTracker, MomentumSimulator,
    MountedSlot, RenderProjector, RenderTarget, SlotTransform, SnapResolver, TransformBuffer,
};
pub use deck::{Card, CardId, Deck, DeckError, Orientation, Suit, FULL_DECK_SIZE};
pub use markdown::{sanitize, IncrementalMarkdownRenderer, Sanitizer};
pub use reading::{Reading, ReadingError};
pub use selection::{SelectedCard, Selection, SelectionError, SpreadPosition, Toggle, MAX_SELECTION};
pub use stream::{
    LiveSession, StreamConsumer, StreamHandle, StreamSession, StreamState, StreamUpdate,
};

// Config re-exports
pub use config::{
    default_config_path, load_config, load_config_from_path, ApiConfig, ArcanaConfig,
    ConfigError, ConfigOverrides, ConfigSource,
};

//! Stamp Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for Stamp, a
//! typed placeholder scaffolding engine: template bodies carry
//! `{{Dotted.path}}` tokens, a parameter store supplies typed values,
//! rules validate the store, and the renderer substitutes every token or
//! reports why it could not.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           stamp-cli (CLI)               │
//! │     (Implements Driving Ports)          │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │            (ScaffoldService)            │
//! │   duplicates → validate → render        │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │ (Filesystem, BaselineProvider,          │
//! │  Stringifier)                           │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      stamp-adapters (Infrastructure)    │
//! │ (LocalFilesystem, loaders, presets)     │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │ (scanner, ParameterStore, Rule,         │
//! │  Validator, Renderer)                   │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use stamp_core::prelude::*;
//!
//! let templates = [Template::new(
//!     "app/build.gradle.kts",
//!     "minSdk = {{AndroidApiVersion.a}}\ntargetSdk = {{AndroidApiVersion.b}}",
//! )?];
//! let store = ParameterStore::new()
//!     .with("AndroidApiVersion.a", 24)?
//!     .with("AndroidApiVersion.b", 34)?;
//! let rules = [Rule::ordering(
//!     "min-le-target",
//!     &["AndroidApiVersion.a", "AndroidApiVersion.b"],
//!     Order::Ascending,
//! )?];
//!
//! let scaffold = ScaffoldService::default().materialize(&templates, &store, &rules)?;
//! assert_eq!(
//!     scaffold.get("app/build.gradle.kts"),
//!     Some("minSdk = 24\ntargetSdk = 34")
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        Diagnostic, Outcome, Scaffold, ScaffoldFailure, ScaffoldService,
        ports::{BaselineProvider, Filesystem, Stringifier},
    };
    pub use crate::domain::{
        NoBaselines, Order, ParamPath, ParameterStore, PlainStringifier, Rule, Schema, Template,
        Value, ValueKind, Violation, ViolationKind,
    };
    pub use crate::error::{StampError, StampResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

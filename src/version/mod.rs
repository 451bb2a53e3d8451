//! Version resolution layer
//!
//! Turns classified specifiers into concrete Julia versions.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Catalogue  │────▶│    Batch    │◀────│   Project   │
//! │(versions.js)│     │ (orchestr.) │     │(compat,pin) │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        │                   │                   │
//!        ▼                   ▼                   ▼
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Nightly   │     │  Resolver   │────▶│    Range    │
//! │  (prober)   │     │ (one spec)  │     │ (npm rules) │
//! └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`batch`]: Resolves a list of specifiers with the missing-version policy
//! - [`catalogue`]: `versions.json` types and the catalogue trait
//! - [`compat`]: Julia `[compat]` entry to range translation
//! - [`nightly`]: Nightly platform table, artifact URLs and the prober trait
//! - [`range`]: npm-style version ranges
//! - [`registries`]: HTTP implementations of the catalogue and prober
//! - [`resolver`]: Resolution of a single specifier
//! - [`error`]: Error types for fetching and resolution
//! - [`semver`]: Shared semver utilities

pub mod batch;
pub mod catalogue;
pub mod compat;
pub mod error;
pub mod nightly;
pub mod range;
pub mod registries;
pub mod resolver;
pub mod semver;

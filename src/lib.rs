//! # Arkham Horror MCP
//!
//! Scenario and card data for Arkham Horror: The Card Game, served over a
//! REST API, the Model Context Protocol, and a CLI.
//!
//! Scenarios are scraped from a community listing page and cached for the
//! life of the process. Cards are fetched live from the public card
//! database on every request. Both can be searched with exact or fuzzy
//! name matching.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │   Fetcher    │──▶│ ScenarioCache│──▶│   Catalog    │
//! │ scrape + API │   │  (one fill)  │   │ search/notes │
//! └──────────────┘   └──────────────┘   └──────┬───────┘
//!                                              │
//!                      ┌───────────────────────┼──────────────┐
//!                      ▼                       ▼              ▼
//!                 ┌──────────┐           ┌──────────┐   ┌──────────┐
//!                 │   CLI    │           │   REST   │   │   MCP    │
//!                 │ (arkham) │           │  (axum)  │   │ http/io  │
//!                 └──────────┘           └──────────┘   └──────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`error`] | Typed catalog errors |
//! | [`models`] | Scenario, card, and search result records |
//! | [`html`] | Minimal HTML slicing for the scenario pages |
//! | [`metadata`] | Player counts and difficulty from free text |
//! | [`similarity`] | Ratcliff/Obershelp name similarity |
//! | [`fetcher`] | Upstream access: scenario scraping and the card API |
//! | [`cache`] | Fill-once scenario cache |
//! | [`search`] | Filtering, fuzzy matching, result capping |
//! | [`notes`] | In-memory notes and the summary prompt |
//! | [`catalog`] | Operations shared by every surface |
//! | [`traits`] | Tool trait, built-in tools, registry |
//! | [`server`] | HTTP server |
//! | [`mcp`] | MCP protocol bridge |

pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod html;
pub mod mcp;
pub mod metadata;
pub mod models;
pub mod notes;
pub mod search;
pub mod server;
pub mod similarity;
pub mod traits;

//! Senko - selection process configuration ledger
//!
//! This library holds the configuration model for a recruitment pipeline:
//! - Stages, their task checklists and their outcome statuses
//! - Validation rules shared by all three registries
//! - Status working copies with atomic commit
//! - Configuration summary, health score, JSON export and integrity check
//! - CLI command parsing and execution
//!
//! # Example
//!
//! ```no_run
//! use senko::db::DbConnection;
//! use senko::models::CreateStageInput;
//! use senko::registry::StageRegistry;
//!
//! fn main() -> anyhow::Result<()> {
//!     let conn = DbConnection::connect()?;
//!     let mut stages = StageRegistry::load(&conn)?;
//!     stages.create_stage(CreateStageInput::new("first_interview", "一次面接"))?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod repo;
pub mod registry;
pub mod templates;
pub mod validation;
pub mod summary;
pub mod cli;
pub mod utils;

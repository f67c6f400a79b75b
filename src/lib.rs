//! # conflict-finder - method patch conflicts between RPG Maker plugins
//!
//! RPG Maker MV/MZ plugins change the engine by reassigning methods on its
//! built-in classes. When two plugins touch the same method, the one that
//! loads later decides what survives. This crate reads a project without
//! running any of its scripts and reports:
//!
//! - every edit made to every method, in load order, classified as an
//!   overwrite, override, patch or mixin
//! - pairs of edits where one silently discards the other
//! - a plugin load order that avoids the conflicts worth fixing
//!
//! ## Quick Start
//!
//! ```
//! use conflict_finder::analysis::Analysis;
//! use conflict_finder::config::AnalysisConfig;
//! use conflict_finder::source::{Origin, SourceFile};
//!
//! let files = vec![
//!     SourceFile::parse(
//!         "A.js",
//!         "Game_Actor.prototype.gainHp = function(v) { this._hp += v; };".to_string(),
//!         Origin::Plugin,
//!     )
//!     .unwrap(),
//!     SourceFile::parse(
//!         "B.js",
//!         "var _gainHp = Game_Actor.prototype.gainHp;\n\
//!          Game_Actor.prototype.gainHp = function(v) { _gainHp.call(this, v * 2); };"
//!             .to_string(),
//!         Origin::Plugin,
//!     )
//!     .unwrap(),
//! ];
//! let analysis = Analysis::run(&files, &AnalysisConfig::default());
//! assert!(analysis.conflicts().is_empty());
//! assert_eq!(analysis.suggest_order().groups, vec![vec!["A.js", "B.js"]]);
//! ```
//!
//! ## Whole projects
//!
//! ```no_run
//! use std::path::Path;
//! use conflict_finder::config::AnalysisConfig;
//! use conflict_finder::project::{analyze_project, DiskReader};
//!
//! let analysis = analyze_project(Path::new("MyGame"), &DiskReader, &AnalysisConfig::default())?;
//! for group in analysis.suggest_order().groups {
//!     println!("{}", group.join(", "));
//! }
//! # Ok::<(), conflict_finder::error::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - **[`parser`]** - pest lexer, recursive descent parser and ESTree AST
//! - **[`source`]** - parsed files with parent links and line lookup
//! - **[`analysis`]** - matcher, inheritance, edit histories, conflicts, order
//! - **[`project`]** - engine detection, plugin list decoding, file loading
//! - **[`config`]** and **[`error`]**

#[macro_use]
extern crate lazy_static;

pub mod analysis;
pub mod config;
pub mod error;
pub mod parser;
pub mod project;
pub mod source;

pub use analysis::Analysis;
pub use config::AnalysisConfig;
pub use error::{Error, Result};

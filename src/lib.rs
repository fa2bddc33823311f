//! Element classification, button prioritization and guarded clicking for
//! pages in an already running browser.
//!
//! The pipeline runs one way: a `DomSnapshot` from the browser is enriched
//! element by element (`element`), buttons and fields are discovered from it
//! (`button`, `field`), and the `Orchestrator` clicks or fills them through a
//! `Session` while the `TypingGuard` holds clicks on inputs that are still
//! being typed into.

pub mod analysis;
pub mod browser;
pub mod button;
pub mod cli;
pub mod dom;
pub mod element;
pub mod field;
pub mod guard;
pub mod orchestrator;
pub mod report;
pub mod trace;

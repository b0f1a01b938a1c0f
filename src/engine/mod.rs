//! # Engine Module
//!
//! Internal ECS core implementation.
//!
//! This module contains all core building blocks:
//! - Archetype identity and the archetype set
//! - Entity handles and the generational directory
//! - Type-erased column and table storage
//! - The world façade and structural transitions
//! - Bulk iteration
//!
//! Public API exposure is controlled by `lib.rs`.

pub mod types;
pub mod error;
pub mod component;
pub mod archetype;
pub mod storage;
pub mod table;
pub mod entity;
pub mod world;
pub mod query;

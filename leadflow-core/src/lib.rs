//! Leadflow Core
//!
//! Core types shared by the Leadflow orchestration engine and its host.
//!
//! This crate contains:
//! - Domain types: Jobs, job statuses, pipeline and step definitions, runs
//! - DTOs: Request bodies exchanged with the Job Store and the Job Executor

pub mod domain;
pub mod dto;

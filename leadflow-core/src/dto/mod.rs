//! Data Transfer Objects
//!
//! Request bodies exchanged with the Job Store and the Job Executor.

pub mod job;

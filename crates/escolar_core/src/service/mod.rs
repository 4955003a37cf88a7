//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep CLI/report layers decoupled from storage details.

pub mod registrar;
pub mod student_record;

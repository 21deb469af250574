//! Shared utilities and common types for the inventory backend.
//!
//! This crate provides functionality used across the other crates:
//! - JWT issuing and validation
//! - Password hashing with Argon2id
//! - Offset pagination arithmetic
//! - Common validation logic

pub mod jwt;
pub mod pagination;
pub mod password;
pub mod validation;

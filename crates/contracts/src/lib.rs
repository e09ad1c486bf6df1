//! Shared types between the frontend and the backend REST API.

pub mod domain;

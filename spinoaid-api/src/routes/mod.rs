/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Liveness and health check endpoints
/// - `auth`: Authentication endpoints (register, login, me)
/// - `patients`: Patient record CRUD
/// - `annotations`: Annotation save, list and delete
/// - `images`: Image upload
/// - `analysis`: Image analysis

pub mod analysis;
pub mod annotations;
pub mod auth;
pub mod health;
pub mod images;
pub mod patients;

//! Business logic services.
//!
//! Services contain the logic between HTTP handlers and the stores.

pub mod draft_service;
pub mod pdf_converter;
pub mod pdf_service;
pub mod template_helpers;

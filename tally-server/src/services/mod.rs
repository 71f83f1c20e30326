//! Long-lived service components outside the request/response cycle

pub mod backup;
pub mod image;
pub mod image_cleaner;
pub mod upload_session;

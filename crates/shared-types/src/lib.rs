pub mod error;
pub mod feature_flags;

// Identity and request envelope
pub mod common;
pub mod models;

// Practice domain modules
pub mod activity;
pub mod case;
pub mod client;
pub mod dashboard;
pub mod document;
pub mod hearing;
pub mod notification;
pub mod payment;
pub mod schedule;

pub use error::*;
pub use feature_flags::*;
pub use models::*;

pub use activity::*;
pub use case::*;
pub use client::*;
pub use common::*;
pub use dashboard::*;
pub use document::*;
pub use hearing::*;
pub use notification::*;
pub use payment::*;
pub use schedule::*;

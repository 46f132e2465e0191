pub mod app;

pub mod auth;

pub mod config;

pub mod db;

pub mod error_convert;

pub mod health;

pub mod logging;

pub mod rate_limit;

pub mod razorpay;

// Practice-management domain
pub mod repo;

pub mod rest;

pub mod storage;

pub mod supabase;

pub mod telemetry;

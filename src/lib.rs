//! # HOS Rust Backend
//!
//! Hours-of-Service compliant trip scheduling engine.
//!
//! This crate provides a Rust backend for tracking commercial driving trips and
//! generating HOS-compliant duty logs and route plans. Given a planned route
//! (distance, duration, waypoint geometry) it produces a day-by-day sequence of
//! duty-status intervals (driving, on-duty, off-duty, sleeper-berth) that
//! satisfies U.S. federal driving-time regulations, together with per-day
//! summary sheets and fuel-stop annotations. The backend exposes a REST API via
//! Axum for the frontend.
//!
//! ## Features
//!
//! - **Duty-Schedule Generation**: multi-day duty logs obeying the 11-hour
//!   driving limit and the 30-minute break cadence
//! - **Daily Summaries**: per-status hour totals validated against the 24-hour
//!   day invariant
//! - **Route Planning**: pluggable route providers with a haversine fallback
//!   estimate when the external service is unavailable
//! - **Fuel-Stop Planning**: fixed-interval refueling stops with nearby-station
//!   lookup and geographic fallback search
//! - **HTTP API**: RESTful endpoints for trip and log management
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`api`]: Domain types and Data Transfer Objects (DTOs)
//! - [`models`]: Duration arithmetic and great-circle geometry utilities
//! - [`config`]: Regulatory constants as a single injected configuration
//! - [`scheduler`]: The duty-schedule generator state machine
//! - [`services`]: Business logic (summaries, fuel stops, routing, trips)
//! - [`db`]: Repository pattern and persistence abstraction
//! - [`http`]: Axum-based HTTP server and request handlers

pub mod api;
pub mod config;

pub mod db;
pub mod models;

pub mod scheduler;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;

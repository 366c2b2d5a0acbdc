// File: services/clinic_backend/src/lib.rs
pub mod app;

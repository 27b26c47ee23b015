//! Intake Relay - Guided intake and AI chat backend
//!
//! This crate routes chat messages between end users (web chat and a
//! WhatsApp webhook) and an LLM provider, walking new users through a
//! lawyer-editable intake questionnaire whose answers are persisted as leads.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

//! Folio: a personal portfolio server with a career assistant grounded in
//! the site's own content.

pub mod activity;
pub mod chat;
pub mod config;
pub mod contact;
pub mod content;
pub mod error;
pub mod feeds;
pub mod llm;
pub mod logger;
pub mod presentation;
pub mod runtime;
pub mod web;

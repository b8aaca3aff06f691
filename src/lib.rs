//! DevScribe: a server-rendered developer blog over a hosted headless CMS.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;

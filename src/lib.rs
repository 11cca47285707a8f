//! speechbox-rs: text-to-speech with an offline and a cloud engine.
//!
//! Input text is cleaned and validated before it reaches a backend, generated
//! audio is kept in a working directory for replay or download, and files
//! older than the retention window are removed on each new request.

pub mod backend;
pub mod cli;
pub mod config;
pub mod engine;
pub mod history;
pub mod storage;
pub mod text;

//! # pos-web — Interfaces do etiquetador POS
//!
//! - [`app`]: servidor HTTP/WebSocket (binário `pos-web`)
//! - [`config`]: argumentos de linha de comando compartilhados com o console (`pos-console`)

pub mod app;
pub mod config;

//! photo-deck
//!
//! 画像を取り込んでセッションに保持し、1画像1ページのPDFとして書き出す。

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod intake;
pub mod logging;
pub mod preview;
pub mod session;

//! 電動工具安全検査ツール
//!
//! 状態モデル（ストア・トグル規則・画面遷移）は inspect_ai_common にあり、
//! このクレートは外部API・写真取り込み・対話フロー・CLIを扱う。

pub mod analyzer;
pub mod capture;
pub mod cli;
pub mod config;
pub mod error;
pub mod interactive;
pub mod jwt;
pub mod session;

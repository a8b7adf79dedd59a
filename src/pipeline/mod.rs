//! Pipeline stages for PDF topic classification.
//!
//! Each submodule implements exactly one step. Stages hand complete values
//! to each other; nothing is streamed.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ segment ──▶ llm ──▶ sink
//! (path)    (pdfium)    (chunks)   (topic)  (CSV)
//! ```
//!
//! 1. [`input`]   — check the path exists, is readable and starts with `%PDF`
//! 2. [`extract`] — concatenate every page's text layer; runs in
//!    `spawn_blocking` because pdfium is not async-safe
//! 3. [`segment`] — split on blank lines and re-chunk over-long paragraphs
//! 4. [`llm`]     — one classification request per chunk; the only stage
//!    with network I/O
//! 5. [`sink`]    — write the `text,topic` table

pub mod extract;
pub mod input;
pub mod llm;
pub mod segment;
pub mod sink;

//! Pipeline stages for transcript-to-bullets summarisation.
//!
//! Each submodule implements exactly one transformation step so each can be
//! tested on its own. Only [`llm`] performs I/O.
//!
//! ## Data Flow
//!
//! ```text
//! transcript ──▶ chunk ──▶ llm ──▶ normalize ──▶ render
//!               (windows)  (raw)   (BulletList)  (PDF bytes)
//! ```
//!
//! 1. [`chunk`]     : split the transcript into overlapping windows
//! 2. [`llm`]       : send the joined context to the model with retry/backoff
//! 3. [`normalize`] : turn the free-form response into a unique, ordered
//!    bullet list using the pattern tables in [`rules`]
//! 4. [`render`]    : re-clean the bullets and lay them out as a PDF with
//!    genpdf and the embedded DejaVu Sans fonts

pub mod chunk;
pub mod llm;
pub mod normalize;
pub mod render;
pub mod rules;

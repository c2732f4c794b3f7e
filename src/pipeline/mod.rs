//! Pure conversion stages run before and after the runtime call.
//!
//! ```text
//! input  ─▶ options ─▶ [runtime export] ─▶ pages
//! bytes     wire JSON                      reassembled SvgPage list
//! ```

pub mod input;
pub mod options;
pub mod pages;

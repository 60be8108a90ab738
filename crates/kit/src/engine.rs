// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The narrow interface the core consumes from the document engine (§6.2).
//!
//! The engine itself (text layout, formula evaluation) is out of scope;
//! this trait names only the entry points `Document`, `ChildSession`, and
//! `RenderDispatcher` call, so tests can substitute a fake engine without
//! linking a real layout/rendering library.

/// Why a password-gated load attempt did not immediately succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordOutcome {
    RequiredToView,
    RequiredToModify,
    Wrong,
}

/// A pixel buffer an engine paint call fills, handed back to
/// [`crate::png_cache::PngCache`] for encoding.
#[derive(Debug, Clone)]
pub struct Pixmap {
    pub width: u32,
    pub height: u32,
    /// Tightly packed 8-bit RGBA rows, `width * height * 4` bytes.
    pub rgba: Vec<u8>,
}

impl Pixmap {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, rgba: vec![0; width as usize * height as usize * 4] }
    }
}

/// Entry points the core calls into the document engine. Every call except
/// construction must be preceded by `set_view` under the document mutex
/// (§5) — enforced by callers, not by this trait.
pub trait DocumentEngine: Send {
    /// Open the document at `uri`, returning an opaque handle identifier.
    /// Called exactly once per document (§4.6 `on_load`'s one-at-a-time
    /// gate); subsequent sessions only call `create_view`.
    fn document_load(&mut self, uri: &str, password: Option<&str>) -> Result<(), crate::error::KitError>;

    /// Report why `document_load`/`create_view` needs a password, if any.
    fn password_outcome(&self) -> Option<PasswordOutcome>;

    fn create_view(&mut self) -> Result<i32, crate::error::KitError>;
    fn destroy_view(&mut self, view_id: i32);
    fn set_view(&mut self, view_id: i32);
    fn get_view(&self) -> i32;
    fn get_view_ids(&self) -> Vec<i32>;

    /// Paint the given document-coordinate rectangle into a pixel buffer
    /// sized for `px_w`/`px_h`.
    #[allow(clippy::too_many_arguments)]
    fn paint_part_tile(
        &mut self,
        part: i32,
        px_w: u32,
        px_h: u32,
        doc_x: i64,
        doc_y: i64,
        doc_w: i64,
        doc_h: i64,
    ) -> Result<Pixmap, crate::error::KitError>;

    /// Query a `.uno:` command's current value(s), e.g.
    /// `.uno:TrackedChangeAuthors` for `notify_view_info`'s author colors.
    fn get_command_values(&mut self, command: &str) -> Result<String, crate::error::KitError>;

    fn post_unocommand(&mut self, name: &str, args: &str, notify: bool);
}

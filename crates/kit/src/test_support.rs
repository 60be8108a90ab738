// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A minimal in-memory [`DocumentEngine`] for tests, so `Document` and
//! `RenderDispatcher` can be exercised without a real layout engine.

use crate::engine::{DocumentEngine, PasswordOutcome, Pixmap};
use crate::error::KitError;

pub struct FakeEngine {
    next_view_id: i32,
    views: Vec<i32>,
    current_view: i32,
    pub required_password: Option<String>,
    pub loaded: bool,
    pub command_values: String,
    pub fail_paint: bool,
}

impl Default for FakeEngine {
    fn default() -> Self {
        Self {
            next_view_id: 0,
            views: Vec::new(),
            current_view: -1,
            required_password: None,
            loaded: false,
            command_values: "{}".to_string(),
            fail_paint: false,
        }
    }
}

impl DocumentEngine for FakeEngine {
    fn document_load(&mut self, _uri: &str, password: Option<&str>) -> Result<(), KitError> {
        if let Some(required) = &self.required_password {
            if password != Some(required.as_str()) {
                return Ok(());
            }
        }
        self.loaded = true;
        Ok(())
    }

    fn password_outcome(&self) -> Option<PasswordOutcome> {
        if self.required_password.is_some() && !self.loaded {
            Some(PasswordOutcome::RequiredToView)
        } else {
            None
        }
    }

    fn create_view(&mut self) -> Result<i32, KitError> {
        let id = self.next_view_id;
        self.next_view_id += 1;
        self.views.push(id);
        self.current_view = id;
        Ok(id)
    }

    fn destroy_view(&mut self, view_id: i32) {
        self.views.retain(|&v| v != view_id);
    }

    fn set_view(&mut self, view_id: i32) {
        self.current_view = view_id;
    }

    fn get_view(&self) -> i32 {
        self.current_view
    }

    fn get_view_ids(&self) -> Vec<i32> {
        self.views.clone()
    }

    fn paint_part_tile(
        &mut self,
        _part: i32,
        px_w: u32,
        px_h: u32,
        _doc_x: i64,
        _doc_y: i64,
        _doc_w: i64,
        _doc_h: i64,
    ) -> Result<Pixmap, KitError> {
        if self.fail_paint {
            return Err(KitError::engine("tile", "fake paint failure"));
        }
        Ok(Pixmap::new(px_w, px_h))
    }

    fn get_command_values(&mut self, _command: &str) -> Result<String, KitError> {
        Ok(self.command_values.clone())
    }

    fn post_unocommand(&mut self, _name: &str, _args: &str, _notify: bool) {}
}

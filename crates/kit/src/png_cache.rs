// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Content-addressed cache mapping a pixel-region hash to an encoded PNG,
//! self-balancing by hit-count (§4.5).
//!
//! Per-document, accessed only from the dispatcher thread (§5) — no
//! synchronization here, unlike [`crate::tile_queue::TileQueue`].

use std::collections::HashMap;
use std::io::Cursor;

use image::{codecs::png::PngEncoder, ExtendedColorType, ImageEncoder};
use tracing::{debug, trace};

use crate::error::KitError;

/// Soft budget in bytes before a rebalance pass runs.
pub const DEFAULT_BUDGET_BYTES: u64 = 128 * 1024;

struct Entry {
    bytes: Vec<u8>,
    hit_count: u64,
}

/// Content-addressed image cache. Keyed by a 64-bit hash of the source
/// pixel region, not by tile identity — two different tiles whose pixels
/// happen to match (a blank background, an unchanged toolbar) share an
/// entry.
pub struct PngCache {
    entries: HashMap<u64, Entry>,
    total_bytes: u64,
    budget_bytes: u64,
}

impl Default for PngCache {
    fn default() -> Self {
        Self::new(DEFAULT_BUDGET_BYTES)
    }
}

impl PngCache {
    pub fn new(budget_bytes: u64) -> Self {
        Self { entries: HashMap::new(), total_bytes: 0, budget_bytes }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Encode a full `w`×`h` RGBA pixmap, from cache on a content hit.
    pub fn encode(&mut self, rgba: &[u8], w: u32, h: u32) -> Result<Vec<u8>, KitError> {
        self.encode_region(rgba, w, h)
    }

    /// Encode a `w`×`h` sub-rectangle starting at `(src_x, src_y)` within a
    /// larger `buffer_w`×`buffer_h` pixmap. The hash and the encoded
    /// region both cover only the sub-rectangle, so two calls extracting
    /// identical pixel content — even from different source buffers — hit
    /// the same cache entry.
    #[allow(clippy::too_many_arguments)]
    pub fn encode_sub(
        &mut self,
        rgba: &[u8],
        src_x: u32,
        src_y: u32,
        w: u32,
        h: u32,
        buffer_w: u32,
        _buffer_h: u32,
    ) -> Result<Vec<u8>, KitError> {
        let mut region = Vec::with_capacity(w as usize * h as usize * 4);
        for row in 0..h {
            let start = ((src_y + row) * buffer_w + src_x) as usize * 4;
            let end = start + w as usize * 4;
            region.extend_from_slice(&rgba[start..end]);
        }
        self.encode_region(&region, w, h)
    }

    fn encode_region(&mut self, rgba: &[u8], w: u32, h: u32) -> Result<Vec<u8>, KitError> {
        let hash = hash_region(rgba, w, h);
        if let Some(entry) = self.entries.get_mut(&hash) {
            entry.hit_count += 1;
            trace!(hash, hit_count = entry.hit_count, "png cache hit");
            return Ok(entry.bytes.clone());
        }

        let bytes = encode_png(rgba, w, h)?;
        self.total_bytes += bytes.len() as u64;
        self.entries.insert(hash, Entry { bytes: bytes.clone(), hit_count: 0 });
        trace!(hash, bytes = bytes.len(), "png cache miss, encoded");

        if self.total_bytes > self.budget_bytes {
            self.rebalance();
        }

        Ok(bytes)
    }

    /// Evict every entry at or below the mean hit-count, then halve the
    /// hit-count of survivors, so repeatedly-requested tiles age out
    /// slower than one-off previews.
    fn rebalance(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        let mean = self.entries.values().map(|e| e.hit_count).sum::<u64>() / self.entries.len() as u64;

        let before = self.entries.len();
        self.entries.retain(|_, e| e.hit_count > mean);
        let evicted = before - self.entries.len();

        self.total_bytes = self.entries.values().map(|e| e.bytes.len() as u64).sum();
        for entry in self.entries.values_mut() {
            entry.hit_count /= 2;
        }
        debug!(evicted, mean, remaining = self.entries.len(), total_bytes = self.total_bytes, "png cache rebalanced");
    }
}

fn hash_region(rgba: &[u8], w: u32, h: u32) -> u64 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&w.to_le_bytes());
    hasher.update(&h.to_le_bytes());
    hasher.update(rgba);
    let digest = hasher.finalize();
    let d = digest.as_bytes();
    u64::from_le_bytes([d[0], d[1], d[2], d[3], d[4], d[5], d[6], d[7]])
}

fn encode_png(rgba: &[u8], w: u32, h: u32) -> Result<Vec<u8>, KitError> {
    let expected = w as usize * h as usize * 4;
    if rgba.len() != expected {
        return Err(KitError::engine(
            "paint",
            format!("pixel buffer is {} bytes, expected {expected} for {w}x{h}", rgba.len()),
        ));
    }
    let mut out = Cursor::new(Vec::new());
    PngEncoder::new(&mut out)
        .write_image(rgba, w, h, ExtendedColorType::Rgba8)
        .map_err(|e| KitError::engine("paint", format!("png encode failed: {e}")))?;
    Ok(out.into_inner())
}

#[cfg(test)]
#[path = "png_cache_tests.rs"]
mod tests;

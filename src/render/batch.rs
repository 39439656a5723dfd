//! CPU-side vertex/index batch for one flush.

use crate::layout::GlyphQuad;

/// Glyph ceiling per batch. 4 vertices each keeps every index within `u16`.
pub const MAX_GLYPHS: usize = 4096;

/// Bytes per vertex: position (8) + uv (8) + color (16).
pub const VERTEX_STRIDE: u64 = 32;

/// One corner of a glyph quad.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
    pub color: [f32; 4],
}

/// Glyph quads awaiting submission, as indexed triangles.
///
/// Quads past [`MAX_GLYPHS`] are counted and dropped; the batch never
/// holds a partial quad.
#[derive(Debug, Default)]
pub struct Batch {
    vertices: Vec<Vertex>,
    indices: Vec<u16>,
    dropped: usize,
}

impl Batch {
    pub fn new() -> Self {
        Self {
            vertices: Vec::with_capacity(MAX_GLYPHS * 4),
            indices: Vec::with_capacity(MAX_GLYPHS * 6),
            dropped: 0,
        }
    }

    /// Append one quad (TL, TR, BR, BL; two triangles). Returns `false` and
    /// counts a drop when the batch is full.
    pub fn push_quad(&mut self, q: &GlyphQuad) -> bool {
        if self.glyph_count() >= MAX_GLYPHS {
            self.dropped += 1;
            return false;
        }
        let base = self.vertices.len() as u16;
        self.vertices.extend_from_slice(&[
            Vertex {
                position: [q.x0, q.y0],
                uv: [q.u0, q.v0],
                color: q.color,
            },
            Vertex {
                position: [q.x1, q.y0],
                uv: [q.u1, q.v0],
                color: q.color,
            },
            Vertex {
                position: [q.x1, q.y1],
                uv: [q.u1, q.v1],
                color: q.color,
            },
            Vertex {
                position: [q.x0, q.y1],
                uv: [q.u0, q.v1],
                color: q.color,
            },
        ]);
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
        true
    }

    /// Append every quad, logging how many did not fit.
    pub fn extend(&mut self, quads: &[GlyphQuad]) {
        let before = self.dropped;
        for q in quads {
            self.push_quad(q);
        }
        let lost = self.dropped - before;
        if lost > 0 {
            log::debug!("batch: full at {MAX_GLYPHS} glyphs, dropped {lost}");
        }
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn glyph_count(&self) -> usize {
        self.vertices.len() / 4
    }

    /// Quads dropped for capacity since the batch was created.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    /// Vertex data in native byte order, [`VERTEX_STRIDE`] bytes each.
    pub fn vertex_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.vertices.len() * VERTEX_STRIDE as usize);
        for v in &self.vertices {
            for f in v.position.iter().chain(&v.uv).chain(&v.color) {
                out.extend_from_slice(&f.to_ne_bytes());
            }
        }
        out
    }

    /// Index data in native byte order. Always a multiple of 4 bytes since
    /// every quad adds 6 indices.
    pub fn index_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.indices.len() * 2);
        for i in &self.indices {
            out.extend_from_slice(&i.to_ne_bytes());
        }
        out
    }
}

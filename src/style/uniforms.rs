//! Per-flush uniform block and its byte layout.

/// Size of the uniform block in bytes (WGSL `Uniforms`, 16-byte aligned).
pub const UNIFORM_SIZE: usize = 128;

/// Parameters shared by every shading variant.
///
/// Byte layout (matches the WGSL struct):
///
/// | offset | field |
/// |-------:|-------|
/// | 0      | projection (`mat4x4<f32>`, column-major) |
/// | 64     | glow color |
/// | 80     | outline color |
/// | 96     | time, glow intensity, glow radius, outline width |
/// | 112    | resolution (`vec2<f32>`) |
/// | 120    | softness |
/// | 124    | light intensity |
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Uniforms {
    pub projection: [f32; 16],
    pub glow_color: [f32; 4],
    pub outline_color: [f32; 4],
    pub time: f32,
    pub glow_intensity: f32,
    pub glow_radius: f32,
    pub outline_width: f32,
    pub resolution: [f32; 2],
    pub softness: f32,
    pub light_intensity: f32,
}

impl Uniforms {
    /// Serialize in native byte order for `queue.write_buffer`.
    pub fn to_bytes(&self) -> [u8; UNIFORM_SIZE] {
        let mut bytes = [0u8; UNIFORM_SIZE];
        let params = [
            self.time,
            self.glow_intensity,
            self.glow_radius,
            self.outline_width,
        ];
        let tail = [self.softness, self.light_intensity];
        let fields = self
            .projection
            .iter()
            .chain(&self.glow_color)
            .chain(&self.outline_color)
            .chain(&params)
            .chain(&self.resolution)
            .chain(&tail);
        for (i, v) in fields.enumerate() {
            bytes[i * 4..i * 4 + 4].copy_from_slice(&v.to_ne_bytes());
        }
        bytes
    }
}

/// Orthographic projection mapping pixel coordinates (origin top-left, Y
/// down) to clip space. Column-major.
pub fn ortho_projection(w: f32, h: f32) -> [f32; 16] {
    [
        2.0 / w,
        0.0,
        0.0,
        0.0,
        0.0,
        -2.0 / h,
        0.0,
        0.0,
        0.0,
        0.0,
        1.0,
        0.0,
        -1.0,
        1.0,
        0.0,
        1.0,
    ]
}

/// Apply a column-major projection to a 2D point, returning clip-space x/y.
#[cfg(test)]
pub(crate) fn project(m: &[f32; 16], x: f32, y: f32) -> [f32; 2] {
    [m[0] * x + m[4] * y + m[12], m[1] * x + m[5] * y + m[13]]
}

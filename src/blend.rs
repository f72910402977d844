// Gamma-correct "over" blending for translucent overlays (grid lines, the
// dimmed fullscreen backdrop). Table lookups replace powf in the hot loop.

use crate::types::Color;

pub struct GammaLut {
    // sRGB(0..255) -> linear (0..1) as f32
    srgb_to_linear: [f32; 256],
    // linear(0..1) -> sRGB(0..255) via 4096-step quantization
    // (index = (linear * 4095).round())
    linear_to_srgb: [u8; 4096],
}

impl Default for GammaLut {
    fn default() -> Self {
        Self::new()
    }
}

impl GammaLut {
    /// Build both tables once at startup.
    pub fn new() -> Self {
        let mut s2l = [0.0f32; 256];
        for (v, out) in s2l.iter_mut().enumerate() {
            let c = v as f32 / 255.0;
            *out = if c <= 0.04045 { c / 12.92 } else { ((c + 0.055) / 1.055).powf(2.4) };
        }

        let mut l2s = [0u8; 4096];
        for (i, out) in l2s.iter_mut().enumerate() {
            let l = i as f32 / 4095.0;
            let s = if l <= 0.003_130_8 { 12.92 * l } else { 1.055 * l.powf(1.0 / 2.4) - 0.055 };
            *out = (s * 255.0).round().clamp(0.0, 255.0) as u8;
        }

        Self { srgb_to_linear: s2l, linear_to_srgb: l2s }
    }

    #[inline]
    pub fn srgb_u8_to_linear(&self, v: u8) -> f32 {
        self.srgb_to_linear[v as usize]
    }

    #[inline]
    pub fn linear_to_srgb_u8(&self, l: f32) -> u8 {
        let idx = (l.clamp(0.0, 1.0) * 4095.0).round() as usize;
        self.linear_to_srgb[idx]
    }

    /// Composite `src` (with its alpha) over an opaque 0x00RRGGBB pixel.
    pub fn blend_over(&self, dst: u32, src: Color) -> u32 {
        match src.a {
            0 => return dst,
            255 => return src.to_rgb_u32(),
            _ => {}
        }
        let a = src.a as f32 / 255.0;
        let mix = |d: u32, s: u8| -> u32 {
            let dl = self.srgb_u8_to_linear(d as u8);
            let sl = self.srgb_u8_to_linear(s);
            self.linear_to_srgb_u8(dl + (sl - dl) * a) as u32
        };
        let r = mix((dst >> 16) & 0xFF, src.r);
        let g = mix((dst >> 8) & 0xFF, src.g);
        let b = mix(dst & 0xFF, src.b);
        (r << 16) | (g << 8) | b
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_round_trip() {
        let lut = GammaLut::new();
        for v in [0u8, 1, 64, 128, 200, 255] {
            assert_eq!(lut.linear_to_srgb_u8(lut.srgb_u8_to_linear(v)), v);
        }
    }

    #[test]
    fn test_blend_over_extremes() {
        let lut = GammaLut::new();
        let dst = 0x00_12_34_56;
        assert_eq!(lut.blend_over(dst, Color::TRANSPARENT), dst);
        assert_eq!(lut.blend_over(dst, Color::RED), 0x00_FF_00_00);
    }

    #[test]
    fn test_half_black_darkens() {
        let lut = GammaLut::new();
        let out = lut.blend_over(0x00_FF_FF_FF, Color::rgba(0, 0, 0, 128));
        let r = (out >> 16) & 0xFF;
        assert!(r > 0 && r < 255);
        assert_eq!(out & 0xFF, r);
    }
}

use crate::GrayImage;

// Separable 5-tap binomial kernel, a close integer approximation of a
// Gaussian with sigma ~ 1.
const KERNEL: [u32; 5] = [1, 4, 6, 4, 1];
const KERNEL_SUM: u32 = 16;

#[inline]
fn clamp_idx(i: i32, n: usize) -> usize {
    i.clamp(0, n as i32 - 1) as usize
}

/// 5x5 Gaussian smoothing with edge clamping, applied before edge
/// detection to suppress sensor noise.
pub fn gaussian_blur_5(src: &GrayImage) -> GrayImage {
    let (w, h) = (src.width, src.height);
    let mut tmp = vec![0u8; w * h];

    // horizontal pass
    for y in 0..h {
        let row = &src.data[y * w..(y + 1) * w];
        for x in 0..w {
            let mut acc = 0u32;
            for (k, &kv) in KERNEL.iter().enumerate() {
                let xi = clamp_idx(x as i32 + k as i32 - 2, w);
                acc += kv * row[xi] as u32;
            }
            tmp[y * w + x] = (acc / KERNEL_SUM) as u8;
        }
    }

    // vertical pass
    let mut out = vec![0u8; w * h];
    for y in 0..h {
        for x in 0..w {
            let mut acc = 0u32;
            for (k, &kv) in KERNEL.iter().enumerate() {
                let yi = clamp_idx(y as i32 + k as i32 - 2, h);
                acc += kv * tmp[yi * w + x] as u32;
            }
            out[y * w + x] = (acc / KERNEL_SUM) as u8;
        }
    }

    GrayImage {
        width: w,
        height: h,
        data: out,
    }
}

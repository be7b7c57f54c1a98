//! Channel sums over packed RGBA8 pixels

use multiversion::multiversion;

/// Sum the R, G and B channels of a run of RGBA pixels. Alpha is ignored.
#[multiversion(targets("x86_64+avx2", "x86_64+sse4.1", "aarch64+neon",))]
pub fn sum_rgba_batch(pixels: &[[u8; 4]]) -> [u64; 3] {
    // u32 lanes vectorize well; flush before they can overflow
    const FLUSH: usize = 1 << 16;

    let mut total = [0u64; 3];
    for chunk in pixels.chunks(FLUSH) {
        let mut acc = [0u32; 3];
        for px in chunk {
            acc[0] += px[0] as u32;
            acc[1] += px[1] as u32;
            acc[2] += px[2] as u32;
        }
        total[0] += acc[0] as u64;
        total[1] += acc[1] as u64;
        total[2] += acc[2] as u64;
    }
    total
}

/// Sum R, G and B over a rectangular region of a row-major RGBA buffer
/// `stride` pixels wide. The region must lie inside the buffer.
pub fn sum_rgba_region(
    data: &[u8],
    stride: usize,
    x: usize,
    y: usize,
    width: usize,
    height: usize,
) -> [u64; 3] {
    let pixels: &[[u8; 4]] = bytemuck::cast_slice(&data[..data.len() - data.len() % 4]);

    let mut total = [0u64; 3];
    for row in y..y + height {
        let start = row * stride + x;
        let [r, g, b] = sum_rgba_batch(&pixels[start..start + width]);
        total[0] += r;
        total[1] += g;
        total[2] += b;
    }
    total
}

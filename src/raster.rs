//! Integer line rasterization between pins.
//!
//! Endpoints are rounded to the nearest pixel and traced with the all-octant
//! error-term form of Bresenham's algorithm. The walk always starts at the
//! lexicographically smaller endpoint, and the list is reversed when the
//! caller asked for the opposite direction, so `(a, b)` and `(b, a)` cover the
//! exact same pixels.
//!
//! Pixels falling outside the grid are clamped to the nearest border pixel
//! rather than dropped. Along a straight line the clamped coordinates stay
//! monotone, so any duplicates introduced by clamping are adjacent and get
//! collapsed.
use crate::pins::PinLayout;
use std::sync::OnceLock;

/// Integer pixel coordinate `[x, y]` inside the grid.
pub type Pixel = [usize; 2];

/// Rasterize the chord `p0 → p1` inside a `width × height` grid.
///
/// Total for any finite input: the result is never empty, and a degenerate
/// chord (both endpoints round to the same pixel) yields that single pixel.
/// `width` and `height` must be non-zero.
pub fn rasterize(p0: [f32; 2], p1: [f32; 2], width: usize, height: usize) -> Vec<Pixel> {
    let a = [p0[0].round() as i64, p0[1].round() as i64];
    let b = [p1[0].round() as i64, p1[1].round() as i64];
    rasterize_pixels(a, b, width, height)
}

/// Same as [`rasterize`] for endpoints already on the integer lattice.
pub fn rasterize_pixels(a: [i64; 2], b: [i64; 2], width: usize, height: usize) -> Vec<Pixel> {
    debug_assert!(width > 0 && height > 0, "rasterize requires a non-empty grid");
    let reversed = (b[0], b[1]) < (a[0], a[1]);
    let (start, end) = if reversed { (b, a) } else { (a, b) };

    let max_x = width.saturating_sub(1) as i64;
    let max_y = height.saturating_sub(1) as i64;
    let mut out: Vec<Pixel> = Vec::new();
    walk(start, end, |x, y| {
        let px = [x.clamp(0, max_x) as usize, y.clamp(0, max_y) as usize];
        if out.last() != Some(&px) {
            out.push(px);
        }
    });

    if reversed {
        out.reverse();
    }
    out
}

/// Bresenham walk from `start` to `end` inclusive.
fn walk(start: [i64; 2], end: [i64; 2], mut visit: impl FnMut(i64, i64)) {
    let [mut x, mut y] = start;
    let [x1, y1] = end;
    let dx = (x1 - x).abs();
    let dy = -(y1 - y).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        visit(x, y);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Linear pixel indices (`y * width + x`) of the chord between pins `i` and `j`.
pub fn chord_indices(
    pins: &PinLayout,
    i: usize,
    j: usize,
    width: usize,
    height: usize,
) -> Vec<u32> {
    rasterize_pixels(pins.pixel(i), pins.pixel(j), width, height)
        .into_iter()
        .map(|[x, y]| (y * width + x) as u32)
        .collect()
}

/// Lazily filled table of chord pixel lists keyed by unordered pin pair.
///
/// Entries are computed on first use and shared between threads; the stored
/// list is the rasterization from the lower to the higher pin index. Memory
/// grows with `pins² · chord length`, so caching is opt-in.
pub struct ChordCache {
    width: usize,
    height: usize,
    pins: usize,
    entries: Vec<OnceLock<Box<[u32]>>>,
}

impl ChordCache {
    pub fn new(pins: usize, width: usize, height: usize) -> Self {
        let pairs = pins * pins.saturating_sub(1) / 2;
        let mut entries = Vec::with_capacity(pairs);
        entries.resize_with(pairs, OnceLock::new);
        Self {
            width,
            height,
            pins,
            entries,
        }
    }

    /// Index of the unordered pair `{i, j}` in the triangular table.
    #[inline]
    fn slot(&self, i: usize, j: usize) -> usize {
        let (lo, hi) = if i < j { (i, j) } else { (j, i) };
        // rows 0..lo hold (pins - 1) + (pins - 2) + ... entries
        lo * (2 * self.pins - lo - 1) / 2 + (hi - lo - 1)
    }

    /// Pixel indices covered by the chord between pins `i` and `j` (`i != j`).
    pub fn get(&self, layout: &PinLayout, i: usize, j: usize) -> &[u32] {
        debug_assert!(i != j, "chords need two distinct pins");
        let (lo, hi) = if i < j { (i, j) } else { (j, i) };
        self.entries[self.slot(lo, hi)].get_or_init(|| {
            chord_indices(layout, lo, hi, self.width, self.height).into_boxed_slice()
        })
    }

    /// Number of chords computed so far.
    pub fn populated(&self) -> usize {
        self.entries.iter().filter(|e| e.get().is_some()).count()
    }
}

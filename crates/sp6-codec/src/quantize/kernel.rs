//! Error diffusion kernel definition.

/// An error diffusion kernel.
///
/// Each entry is `(dx, dy, weight)`: the neighbour at that offset from the
/// current pixel receives `error * weight / divisor`. Neighbours that fall
/// outside the image are skipped and their share is dropped, never
/// redistributed.
#[derive(Debug, Clone, Copy)]
pub struct Kernel {
    pub entries: &'static [(i32, i32, u8)],
    pub divisor: u8,
}

impl Kernel {
    /// Sum of all weights. Equals `divisor` for full-propagation kernels.
    pub fn total_weight(&self) -> u32 {
        self.entries.iter().map(|&(_, _, w)| w as u32).sum()
    }
}

/// Floyd-Steinberg kernel.
///
/// ```text
///        X   7
///    3   5   1
/// ```
pub const FLOYD_STEINBERG: Kernel = Kernel {
    entries: &[
        (1, 0, 7),  // right
        (-1, 1, 3), // below-left
        (0, 1, 5),  // below
        (1, 1, 1),  // below-right
    ],
    divisor: 16,
};

/// One RGB pixel.
pub type Rgb = [u8; 3];

/// Fixed-size RGB grid, row-major, (0, 0) top-left.
///
/// Every access is bounds-checked; the backing storage is never handed out
/// mutably.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaterfallImage {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
}

impl WaterfallImage {
    pub fn new(width: usize, height: usize, fill: Rgb) -> Self {
        Self {
            width,
            height,
            pixels: vec![fill; width * height],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgb> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Returns false (and writes nothing) when (x, y) is outside the grid.
    pub fn set_pixel(&mut self, x: usize, y: usize, color: Rgb) -> bool {
        match self.index(x, y) {
            Some(i) => {
                self.pixels[i] = color;
                true
            }
            None => false,
        }
    }

    pub fn fill(&mut self, color: Rgb) {
        self.pixels.fill(color);
    }

    /// Move every row `dx` columns to the left. The rightmost `dx` columns keep
    /// their old content until painted over.
    pub fn scroll_left(&mut self, dx: usize) {
        if dx == 0 || dx >= self.width {
            return;
        }
        let width = self.width;
        for row in self.pixels.chunks_exact_mut(width) {
            row.copy_within(dx.., 0);
        }
    }

    /// Paint columns `[x0, width)` of row `y` with one color.
    pub fn fill_row_from(&mut self, y: usize, x0: usize, color: Rgb) {
        if y >= self.height || x0 >= self.width {
            return;
        }
        let start = y * self.width;
        self.pixels[start + x0..start + self.width].fill(color);
    }

    pub fn row(&self, y: usize) -> Option<&[Rgb]> {
        (y < self.height).then(|| &self.pixels[y * self.width..(y + 1) * self.width])
    }

    /// Packed `RGBRGB...` bytes, the layout image widgets expect.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flatten().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_checked_access() {
        let mut image = WaterfallImage::new(4, 2, [0, 0, 0]);
        assert!(image.set_pixel(3, 1, [1, 2, 3]));
        assert!(!image.set_pixel(4, 0, [9, 9, 9]));
        assert!(!image.set_pixel(0, 2, [9, 9, 9]));
        assert_eq!(image.pixel(3, 1), Some([1, 2, 3]));
        assert_eq!(image.pixel(4, 1), None);
    }

    #[test]
    fn test_scroll_left_moves_rows_independently() {
        let mut image = WaterfallImage::new(5, 2, [0, 0, 0]);
        for x in 0..5 {
            image.set_pixel(x, 0, [x as u8, 0, 0]);
            image.set_pixel(x, 1, [0, x as u8, 0]);
        }
        image.scroll_left(2);

        let top: Vec<u8> = image.row(0).unwrap().iter().map(|p| p[0]).collect();
        assert_eq!(top, vec![2, 3, 4, 3, 4]);
        let bottom: Vec<u8> = image.row(1).unwrap().iter().map(|p| p[1]).collect();
        assert_eq!(bottom, vec![2, 3, 4, 3, 4]);
    }

    #[test]
    fn test_fill_row_from_and_bytes() {
        let mut image = WaterfallImage::new(3, 1, [0, 0, 0]);
        image.fill_row_from(0, 1, [0, 200, 0]);
        assert_eq!(image.to_rgb_bytes(), vec![0, 0, 0, 0, 200, 0, 0, 200, 0]);

        // Out-of-range requests are ignored
        image.fill_row_from(1, 0, [255, 255, 255]);
        image.fill_row_from(0, 3, [255, 255, 255]);
        assert_eq!(image.pixel(2, 0), Some([0, 200, 0]));
    }
}

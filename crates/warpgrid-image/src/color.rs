/// An RGB color with one byte per channel.
///
/// `Color::BLACK` doubles as the sentinel for output pixels with no valid source pixel.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color {
    /// red channel
    pub r: u8,
    /// green channel
    pub g: u8,
    /// blue channel
    pub b: u8,
}

impl Color {
    /// The out-of-bounds sentinel, `(0, 0, 0)`.
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };

    /// Create a color from its three channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// The channels as an array in `[r, g, b]` order.
    pub const fn channels(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<[u8; 3]> for Color {
    fn from(rgb: [u8; 3]) -> Self {
        Color::new(rgb[0], rgb[1], rgb[2])
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "({:3}, {:3}, {:3})", self.r, self.g, self.b)
    }
}

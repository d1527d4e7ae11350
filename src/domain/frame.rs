// Frame domain model - What a tile wants drawn, independent of pixels

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const WHITE: Color = Color::new(255, 255, 255);
    pub const GREEN: Color = Color::new(0, 255, 0);
    pub const RED: Color = Color::new(255, 0, 0);
}

/// Background template a tile is drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Background {
    Subscribers,
    Crypto,
    Finance,
}

impl Background {
    /// File name looked up in the resources directory.
    pub fn template_name(&self) -> &'static str {
        match self {
            Background::Subscribers => "youtube-background.png",
            Background::Crypto => "crypto-background.png",
            Background::Finance => "finance-background.png",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameLine {
    pub text: String,
    /// Top edge of the line, in pixels.
    pub top: i32,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub background: Background,
    pub lines: Vec<FrameLine>,
}

impl Frame {
    pub fn new(background: Background) -> Self {
        Self {
            background,
            lines: Vec::new(),
        }
    }

    pub fn line(mut self, text: impl Into<String>, top: i32, color: Color) -> Self {
        self.lines.push(FrameLine {
            text: text.into(),
            top,
            color,
        });
        self
    }
}

/// Pixel width of `chars` monospace glyphs.
pub fn text_width(chars: usize, glyph_width: u32, spacing: u32) -> u32 {
    if chars == 0 {
        return 0;
    }
    let chars = chars as u32;
    chars * glyph_width + (chars - 1) * spacing
}

/// Left offset that centers a run of text on the canvas.
///
/// Text wider than the canvas starts at the left edge and is clipped on the
/// right.
pub fn centered_offset(text_width: u32, canvas_width: u32) -> i32 {
    (canvas_width.saturating_sub(text_width) / 2) as i32
}

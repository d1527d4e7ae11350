// Image renderer - Draw frames onto small PNG bitmaps for the display
use crate::domain::frame::{Background, Color, Frame, centered_offset, text_width};
use anyhow::Context;
use embedded_graphics::{
    mono_font::{MonoFont, MonoTextStyle, ascii::FONT_4X6},
    pixelcolor::Rgb888,
    prelude::*,
    primitives::{Circle, Polyline, PrimitiveStyle, Rectangle, Triangle},
    text::{Baseline, Text},
};
use image::{ImageFormat, Rgb, RgbImage, imageops};
use std::convert::Infallible;
use std::path::PathBuf;
use tempfile::NamedTempFile;

const FONT: &MonoFont<'static> = &FONT_4X6;

const YOUTUBE_RED: Rgb888 = Rgb888::new(255, 0, 0);
const COIN_ORANGE: Rgb888 = Rgb888::new(247, 147, 26);
const CHART_BLUE: Rgb888 = Rgb888::new(0, 170, 255);

#[derive(Debug, Clone)]
pub struct FrameRenderer {
    size: u32,
    resources_dir: Option<PathBuf>,
}

impl FrameRenderer {
    pub fn new(size: u32, resources_dir: Option<PathBuf>) -> Self {
        Self {
            size: size.max(1),
            resources_dir,
        }
    }

    /// Draw a frame into a temporary PNG. The file is removed when the
    /// returned handle is dropped.
    pub fn render(&self, frame: &Frame) -> anyhow::Result<NamedTempFile> {
        let image = self.draw(frame)?;

        let file = tempfile::Builder::new()
            .prefix("pixeltracker-")
            .suffix(".png")
            .tempfile()
            .context("Failed to create temporary image file")?;
        image
            .save_with_format(file.path(), ImageFormat::Png)
            .with_context(|| format!("Failed to write {}", file.path().display()))?;

        Ok(file)
    }

    pub fn draw(&self, frame: &Frame) -> anyhow::Result<RgbImage> {
        let mut canvas = Canvas(self.background(frame.background)?);

        for line in &frame.lines {
            let width = text_width(
                line.text.chars().count(),
                FONT.character_size.width,
                FONT.character_spacing,
            );
            let x = centered_offset(width, self.size);
            let style = MonoTextStyle::new(FONT, to_rgb888(line.color));

            let _ = Text::with_baseline(&line.text, Point::new(x, line.top), style, Baseline::Top)
                .draw(&mut canvas);
        }

        Ok(canvas.0)
    }

    fn background(&self, kind: Background) -> anyhow::Result<RgbImage> {
        if let Some(dir) = &self.resources_dir {
            let path = dir.join(kind.template_name());
            if path.is_file() {
                let template = image::open(&path)
                    .with_context(|| format!("Failed to load background {}", path.display()))?
                    .to_rgb8();

                if template.dimensions() != (self.size, self.size) {
                    return Ok(imageops::resize(
                        &template,
                        self.size,
                        self.size,
                        imageops::FilterType::Nearest,
                    ));
                }
                return Ok(template);
            }
            tracing::debug!(path = %path.display(), "No background template, drawing built-in one");
        }

        Ok(self.builtin_background(kind))
    }

    /// Simple backgrounds laid out on a 32px grid and scaled to the canvas
    fn builtin_background(&self, kind: Background) -> RgbImage {
        let mut canvas = Canvas(RgbImage::new(self.size, self.size));
        let s = self.size as i32;
        let at = |x: i32, y: i32| Point::new(x * s / 32, y * s / 32);
        let scaled = |v: u32| (v * self.size / 32).max(1);

        match kind {
            Background::Subscribers => {
                let _ = Rectangle::new(at(8, 3), Size::new(scaled(16), scaled(11)))
                    .into_styled(PrimitiveStyle::with_fill(YOUTUBE_RED))
                    .draw(&mut canvas);
                let _ = Triangle::new(at(14, 5), at(14, 11), at(19, 8))
                    .into_styled(PrimitiveStyle::with_fill(Rgb888::WHITE))
                    .draw(&mut canvas);
            }
            Background::Crypto => {
                let _ = Circle::new(at(10, 1), scaled(12))
                    .into_styled(PrimitiveStyle::with_fill(COIN_ORANGE))
                    .draw(&mut canvas);
            }
            Background::Finance => {
                let points = [at(3, 12), at(9, 7), at(14, 10), at(20, 3), at(28, 6)];
                let _ = Polyline::new(&points)
                    .into_styled(PrimitiveStyle::with_stroke(CHART_BLUE, 1))
                    .draw(&mut canvas);
            }
        }

        canvas.0
    }
}

fn to_rgb888(color: Color) -> Rgb888 {
    Rgb888::new(color.r, color.g, color.b)
}

/// embedded-graphics target backed by an `image` buffer
struct Canvas(RgbImage);

impl OriginDimensions for Canvas {
    fn size(&self) -> Size {
        Size::new(self.0.width(), self.0.height())
    }
}

impl DrawTarget for Canvas {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let (width, height) = self.0.dimensions();
        for Pixel(point, color) in pixels {
            if point.x < 0 || point.y < 0 {
                continue;
            }
            let (x, y) = (point.x as u32, point.y as u32);
            if x < width && y < height {
                self.0.put_pixel(x, y, Rgb([color.r(), color.g(), color.b()]));
            }
        }
        Ok(())
    }
}

use std::io;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use tui::backend::CrosstermBackend;
use tui::layout::Rect;
use tui::style::{Color, Style};
use tui::symbols::Marker;
use tui::widgets::canvas::{Canvas, Points};
use tui::widgets::{Block, Borders};
use tui::Terminal;

pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;

/// The monochrome framebuffer: one byte per pixel, each 0 or 1, row-major.
///
/// Only CLS and DRW mutate it, and both raise the draw flag. The flag is only
/// ever lowered by whoever presents the frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBuffer {
    pixels: [u8; DISPLAY_WIDTH * DISPLAY_HEIGHT],
    draw_flag: bool,
}

impl Default for FrameBuffer {
    fn default() -> Self {
        FrameBuffer {
            pixels: [0; DISPLAY_WIDTH * DISPLAY_HEIGHT],
            draw_flag: false,
        }
    }
}

impl FrameBuffer {
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        self.pixels[y * DISPLAY_WIDTH + x]
    }

    pub fn draw_flag(&self) -> bool {
        self.draw_flag
    }

    /// called by the presenter once it has read the frame
    pub fn clear_draw_flag(&mut self) {
        self.draw_flag = false;
    }

    /// CLS
    pub fn clear(&mut self) {
        self.pixels.fill(0);
        self.draw_flag = true;
    }

    /// XOR an 8-pixel-wide sprite onto the screen with its top-left corner at
    /// (x, y), which must already be on screen. Rows and columns that run off
    /// the right or bottom edge are dropped, not wrapped. Returns true if any
    /// pixel went from 1 to 0.
    pub fn draw_sprite(&mut self, x: usize, y: usize, rows: &[u8]) -> bool {
        let mut collided = false;
        for (row, bits) in rows.iter().enumerate() {
            let py = y + row;
            if py >= DISPLAY_HEIGHT {
                break;
            }
            for col in 0..8 {
                let px = x + col;
                if px >= DISPLAY_WIDTH {
                    break;
                }
                if (bits >> (7 - col)) & 1 == 1 {
                    let pixel = &mut self.pixels[py * DISPLAY_WIDTH + px];
                    collided |= *pixel == 1;
                    *pixel ^= 1;
                }
            }
        }
        self.draw_flag = true;
        collided
    }

    /// reset to a blank screen with the flag down
    pub fn reset(&mut self) {
        *self = FrameBuffer::default();
    }
}

/// Display is used by the host to put frames on a screen. The interpreter
/// never talks to it; the host hands it the framebuffer when it's dirty.
pub trait Display {
    fn draw(&mut self, frame: &FrameBuffer) -> Result<(), io::Error>;
}

// store useful metadata about the screen
struct Resolution(usize, usize);

impl Resolution {
    fn pixel_count(&self) -> usize {
        self.0 * self.1
    }

    fn x_bounds(&self) -> [f64; 2] {
        [0.0, (self.0 - 1) as f64]
    }

    fn y_bounds(&self) -> [f64; 2] {
        [-1.0 * (self.1 - 1) as f64, 0.0]
    }

    /// canvas coordinates of every pixel holding `value`
    fn plane_from_pixels<'a>(
        &self,
        pixels: &'a [u8],
        value: u8,
    ) -> impl std::iter::Iterator<Item = (f64, f64)> + 'a {
        let w = self.0;
        pixels
            .iter()
            .take(self.pixel_count())
            .enumerate()
            .filter(move |(_, px)| **px == value)
            .map(move |(i, _)| {
                (
                    (i % w) as f64,        // x
                    -1.0 * (i / w) as f64, // y
                )
            })
    }
}

/// monochrome display in a terminal, rendered using TUI and Crossterm
pub struct MonoTermDisplay {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    resolution: Resolution,
}

impl MonoTermDisplay {
    pub fn new() -> Result<MonoTermDisplay, io::Error> {
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.hide_cursor()?;
        terminal.clear()?;
        Ok(MonoTermDisplay {
            terminal,
            resolution: Resolution(DISPLAY_WIDTH, DISPLAY_HEIGHT),
        })
    }
}

impl Drop for MonoTermDisplay {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

impl Display for MonoTermDisplay {
    fn draw(&mut self, frame: &FrameBuffer) -> Result<(), io::Error> {
        let resolution = &self.resolution;
        let pixels = frame.pixels();

        // 1:1 between terminal cells and chip8 pixels, plus a border
        self.terminal.draw(|f| {
            let size = Rect::new(
                0,
                0,
                2 + resolution.0 as u16,
                2 + resolution.1 as u16,
            )
            .intersection(f.size());

            let canvas = Canvas::default()
                .block(
                    Block::default()
                        .title("CHIP-8")
                        .borders(Borders::ALL)
                        .style(Style::default().bg(Color::Black)),
                )
                .x_bounds(resolution.x_bounds())
                .y_bounds(resolution.y_bounds())
                .marker(Marker::Block)
                .paint(|ctx| {
                    ctx.draw(&Points {
                        coords: &resolution.plane_from_pixels(pixels, 0).collect::<Vec<_>>(),
                        color: Color::Black,
                    });
                    ctx.draw(&Points {
                        coords: &resolution.plane_from_pixels(pixels, 1).collect::<Vec<_>>(),
                        color: Color::White,
                    });
                });
            f.render_widget(canvas, size);
        })?;
        Ok(())
    }
}

/// useful for testing non-display routines; counts the frames it was given
#[derive(Default)]
pub struct DummyDisplay {
    pub frames: usize,
}

impl DummyDisplay {
    pub fn new() -> DummyDisplay {
        DummyDisplay { frames: 0 }
    }
}

impl Display for DummyDisplay {
    fn draw(&mut self, _frame: &FrameBuffer) -> Result<(), io::Error> {
        self.frames += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Resolution tests
    #[test]
    fn test_pixel_count() {
        let r = Resolution(64, 32);
        assert_eq!(r.pixel_count(), 2048)
    }

    #[test]
    fn test_x_bounds() {
        let r = Resolution(64, 32);
        assert_eq!(r.x_bounds(), [0.0, 63.0]);
    }

    #[test]
    fn test_y_bounds() {
        let r = Resolution(64, 32);
        assert_eq!(r.y_bounds(), [-31.0, 0.0]);
    }

    #[test]
    fn test_plane_iterator() {
        let r = Resolution(64, 32);
        let mut fb = FrameBuffer::default();
        fb.draw_sprite(1, 2, &[0x80]);
        let lit: Vec<_> = r.plane_from_pixels(fb.pixels(), 1).collect();
        assert_eq!(lit, vec![(1.0, -2.0)]);
        assert_eq!(r.plane_from_pixels(fb.pixels(), 0).count(), 2047);
    }

    // FrameBuffer tests
    #[test]
    fn test_blank_on_creation() {
        let fb = FrameBuffer::default();
        assert!(fb.pixels().iter().all(|p| *p == 0));
        assert!(!fb.draw_flag());
    }

    #[test]
    fn test_clear_sets_flag() {
        let mut fb = FrameBuffer::default();
        fb.draw_sprite(0, 0, &[0xff; 4]);
        fb.clear_draw_flag();
        fb.clear();
        assert!(fb.pixels().iter().all(|p| *p == 0));
        assert!(fb.draw_flag());
    }

    #[test]
    fn test_sprite_xor_and_collision() {
        let mut fb = FrameBuffer::default();
        assert!(!fb.draw_sprite(10, 5, &[0b1010_0000]));
        assert_eq!(fb.pixel(10, 5), 1);
        assert_eq!(fb.pixel(11, 5), 0);
        assert_eq!(fb.pixel(12, 5), 1);
        // overlapping one lit pixel flips it off
        assert!(fb.draw_sprite(12, 5, &[0b1000_0000]));
        assert_eq!(fb.pixel(12, 5), 0);
    }

    #[test]
    fn test_sprite_clips_right_and_bottom() {
        let mut fb = FrameBuffer::default();
        fb.draw_sprite(60, 30, &[0xff, 0xff, 0xff, 0xff]);
        let lit = fb.pixels().iter().filter(|p| **p == 1).count();
        assert_eq!(lit, 4 * 2);
        // nothing wrapped round to the left or top
        for y in 0..30 {
            assert_eq!(fb.pixel(0, y), 0);
        }
        for x in 0..60 {
            assert_eq!(fb.pixel(x, 0), 0);
        }
    }

    #[test]
    fn test_reset() {
        let mut fb = FrameBuffer::default();
        fb.draw_sprite(0, 0, &[0xff]);
        fb.reset();
        assert_eq!(fb, FrameBuffer::default());
    }

    #[test]
    fn test_dummy_counts_frames() -> Result<(), io::Error> {
        let mut d = DummyDisplay::new();
        d.draw(&FrameBuffer::default())?;
        d.draw(&FrameBuffer::default())?;
        assert_eq!(d.frames, 2);
        Ok(())
    }
}

// The host window that stands in for the physical panel.
// It owns a 0x00RRGGBB buffer the size of the window; presented frames are
// copied into its top-left corner and pushed to the screen.

use display_sim::{DisplayError, Frame, RenderTarget, present};
use minifb::{Key, Scale, Window, WindowOptions};

pub struct HostWindow {
    window: Window, // the on-screen window you see
    width: usize,
    height: usize,
    buffer: Vec<u32>,
}

impl HostWindow {
    /// Open a window of `width` x `height` display pixels, magnified by `scale`.
    pub fn new(title: &str, width: usize, height: usize, scale: u8) -> Result<Self, DisplayError> {
        let options = WindowOptions {
            scale: match scale {
                0 | 1 => Scale::X1,
                2 => Scale::X2,
                3 | 4 => Scale::X4,
                _ => Scale::X8,
            },
            ..WindowOptions::default()
        };
        let mut window = Window::new(title, width, height, options)
            .map_err(|e| DisplayError::WindowInit(e.to_string()))?;
        window.set_target_fps(60);

        Ok(Self {
            window,
            width,
            height,
            buffer: vec![0; width * height],
        })
    }

    /// Returns false when the user closes the window (so we can stop the loop).
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    pub fn esc_pressed(&self) -> bool {
        self.window.is_key_down(Key::Escape)
    }

    /// Keep the window responsive while no frame arrives.
    pub fn refresh(&mut self) {
        self.window.update();
    }
}

impl RenderTarget for HostWindow {
    fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn write_frame(&mut self, frame: &Frame) -> Result<(), DisplayError> {
        present::check_fits(frame, self.size())?;
        frame.write_0rgb(&mut self.buffer, self.width);
        self.window
            .update_with_buffer(&self.buffer, self.width, self.height)
            .map_err(|e| DisplayError::WindowUpdate(e.to_string()))
    }
}

// Draw-call driver that runs on the producer thread.
// It only uses the public display contract, the way application code for
// the real panel would: pixels, fills, bitmaps, blits, then present().

use std::thread;
use std::time::{Duration, Instant};

use display_sim::{BitmapMode, Color, DisplayError, DisplaySurface, PixelStore};
use rand::Rng;

/// Run every scene in a loop until the host goes away.
pub fn run<R: Rng>(display: &mut DisplaySurface, rng: &mut R) -> Result<(), DisplayError> {
    // Leave the power-on noise up for a moment so it can be seen.
    thread::sleep(Duration::from_secs(1));

    loop {
        let ms = bench_pixels(display, rng, 10_000)?;
        hud(display, &format!("PIXELS {ms}MS"))?;
        pause();

        let ms = bench_fills(display, rng, 50)?;
        hud(display, &format!("FILL {ms}MS"))?;
        pause();

        let ms = bench_blits(display, rng, 50)?;
        hud(display, &format!("BLIT {ms}MS"))?;
        pause();

        let ms = bench_invert(display)?;
        hud(display, &format!("INVERT {ms}MS"))?;
        pause();
    }
}

fn pause() {
    thread::sleep(Duration::from_millis(800));
}

fn rand_color<R: Rng>(rng: &mut R) -> Color {
    Color::rgb(rng.random(), rng.random(), rng.random())
}

fn rand_point<R: Rng>(display: &DisplaySurface, rng: &mut R) -> (i32, i32) {
    (
        rng.random_range(0..display.width() as i32),
        rng.random_range(0..display.height() as i32),
    )
}

fn bench_pixels<R: Rng>(display: &mut DisplaySurface, rng: &mut R, num: usize) -> Result<u128, DisplayError> {
    let start = Instant::now();
    display.clear(true)?;
    for i in 1..num {
        let (x, y) = rand_point(display, rng);
        display.draw_pixel(x, y, rand_color(rng))?;
        if i % 100 == 0 {
            display.present()?;
        }
    }
    display.present()?;
    let ms = start.elapsed().as_millis();
    log::info!("{num} pixels {ms}ms");
    Ok(ms)
}

fn bench_fills<R: Rng>(display: &mut DisplaySurface, rng: &mut R, num: usize) -> Result<u128, DisplayError> {
    let start = Instant::now();
    display.clear(true)?;
    for _ in 1..num {
        let (x, y) = rand_point(display, rng);
        let w = rng.random_range(1..=(display.width() / 2).max(1));
        let h = rng.random_range(1..=(display.height() / 2).max(1));
        // rectangles may hang off the edge; fill clips them
        display.fill(x, y, w, h, rand_color(rng), true)?;
    }
    let ms = start.elapsed().as_millis();
    log::info!("{num} rectangles {ms}ms");
    Ok(ms)
}

fn bench_blits<R: Rng>(display: &mut DisplaySurface, rng: &mut R, num: usize) -> Result<u128, DisplayError> {
    // 16x16 tile with a diagonal gradient
    let mut tile = PixelStore::new(16, 16);
    for y in 0..16 {
        for x in 0..16 {
            tile.set(x, y, Color::rgb((x * 16) as u8, (y * 16) as u8, 128));
        }
    }

    let start = Instant::now();
    display.clear(true)?;
    for _ in 1..num {
        let (x, y) = rand_point(display, rng);
        display.write_buffer(x - 8, y - 8, &tile)?;
        display.present()?;
    }
    let ms = start.elapsed().as_millis();
    log::info!("{num} blits {ms}ms");
    Ok(ms)
}

fn bench_invert(display: &mut DisplaySurface) -> Result<u128, DisplayError> {
    let start = Instant::now();
    let (w, h) = (display.width() as i32, display.height() as i32);
    for y in 0..h / 2 {
        for x in 0..w {
            display.invert_pixel(x, y)?;
        }
    }
    display.present()?;
    let ms = start.elapsed().as_millis();
    log::info!("invert half screen {ms}ms");
    Ok(ms)
}

/// Status line in the bottom-left corner, drawn glyph by glyph as bitmaps.
fn hud(display: &mut DisplaySurface, text: &str) -> Result<(), DisplayError> {
    let y = display.height() as i32 - 10;
    display.fill(0, y - 1, display.width(), 10, Color::BLACK, false)?;
    draw_text_5x7(display, 2, y, text, Color::WHITE)?;
    display.present()
}

/// Each glyph is a 1-byte-wide, 7-row bitmap; 1 pixel spacing.
pub fn draw_text_5x7(display: &mut DisplaySurface, mut x: i32, y: i32, text: &str, color: Color) -> Result<(), DisplayError> {
    for ch in text.chars() {
        if x + 5 > display.width() as i32 {
            break;
        }
        if let Some(rows) = glyph5x7(ch) {
            display.draw_bitmap(x, y, 1, rows.len(), &rows, BitmapMode::Color(color))?;
        }
        x += 6; // 5 pixels glyph width + 1 pixel spacing
    }
    Ok(())
}

/// 5x7 glyph rows, high bit = leftmost pixel.
fn glyph5x7(ch: char) -> Option<[u8; 7]> {
    // rows are written as 5-bit patterns and shifted into the top of the byte
    macro_rules! g { ($($row:expr),*) => {
        Some([$($row << 3),*])
    }; }

    match ch.to_ascii_uppercase() {
        '0' => g!(0b01110,0b10001,0b10011,0b10101,0b11001,0b10001,0b01110),
        '1' => g!(0b00100,0b01100,0b00100,0b00100,0b00100,0b00100,0b01110),
        '2' => g!(0b01110,0b10001,0b00001,0b00010,0b00100,0b01000,0b11111),
        '3' => g!(0b11110,0b00001,0b00001,0b01110,0b00001,0b00001,0b11110),
        '4' => g!(0b00010,0b00110,0b01010,0b10010,0b11111,0b00010,0b00010),
        '5' => g!(0b11111,0b10000,0b11110,0b00001,0b00001,0b10001,0b01110),
        '6' => g!(0b00110,0b01000,0b10000,0b11110,0b10001,0b10001,0b01110),
        '7' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b01000,0b01000),
        '8' => g!(0b01110,0b10001,0b10001,0b01110,0b10001,0b10001,0b01110),
        '9' => g!(0b01110,0b10001,0b10001,0b01111,0b00001,0b00010,0b01100),

        'B' => g!(0b11110,0b10001,0b10001,0b11110,0b10001,0b10001,0b11110),
        'E' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b11111),
        'F' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b10000),
        'I' => g!(0b01110,0b00100,0b00100,0b00100,0b00100,0b00100,0b01110),
        'L' => g!(0b10000,0b10000,0b10000,0b10000,0b10000,0b10000,0b11111),
        'M' => g!(0b10001,0b11011,0b10101,0b10101,0b10001,0b10001,0b10001),
        'N' => g!(0b10001,0b11001,0b10101,0b10011,0b10001,0b10001,0b10001),
        'P' => g!(0b11110,0b10001,0b10001,0b11110,0b10000,0b10000,0b10000),
        'R' => g!(0b11110,0b10001,0b10001,0b11110,0b10100,0b10010,0b10001),
        'S' => g!(0b01111,0b10000,0b10000,0b01110,0b00001,0b00001,0b11110),
        'T' => g!(0b11111,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        'V' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b01010,0b00100),
        'X' => g!(0b10001,0b10001,0b01010,0b00100,0b01010,0b10001,0b10001),

        ' ' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00000,0b00000),
        ':' => g!(0b00000,0b00100,0b00000,0b00000,0b00100,0b00000,0b00000),
        '.' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00100,0b00000),

        _ => None,
    }
}

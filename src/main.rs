// Display simulator: a window that behaves like the embedded panel.
// • The main thread owns the window and applies presented frames.
// • A worker thread runs the drawing code against a DisplaySurface.
// • --snapshot-dir saves every presented frame as a PNG.
// • ESC or closing the window stops both sides.

mod demo;
mod window;

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use clap::Parser;
use display_sim::{
    BoundsPolicy, DisplayConfig, DisplayError, DisplaySurface, QueueStatus, RenderTarget, present,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use window::HostWindow;

/// Desktop stand-in for an embedded display.
#[derive(Parser, Debug)]
#[command(name = "display-sim", version, about)]
struct Args {
    /// Display width in pixels.
    #[arg(long, default_value_t = display_sim::config::DEFAULT_WIDTH)]
    width: usize,

    /// Display height in pixels.
    #[arg(long, default_value_t = display_sim::config::DEFAULT_HEIGHT)]
    height: usize,

    /// Window magnification (1, 2, 4 or 8).
    #[arg(long, default_value_t = 2)]
    scale: u8,

    /// Save every presented frame into this (existing) directory.
    #[arg(long)]
    snapshot_dir: Option<PathBuf>,

    /// Fail on out-of-range pixels instead of ignoring them.
    #[arg(long)]
    strict: bool,

    /// Seed for the power-on noise and the demo scenes.
    #[arg(long)]
    seed: Option<u64>,
}

impl Args {
    fn display_config(&self) -> DisplayConfig {
        let bounds = if self.strict { BoundsPolicy::Strict } else { BoundsPolicy::Ignore };
        let mut config = DisplayConfig::new(self.width, self.height).with_bounds(bounds);
        config.snapshot_dir = self.snapshot_dir.clone();
        config
    }
}

fn main() -> Result<(), DisplayError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    /* --- Host side: window + consumer end of the bridge --- */
    let mut host = HostWindow::new("Display Simulator", args.width, args.height, args.scale)?;
    let (w, h) = host.size();
    let (presenter, mut queue) = present::rendezvous(w, h);

    /* --- Producer side: drawing code on its own thread --- */
    let config = args.display_config();
    let seed = args.seed;
    let worker = thread::spawn(move || -> Result<(), DisplayError> {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let mut display = DisplaySurface::with_rng(config, presenter, &mut rng)?;
        demo::run(&mut display, &mut rng)
    });

    /* ------------------------------ Main loop ------------------------------ */
    while host.is_open() && !host.esc_pressed() {
        match queue.serve_next(&mut host, Duration::from_millis(16)) {
            QueueStatus::Presented => {}
            QueueStatus::Idle => host.refresh(),
            QueueStatus::Closed => break,
        }
    }
    log::info!("Window closed after {} frames", queue.presented());

    // Dropping the queue unblocks a producer waiting in present().
    drop(queue);
    match worker.join() {
        Ok(Ok(())) | Ok(Err(DisplayError::PresenterClosed)) => Ok(()),
        Ok(Err(e)) => Err(e),
        Err(_) => {
            log::error!("Drawing thread panicked");
            Ok(())
        }
    }
}

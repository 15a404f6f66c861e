use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::LevelFilter;

use chip8_vm::devices::Renderer;
use chip8_vm::Machine;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// The path of the rom to load
    #[arg(short, long, value_name = "FILE")]
    rom_path: PathBuf,

    /// Seed for the random number opcode, random if not given
    #[arg(long)]
    seed: Option<u64>,

    /// Run without a window and print the screen after the last frame
    #[arg(long)]
    headless: bool,

    /// How many frames to run in headless mode
    #[arg(long, default_value_t = 600)]
    frames: u64,

    /// Window scale, one of 1, 2, 4, 8, 16 or 32; fits the screen if not given
    #[arg(long)]
    scale: Option<usize>,

    /// Overrides the level given by RUST_LOG
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<LevelFilter>,
}

/// Draws nothing, frames and beeps only end up in the log.
struct HeadlessRenderer;

impl Renderer for HeadlessRenderer {
    fn render(&mut self, pixels: &[u8]) {
        log::trace!("Frame with {} pixels set", pixels.iter().filter(|p| **p == 1).count());
    }

    fn beep(&mut self) {
        log::info!("Beep");
    }
}

fn run_headless(mut machine: Machine, rom: &[u8], frames: u64) -> anyhow::Result<()> {
    machine.set_renderer(HeadlessRenderer);
    machine.load(rom)?;

    for _ in 0..frames {
        machine.tick()?;
    }

    print!("{}", machine.interpreter().display());

    Ok(())
}

#[cfg(feature = "window")]
mod window {
    use std::{cell::RefCell, collections::HashMap, rc::Rc};

    use anyhow::anyhow;
    use minifb::{Key, KeyRepeat, Scale, Window, WindowOptions};

    use chip8_vm::devices::Renderer;
    use chip8_vm::display::{DISPLAY_HEIGHT, DISPLAY_WIDTH};
    use chip8_vm::Machine;

    const FOREGROUND: u32 = 0xFFFFFF;
    const BACKGROUND: u32 = 0;

    struct WindowRenderer {
        buffer: Rc<RefCell<Vec<u32>>>,
    }

    impl Renderer for WindowRenderer {
        fn render(&mut self, pixels: &[u8]) {
            for (i, p) in self.buffer.borrow_mut().iter_mut().zip(pixels) {
                *i = if *p == 1 { FOREGROUND } else { BACKGROUND };
            }
        }

        fn beep(&mut self) {
            // terminal bell
            eprint!("\x07");
        }
    }

    fn keymap() -> HashMap<Key, u8> {
        HashMap::from([
            (Key::Key1, 0x1),
            (Key::Key2, 0x2),
            (Key::Key3, 0x3),
            (Key::Key4, 0xC),
            (Key::Q, 0x4),
            (Key::W, 0x5),
            (Key::E, 0x6),
            (Key::R, 0xD),
            (Key::A, 0x7),
            (Key::S, 0x8),
            (Key::D, 0x9),
            (Key::F, 0xE),
            (Key::Z, 0xA),
            (Key::X, 0x0),
            (Key::C, 0xB),
            (Key::V, 0xF),
        ])
    }

    fn scale(scale: Option<usize>) -> anyhow::Result<Scale> {
        Ok(match scale {
            None => Scale::FitScreen,
            Some(1) => Scale::X1,
            Some(2) => Scale::X2,
            Some(4) => Scale::X4,
            Some(8) => Scale::X8,
            Some(16) => Scale::X16,
            Some(32) => Scale::X32,
            Some(other) => return Err(anyhow!("Unsupported window scale {}", other)),
        })
    }

    pub fn run(mut machine: Machine, rom: &[u8], window_scale: Option<usize>) -> anyhow::Result<()> {
        let keymap = keymap();
        let buffer = Rc::new(RefCell::new(vec![BACKGROUND; DISPLAY_WIDTH * DISPLAY_HEIGHT]));
        machine.set_renderer(WindowRenderer { buffer: buffer.clone() });
        machine.load(rom)?;

        let opts = WindowOptions {
            scale: scale(window_scale)?,
            ..WindowOptions::default()
        };

        let mut window = Window::new("Chip-8 - ESC to exit", DISPLAY_WIDTH, DISPLAY_HEIGHT, opts)
            .map_err(|e| anyhow!("Unable to open window: {}", e))?;

        // One tick per frame at ~60 fps
        window.set_target_fps(60);
        window.topmost(true);

        while window.is_open() && !window.is_key_down(Key::Escape) {
            for key in window.get_keys_pressed(KeyRepeat::No) {
                if let Some(keycode) = keymap.get(&key) {
                    machine.press_key(*keycode);
                }
            }
            for key in window.get_keys_released() {
                if let Some(keycode) = keymap.get(&key) {
                    machine.release_key(*keycode);
                }
            }

            machine.tick()?;

            window
                .update_with_buffer(&buffer.borrow(), DISPLAY_WIDTH, DISPLAY_HEIGHT)
                .map_err(|e| anyhow!("Unable to update window: {}", e))?;
        }

        Ok(())
    }
}

#[cfg(feature = "window")]
fn run_window(machine: Machine, rom: &[u8], scale: Option<usize>) -> anyhow::Result<()> {
    window::run(machine, rom, scale)
}

#[cfg(not(feature = "window"))]
fn run_window(_machine: Machine, _rom: &[u8], _scale: Option<usize>) -> anyhow::Result<()> {
    anyhow::bail!("Built without the `window` feature, use --headless")
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut logger = env_logger::Builder::from_default_env();
    if let Some(level) = cli.log_level {
        logger.filter_level(level);
    }
    logger.init();

    let bytes = std::fs::read(&cli.rom_path).with_context(|| format!("Unable to read rom {}", cli.rom_path.display()))?;

    let machine = match cli.seed {
        Some(seed) => Machine::with_seed(seed),
        None => Machine::new(),
    };

    if cli.headless {
        run_headless(machine, &bytes, cli.frames)
    } else {
        run_window(machine, &bytes, cli.scale)
    }
}

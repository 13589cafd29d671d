use std::path::PathBuf;
use std::time::Duration;

use chip8_vm::{Chip8, Error, FrameBuffer, DISPLAY_HEIGHT, DISPLAY_WIDTH};
use clap::Parser;
use log::LevelFilter;
use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::pixels;
use sdl2::rect::Rect;
use sdl2::render::Canvas;
use sdl2::video::Window;
use simple_logger::SimpleLogger;

// keypad index -> keyboard key
const KEYMAP: [Keycode; 16] = [
    Keycode::Num0,
    Keycode::Num1,
    Keycode::Num2,
    Keycode::Num3,
    Keycode::Num4,
    Keycode::Num5,
    Keycode::Num6,
    Keycode::Num7,
    Keycode::Num8,
    Keycode::Num9,
    Keycode::A,
    Keycode::B,
    Keycode::C,
    Keycode::D,
    Keycode::E,
    Keycode::F,
];

#[derive(Parser, Debug)]
#[command(name = "chip8", about = "Run a CHIP-8 program in an SDL window.")]
struct Args {
    /// Program image, loaded verbatim at 0x200.
    #[arg(value_name = "ROM")]
    rom: PathBuf,

    /// Microseconds to sleep after each instruction.
    #[arg(long, default_value_t = 1500)]
    cycle_us: u64,

    /// Window pixels per CHIP-8 pixel.
    #[arg(long, default_value_t = 10)]
    scale: u32,

    /// Step over undecodable instructions instead of stopping.
    #[arg(long, default_value_t = false)]
    skip_faults: bool,
}

fn keypad_index(keycode: Keycode) -> Option<usize> {
    KEYMAP.iter().position(|k| *k == keycode)
}

fn present(canvas: &mut Canvas<Window>, frame: &FrameBuffer, scale: u32) -> Result<(), String> {
    canvas.set_draw_color(pixels::Color::RGB(0, 0, 0));
    canvas.clear();
    canvas.set_draw_color(pixels::Color::RGB(255, 255, 255));
    for y in 0..DISPLAY_HEIGHT {
        for x in 0..DISPLAY_WIDTH {
            if !frame.pixel(x, y) {
                continue;
            }
            let rect = Rect::new(
                (x as u32 * scale) as i32,
                (y as u32 * scale) as i32,
                scale,
                scale,
            );
            canvas.fill_rect(rect)?;
        }
    }
    canvas.present();
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .env()
        .init()?;
    let args = Args::parse();

    let rom = std::fs::read(&args.rom)?;
    let mut emu = Chip8::new();
    emu.load_program(&rom)?;
    log::info!("loaded {} ({} bytes)", args.rom.display(), rom.len());

    let sdl_ctx = sdl2::init()?;
    let video = sdl_ctx.video()?;

    let window = video
        .window(
            "CHIP-8",
            DISPLAY_WIDTH as u32 * args.scale,
            DISPLAY_HEIGHT as u32 * args.scale,
        )
        .position_centered()
        .build()?;
    let mut canvas = window.into_canvas().build()?;
    present(&mut canvas, emu.display_snapshot(), args.scale)?;

    let mut event_pump = sdl_ctx.event_pump()?;

    let sleep = Duration::from_micros(args.cycle_us);
    let mut sounding = false;

    'main: loop {
        match emu.step() {
            Ok(outcome) => {
                if outcome.draw {
                    present(&mut canvas, emu.display_snapshot(), args.scale)?;
                }
                if outcome.sound != sounding {
                    sounding = outcome.sound;
                    log::debug!("tone {}", if sounding { "on" } else { "off" });
                }
            }
            Err(err @ Error::Decode(_)) if args.skip_faults => {
                log::warn!("{} at {:03X}, skipping", err, emu.pc());
                emu.skip_instruction();
            }
            Err(err) => {
                log::error!("{} at {:03X}", err, emu.pc());
                return Err(err.into());
            }
        }

        for e in event_pump.poll_iter() {
            match e {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => break 'main,
                Event::KeyDown {
                    keycode: Some(keycode),
                    ..
                } => {
                    if let Some(index) = keypad_index(keycode) {
                        emu.set_key(index, true)?;
                    }
                }
                Event::KeyUp {
                    keycode: Some(keycode),
                    ..
                } => {
                    if let Some(index) = keypad_index(keycode) {
                        emu.set_key(index, false)?;
                    }
                }
                _ => {}
            }
        }

        std::thread::sleep(sleep);
    }

    Ok(())
}

//! A CHIP-8 virtual machine core.
//!
//! The host owns a [`Chip8`], loads a program image, feeds key state with
//! [`Chip8::set_key`] and calls [`Chip8::step`] at whatever rate it likes,
//! presenting [`Chip8::display_snapshot`] whenever a step reports a draw.
//! Rendering, audio and timing belong to the host.

pub mod chip8;

pub use crate::chip8::{
    Chip8, Error, FrameBuffer, Opcode, Result, StepOutcome, DISPLAY_HEIGHT, DISPLAY_WIDTH,
    KEY_COUNT, MAX_PROGRAM_SIZE, MEMORY_SIZE, PROGRAM_START,
};

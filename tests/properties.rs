//! Property tests for per-instruction invariants.

use chip8_vm::Chip8;
use proptest::prelude::*;
use rand::rngs::mock::StepRng;

fn load(program: &[u8]) -> Chip8<StepRng> {
    let mut vm = Chip8::with_rng(StepRng::new(0, 1));
    vm.load_program(program).unwrap();
    vm
}

fn run(vm: &mut Chip8<StepRng>, steps: usize) {
    for _ in 0..steps {
        vm.step().unwrap();
    }
}

proptest! {
    /// 6XKK loads the immediate and falls through to the next instruction.
    #[test]
    fn prop_load_immediate(x in 0u8..16, kk in 0u8..=255) {
        let mut vm = load(&[0x60 | x, kk]);
        vm.step().unwrap();
        prop_assert_eq!(vm.registers()[x as usize], kk);
        prop_assert_eq!(vm.pc(), 0x202);
    }

    /// 8XY4 wraps the sum and flags the carry.
    #[test]
    fn prop_add_with_carry(vx in 0u8..=255, vy in 0u8..=255) {
        let mut vm = load(&[0x61, vx, 0x62, vy, 0x81, 0x24]);
        run(&mut vm, 3);
        let sum = vx as u16 + vy as u16;
        prop_assert_eq!(vm.registers()[1] as u16, sum % 256);
        prop_assert_eq!(vm.registers()[0xF], (sum > 255) as u8);
    }

    /// 8XY5 and 8XY7 wrap the difference and flag "no borrow" strictly.
    #[test]
    fn prop_subtract(vx in 0u8..=255, vy in 0u8..=255) {
        let mut vm = load(&[0x61, vx, 0x62, vy, 0x81, 0x25]);
        run(&mut vm, 3);
        prop_assert_eq!(vm.registers()[1], vx.wrapping_sub(vy));
        prop_assert_eq!(vm.registers()[0xF], (vx > vy) as u8);

        let mut vm = load(&[0x61, vx, 0x62, vy, 0x81, 0x27]);
        run(&mut vm, 3);
        prop_assert_eq!(vm.registers()[1], vy.wrapping_sub(vx));
        prop_assert_eq!(vm.registers()[0xF], (vy > vx) as u8);
    }

    /// 8XY6 and 8XYE move the shifted-out bit into VF.
    #[test]
    fn prop_shifts(vx in 0u8..=255) {
        let mut vm = load(&[0x61, vx, 0x81, 0x06]);
        run(&mut vm, 2);
        prop_assert_eq!(vm.registers()[1], vx >> 1);
        prop_assert_eq!(vm.registers()[0xF], vx & 1);

        let mut vm = load(&[0x61, vx, 0x81, 0x0E]);
        run(&mut vm, 2);
        prop_assert_eq!(vm.registers()[1], vx << 1);
        prop_assert_eq!(vm.registers()[0xF], vx >> 7);
    }

    /// FX33 writes the three decimal digits of VX.
    #[test]
    fn prop_bcd(value in 0u8..=255) {
        let mut vm = load(&[0x62, value, 0xA5, 0x00, 0xF2, 0x33]);
        run(&mut vm, 3);
        let digits = vm.memory().slice(0x500, 3).unwrap();
        prop_assert_eq!(digits[0] as u16 * 100 + digits[1] as u16 * 10 + digits[2] as u16, value as u16);
        prop_assert!(digits.iter().all(|d| *d < 10));
    }

    /// A call followed by a return lands right after the call.
    #[test]
    fn prop_call_return(target in 0x300u16..0xFFE) {
        // I = target; V0, V1 = 00 EE; store; call target
        let program = [
            0xA0 | (target >> 8) as u8, target as u8,
            0x60, 0x00,
            0x61, 0xEE,
            0xF1, 0x55,
            0x20 | (target >> 8) as u8, target as u8,
        ];
        let mut vm = load(&program);
        run(&mut vm, 4);
        let sp = vm.sp();
        run(&mut vm, 1);
        prop_assert_eq!(vm.pc(), target);
        run(&mut vm, 1);
        prop_assert_eq!(vm.pc(), 0x20A);
        prop_assert_eq!(vm.sp(), sp);
    }

    /// Drawing any sprite twice at any position restores a blank screen and
    /// reports the collision on the second draw.
    #[test]
    fn prop_draw_twice_erases(x in 0u8..=255, y in 0u8..=255, row in 1u8..=255) {
        // sprite byte stored at 0x300 through FX55
        let program = [
            0x60, row,
            0xA3, 0x00,
            0xF0, 0x55,
            0x61, x,
            0x62, y,
            0xD1, 0x21,
            0xD1, 0x21,
        ];
        let mut vm = load(&program);
        run(&mut vm, 6);
        prop_assert_eq!(vm.registers()[0xF], 0);
        prop_assert_eq!(
            vm.display_snapshot().pixels().iter().filter(|p| **p).count(),
            row.count_ones() as usize
        );
        run(&mut vm, 1);
        prop_assert_eq!(vm.registers()[0xF], 1);
        prop_assert!(vm.display_snapshot().is_blank());
    }

    /// The delay timer never goes below zero however long it is ticked.
    #[test]
    fn prop_timer_floor(start in 0u8..=255, ticks in 0usize..600) {
        // V0 = start; delay = V0; spin
        let mut vm = load(&[0x60, start, 0xF0, 0x15, 0x12, 0x04]);
        run(&mut vm, 2 + ticks);
        let expected = (start as usize).saturating_sub(1 + ticks);
        prop_assert_eq!(vm.delay_timer() as usize, expected);
    }
}

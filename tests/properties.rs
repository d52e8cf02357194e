use proptest::prelude::*;

use schip8::emu::Chip8;

fn boot(opcodes: &[u16]) -> Chip8 {
    let rom: Vec<u8> = opcodes.iter().flat_map(|op| op.to_be_bytes()).collect();
    let mut chip8 = Chip8::new();
    chip8.load(&rom).unwrap();
    chip8
}

proptest! {
    #[test]
    fn load_immediate_sets_register_and_advances_pc(x in 0u16..16, nn in any::<u8>()) {
        let mut chip8 = boot(&[0x6000 | x << 8 | nn as u16]);
        chip8.cpu_cycle().unwrap();
        prop_assert_eq!(chip8.v()[x as usize], nn);
        prop_assert_eq!(chip8.pc(), 0x202);
    }

    #[test]
    fn add_immediate_wraps_without_touching_vf(x in 0u16..15, a in any::<u8>(), b in any::<u8>(), vf in any::<u8>()) {
        let mut chip8 = boot(&[
            0x6F00 | vf as u16,
            0x6000 | x << 8 | a as u16,
            0x7000 | x << 8 | b as u16,
        ]);
        for _ in 0..3 {
            chip8.cpu_cycle().unwrap();
        }
        prop_assert_eq!(chip8.v()[x as usize], a.wrapping_add(b));
        prop_assert_eq!(chip8.v()[0xF], vf);
    }

    #[test]
    fn add_registers_reports_carry(a in any::<u8>(), b in any::<u8>()) {
        let mut chip8 = boot(&[0x6000 | a as u16, 0x6100 | b as u16, 0x8014]);
        for _ in 0..3 {
            chip8.cpu_cycle().unwrap();
        }
        prop_assert_eq!(chip8.v()[0], a.wrapping_add(b));
        prop_assert_eq!(chip8.v()[0xF], u8::from(a as u16 + b as u16 > 255));
    }

    #[test]
    fn bcd_digits_recompose_the_value(value in any::<u8>()) {
        let mut chip8 = boot(&[0x6000 | value as u16, 0xA300, 0xF033]);
        for _ in 0..3 {
            chip8.cpu_cycle().unwrap();
        }
        let digits = &chip8.memory()[0x300..0x303];
        prop_assert!(digits.iter().all(|&d| d < 10));
        prop_assert_eq!(digits[0] as u16 * 100 + digits[1] as u16 * 10 + digits[2] as u16, value as u16);
    }
}

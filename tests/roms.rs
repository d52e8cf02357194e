//! Drives the interpreter through its public API with small hand-assembled programs.

use schip8::{
    emu::{Chip8, Chip8Error, Chip8Result, Chip8Runner, Config, MAX_ROM_SIZE, Resolution, RunState},
    u4,
};

fn assemble(opcodes: &[u16]) -> Vec<u8> {
    opcodes.iter().flat_map(|op| op.to_be_bytes()).collect()
}

fn boot(opcodes: &[u16]) -> Chip8 {
    let mut chip8 = Chip8::new();
    chip8.load(&assemble(opcodes)).unwrap();
    chip8
}

fn run(chip8: &mut Chip8, cycles: usize) {
    for _ in 0..cycles {
        chip8.cpu_cycle().unwrap();
    }
}

#[test]
fn oversized_rom_is_rejected_before_execution() {
    let mut chip8 = Chip8::new();
    let err = chip8.load(&vec![0x12; MAX_ROM_SIZE + 1]).unwrap_err();
    assert!(matches!(err, Chip8Error::RomLoadError { .. }));
    assert_eq!(err.to_string(), "ROM is too large (3585 bytes), max size is 3584 bytes");
    assert_eq!(chip8.pc(), 0x200);
    assert_eq!(chip8.memory()[0x200], 0);
}

#[test]
fn draws_font_glyph_and_detects_collision() {
    let mut chip8 = boot(&[
        0x6000, // V0 = 0
        0xF029, // I = glyph 0
        0xD005, // draw at (V0, V0)
        0xD005, // draw again
    ]);

    run(&mut chip8, 3);
    let glyph = [0xF0u8, 0x90, 0x90, 0x90, 0xF0];
    for y in 0..5 {
        for x in 0..8 {
            assert_eq!(
                chip8.get_display_pixel(x, y),
                glyph[y] & (0x80 >> x) != 0,
                "pixel ({x}, {y})"
            );
        }
    }
    assert_eq!(chip8.v()[0xF], 0);

    run(&mut chip8, 1);
    assert!(chip8.display().pixels().iter().all(|&p| !p));
    assert_eq!(chip8.v()[0xF], 1);
}

#[test]
fn subroutine_writes_bcd() {
    let mut chip8 = boot(&[
        0x6A9D, // 0x200: VA = 157
        0xA300, // 0x202: I = 0x300
        0x2208, // 0x204: call 0x208
        0x1206, // 0x206: loop
        0xFA33, // 0x208: BCD VA
        0x00EE, // 0x20A: return
    ]);

    run(&mut chip8, 5);
    assert_eq!(&chip8.memory()[0x300..0x303], &[1, 5, 7]);
    assert_eq!(chip8.pc(), 0x206);
    assert!(chip8.stack().is_empty());
}

#[test]
fn key_wait_blocks_until_a_key_is_down() {
    let mut chip8 = boot(&[0xF50A, 0x6101]);

    for _ in 0..4 {
        assert_eq!(chip8.cpu_cycle().unwrap(), Chip8Result::WaitForNextFrame);
        assert_eq!(chip8.pc(), 0x200);
    }

    chip8.set_key(u4::new(0x7), true);
    assert_eq!(chip8.cpu_cycle().unwrap(), Chip8Result::Continue);
    assert_eq!(chip8.v()[5], 7);
    assert_eq!(chip8.pc(), 0x202);
}

#[test]
fn high_resolution_scroll_program() {
    let mut chip8 = boot(&[
        0x00FF, // high res
        0x6000, // V0 = 0
        0xF029, // I = glyph 0
        0xD005, // draw
        0x00C8, // scroll down 8
        0x00FB, // scroll right 4
    ]);

    run(&mut chip8, 6);
    let display = chip8.display();
    assert_eq!(display.resolution(), Resolution::High);
    assert!(display.get_pixel(4, 8));
    assert!(display.get_pixel(7, 12));
    assert!(!display.get_pixel(0, 0));
    assert_eq!(display.pixels().iter().filter(|&&p| p).count(), 14);
}

#[test]
fn timers_tick_down_and_stop_at_zero() {
    let mut chip8 = boot(&[0x6002, 0xF015]);
    run(&mut chip8, 2);
    assert_eq!(chip8.delay_timer(), 2);

    chip8.timers_cycle();
    chip8.timers_cycle();
    assert_eq!(chip8.delay_timer(), 0);
    chip8.timers_cycle();
    assert_eq!(chip8.delay_timer(), 0);
}

#[test]
fn runner_stops_on_exit_opcode() {
    let mut chip8 = Chip8::new();
    chip8.load(&assemble(&[0x7001, 0x00FD, 0x7001])).unwrap();
    let mut runner = Chip8Runner::new(chip8, &Config::default());

    runner.run_frame().unwrap();

    assert_eq!(runner.state(), RunState::Quit);
    assert_eq!(runner.chip8_ref().v()[0], 1);
}

#[test]
fn runner_surfaces_stack_overflow() {
    let mut chip8 = Chip8::new();
    chip8.load(&assemble(&[0x2200])).unwrap();
    // 20 instructions per frame, enough for the 13th call to land in the first frame
    let config = Config {
        instructions_per_second: 1200,
        ..Config::default()
    };
    let mut runner = Chip8Runner::new(chip8, &config);

    let err = runner.run_frame().unwrap_err();
    assert!(matches!(err, Chip8Error::StackOverflow { depth: 12 }));
    assert_eq!(runner.state(), RunState::Quit);
}

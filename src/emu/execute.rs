use log::{debug, info};

use super::{
    BIG_FONT_CHAR_SIZE, BIG_FONT_START_ADDRESS, Chip8, Chip8Error, Chip8Result, FONT_CHAR_SIZE,
    FONT_START_ADDRESS, HORIZONTAL_SCROLL, Opcode, OpcodeALU, Resolution,
};
use crate::u4;

impl Chip8 {
    /// Executes a decoded opcode. The program counter already points past it.
    pub(crate) fn execute(&mut self, opcode: Opcode) -> Result<Chip8Result, Chip8Error> {
        match opcode {
            Opcode::ClearDisplay => {
                self.display.clear();
            }
            Opcode::ScrollDown { n } => {
                self.display.scroll_down(n.into());
            }
            Opcode::ScrollRight => {
                self.display.scroll_right(HORIZONTAL_SCROLL);
            }
            Opcode::ScrollLeft => {
                self.display.scroll_left(HORIZONTAL_SCROLL);
            }
            Opcode::LowRes => {
                self.set_resolution(Resolution::Low);
            }
            Opcode::HighRes => {
                self.set_resolution(Resolution::High);
            }
            Opcode::Exit => {
                info!("Program exited at {:#05X}", self.pc.wrapping_sub(2));
                return Ok(Chip8Result::Exit);
            }
            Opcode::Jump { nnn } => {
                self.pc = nnn;
            }
            Opcode::JumpWithOffset { nnn } => {
                self.pc = nnn.wrapping_add(self.v[0].into());
            }
            Opcode::Call { nnn } => {
                self.push_stack(self.pc)?;
                self.pc = nnn;
            }
            Opcode::Return => {
                self.pc = self.pop_stack()?;
            }
            Opcode::SkipRegEqualImm { x, nn } => {
                if self.v[x] == nn {
                    self.skip();
                }
            }
            Opcode::SkipRegNotEqualImm { x, nn } => {
                if self.v[x] != nn {
                    self.skip();
                }
            }
            Opcode::SkipRegEqualReg { x, y } => {
                if self.v[x] == self.v[y] {
                    self.skip();
                }
            }
            Opcode::SkipRegNotEqualReg { x, y } => {
                if self.v[x] != self.v[y] {
                    self.skip();
                }
            }
            Opcode::SetRegImm { x, nn } => {
                self.v[x] = nn;
            }
            Opcode::AddRegImm { x, nn } => {
                self.v[x] = self.v[x].wrapping_add(nn);
            }
            Opcode::ALU { x, y, op } => {
                self.execute_alu(x, y, op);
            }
            Opcode::Random { x, nn } => {
                let rand_byte: u8 = rand::random();
                self.v[x] = rand_byte & nn;
            }
            Opcode::SetIndexImm { nnn } => {
                self.i = nnn;
            }
            Opcode::AddIndexReg { x } => {
                self.i = self.i.wrapping_add(self.v[x].into());
            }
            Opcode::Draw { x, y, n } => {
                self.execute_draw(x, y, n)?;
            }
            Opcode::SkipIfPressed { x } => {
                if self.keypad[u4::from_low(self.v[x])] {
                    self.skip();
                }
            }
            Opcode::SkipIfNotPressed { x } => {
                if !self.keypad[u4::from_low(self.v[x])] {
                    self.skip();
                }
            }
            Opcode::WaitForKey { x } => {
                return Ok(self.execute_wait_for_key(x));
            }
            Opcode::ReadDelayTimer { x } => {
                self.v[x] = self.delay_timer;
            }
            Opcode::SetDelayTimer { x } => {
                self.delay_timer = self.v[x];
            }
            Opcode::SetSoundTimer { x } => {
                self.sound_timer = self.v[x];
            }
            Opcode::FontChar { x } => {
                self.i = (FONT_START_ADDRESS + self.v[x] as usize * FONT_CHAR_SIZE) as u16;
            }
            Opcode::BigFontChar { x } => {
                self.i = (BIG_FONT_START_ADDRESS + self.v[x] as usize * BIG_FONT_CHAR_SIZE) as u16;
            }
            Opcode::BCD { x } => {
                let value = self.v[x];
                self.mem_range(self.i, 3)?
                    .copy_from_slice(&[value / 100, (value / 10) % 10, value % 10]);
            }
            Opcode::StoreRegs { x } => {
                let count = usize::from(x) + 1;
                let (i, regs) = (self.i, self.v);
                self.mem_range(i, count)?.copy_from_slice(&regs[..count]);
            }
            Opcode::LoadRegs { x } => {
                let count = usize::from(x) + 1;
                let mut regs = self.v;
                regs[..count].copy_from_slice(self.mem_range(self.i, count)?);
                self.v = regs;
            }
            Opcode::Unknown(opcode) => {
                debug!(
                    "Ignoring unknown opcode {opcode:#06X} at {:#05X}",
                    self.pc.wrapping_sub(2)
                );
            }
        };

        Ok(Chip8Result::Continue)
    }

    fn skip(&mut self) {
        self.pc = self.pc.wrapping_add(2);
    }

    fn set_resolution(&mut self, resolution: Resolution) {
        if self.display.resolution() != resolution {
            info!(
                "Switching to {}x{} display",
                resolution.width(),
                resolution.height()
            );
        }
        self.display.set_resolution(resolution);
    }

    /// VF is computed from the operands first and written last, so it wins when x is 0xF.
    fn execute_alu(&mut self, x: u4, y: u4, op: OpcodeALU) {
        let (vx, vy) = (self.v[x], self.v[y]);

        match op {
            OpcodeALU::Set => self.v[x] = vy,
            OpcodeALU::Or => self.v[x] = vx | vy,
            OpcodeALU::And => self.v[x] = vx & vy,
            OpcodeALU::Xor => self.v[x] = vx ^ vy,
            OpcodeALU::Add => {
                let (res, carry) = vx.overflowing_add(vy);
                self.v[x] = res;
                self.v[0xF] = u8::from(carry);
            }
            OpcodeALU::Sub => {
                self.v[x] = vx.wrapping_sub(vy);
                self.v[0xF] = u8::from(vx >= vy);
            }
            OpcodeALU::SubReverse => {
                self.v[x] = vy.wrapping_sub(vx);
                self.v[0xF] = u8::from(vx <= vy);
            }
            OpcodeALU::ShiftRight => {
                self.v[x] = vx >> 1;
                self.v[0xF] = vx & 1;
            }
            OpcodeALU::ShiftLeft => {
                self.v[x] = vx << 1;
                self.v[0xF] = vx >> 7;
            }
        }
    }

    fn execute_draw(&mut self, x: u4, y: u4, n: u4) -> Result<(), Chip8Error> {
        let width = self.display.width();
        let height = self.display.height();

        let x_pos = self.v[x] as usize % width;
        let y_pos = self.v[y] as usize % height;
        self.v[0xF] = 0;

        // Dxy0 in high resolution draws a 16x16 sprite stored as two bytes per row
        let big_sprite = usize::from(n) == 0 && self.display.resolution() == Resolution::High;
        let (rows, cols) = if big_sprite {
            (16, 16)
        } else {
            (usize::from(n), 8)
        };

        // Sprites clip at the right and bottom edges, they do not wrap
        let row_count = std::cmp::min(rows, height - y_pos);
        let col_count = std::cmp::min(cols, width - x_pos);

        let mut any_collision = false;
        for row in 0..row_count {
            let sprite_row = if big_sprite {
                let addr = self.i.wrapping_add(row as u16 * 2);
                let high = *self.mem_get(addr)?;
                let low = *self.mem_get(addr.wrapping_add(1))?;
                u16::from_be_bytes([high, low])
            } else {
                u16::from(*self.mem_get(self.i.wrapping_add(row as u16))?) << 8
            };

            for col in 0..col_count {
                // If current sprite bit is non-zero
                if sprite_row & (0x8000 >> col) != 0
                    && self.display.flip_pixel(x_pos + col, y_pos + row)
                {
                    any_collision = true;
                }
            }
        }

        if any_collision {
            self.v[0xF] = 1;
        }
        Ok(())
    }

    fn execute_wait_for_key(&mut self, x: u4) -> Chip8Result {
        if let Some(key) = self.keypad.iter().position(|&pressed| pressed) {
            self.v[x] = key as u8;
            return Chip8Result::Continue;
        }

        // Repeat this instruction until a key is pressed
        self.pc = self.pc.wrapping_sub(2);
        Chip8Result::WaitForNextFrame
    }
}

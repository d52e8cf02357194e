use crate::u4;

/// Raw fields of a fetched instruction, extracted by fixed bit masks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: u16,
    /// 12-bit address.
    pub nnn: u16,
    /// 8-bit immediate.
    pub nn: u8,
    pub n: u4,
    pub x: u4,
    pub y: u4,
}

impl Instruction {
    pub fn new(opcode: u16) -> Self {
        Self {
            opcode,
            nnn: opcode & 0x0FFF,
            nn: (opcode & 0x00FF) as u8,
            n: u4::from_low(opcode as u8),
            x: u4::from_low((opcode >> 8) as u8),
            y: u4::from_low((opcode >> 4) as u8),
        }
    }

    /// Top nibble, selecting the opcode family.
    pub fn family(&self) -> u8 {
        (self.opcode >> 12) as u8
    }
}

/// CHIP-8 and SCHIP instruction opcodes.
///
/// The fields (x, y, n, nn, nnn) correspond to the operands encoded in the opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    /// 1nnn - Jump to location nnn.
    Jump { nnn: u16 },
    /// Bnnn - Jump to location nnn + V0.
    JumpWithOffset { nnn: u16 },

    /// 2nnn - Call subroutine at nnn.
    Call { nnn: u16 },
    /// 00EE - Return from a subroutine.
    Return,

    /// 3xnn - Skip next instruction if Vx == nn.
    SkipRegEqualImm { x: u4, nn: u8 },
    /// 4xnn - Skip next instruction if Vx != nn.
    SkipRegNotEqualImm { x: u4, nn: u8 },
    /// 5xy0 - Skip next instruction if Vx == Vy.
    SkipRegEqualReg { x: u4, y: u4 },
    /// 9xy0 - Skip next instruction if Vx != Vy.
    SkipRegNotEqualReg { x: u4, y: u4 },

    /// 6xnn - Set Vx = nn.
    SetRegImm { x: u4, nn: u8 },
    /// 7xnn - Set Vx = Vx + nn.
    AddRegImm { x: u4, nn: u8 },
    /// Annn - Set I = nnn.
    SetIndexImm { nnn: u16 },
    /// Fx1E - Set I = I + Vx.
    AddIndexReg { x: u4 },

    /// 8xyN - ALU operations
    ALU { x: u4, y: u4, op: OpcodeALU },
    /// Cxnn - Set Vx = random byte AND nn.
    Random { x: u4, nn: u8 },

    /// 00E0 - Clear the display.
    ClearDisplay,
    /// Dxyn - Display sprite.
    Draw { x: u4, y: u4, n: u4 },

    /// 00Cn - Scroll the display down by n pixels.
    ScrollDown { n: u4 },
    /// 00FB - Scroll the display right by 4 pixels.
    ScrollRight,
    /// 00FC - Scroll the display left by 4 pixels.
    ScrollLeft,
    /// 00FD - Exit the interpreter.
    Exit,
    /// 00FE - Switch to 64x32 resolution.
    LowRes,
    /// 00FF - Switch to 128x64 resolution.
    HighRes,

    /// Ex9E - Skip next instruction if key with the value of Vx is pressed.
    SkipIfPressed { x: u4 },
    /// ExA1 - Skip next instruction if key with the value of Vx is not pressed.
    SkipIfNotPressed { x: u4 },
    /// Fx0A - Wait for a key press, store the value of the key in Vx.
    WaitForKey { x: u4 },

    /// Fx07 - Set Vx = delay timer value.
    ReadDelayTimer { x: u4 },
    /// Fx15 - Set delay timer = Vx.
    SetDelayTimer { x: u4 },
    /// Fx18 - Set sound timer = Vx.
    SetSoundTimer { x: u4 },

    /// Fx29 - Set I = location of small sprite for digit Vx.
    FontChar { x: u4 },
    /// Fx30 - Set I = location of big sprite for decimal digit Vx.
    BigFontChar { x: u4 },
    /// Fx33 - Store BCD representation of Vx in memory locations I, I+1, and I+2.
    BCD { x: u4 },

    /// Fx55 - Store registers V0 through Vx in memory starting at location I.
    StoreRegs { x: u4 },
    /// Fx65 - Read registers V0 through Vx from memory starting at location I.
    LoadRegs { x: u4 },

    /// Any opcode the interpreter does not implement. Executes as a no-op.
    Unknown(u16),
}

/// ALU operations for the 8xyN instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpcodeALU {
    /// 8xy0 - Vx = Vy
    Set,
    /// 8xy1 - Vx = Vx OR Vy
    Or,
    /// 8xy2 - Vx = Vx AND Vy
    And,
    /// 8xy3 - Vx = Vx XOR Vy
    Xor,
    /// 8xy4 - Vx = Vx + Vy, VF = carry
    Add,
    /// 8xy5 - Vx = Vx - Vy, VF = NOT borrow
    Sub,
    /// 8xy6 - Vx = Vx >> 1, VF = shifted out bit
    ShiftRight,
    /// 8xy7 - Vx = Vy - Vx, VF = NOT borrow
    SubReverse,
    /// 8xyE - Vx = Vx << 1, VF = shifted out bit
    ShiftLeft,
}

impl Opcode {
    /// Decode a 16-bit raw opcode into an Opcode enum variant
    pub fn decode(opcode: u16) -> Self {
        Self::from(Instruction::new(opcode))
    }
}

impl From<Instruction> for Opcode {
    fn from(inst: Instruction) -> Self {
        let Instruction {
            opcode,
            nnn,
            nn,
            n,
            x,
            y,
        } = inst;

        match (inst.family(), x.get(), y.get(), n.get()) {
            (0x0, 0x0, 0xE, 0x0) => Opcode::ClearDisplay,
            (0x0, 0x0, 0xE, 0xE) => Opcode::Return,
            (0x0, 0x0, 0xC, _) => Opcode::ScrollDown { n },
            (0x0, 0x0, 0xF, 0xB) => Opcode::ScrollRight,
            (0x0, 0x0, 0xF, 0xC) => Opcode::ScrollLeft,
            (0x0, 0x0, 0xF, 0xD) => Opcode::Exit,
            (0x0, 0x0, 0xF, 0xE) => Opcode::LowRes,
            (0x0, 0x0, 0xF, 0xF) => Opcode::HighRes,
            (0x1, _, _, _) => Opcode::Jump { nnn },
            (0x2, _, _, _) => Opcode::Call { nnn },
            (0x3, _, _, _) => Opcode::SkipRegEqualImm { x, nn },
            (0x4, _, _, _) => Opcode::SkipRegNotEqualImm { x, nn },
            (0x5, _, _, 0x0) => Opcode::SkipRegEqualReg { x, y },
            (0x6, _, _, _) => Opcode::SetRegImm { x, nn },
            (0x7, _, _, _) => Opcode::AddRegImm { x, nn },
            (0x8, _, _, _) => Opcode::ALU {
                x,
                y,
                op: match n.get() {
                    0x0 => OpcodeALU::Set,
                    0x1 => OpcodeALU::Or,
                    0x2 => OpcodeALU::And,
                    0x3 => OpcodeALU::Xor,
                    0x4 => OpcodeALU::Add,
                    0x5 => OpcodeALU::Sub,
                    0x6 => OpcodeALU::ShiftRight,
                    0x7 => OpcodeALU::SubReverse,
                    0xE => OpcodeALU::ShiftLeft,
                    _ => return Opcode::Unknown(opcode),
                },
            },
            // The low nibble is not checked here, 9xyN behaves as 9xy0.
            (0x9, _, _, _) => Opcode::SkipRegNotEqualReg { x, y },
            (0xA, _, _, _) => Opcode::SetIndexImm { nnn },
            (0xB, _, _, _) => Opcode::JumpWithOffset { nnn },
            (0xC, _, _, _) => Opcode::Random { x, nn },
            (0xD, _, _, _) => Opcode::Draw { x, y, n },
            (0xE, _, 0x9, 0xE) => Opcode::SkipIfPressed { x },
            (0xE, _, 0xA, 0x1) => Opcode::SkipIfNotPressed { x },
            (0xF, _, 0x0, 0xA) => Opcode::WaitForKey { x },
            (0xF, _, 0x0, 0x7) => Opcode::ReadDelayTimer { x },
            (0xF, _, 0x1, 0x5) => Opcode::SetDelayTimer { x },
            (0xF, _, 0x1, 0x8) => Opcode::SetSoundTimer { x },
            (0xF, _, 0x1, 0xE) => Opcode::AddIndexReg { x },
            (0xF, _, 0x2, 0x9) => Opcode::FontChar { x },
            (0xF, _, 0x3, 0x0) => Opcode::BigFontChar { x },
            (0xF, _, 0x3, 0x3) => Opcode::BCD { x },
            (0xF, _, 0x5, 0x5) => Opcode::StoreRegs { x },
            (0xF, _, 0x6, 0x5) => Opcode::LoadRegs { x },

            _ => Opcode::Unknown(opcode),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_fields_by_mask() {
        let inst = Instruction::new(0xD3A5);
        assert_eq!(inst.family(), 0xD);
        assert_eq!(inst.x, u4::new(0x3));
        assert_eq!(inst.y, u4::new(0xA));
        assert_eq!(inst.n, u4::new(0x5));
        assert_eq!(inst.nn, 0xA5);
        assert_eq!(inst.nnn, 0x3A5);
    }

    #[test]
    fn decodes_schip_display_control() {
        assert_eq!(Opcode::decode(0x00C4), Opcode::ScrollDown { n: u4::new(4) });
        assert_eq!(Opcode::decode(0x00FB), Opcode::ScrollRight);
        assert_eq!(Opcode::decode(0x00FC), Opcode::ScrollLeft);
        assert_eq!(Opcode::decode(0x00FD), Opcode::Exit);
        assert_eq!(Opcode::decode(0x00FE), Opcode::LowRes);
        assert_eq!(Opcode::decode(0x00FF), Opcode::HighRes);
        assert_eq!(Opcode::decode(0xF230), Opcode::BigFontChar { x: u4::new(2) });
    }

    #[test]
    fn skip_reg_equal_requires_zero_low_nibble() {
        assert_eq!(
            Opcode::decode(0x5120),
            Opcode::SkipRegEqualReg {
                x: u4::new(1),
                y: u4::new(2)
            }
        );
        assert_eq!(Opcode::decode(0x5121), Opcode::Unknown(0x5121));
    }

    #[test]
    fn unknown_sub_opcodes_decode_as_unknown() {
        assert_eq!(Opcode::decode(0x8128), Opcode::Unknown(0x8128));
        assert_eq!(Opcode::decode(0xE1FF), Opcode::Unknown(0xE1FF));
        assert_eq!(Opcode::decode(0xF1FF), Opcode::Unknown(0xF1FF));
        assert_eq!(Opcode::decode(0x0123), Opcode::Unknown(0x0123));
    }

    #[test]
    fn decodes_alu_family() {
        assert_eq!(
            Opcode::decode(0x8AB4),
            Opcode::ALU {
                x: u4::new(0xA),
                y: u4::new(0xB),
                op: OpcodeALU::Add
            }
        );
        assert_eq!(
            Opcode::decode(0x801E),
            Opcode::ALU {
                x: u4::new(0),
                y: u4::new(1),
                op: OpcodeALU::ShiftLeft
            }
        );
    }
}

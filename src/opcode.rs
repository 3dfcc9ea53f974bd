//! Script opcode tags
//!
//! Every byte value maps to some opcode so that parsing is total: values
//! without an assigned instruction are carried as [`Opcode::Unknown`] and
//! fail if they ever reach execution in a live branch.

use std::fmt;

/// Instruction tag for one script operation.
///
/// `Special` covers the inline pushes whose wire byte is the push length
/// (1 through 75) and therefore has no fixed byte of its own. `RawData`
/// marks an uninterpreted coinbase body and never appears on the wire as
/// an opcode byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    Zero,
    Special,
    PushData1,
    PushData2,
    PushData4,
    Negative1,
    Reserved,
    Op1,
    Op2,
    Op3,
    Op4,
    Op5,
    Op6,
    Op7,
    Op8,
    Op9,
    Op10,
    Op11,
    Op12,
    Op13,
    Op14,
    Op15,
    Op16,
    Nop,
    Ver,
    If,
    NotIf,
    VerIf,
    VerNotIf,
    Else,
    EndIf,
    Verify,
    ToAltStack,
    FromAltStack,
    IfDup,
    Depth,
    Drop,
    Dup,
    Nip,
    Over,
    Pick,
    Roll,
    Size,
    Cat,
    Substr,
    Left,
    Right,
    Invert,
    And,
    Or,
    Xor,
    Equal,
    EqualVerify,
    Reserved1,
    Reserved2,
    Mul2,
    Div2,
    Not,
    Add,
    Mul,
    Div,
    Mod,
    LShift,
    RShift,
    BoolOr,
    GreaterThanOrEqual,
    Min,
    Sha256,
    Hash160,
    CodeSeparator,
    CheckSig,
    CheckSigVerify,
    CheckMultisig,
    CheckMultisigVerify,
    Nop1,
    Nop2,
    Nop3,
    Nop4,
    Nop5,
    Nop6,
    Nop7,
    Nop8,
    Nop9,
    Nop10,
    RawData,
    Unknown(u8),
}

impl Opcode {
    /// Map a wire byte to its opcode. Total: unassigned values come back
    /// as `Unknown` carrying the byte.
    pub fn from_byte(byte: u8) -> Opcode {
        match byte {
            0x00 => Opcode::Zero,
            0x01..=0x4b => Opcode::Special,
            0x4c => Opcode::PushData1,
            0x4d => Opcode::PushData2,
            0x4e => Opcode::PushData4,
            0x4f => Opcode::Negative1,
            0x50 => Opcode::Reserved,
            0x51 => Opcode::Op1,
            0x52 => Opcode::Op2,
            0x53 => Opcode::Op3,
            0x54 => Opcode::Op4,
            0x55 => Opcode::Op5,
            0x56 => Opcode::Op6,
            0x57 => Opcode::Op7,
            0x58 => Opcode::Op8,
            0x59 => Opcode::Op9,
            0x5a => Opcode::Op10,
            0x5b => Opcode::Op11,
            0x5c => Opcode::Op12,
            0x5d => Opcode::Op13,
            0x5e => Opcode::Op14,
            0x5f => Opcode::Op15,
            0x60 => Opcode::Op16,
            0x61 => Opcode::Nop,
            0x62 => Opcode::Ver,
            0x63 => Opcode::If,
            0x64 => Opcode::NotIf,
            0x65 => Opcode::VerIf,
            0x66 => Opcode::VerNotIf,
            0x67 => Opcode::Else,
            0x68 => Opcode::EndIf,
            0x69 => Opcode::Verify,
            0x6b => Opcode::ToAltStack,
            0x6c => Opcode::FromAltStack,
            0x73 => Opcode::IfDup,
            0x74 => Opcode::Depth,
            0x75 => Opcode::Drop,
            0x76 => Opcode::Dup,
            0x77 => Opcode::Nip,
            0x78 => Opcode::Over,
            0x79 => Opcode::Pick,
            0x7a => Opcode::Roll,
            0x7e => Opcode::Cat,
            0x7f => Opcode::Substr,
            0x80 => Opcode::Left,
            0x81 => Opcode::Right,
            0x82 => Opcode::Size,
            0x83 => Opcode::Invert,
            0x84 => Opcode::And,
            0x85 => Opcode::Or,
            0x86 => Opcode::Xor,
            0x87 => Opcode::Equal,
            0x88 => Opcode::EqualVerify,
            0x89 => Opcode::Reserved1,
            0x8a => Opcode::Reserved2,
            0x8d => Opcode::Mul2,
            0x8e => Opcode::Div2,
            0x91 => Opcode::Not,
            0x93 => Opcode::Add,
            0x95 => Opcode::Mul,
            0x96 => Opcode::Div,
            0x97 => Opcode::Mod,
            0x98 => Opcode::LShift,
            0x99 => Opcode::RShift,
            0x9b => Opcode::BoolOr,
            0xa2 => Opcode::GreaterThanOrEqual,
            0xa3 => Opcode::Min,
            0xa8 => Opcode::Sha256,
            0xa9 => Opcode::Hash160,
            0xab => Opcode::CodeSeparator,
            0xac => Opcode::CheckSig,
            0xad => Opcode::CheckSigVerify,
            0xae => Opcode::CheckMultisig,
            0xaf => Opcode::CheckMultisigVerify,
            0xb0 => Opcode::Nop1,
            0xb1 => Opcode::Nop2,
            0xb2 => Opcode::Nop3,
            0xb3 => Opcode::Nop4,
            0xb4 => Opcode::Nop5,
            0xb5 => Opcode::Nop6,
            0xb6 => Opcode::Nop7,
            0xb7 => Opcode::Nop8,
            0xb8 => Opcode::Nop9,
            0xb9 => Opcode::Nop10,
            other => Opcode::Unknown(other),
        }
    }

    /// Wire byte for this opcode. `Special` (whose byte is the push
    /// length) and `RawData` (which has no opcode byte) return `None`.
    pub fn to_byte(self) -> Option<u8> {
        let byte = match self {
            Opcode::Zero => 0x00,
            Opcode::Special | Opcode::RawData => return None,
            Opcode::PushData1 => 0x4c,
            Opcode::PushData2 => 0x4d,
            Opcode::PushData4 => 0x4e,
            Opcode::Negative1 => 0x4f,
            Opcode::Reserved => 0x50,
            Opcode::Op1 => 0x51,
            Opcode::Op2 => 0x52,
            Opcode::Op3 => 0x53,
            Opcode::Op4 => 0x54,
            Opcode::Op5 => 0x55,
            Opcode::Op6 => 0x56,
            Opcode::Op7 => 0x57,
            Opcode::Op8 => 0x58,
            Opcode::Op9 => 0x59,
            Opcode::Op10 => 0x5a,
            Opcode::Op11 => 0x5b,
            Opcode::Op12 => 0x5c,
            Opcode::Op13 => 0x5d,
            Opcode::Op14 => 0x5e,
            Opcode::Op15 => 0x5f,
            Opcode::Op16 => 0x60,
            Opcode::Nop => 0x61,
            Opcode::Ver => 0x62,
            Opcode::If => 0x63,
            Opcode::NotIf => 0x64,
            Opcode::VerIf => 0x65,
            Opcode::VerNotIf => 0x66,
            Opcode::Else => 0x67,
            Opcode::EndIf => 0x68,
            Opcode::Verify => 0x69,
            Opcode::ToAltStack => 0x6b,
            Opcode::FromAltStack => 0x6c,
            Opcode::IfDup => 0x73,
            Opcode::Depth => 0x74,
            Opcode::Drop => 0x75,
            Opcode::Dup => 0x76,
            Opcode::Nip => 0x77,
            Opcode::Over => 0x78,
            Opcode::Pick => 0x79,
            Opcode::Roll => 0x7a,
            Opcode::Cat => 0x7e,
            Opcode::Substr => 0x7f,
            Opcode::Left => 0x80,
            Opcode::Right => 0x81,
            Opcode::Size => 0x82,
            Opcode::Invert => 0x83,
            Opcode::And => 0x84,
            Opcode::Or => 0x85,
            Opcode::Xor => 0x86,
            Opcode::Equal => 0x87,
            Opcode::EqualVerify => 0x88,
            Opcode::Reserved1 => 0x89,
            Opcode::Reserved2 => 0x8a,
            Opcode::Mul2 => 0x8d,
            Opcode::Div2 => 0x8e,
            Opcode::Not => 0x91,
            Opcode::Add => 0x93,
            Opcode::Mul => 0x95,
            Opcode::Div => 0x96,
            Opcode::Mod => 0x97,
            Opcode::LShift => 0x98,
            Opcode::RShift => 0x99,
            Opcode::BoolOr => 0x9b,
            Opcode::GreaterThanOrEqual => 0xa2,
            Opcode::Min => 0xa3,
            Opcode::Sha256 => 0xa8,
            Opcode::Hash160 => 0xa9,
            Opcode::CodeSeparator => 0xab,
            Opcode::CheckSig => 0xac,
            Opcode::CheckSigVerify => 0xad,
            Opcode::CheckMultisig => 0xae,
            Opcode::CheckMultisigVerify => 0xaf,
            Opcode::Nop1 => 0xb0,
            Opcode::Nop2 => 0xb1,
            Opcode::Nop3 => 0xb2,
            Opcode::Nop4 => 0xb3,
            Opcode::Nop5 => 0xb4,
            Opcode::Nop6 => 0xb5,
            Opcode::Nop7 => 0xb6,
            Opcode::Nop8 => 0xb7,
            Opcode::Nop9 => 0xb8,
            Opcode::Nop10 => 0xb9,
            Opcode::Unknown(other) => other,
        };
        Some(byte)
    }

    /// The push set: opcodes whose only effect is placing a value on the
    /// stack. This is the set an input script must be drawn from when it
    /// feeds a pay-to-script-hash output.
    pub fn is_push_value(self) -> bool {
        matches!(
            self,
            Opcode::Zero
                | Opcode::Special
                | Opcode::PushData1
                | Opcode::PushData2
                | Opcode::PushData4
                | Opcode::Negative1
                | Opcode::Op1
                | Opcode::Op2
                | Opcode::Op3
                | Opcode::Op4
                | Opcode::Op5
                | Opcode::Op6
                | Opcode::Op7
                | Opcode::Op8
                | Opcode::Op9
                | Opcode::Op10
                | Opcode::Op11
                | Opcode::Op12
                | Opcode::Op13
                | Opcode::Op14
                | Opcode::Op15
                | Opcode::Op16
        )
    }

    /// The four branch opcodes, the only ones still interpreted inside a
    /// dead branch.
    pub fn is_conditional(self) -> bool {
        matches!(
            self,
            Opcode::If | Opcode::NotIf | Opcode::Else | Opcode::EndIf
        )
    }

    /// Opcodes that fail unconditionally when executed in a live branch:
    /// the reserved set and the historically disabled arithmetic and
    /// bitwise set. A dead branch skips them like anything else.
    pub fn is_disabled(self) -> bool {
        matches!(
            self,
            Opcode::Reserved
                | Opcode::Ver
                | Opcode::VerIf
                | Opcode::VerNotIf
                | Opcode::Reserved1
                | Opcode::Reserved2
                | Opcode::Cat
                | Opcode::Substr
                | Opcode::Left
                | Opcode::Right
                | Opcode::Invert
                | Opcode::And
                | Opcode::Or
                | Opcode::Xor
                | Opcode::Mul2
                | Opcode::Div2
                | Opcode::Mul
                | Opcode::Div
                | Opcode::Mod
                | Opcode::LShift
                | Opcode::RShift
        )
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mnemonic = match self {
            Opcode::Zero => "zero",
            Opcode::Special => "special",
            Opcode::PushData1 => "pushdata1",
            Opcode::PushData2 => "pushdata2",
            Opcode::PushData4 => "pushdata4",
            Opcode::Negative1 => "-1",
            Opcode::Reserved => "reserved",
            Opcode::Op1 => "1",
            Opcode::Op2 => "2",
            Opcode::Op3 => "3",
            Opcode::Op4 => "4",
            Opcode::Op5 => "5",
            Opcode::Op6 => "6",
            Opcode::Op7 => "7",
            Opcode::Op8 => "8",
            Opcode::Op9 => "9",
            Opcode::Op10 => "10",
            Opcode::Op11 => "11",
            Opcode::Op12 => "12",
            Opcode::Op13 => "13",
            Opcode::Op14 => "14",
            Opcode::Op15 => "15",
            Opcode::Op16 => "16",
            Opcode::Nop => "nop",
            Opcode::Ver => "ver",
            Opcode::If => "if",
            Opcode::NotIf => "notif",
            Opcode::VerIf => "verif",
            Opcode::VerNotIf => "vernotif",
            Opcode::Else => "else",
            Opcode::EndIf => "endif",
            Opcode::Verify => "verify",
            Opcode::ToAltStack => "toaltstack",
            Opcode::FromAltStack => "fromaltstack",
            Opcode::IfDup => "ifdup",
            Opcode::Depth => "depth",
            Opcode::Drop => "drop",
            Opcode::Dup => "dup",
            Opcode::Nip => "nip",
            Opcode::Over => "over",
            Opcode::Pick => "pick",
            Opcode::Roll => "roll",
            Opcode::Size => "size",
            Opcode::Cat => "cat",
            Opcode::Substr => "substr",
            Opcode::Left => "left",
            Opcode::Right => "right",
            Opcode::Invert => "invert",
            Opcode::And => "and",
            Opcode::Or => "or",
            Opcode::Xor => "xor",
            Opcode::Equal => "equal",
            Opcode::EqualVerify => "equalverify",
            Opcode::Reserved1 => "reserved1",
            Opcode::Reserved2 => "reserved2",
            Opcode::Mul2 => "2mul",
            Opcode::Div2 => "2div",
            Opcode::Not => "not",
            Opcode::Add => "add",
            Opcode::Mul => "mul",
            Opcode::Div => "div",
            Opcode::Mod => "mod",
            Opcode::LShift => "lshift",
            Opcode::RShift => "rshift",
            Opcode::BoolOr => "boolor",
            Opcode::GreaterThanOrEqual => "greaterthanorequal",
            Opcode::Min => "min",
            Opcode::Sha256 => "sha256",
            Opcode::Hash160 => "hash160",
            Opcode::CodeSeparator => "codeseparator",
            Opcode::CheckSig => "checksig",
            Opcode::CheckSigVerify => "checksigverify",
            Opcode::CheckMultisig => "checkmultisig",
            Opcode::CheckMultisigVerify => "checkmultisigverify",
            Opcode::Nop1 => "nop1",
            Opcode::Nop2 => "nop2",
            Opcode::Nop3 => "nop3",
            Opcode::Nop4 => "nop4",
            Opcode::Nop5 => "nop5",
            Opcode::Nop6 => "nop6",
            Opcode::Nop7 => "nop7",
            Opcode::Nop8 => "nop8",
            Opcode::Nop9 => "nop9",
            Opcode::Nop10 => "nop10",
            Opcode::RawData => "raw_data",
            Opcode::Unknown(byte) => return write!(f, "<unknown {byte:#04x}>"),
        };
        f.write_str(mnemonic)
    }
}

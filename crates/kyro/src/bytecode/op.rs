//! Opcode definitions.
//!
//! Numbering follows the external compiler that produces KYC modules;
//! every instruction is exactly two bytes, `(opcode, argument)`. Opcode
//! bytes outside this set are rejected at load time.

use strum::{FromRepr, IntoStaticStr};

/// One opcode of the source bytecode format.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr, IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub(crate) enum Opcode {
    PopTop = 1,
    RotTwo = 2,
    RotThree = 3,
    DupTop = 4,
    Nop = 9,
    UnaryNegative = 11,
    UnaryNot = 12,
    BinaryMultiply = 20,
    BinaryModulo = 22,
    BinaryAdd = 23,
    BinarySubtract = 24,
    BinarySubscr = 25,
    BinaryFloorDivide = 26,
    BinaryTrueDivide = 27,
    ReturnValue = 83,
    StoreName = 90,
    StoreAttr = 95,
    LoadConst = 100,
    LoadName = 101,
    BuildTuple = 102,
    BuildList = 103,
    BuildMap = 105,
    LoadAttr = 106,
    CompareOp = 107,
    JumpAbsolute = 113,
    PopJumpIfFalse = 114,
    PopJumpIfTrue = 115,
    LoadGlobal = 116,
    LoadFast = 124,
    StoreFast = 125,
    RaiseVarargs = 130,
    CallFunction = 131,
    MakeFunction = 132,
    CallFunctionKw = 141,
    LoadMethod = 160,
    CallMethod = 161,
}

impl Opcode {
    /// The source-format mnemonic, e.g. `LOAD_CONST`.
    #[must_use]
    pub fn mnemonic(self) -> &'static str {
        self.into()
    }

    /// Net operand-stack effect of this opcode, when it is fixed.
    ///
    /// Returns `None` for opcodes whose effect depends on control flow
    /// or call shape (`CALL_*`, `RETURN_VALUE`, `RAISE_VARARGS`). Used
    /// by debug assertions in the dispatch loop and by the stack-balance
    /// tests.
    #[must_use]
    pub fn stack_effect(self, arg: u8) -> Option<i32> {
        let arg = i32::from(arg);
        match self {
            Self::Nop | Self::RotTwo | Self::RotThree | Self::JumpAbsolute => Some(0),
            Self::PopTop | Self::PopJumpIfFalse | Self::PopJumpIfTrue | Self::StoreName | Self::StoreFast => Some(-1),
            Self::DupTop | Self::LoadConst | Self::LoadName | Self::LoadGlobal | Self::LoadFast => Some(1),
            Self::UnaryNegative | Self::UnaryNot | Self::LoadAttr | Self::LoadMethod => Some(0),
            Self::BinaryMultiply
            | Self::BinaryModulo
            | Self::BinaryAdd
            | Self::BinarySubtract
            | Self::BinarySubscr
            | Self::BinaryFloorDivide
            | Self::BinaryTrueDivide
            | Self::CompareOp => Some(-1),
            Self::StoreAttr => Some(-2),
            Self::BuildTuple | Self::BuildList => Some(1 - arg),
            Self::BuildMap => Some(1 - 2 * arg),
            Self::MakeFunction => None,
            Self::ReturnValue | Self::RaiseVarargs => None,
            Self::CallFunction | Self::CallFunctionKw | Self::CallMethod => None,
        }
    }
}

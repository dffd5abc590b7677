//! Bytecode representation and the virtual machine.
//!
//! - `op` - opcode definitions with the external compiler's numbering
//! - `code` - runtime code objects
//! - `vm` - the frame machine and fetch-decode-execute loop

pub(crate) mod code;
pub(crate) mod op;
pub(crate) mod vm;

pub use code::CodeId;

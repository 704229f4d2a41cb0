// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Static mnemonic and directive tables.

/// Opcode of the jump group (`jmp`/`bne`/`jsr`). The only group that
/// accepts relative addressing.
pub const JUMP_OPCODE: u8 = 9;

/// Opcode of `prn`, whose single operand is the source rather than the
/// destination.
pub const PRN_OPCODE: u8 = 13;

/// Longest mnemonic; the first pass reads at most this many characters.
pub const MAX_OP_LEN: usize = 4;

/// One row of the operation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    pub mnemonic: &'static str,
    pub opcode: u8,
    pub func: u8,
    pub operands: u8,
}

const OPERATIONS: &[Operation] = &[
    Operation { mnemonic: "mov", opcode: 0, func: 0, operands: 2 },
    Operation { mnemonic: "cmp", opcode: 1, func: 0, operands: 2 },
    Operation { mnemonic: "add", opcode: 2, func: 1, operands: 2 },
    Operation { mnemonic: "sub", opcode: 2, func: 2, operands: 2 },
    Operation { mnemonic: "lea", opcode: 4, func: 0, operands: 2 },
    Operation { mnemonic: "clr", opcode: 5, func: 1, operands: 1 },
    Operation { mnemonic: "not", opcode: 5, func: 2, operands: 1 },
    Operation { mnemonic: "inc", opcode: 5, func: 3, operands: 1 },
    Operation { mnemonic: "dec", opcode: 5, func: 4, operands: 1 },
    Operation { mnemonic: "jmp", opcode: 9, func: 1, operands: 1 },
    Operation { mnemonic: "bne", opcode: 9, func: 2, operands: 1 },
    Operation { mnemonic: "jsr", opcode: 9, func: 3, operands: 1 },
    Operation { mnemonic: "red", opcode: 12, func: 0, operands: 1 },
    Operation { mnemonic: "prn", opcode: 13, func: 0, operands: 1 },
    Operation { mnemonic: "rts", opcode: 14, func: 0, operands: 0 },
    Operation { mnemonic: "stop", opcode: 15, func: 0, operands: 0 },
];

/// Resolve a mnemonic to its operation row.
pub fn lookup(mnemonic: &str) -> Option<&'static Operation> {
    OPERATIONS.iter().find(|op| op.mnemonic == mnemonic)
}

/// The four recognized dot-directives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    Data,
    String,
    Entry,
    Extern,
}

const DIRECTIVES: &[(&str, DirectiveKind)] = &[
    (".data", DirectiveKind::Data),
    (".string", DirectiveKind::String),
    (".entry", DirectiveKind::Entry),
    (".extern", DirectiveKind::Extern),
];

/// Outcome of looking up a directive token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveLookup {
    /// The token does not start with a dot.
    NotDirective,
    Known(DirectiveKind),
    /// Dot-prefixed but names no known directive.
    Unknown,
}

/// Resolve a directive token.
pub fn directive(token: &str) -> DirectiveLookup {
    if !token.starts_with('.') {
        return DirectiveLookup::NotDirective;
    }
    for (name, kind) in DIRECTIVES {
        if token == *name {
            return DirectiveLookup::Known(*kind);
        }
    }
    DirectiveLookup::Unknown
}

/// Reserved words a macro may not be named after.
pub fn is_reserved_word(name: &str) -> bool {
    if name == "mcro" || name == "mcroend" {
        return true;
    }
    if DIRECTIVES.iter().any(|(dir, _)| *dir == name) {
        return true;
    }
    lookup(name).is_some()
}

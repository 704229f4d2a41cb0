// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Symbol table for label definitions and external reference sites.
//!
//! Definitions (code, data, extern declarations) live in one
//! insertion-ordered list with unique names. Reference sites, which record
//! every code cell that mentions an external symbol, live in a second
//! insertion-ordered list and may repeat names freely. The output writers
//! rely on both orders.

/// Kind of a defined symbol.
///
/// `Entry` is never set at definition time; it is applied by promoting an
/// existing `Code` or `Data` symbol during the second pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Code,
    Data,
    Entry,
    Extern,
}

/// A defined symbol: name, assigned address, and kind.
#[derive(Debug, Clone)]
pub struct SymbolEntry {
    pub name: String,
    pub address: u32,
    pub kind: SymbolKind,
}

/// One use of an external symbol: the address of the code cell holding the
/// reference. Emitted verbatim into the `.ext` artifact.
#[derive(Debug, Clone)]
pub struct ExternRef {
    pub name: String,
    pub address: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertError {
    DuplicateName,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromoteError {
    Undefined,
    AlreadyExtern,
}

#[derive(Debug, Default)]
pub struct SymbolTable {
    entries: Vec<SymbolEntry>,
    references: Vec<ExternRef>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a symbol. Names are unique across all definitions.
    pub fn insert(&mut self, name: &str, address: u32, kind: SymbolKind) -> Result<(), InsertError> {
        if self.find(name).is_some() {
            return Err(InsertError::DuplicateName);
        }
        self.entries.push(SymbolEntry {
            name: name.to_string(),
            address,
            kind,
        });
        Ok(())
    }

    /// First definition matching `name`.
    pub fn find(&self, name: &str) -> Option<&SymbolEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    /// First definition matching both `name` and `kind`.
    pub fn find_kind(&self, name: &str, kind: SymbolKind) -> Option<&SymbolEntry> {
        self.entries
            .iter()
            .find(|entry| entry.name == name && entry.kind == kind)
    }

    /// Record a use site of an external symbol at `address`.
    pub fn append_reference(&mut self, name: &str, address: u32) {
        self.references.push(ExternRef {
            name: name.to_string(),
            address,
        });
    }

    /// Promote a `Code` or `Data` definition to `Entry`. Idempotent when the
    /// symbol is already an entry.
    pub fn promote_to_entry(&mut self, name: &str) -> Result<(), PromoteError> {
        let Some(entry) = self.entries.iter_mut().find(|entry| entry.name == name) else {
            return Err(PromoteError::Undefined);
        };
        match entry.kind {
            SymbolKind::Entry => Ok(()),
            SymbolKind::Extern => Err(PromoteError::AlreadyExtern),
            SymbolKind::Code | SymbolKind::Data => {
                entry.kind = SymbolKind::Entry;
                Ok(())
            }
        }
    }

    /// Definitions in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &SymbolEntry> {
        self.entries.iter()
    }

    /// External reference sites in insertion order.
    pub fn references(&self) -> &[ExternRef] {
        &self.references
    }

    /// Shift every data symbol so its offset into the data image becomes an
    /// absolute address following the code image.
    pub fn rebase_data(&mut self, final_ic: u32) {
        for entry in &mut self.entries {
            if entry.kind == SymbolKind::Data {
                entry.address += final_ic;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

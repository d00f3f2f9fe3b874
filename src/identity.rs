//! Link-name and output-file-name allocation.
//!
//! Every node gets a human-readable link name used as its cross-reference
//! target, and an output file name derived from it. Both are pure functions
//! of the node's kind and qualified name, so repeated builds over the same
//! input are reproducible and diff-stable. The allocator's registries detect
//! any collision as a fatal internal error.

use sha1::{Digest, Sha1};
use std::collections::HashMap;

use crate::compound::CompoundKind;
use crate::error::GenerationError;

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// The derived identifiers for one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeIdentity {
    /// Cross-reference target; never hashed, so generated text stays readable.
    pub link_name: String,
    /// On-disk file name, hash-shortened when the derived name would exceed
    /// the platform filename limit.
    pub file_name: String,
    /// Verbatim-source page link, file nodes only.
    pub program_link_name: Option<String>,
    /// Verbatim-source page file name, file nodes only.
    pub program_file_name: Option<String>,
}

/// Replace every non-alphanumeric byte with a fixed-width `_xx` hex escape.
///
/// The escape is injective (`_` itself escapes to `_5f`), so two distinct
/// inputs can never collide on sanitization alone.
pub fn sanitize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for byte in name.bytes() {
        if byte.is_ascii_alphanumeric() {
            out.push(byte as char);
        } else {
            out.push('_');
            out.push(HEX_DIGITS[(byte >> 4) as usize] as char);
            out.push(HEX_DIGITS[(byte & 0x0f) as usize] as char);
        }
    }
    out
}

/// Lowercase 40-character SHA-1 digest of `input`.
pub fn sha1_hex(input: &str) -> String {
    let digest = Sha1::digest(input.as_bytes());
    let mut out = String::with_capacity(40);
    for byte in digest {
        out.push(HEX_DIGITS[(byte >> 4) as usize] as char);
        out.push(HEX_DIGITS[(byte & 0x0f) as usize] as char);
    }
    out
}

/// Derive the cross-reference link name for a node.
pub fn derive_link_name(kind: CompoundKind, name: &str) -> String {
    format!("{}_{}", kind.name(), sanitize(name))
}

/// Allocates identities and enforces build-wide uniqueness.
#[derive(Debug)]
pub struct IdentityAllocator {
    max_filename_length: usize,
    /// link name -> the "{kind} `{name}`" that claimed it
    link_names: HashMap<String, String>,
    file_names: HashMap<String, String>,
}

impl IdentityAllocator {
    pub fn new(max_filename_length: usize) -> Self {
        Self {
            max_filename_length,
            link_names: HashMap::new(),
            file_names: HashMap::new(),
        }
    }

    /// Allocate the identity for one node.
    ///
    /// `name` is the fully-qualified name, or the path for files and
    /// directories. Fails with [`GenerationError::IdentityCollision`] when a
    /// previously allocated node already claimed the derived link name or
    /// file name.
    pub fn allocate(
        &mut self,
        kind: CompoundKind,
        name: &str,
    ) -> Result<NodeIdentity, GenerationError> {
        let link_name = derive_link_name(kind, name);
        let mut file_name = format!("{link_name}.rst");
        if file_name.len() >= self.max_filename_length {
            file_name = format!("{}_{}.rst", kind.name(), sha1_hex(&link_name));
        }

        let mut program_link_name = None;
        let mut program_file_name = None;
        if kind == CompoundKind::File {
            let program_link = format!("program_listing_{link_name}");
            let mut program_file = format!("{program_link}.rst");
            // Adding the prefix may have pushed the pair over the limit; if
            // so, both names fall back to the hashed base so they never
            // diverge.
            if program_file.len() >= self.max_filename_length {
                file_name = format!("{}_{}.rst", kind.name(), sha1_hex(&link_name));
                program_file = format!("program_listing_{file_name}");
            }
            program_link_name = Some(program_link);
            program_file_name = Some(program_file);
        }

        let owner = format!("{} `{}`", kind, name);
        claim(&mut self.link_names, "link name", &link_name, &owner)?;
        claim(&mut self.file_names, "file name", &file_name, &owner)?;
        if let Some(program_link) = &program_link_name {
            claim(&mut self.link_names, "link name", program_link, &owner)?;
        }
        if let Some(program_file) = &program_file_name {
            claim(&mut self.file_names, "file name", program_file, &owner)?;
        }

        Ok(NodeIdentity {
            link_name,
            file_name,
            program_link_name,
            program_file_name,
        })
    }
}

fn claim(
    registry: &mut HashMap<String, String>,
    what: &'static str,
    value: &str,
    owner: &str,
) -> Result<(), GenerationError> {
    if let Some(existing) = registry.get(value) {
        return Err(GenerationError::IdentityCollision {
            what,
            value: value.to_string(),
            first: existing.clone(),
            second: owner.to_string(),
        });
    }
    registry.insert(value.to_string(), owner.to_string());
    Ok(())
}

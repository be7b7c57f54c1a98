//! ICC Profile Writer
//!
//! Two-pass construction: tags are appended in order with [`ProfileWriter::add_tag`]
//! (or shared between several signatures with [`ProfileWriter::add_shared_tag`]),
//! then [`ProfileWriter::finalize`] lays out the tag table, pads every tag to a
//! 4-byte boundary and patches the size field at offset 0.

use super::header::{HEADER_SIZE, IccHeader};
use super::types::TagSignature;

/// Size of one tag table entry: signature, offset, length
pub const TAG_ENTRY_SIZE: usize = 12;

#[derive(Debug, Clone)]
struct PendingTag {
    signatures: Vec<TagSignature>,
    body: Vec<u8>,
}

/// Builder for a binary ICC profile
#[derive(Debug, Clone)]
pub struct ProfileWriter {
    header: IccHeader,
    tags: Vec<PendingTag>,
}

impl ProfileWriter {
    pub fn new(header: IccHeader) -> Self {
        Self {
            header,
            tags: Vec::new(),
        }
    }

    /// Append a tag body (type signature included) under one signature
    pub fn add_tag(&mut self, signature: TagSignature, body: Vec<u8>) -> &mut Self {
        self.add_shared_tag(&[signature], body)
    }

    /// Append one tag body referenced by several table entries
    pub fn add_shared_tag(&mut self, signatures: &[TagSignature], body: Vec<u8>) -> &mut Self {
        self.tags.push(PendingTag {
            signatures: signatures.to_vec(),
            body,
        });
        self
    }

    /// Number of tag table entries the finished profile will carry
    pub fn entry_count(&self) -> usize {
        self.tags.iter().map(|t| t.signatures.len()).sum()
    }

    /// Lay out the profile and return the finished bytes
    pub fn finalize(&self) -> Vec<u8> {
        let entry_count = self.entry_count();
        let table_size = 4 + entry_count * TAG_ENTRY_SIZE;

        let mut table = Vec::with_capacity(table_size);
        table.extend_from_slice(&(entry_count as u32).to_be_bytes());

        let mut data = Vec::new();
        let mut offset = HEADER_SIZE + table_size;
        for tag in &self.tags {
            for sig in &tag.signatures {
                table.extend_from_slice(&sig.to_bytes());
                table.extend_from_slice(&(offset as u32).to_be_bytes());
                table.extend_from_slice(&(tag.body.len() as u32).to_be_bytes());
            }
            data.extend_from_slice(&tag.body);
            let padded = tag.body.len().next_multiple_of(4);
            data.resize(data.len() + padded - tag.body.len(), 0);
            offset += padded;
        }

        let mut out = Vec::with_capacity(offset);
        out.extend_from_slice(&self.header.to_bytes());
        out.extend_from_slice(&table);
        out.extend_from_slice(&data);

        let size = out.len() as u32;
        out[0..4].copy_from_slice(&size.to_be_bytes());
        out
    }
}

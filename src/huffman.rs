//! Huffman coding: tree construction, code generation, encoding, and decoding.
//!
//! The tree is an arena of nodes addressed by index. Leaves hold a symbol,
//! internal nodes hold exactly two child indices, and the root is whatever
//! node survives the merge loop. A table with a single used symbol yields a
//! lone leaf as root, whose code is empty.
use std::fmt;
use std::io::{self, Read, Write};

use bitvec::prelude::*;

use crate::bitio::{BitReader, BitWriter};
use crate::frequency::FrequencyTable;
use crate::pqueue::MinHeap;
use crate::{HuffError, HuffResult};

/// A node in the Huffman tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HuffmanNode {
    Leaf {
        weight: u64,
        value: u8,
    },
    Internal {
        weight: u64,
        left: usize,
        right: usize,
    },
}

impl HuffmanNode {
    /// Frequency weight of this node (or subtree).
    pub fn weight(&self) -> u64 {
        match *self {
            HuffmanNode::Leaf { weight, .. } | HuffmanNode::Internal { weight, .. } => weight,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, HuffmanNode::Leaf { .. })
    }
}

/// A Huffman tree for encoding and decoding byte streams.
#[derive(Debug, Clone)]
pub struct HuffmanTree {
    /// Leaves first (ascending symbol), then internal nodes in merge order.
    nodes: Vec<HuffmanNode>,
    root: usize,
    /// Number of distinct symbols in the tree.
    pub leaf_count: u32,
}

impl HuffmanTree {
    /// Build a Huffman tree from input data.
    pub fn from_data(input: &[u8]) -> HuffResult<Self> {
        let mut freq = FrequencyTable::new();
        freq.count(input);
        Self::from_frequency_table(&freq)
    }

    /// Build a Huffman tree from a frequency table.
    ///
    /// Leaves are seeded in ascending symbol order; each round extracts the
    /// two lightest nodes and merges them with the first one on the left.
    /// Fails with [`HuffError::EmptyAlphabet`] if no symbol is used.
    pub fn from_frequency_table(freq: &FrequencyTable) -> HuffResult<Self> {
        if freq.used == 0 {
            return Err(HuffError::EmptyAlphabet);
        }

        let capacity = 2 * freq.used as usize - 1;
        let mut nodes: Vec<HuffmanNode> = Vec::with_capacity(capacity);
        let mut heap: MinHeap<usize> = MinHeap::with_capacity(freq.used as usize);

        for (value, weight) in freq.symbols() {
            heap.push(weight, nodes.len());
            nodes.push(HuffmanNode::Leaf { weight, value });
        }

        let root = loop {
            let left = heap.pop().ok_or(HuffError::EmptyAlphabet)?;
            let Some(right) = heap.pop() else {
                break left;
            };

            let weight = nodes[left].weight() + nodes[right].weight();
            let merged = nodes.len();
            nodes.push(HuffmanNode::Internal {
                weight,
                left,
                right,
            });
            heap.push(weight, merged);
        };

        log::trace!(
            "huffman tree: {} leaves, {} nodes, root weight {}",
            freq.used,
            nodes.len(),
            nodes[root].weight()
        );

        Ok(HuffmanTree {
            nodes,
            root,
            leaf_count: freq.used,
        })
    }

    /// Index of the root node.
    pub fn root(&self) -> usize {
        self.root
    }

    /// Look up a node by index.
    pub fn node(&self, idx: usize) -> Option<&HuffmanNode> {
        self.nodes.get(idx)
    }

    /// Total weight of the tree, equal to the number of encoded symbols.
    pub fn total_weight(&self) -> u64 {
        self.nodes[self.root].weight()
    }

    /// Child of internal node `idx`: left on `false`, right on `true`.
    ///
    /// Returns `None` if `idx` is a leaf or out of range.
    pub fn child(&self, idx: usize, bit: bool) -> Option<usize> {
        match self.nodes.get(idx)? {
            HuffmanNode::Internal { left, right, .. } => Some(if bit { *right } else { *left }),
            HuffmanNode::Leaf { .. } => None,
        }
    }

    /// Symbol held by node `idx`, if it is a leaf.
    pub fn leaf_value(&self, idx: usize) -> Option<u8> {
        match self.nodes.get(idx)? {
            HuffmanNode::Leaf { value, .. } => Some(*value),
            HuffmanNode::Internal { .. } => None,
        }
    }

    /// Derive the code of every leaf by depth-first traversal.
    ///
    /// Descending left appends 0, right appends 1. A leaf root gets the
    /// empty code.
    pub fn code_table(&self) -> CodeTable {
        let mut table = CodeTable::new();
        let mut prefix: BitVec<u8, Msb0> = BitVec::new();
        self.generate_codes(self.root, &mut prefix, &mut table);
        table
    }

    /// Recursion depth is bounded by the leaf count, at most 255.
    fn generate_codes(&self, idx: usize, prefix: &mut BitVec<u8, Msb0>, table: &mut CodeTable) {
        match self.nodes[idx] {
            HuffmanNode::Leaf { value, .. } => {
                table.codes[value as usize] = Some(Code {
                    bits: prefix.clone(),
                });
            }
            HuffmanNode::Internal { left, right, .. } => {
                prefix.push(false);
                self.generate_codes(left, prefix, table);
                prefix.pop();

                prefix.push(true);
                self.generate_codes(right, prefix, table);
                prefix.pop();
            }
        }
    }

    /// Decode up to `count` symbols from `reader`, appending them to `output`.
    ///
    /// A leaf root emits its symbol `count` times without touching the
    /// reader. Otherwise the walk restarts at the root after every leaf and
    /// stops early if the reader runs out of bits. Returns the number of
    /// symbols decoded.
    pub fn decode<R: Read>(
        &self,
        reader: &mut BitReader<R>,
        count: u64,
        output: &mut Vec<u8>,
    ) -> io::Result<u64> {
        if let Some(value) = self.leaf_value(self.root) {
            let too_large = || io::Error::new(io::ErrorKind::OutOfMemory, "output too large");
            let n = usize::try_from(count).map_err(|_| too_large())?;
            let new_len = output.len().checked_add(n).ok_or_else(too_large)?;
            output.try_reserve_exact(n).map_err(|_| too_large())?;
            output.resize(new_len, value);
            return Ok(count);
        }

        let mut decoded = 0u64;
        let mut node = self.root;
        while decoded < count {
            let Some(bit) = reader.read_bit()? else {
                break;
            };
            node = self.child(node, bit).ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidData, "walk descended past a leaf")
            })?;
            if let Some(value) = self.leaf_value(node) {
                output.push(value);
                decoded += 1;
                node = self.root;
            }
        }
        Ok(decoded)
    }
}

/// A prefix code: an MSB-first bit string of arbitrary length.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Code {
    bits: BitVec<u8, Msb0>,
}

impl Code {
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn as_bitslice(&self) -> &BitSlice<u8, Msb0> {
        &self.bits
    }

    /// Whether this code is a prefix of (or equal to) `other`.
    pub fn is_prefix_of(&self, other: &Code) -> bool {
        other.bits.starts_with(self.bits.as_bitslice())
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.bits.iter().by_vals() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// Per-symbol codes, indexed by byte value.
#[derive(Debug, Clone)]
pub struct CodeTable {
    codes: Vec<Option<Code>>,
}

impl CodeTable {
    fn new() -> Self {
        CodeTable {
            codes: vec![None; 256],
        }
    }

    /// The code of `byte`, or `None` if the symbol is not in the tree.
    pub fn get(&self, byte: u8) -> Option<&Code> {
        self.codes[byte as usize].as_ref()
    }

    /// Iterate over `(symbol, code)` for every coded symbol, ascending.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &Code)> + '_ {
        self.codes
            .iter()
            .enumerate()
            .filter_map(|(b, c)| c.as_ref().map(|c| (b as u8, c)))
    }

    /// Length of the longest code.
    pub fn max_code_len(&self) -> usize {
        self.iter().map(|(_, c)| c.len()).max().unwrap_or(0)
    }

    /// Number of payload bits needed to encode a source with these counts.
    pub fn encoded_bits(&self, freq: &FrequencyTable) -> u64 {
        self.iter()
            .map(|(b, c)| freq.get(b) * c.len() as u64)
            .sum()
    }

    /// Write the code of every byte of `input` to `writer`.
    ///
    /// Does not flush; the caller decides where the payload ends.
    pub fn encode<W: Write>(&self, input: &[u8], writer: &mut BitWriter<W>) -> io::Result<()> {
        for &byte in input {
            let code = self.get(byte).ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("byte {byte:#04x} has no code"),
                )
            })?;
            writer.write_bits(code.as_bitslice())?;
        }
        Ok(())
    }
}

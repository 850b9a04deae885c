//! Generalized Index Computation
//!
//! Generalized indices (gindices) for the execution payload header tree and
//! for reaching it from the beacon block body root.

use crate::types::HeaderField;

/// Execution payload header has 17 fields, tree depth 5 (2^5 = 32 >= 17)
pub const HEADER_TREE_DEPTH: u32 = 5;

/// Number of leaves in the header tree.
pub const HEADER_LEAF_COUNT: usize = 1 << HEADER_TREE_DEPTH;

/// gindex of the first header leaf (2^5)
pub const HEADER_BASE_GINDEX: u64 = 1 << HEADER_TREE_DEPTH;

/// `BeaconBlockBody` (Deneb/Electra) has 12/13 fields, tree depth 4 (2^4 = 16).
/// `execution_payload` is field 9, so its gindex is 16 + 9.
pub const EXECUTION_PAYLOAD_GINDEX_IN_BODY: u64 = 25;

/// Offset between a generalized index handed to the header proof builder and
/// the tree position queried on the Merkleizer.
///
/// The Merkleizer numbers its root 1 and is always queried one past the
/// requested index. Do not re-derive this: callers and light clients depend on
/// the exact branches it yields.
pub const MERKLEIZER_POSITION_OFFSET: u64 = 1;

/// Tree position queried on the Merkleizer for `generalized_index`, or
/// `None` if the index is too large to have one.
#[must_use]
pub const fn merkleizer_position(generalized_index: u64) -> Option<u64> {
    generalized_index.checked_add(MERKLEIZER_POSITION_OFFSET)
}

/// Index to request from the header proof builder so the Merkleizer returns
/// the branch of `field`'s leaf.
#[must_use]
pub const fn leaf_proof_index(field: HeaderField) -> u64 {
    field.generalized_index() - MERKLEIZER_POSITION_OFFSET
}

/// gindex of a header field counted from the beacon block body root.
#[must_use]
pub fn body_gindex(field: HeaderField) -> u64 {
    concat_gindices(&[EXECUTION_PAYLOAD_GINDEX_IN_BODY, field.generalized_index()])
}

/// Concatenate generalized indices along a path
///
/// Given a sequence of gindices representing a path through nested structures,
/// compute the final gindex from the outermost root.
#[must_use]
pub fn concat_gindices(gindices: &[u64]) -> u64 {
    let mut result = 1_u64;

    for &gindex in gindices {
        let depth = gindex_depth(gindex);
        result = (result << depth) | (gindex ^ (1_u64 << depth));
    }

    result
}

/// Compute the depth (number of proof elements) for a given gindex
#[must_use]
pub const fn gindex_depth(gindex: u64) -> u32 {
    63 - gindex.leading_zeros()
}

//! Block Address Helpers.
//!
//! Caches, prefetchers, and the DRAM model all reason in whole cache blocks. These
//! helpers keep the masking arithmetic in one place:
//! 1. **Alignment:** Rounding a byte address down to its containing block.
//! 2. **Offsets:** Extracting the byte offset within a block.
//! 3. **Sequencing:** Stepping to the following block.

use super::constants::{BLOCK_SIZE, LOG2_BLOCK_SIZE};

/// Returns the address of the block containing `addr`.
///
/// # Arguments
///
/// * `addr` - Any byte address.
///
/// # Returns
///
/// `addr` with the low `LOG2_BLOCK_SIZE` bits cleared.
#[inline(always)]
pub const fn block_address(addr: u64) -> u64 {
    (addr >> LOG2_BLOCK_SIZE) << LOG2_BLOCK_SIZE
}

/// Returns the byte offset of `addr` within its block.
#[inline(always)]
pub const fn block_offset(addr: u64) -> u64 {
    addr & (BLOCK_SIZE - 1)
}

/// Returns the block number (address divided by the block size).
#[inline(always)]
pub const fn block_number(addr: u64) -> u64 {
    addr >> LOG2_BLOCK_SIZE
}

/// Returns the address one block after `addr`, preserving the in-block offset.
#[inline(always)]
pub const fn next_block(addr: u64) -> u64 {
    addr.wrapping_add(BLOCK_SIZE)
}

//! Over-the-air image transfer: chunk application and hash verification.
//!
//! Chunks may arrive out of order on a lossy link and get retransmitted;
//! the flash write always happens, since skipping it would leave a hole
//! in the image. Only the hash accumulator and `last_chunk_acked` are
//! gated on true-duplicate detection (re-arrival of the exact index last
//! folded into the hash), so a chunk arriving ahead of its predecessor
//! never gets stuck waiting for an index that already passed.

use crate::error::OtaError;
use crate::ports::HashPort;
use crate::wire::{CHUNK_SIZE, HASH_LEN};

/// Outcome of applying one chunk, used by the caller to decide which
/// notification to raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkOutcome {
    /// Chunk accepted and folded into the running hash.
    Applied,
    /// Chunk index already applied; re-acknowledge without re-hashing.
    AlreadyApplied,
    /// This was the final chunk; the accumulated hash has been compared
    /// against the expected digest.
    Final { hashes_match: bool },
}

/// Software `HashPort` backed by the `sha2` crate, used on boards with no
/// hardware SHA-256 peripheral and in every host test.
#[derive(Default)]
pub struct Sha2HashPort {
    state: sha2::Sha256,
}

impl HashPort for Sha2HashPort {
    fn init(&mut self) {
        use sha2::Digest;
        self.state = sha2::Sha256::new();
    }

    fn update(&mut self, data: &[u8]) {
        use sha2::Digest;
        self.state.update(data);
    }

    fn finalize(&mut self) -> [u8; 32] {
        use sha2::Digest;
        let digest = core::mem::take(&mut self.state).finalize();
        self.state = sha2::Sha256::new();
        digest.into()
    }
}

/// State for one in-progress (or completed) image transfer.
pub struct OtaSession<H> {
    image_size: u32,
    chunk_count: u32,
    expected_hash: [u8; HASH_LEN],
    hasher: H,
    /// Index of the highest chunk applied so far, or `-1` before the first.
    last_chunk_acked: i64,
    hashes_match: Option<bool>,
}

impl<H: HashPort> OtaSession<H> {
    /// Begin a new transfer. Rejects a `chunk_count` inconsistent with
    /// `image_size` under the fixed chunk size, rather than discovering
    /// the mismatch partway through the transfer, and rejects a hash of
    /// the wrong length up front rather than truncating or panicking on
    /// the eventual comparison.
    pub fn begin(
        image_size: u32,
        chunk_count: u32,
        expected_hash: &[u8],
        mut hasher: H,
    ) -> Result<Self, OtaError> {
        if expected_hash.len() != HASH_LEN {
            return Err(OtaError::InvalidHashLength);
        }
        let expected_chunks = image_size.div_ceil(CHUNK_SIZE as u32);
        if chunk_count != expected_chunks {
            return Err(OtaError::SizeMismatch);
        }
        hasher.init();
        let mut hash = [0u8; HASH_LEN];
        hash.copy_from_slice(expected_hash);
        Ok(Self {
            image_size,
            chunk_count,
            expected_hash: hash,
            hasher,
            last_chunk_acked: -1,
            hashes_match: None,
        })
    }

    pub const fn image_size(&self) -> u32 {
        self.image_size
    }

    pub const fn chunk_count(&self) -> u32 {
        self.chunk_count
    }

    pub const fn is_complete(&self) -> bool {
        self.hashes_match.is_some()
    }

    pub const fn hashes_match(&self) -> Option<bool> {
        self.hashes_match
    }

    /// Apply one chunk. `flash_write` is called with the absolute byte
    /// offset and the chunk contents unconditionally: a chunk that never
    /// reaches flash because it looked like a duplicate would leave a
    /// hole in the image on a link that reorders instead of only
    /// retransmitting. Only the hash accumulator is gated on a true
    /// duplicate (re-arrival of `last_chunk_acked` itself).
    pub fn apply_chunk(
        &mut self,
        index: u32,
        chunk: &[u8; CHUNK_SIZE],
        flash_write: impl FnOnce(u32, &[u8; CHUNK_SIZE]),
    ) -> Result<ChunkOutcome, OtaError> {
        if index >= self.chunk_count {
            return Err(OtaError::IndexOutOfRange);
        }

        flash_write(index * CHUNK_SIZE as u32, chunk);

        if i64::from(index) == self.last_chunk_acked {
            return Ok(match self.hashes_match {
                Some(matches) => ChunkOutcome::Final { hashes_match: matches },
                None => ChunkOutcome::AlreadyApplied,
            });
        }

        self.hasher.update(chunk);
        self.last_chunk_acked = i64::from(index);

        if index + 1 == self.chunk_count {
            let digest = self.hasher.finalize();
            let matches = digest == self.expected_hash;
            self.hashes_match = Some(matches);
            Ok(ChunkOutcome::Final {
                hashes_match: matches,
            })
        } else {
            Ok(ChunkOutcome::Applied)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk_of(byte: u8) -> [u8; CHUNK_SIZE] {
        [byte; CHUNK_SIZE]
    }

    fn hash_of(chunks: &[[u8; CHUNK_SIZE]]) -> [u8; HASH_LEN] {
        use sha2::Digest;
        let mut hasher = sha2::Sha256::new();
        for chunk in chunks {
            hasher.update(chunk);
        }
        hasher.finalize().into()
    }

    fn begin(image_size: u32, chunk_count: u32, hash: &[u8]) -> Result<OtaSession<Sha2HashPort>, OtaError> {
        OtaSession::begin(image_size, chunk_count, hash, Sha2HashPort::default())
    }

    #[test]
    fn single_chunk_transfer_matches_hash() {
        let chunks = [chunk_of(0xAA)];
        let hash = hash_of(&chunks);
        let mut session = begin(CHUNK_SIZE as u32, 1, &hash).unwrap();

        let outcome = session.apply_chunk(0, &chunks[0], |_, _| {}).unwrap();
        assert_eq!(outcome, ChunkOutcome::Final { hashes_match: true });
        assert_eq!(session.hashes_match(), Some(true));
    }

    #[test]
    fn multi_chunk_transfer_applies_in_order() {
        let chunks = [chunk_of(1), chunk_of(2), chunk_of(3)];
        let hash = hash_of(&chunks);
        let mut session = begin(3 * CHUNK_SIZE as u32, 3, &hash).unwrap();

        let mut writes = heapless::Vec::<u32, 4>::new();
        assert_eq!(
            session
                .apply_chunk(0, &chunks[0], |off, _| writes.push(off).unwrap())
                .unwrap(),
            ChunkOutcome::Applied
        );
        assert_eq!(
            session
                .apply_chunk(1, &chunks[1], |off, _| writes.push(off).unwrap())
                .unwrap(),
            ChunkOutcome::Applied
        );
        let outcome = session
            .apply_chunk(2, &chunks[2], |off, _| writes.push(off).unwrap())
            .unwrap();
        assert_eq!(outcome, ChunkOutcome::Final { hashes_match: true });
        assert_eq!(writes.as_slice(), [0, 128, 256]);
    }

    #[test]
    fn mismatched_hash_is_reported_not_rejected() {
        let chunks = [chunk_of(9)];
        let wrong_hash = [0u8; HASH_LEN];
        let mut session = begin(CHUNK_SIZE as u32, 1, &wrong_hash).unwrap();

        let outcome = session.apply_chunk(0, &chunks[0], |_, _| {}).unwrap();
        assert_eq!(
            outcome,
            ChunkOutcome::Final {
                hashes_match: false
            }
        );
    }

    #[test]
    fn retransmitted_chunk_rewrites_flash_but_hashes_once() {
        let chunks = [chunk_of(1), chunk_of(2)];
        let hash = hash_of(&chunks);
        let mut session = begin(2 * CHUNK_SIZE as u32, 2, &hash).unwrap();

        let mut write_count = 0u32;
        session.apply_chunk(0, &chunks[0], |_, _| write_count += 1).unwrap();
        // Duplicate retransmission of chunk 0 after it was already applied:
        // flash is rewritten (harmless, same bytes) but the hash is not
        // folded in twice.
        let outcome = session
            .apply_chunk(0, &chunks[0], |_, _| write_count += 1)
            .unwrap();
        assert_eq!(outcome, ChunkOutcome::AlreadyApplied);
        assert_eq!(write_count, 2);

        let final_outcome = session.apply_chunk(1, &chunks[1], |_, _| {}).unwrap();
        assert_eq!(final_outcome, ChunkOutcome::Final { hashes_match: true });
    }

    #[test]
    fn out_of_order_chunk_does_not_deadlock_the_transfer() {
        let chunks = [chunk_of(1), chunk_of(2), chunk_of(3)];
        let hash = hash_of(&chunks);
        let mut session = begin(3 * CHUNK_SIZE as u32, 3, &hash).unwrap();

        // Chunk 2 arrives before chunk 1 (e.g. reordered by the link). The
        // old implementation treated any non-successor index as an
        // already-applied duplicate and skipped the flash write entirely,
        // which meant the transfer could never complete once a chunk
        // actually arrived out of order: every later retry of that index
        // hit the same "already applied" short-circuit. Here every index
        // must still reach flash exactly once, in whatever order it shows
        // up, regardless of what the hash outcome ends up being.
        let mut writes = heapless::Vec::<u32, 8>::new();
        session
            .apply_chunk(0, &chunks[0], |off, _| writes.push(off).unwrap())
            .unwrap();
        session
            .apply_chunk(2, &chunks[2], |off, _| writes.push(off).unwrap())
            .unwrap();
        session
            .apply_chunk(1, &chunks[1], |off, _| writes.push(off).unwrap())
            .unwrap();

        assert_eq!(writes.as_slice(), [0, 2 * CHUNK_SIZE as u32, CHUNK_SIZE as u32]);
        assert!(session.is_complete());
    }

    #[test]
    fn rejects_inconsistent_chunk_count() {
        let hash = [0u8; HASH_LEN];
        assert_eq!(
            begin(CHUNK_SIZE as u32, 2, &hash).unwrap_err(),
            OtaError::SizeMismatch
        );
    }

    #[test]
    fn rejects_undersized_hash() {
        assert_eq!(
            begin(CHUNK_SIZE as u32, 1, &[0u8; HASH_LEN - 1]).unwrap_err(),
            OtaError::InvalidHashLength
        );
    }

    #[test]
    fn rejects_chunk_index_beyond_chunk_count() {
        let chunks = [chunk_of(1)];
        let hash = hash_of(&chunks);
        let mut session = begin(CHUNK_SIZE as u32, 1, &hash).unwrap();
        assert_eq!(
            session.apply_chunk(5, &chunks[0], |_, _| {}),
            Err(OtaError::IndexOutOfRange)
        );
    }
}

//! XOR delta reconstruction over fixed-size frame buffers.

/// Merge `delta` into `acc` in place: `acc[i] ^= delta[i]`.
///
/// The bulk of the slices is combined a `u64` word at a time when both share
/// the same alignment; the rest falls back to single bytes.
pub fn merge(acc: &mut [u8], delta: &[u8]) {
    debug_assert_eq!(acc.len(), delta.len(), "delta length mismatch");
    let len = acc.len().min(delta.len());
    let (acc, delta) = (&mut acc[..len], &delta[..len]);

    let (acc_head, acc_words, acc_tail) = bytemuck::pod_align_to_mut::<u8, u64>(acc);
    let (delta_head, delta_words, delta_tail) = bytemuck::pod_align_to::<u8, u64>(delta);

    if acc_head.len() != delta_head.len() {
        // Misaligned relative to each other; re-slice and go byte by byte.
        merge_bytes(acc_head, &delta[..acc_head.len()]);
        let split = acc_head.len();
        let rest = &delta[split..];
        let words_len = acc_words.len() * 8;
        merge_bytes(bytemuck::cast_slice_mut(acc_words), &rest[..words_len]);
        merge_bytes(acc_tail, &rest[words_len..]);
        return;
    }

    merge_bytes(acc_head, delta_head);
    for (a, d) in acc_words.iter_mut().zip(delta_words) {
        *a ^= *d;
    }
    merge_bytes(acc_tail, delta_tail);
}

#[inline]
fn merge_bytes(acc: &mut [u8], delta: &[u8]) {
    for (a, d) in acc.iter_mut().zip(delta) {
        *a ^= *d;
    }
}

/// Fixed-length byte buffer with 8-byte alignment.
///
/// Backed by whole `u64` words so two buffers of the same length always
/// merge entirely on the word path. Padding past `len` stays zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    words: Box<[u64]>,
    len: usize,
}

impl FrameBuffer {
    /// Allocate a zeroed buffer of `len` bytes.
    pub fn zeroed(len: usize) -> Self {
        Self {
            words: vec![0u64; len.div_ceil(8)].into_boxed_slice(),
            len,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &bytemuck::cast_slice::<u64, u8>(&self.words)[..self.len]
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut bytemuck::cast_slice_mut::<u64, u8>(&mut self.words)[..self.len]
    }

    /// Reset every byte to zero.
    pub fn clear(&mut self) {
        self.words.fill(0);
    }

    /// Merge `delta` into this buffer word by word.
    pub fn merge_from(&mut self, delta: &FrameBuffer) {
        debug_assert_eq!(self.len, delta.len, "delta length mismatch");
        for (a, d) in self.words.iter_mut().zip(delta.words.iter()) {
            *a ^= *d;
        }
    }
}

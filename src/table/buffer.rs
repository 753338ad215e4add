//! Owned byte storage for one vertex or index buffer.

use byteorder::{ByteOrder, LittleEndian};

/// A fetched buffer and the distance between consecutive elements in it.
///
/// The table owns these outright; they are dropped when the table is cleared
/// or replaced.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RawBuffer {
    data: Vec<u8>,
    stride: usize,
}

impl RawBuffer {
    pub fn new(data: Vec<u8>, stride: usize) -> Self {
        Self { data, stride }
    }

    /// Placeholder for a bound-but-unused slot, keeps slot numbering intact.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Index buffer of `u32` indices.
    pub fn from_indices(indices: &[u32]) -> Self {
        let mut data = vec![0u8; indices.len() * 4];
        LittleEndian::write_u32_into(indices, &mut data);
        Self { data, stride: 4 }
    }

    /// Stride used for indexing. A zero stride cannot address anything past
    /// element 0, so it is read as 1.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride.max(1)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Bytes from element `index` (plus `offset`) to the end of the buffer.
    ///
    /// Returns `None` when the start lies outside the buffer or the position
    /// overflows; the decoder checks that enough bytes follow.
    pub fn element(&self, index: u32, offset: u32) -> Option<&[u8]> {
        let pos = self
            .stride()
            .checked_mul(index as usize)?
            .checked_add(offset as usize)?;
        if pos >= self.data.len() {
            return None;
        }
        Some(&self.data[pos..])
    }

    /// Read the `index`th little-endian `u32`, ignoring the stride.
    pub fn read_u32(&self, index: u32) -> Option<u32> {
        let pos = (index as usize).checked_mul(4)?;
        let end = pos.checked_add(4)?;
        self.data.get(pos..end).map(LittleEndian::read_u32)
    }
}

impl std::fmt::Debug for RawBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RawBuffer({} bytes, stride {})", self.data.len(), self.stride)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_stride_reads_as_one() {
        let b = RawBuffer::new(vec![1, 2, 3, 4], 0);
        assert_eq!(b.stride(), 1);
        assert_eq!(b.element(2, 0), Some(&[3u8, 4][..]));
    }

    #[test]
    fn test_element_bounds() {
        let b = RawBuffer::new(vec![0; 32], 16);
        assert_eq!(b.element(1, 0).map(|s| s.len()), Some(16));
        assert_eq!(b.element(1, 12).map(|s| s.len()), Some(4));
        assert!(b.element(2, 0).is_none());
        assert!(b.element(u32::MAX, u32::MAX).is_none());
    }

    #[test]
    fn test_indices() {
        let b = RawBuffer::from_indices(&[0, 1_000_000, 7]);
        assert_eq!(b.len(), 12);
        assert_eq!(b.read_u32(1), Some(1_000_000));
        assert_eq!(b.read_u32(3), None);

        let truncated = RawBuffer::new(vec![1, 0, 0, 0, 2, 0], 4);
        assert_eq!(truncated.read_u32(0), Some(1));
        assert_eq!(truncated.read_u32(1), None);
    }
}

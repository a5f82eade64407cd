use log::debug;

/// A bounded append/drain byte buffer.
///
/// Used both for the input re-assembly queue (unconsumed feed suffixes)
/// and for the outbound escape-sequence queue. Appends past the capacity
/// cap are dropped with a diagnostic rather than growing without bound.
#[derive(Debug)]
pub(crate) struct Buffer {
    bytes: Vec<u8>,
    cap: usize,
}

impl Buffer {
    pub(crate) fn new(cap: usize) -> Self {
        Self {
            bytes: Vec::new(),
            cap,
        }
    }

    pub(crate) fn extend(&mut self, bytes: &[u8]) {
        let room = self.cap - self.bytes.len().min(self.cap);
        if bytes.len() > room {
            debug!(
                "buffer full ({} bytes); dropping {} bytes",
                self.cap,
                bytes.len() - room
            );
        }
        self.bytes.extend_from_slice(&bytes[..bytes.len().min(room)]);
    }

    pub(crate) fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    pub(crate) fn len(&self) -> usize {
        self.bytes.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Remove the first `n` bytes.
    pub(crate) fn drain_front(&mut self, n: usize) {
        self.bytes.drain(..n.min(self.bytes.len()));
    }

    pub(crate) fn take(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_and_drain() {
        let mut buffer = Buffer::new(16);
        buffer.extend(b"hello");
        buffer.extend(b" world");
        assert_eq!(buffer.as_slice(), b"hello world");

        buffer.drain_front(6);
        assert_eq!(buffer.as_slice(), b"world");

        assert_eq!(buffer.take(), b"world");
        assert!(buffer.is_empty());
    }

    #[test]
    fn overflow_truncates() {
        let mut buffer = Buffer::new(4);
        buffer.extend(b"abcdef");
        assert_eq!(buffer.as_slice(), b"abcd");
        assert_eq!(buffer.len(), 4);
    }
}

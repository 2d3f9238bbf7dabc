//! Growable byte array with zero-copy freeze.
//!
//! A [`ByteArray`] owns a contiguous, growable region of bytes. It is mutated
//! through [`ByteArray::append`] and [`ByteArray::set`] and leaves service
//! through exactly one of two exits: [`ByteArray::freeze`], which hands the
//! backing memory to an immutable [`Bytes`] value, or
//! [`ByteArray::dispose`], which releases it. After either exit every
//! operation fails with [`BufferError::Invalidated`].

use crate::error::{BufferError, Result, Retired};
use crate::io::unicode::sanitize_utf8;
use bytes::Bytes;

/// Smallest capacity allocated on first growth.
pub(crate) const MIN_CAPACITY: usize = 64;

/// Input accepted by [`ByteArray::append`].
///
/// A closed set of byte-carrying values. Each variant is copied into the
/// array exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendSource<'a> {
    /// UTF-8 text.
    Text(&'a str),
    /// Arbitrary bytes.
    Raw(&'a [u8]),
    /// A previously frozen, immutable byte value.
    Frozen(&'a Bytes),
}

impl AppendSource<'_> {
    /// Returns the bytes carried by this source.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(s) => s.as_bytes(),
            Self::Raw(b) => b,
            Self::Frozen(b) => b.as_ref(),
        }
    }
}

impl<'a> From<&'a str> for AppendSource<'a> {
    fn from(s: &'a str) -> Self {
        Self::Text(s)
    }
}

impl<'a> From<&'a String> for AppendSource<'a> {
    fn from(s: &'a String) -> Self {
        Self::Text(s.as_str())
    }
}

impl<'a> From<&'a [u8]> for AppendSource<'a> {
    fn from(b: &'a [u8]) -> Self {
        Self::Raw(b)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for AppendSource<'a> {
    fn from(b: &'a [u8; N]) -> Self {
        Self::Raw(b.as_slice())
    }
}

impl<'a> From<&'a Vec<u8>> for AppendSource<'a> {
    fn from(b: &'a Vec<u8>) -> Self {
        Self::Raw(b.as_slice())
    }
}

impl<'a> From<&'a Bytes> for AppendSource<'a> {
    fn from(b: &'a Bytes) -> Self {
        Self::Frozen(b)
    }
}

#[derive(Debug)]
enum State {
    Live(Vec<u8>),
    Retired(Retired),
}

/// An owned, growable byte buffer.
///
/// Indices are zero-based byte offsets. The array exclusively owns its
/// memory until it is frozen or disposed.
///
/// # Examples
///
/// ```
/// use bytearray_rs::ByteArray;
///
/// let mut array = ByteArray::new();
/// array.append("foo")?.append(b"bar")?;
/// assert_eq!(array.len()?, 6);
/// assert_eq!(array.get(0)?, b'f');
///
/// let frozen = array.freeze()?;
/// assert_eq!(&frozen[..], b"foobar");
/// assert!(array.len().is_err());
/// # Ok::<(), bytearray_rs::Error>(())
/// ```
#[derive(Debug)]
pub struct ByteArray {
    state: State,
}

impl Default for ByteArray {
    fn default() -> Self {
        Self::new()
    }
}

impl ByteArray {
    /// Creates a new, empty byte array. Nothing is allocated until the first
    /// non-empty append.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: State::Live(Vec::new()),
        }
    }

    /// Creates an empty byte array with room for at least `capacity` bytes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            state: State::Live(Vec::with_capacity(capacity)),
        }
    }

    /// Returns `true` until the array is frozen or disposed.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        matches!(self.state, State::Live(_))
    }

    fn data(&self) -> Result<&Vec<u8>> {
        match &self.state {
            State::Live(data) => Ok(data),
            State::Retired(by) => Err(BufferError::Invalidated { by: *by }.into()),
        }
    }

    fn data_mut(&mut self) -> Result<&mut Vec<u8>> {
        match &mut self.state {
            State::Live(data) => Ok(data),
            State::Retired(by) => Err(BufferError::Invalidated { by: *by }.into()),
        }
    }

    /// Ends the array's life, returning the backing vector.
    fn retire(&mut self, by: Retired) -> Result<Vec<u8>> {
        match std::mem::replace(&mut self.state, State::Retired(by)) {
            State::Live(data) => Ok(data),
            State::Retired(prev) => {
                self.state = State::Retired(prev);
                Err(BufferError::Invalidated { by: prev }.into())
            }
        }
    }

    /// Appends bytes to the end of the array.
    ///
    /// Capacity grows by doubling, so appending `n` bytes in total costs
    /// `O(n)`. Appending an empty value is a no-op. Returns `self` so calls
    /// can be chained.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::Invalidated`] if the array was frozen or
    /// disposed.
    pub fn append<'a>(&mut self, data: impl Into<AppendSource<'a>>) -> Result<&mut Self> {
        let source = data.into();
        let bytes = source.as_bytes();
        let buf = self.data_mut()?;
        if !bytes.is_empty() {
            grow_for(buf, bytes.len());
            buf.extend_from_slice(bytes);
        }
        Ok(self)
    }

    /// Returns the number of populated bytes.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::Invalidated`] if the array was frozen or
    /// disposed.
    pub fn len(&self) -> Result<usize> {
        Ok(self.data()?.len())
    }

    /// Returns `true` if no bytes have been appended.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::Invalidated`] if the array was frozen or
    /// disposed.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.data()?.is_empty())
    }

    /// Current capacity of the backing store.
    pub(crate) fn capacity(&self) -> Result<usize> {
        Ok(self.data()?.capacity())
    }

    /// Returns the byte at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::IndexOutOfRange`] unless `index < len`, or
    /// [`BufferError::Invalidated`] if the array was frozen or disposed.
    pub fn get(&self, index: usize) -> Result<u8> {
        let data = self.data()?;
        data.get(index).copied().ok_or_else(|| {
            BufferError::IndexOutOfRange {
                index,
                len: data.len(),
            }
            .into()
        })
    }

    /// Overwrites the byte at `index` with the low eight bits of `value`.
    ///
    /// Negative values wrap in two's complement, so `-1` stores `255` and
    /// `300` stores `44`.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::IndexOutOfRange`] unless `index < len`, or
    /// [`BufferError::Invalidated`] if the array was frozen or disposed.
    pub fn set(&mut self, index: usize, value: i64) -> Result<&mut Self> {
        let data = self.data_mut()?;
        let len = data.len();
        let slot = data
            .get_mut(index)
            .ok_or(BufferError::IndexOutOfRange { index, len })?;
        *slot = value.to_le_bytes()[0];
        Ok(self)
    }

    /// Returns a best-effort text view of the contents.
    ///
    /// Invalid UTF-8 sequences are replaced with `U+FFFD`. Use
    /// [`ByteArray::freeze`] when the exact bytes matter.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::Invalidated`] if the array was frozen or
    /// disposed.
    pub fn to_text(&self) -> Result<String> {
        Ok(sanitize_utf8(self.data()?).text.into_owned())
    }

    /// Hands the backing memory to an immutable [`Bytes`] value without
    /// copying and invalidates the array.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::Invalidated`] if the array was already frozen
    /// or disposed.
    pub fn freeze(&mut self) -> Result<Bytes> {
        self.retire(Retired::Frozen).map(Bytes::from)
    }

    /// Releases the backing memory and invalidates the array.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::Invalidated`] if the array was already frozen
    /// or disposed.
    pub fn dispose(&mut self) -> Result<()> {
        self.retire(Retired::Disposed).map(drop)
    }
}

/// Ensures room for `additional` more bytes, at least doubling capacity
/// whenever a reallocation is needed.
fn grow_for(buf: &mut Vec<u8>, additional: usize) {
    let required = buf.len().saturating_add(additional);
    if required <= buf.capacity() {
        return;
    }
    let target = required
        .max(buf.capacity().saturating_mul(2))
        .max(MIN_CAPACITY);
    buf.reserve_exact(target - buf.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use test_case::test_case;

    fn array_of(content: &str) -> ByteArray {
        let mut array = ByteArray::new();
        array.append(content).unwrap();
        array
    }

    fn assert_invalidated<T: std::fmt::Debug>(result: Result<T>, expected: Retired) {
        match result {
            Err(Error::Buffer(BufferError::Invalidated { by })) => assert_eq!(by, expected),
            other => panic!("expected invalidated error, got {other:?}"),
        }
    }

    #[test]
    fn test_new_is_empty() {
        let array = ByteArray::new();
        assert_eq!(array.len().unwrap(), 0);
        assert!(array.is_empty().unwrap());
        assert!(array.is_live());
    }

    #[test]
    fn test_append_text_grows_length() {
        let mut array = ByteArray::new();
        array.append("foo").unwrap();
        assert_eq!(array.len().unwrap(), 3);
        array.append("bar").unwrap();
        assert_eq!(array.len().unwrap(), 6);
        assert_eq!(array.to_text().unwrap(), "foobar");
    }

    #[test]
    fn test_append_chains() {
        let mut array = ByteArray::new();
        array
            .append("a")
            .unwrap()
            .append(b"b")
            .unwrap()
            .append(&Bytes::from_static(b"c"))
            .unwrap();
        assert_eq!(array.to_text().unwrap(), "abc");
    }

    #[test]
    fn test_append_text_and_frozen_equivalent() {
        let mut from_text = ByteArray::new();
        from_text.append("hello").unwrap();

        let frozen = Bytes::from_static(b"hello");
        let mut from_bytes = ByteArray::new();
        from_bytes.append(&frozen).unwrap();

        assert_eq!(from_text.freeze().unwrap(), from_bytes.freeze().unwrap());
    }

    #[test]
    fn test_append_all_source_kinds() {
        let owned = String::from("s");
        let vec = vec![b'v'];
        let slice: &[u8] = b"l";
        let mut array = ByteArray::new();
        array
            .append(&owned)
            .unwrap()
            .append(&vec)
            .unwrap()
            .append(slice)
            .unwrap()
            .append(AppendSource::Raw(b"r"))
            .unwrap();
        assert_eq!(array.freeze().unwrap(), Bytes::from_static(b"svlr"));
    }

    #[test]
    fn test_append_empty_is_noop() {
        let mut array = ByteArray::new();
        array.append("").unwrap().append(b"").unwrap();
        assert_eq!(array.len().unwrap(), 0);
        assert_eq!(array.capacity().unwrap(), 0);
    }

    #[test]
    fn test_capacity_doubles() {
        let mut array = ByteArray::new();
        array.append(&[0u8; 10]).unwrap();
        let first = array.capacity().unwrap();
        assert!(first >= MIN_CAPACITY);

        array.append(&[0u8; MIN_CAPACITY]).unwrap();
        let after = array.capacity().unwrap();
        assert!(after >= first * 2);

        // A single large append jumps straight to the required size.
        array.append(&vec![0u8; 1000]).unwrap();
        let len = array.len().unwrap();
        assert!(array.capacity().unwrap() >= len);
    }

    #[test]
    fn test_growth_is_amortized() {
        let mut array = ByteArray::new();
        let mut reallocations = 0;
        let mut last = array.capacity().unwrap();
        for _ in 0..10_000 {
            array.append("x").unwrap();
            let cap = array.capacity().unwrap();
            if cap != last {
                reallocations += 1;
                last = cap;
            }
        }
        assert_eq!(array.len().unwrap(), 10_000);
        assert!(reallocations <= 10, "{reallocations} reallocations");
    }

    #[test]
    fn test_set_then_get() {
        let mut array = array_of("foo");
        array.set(0, 100).unwrap();
        assert_eq!(array.get(0).unwrap(), 100);
        assert_eq!(array.get(1).unwrap(), b'o');
    }

    #[test_case(0, 0; "zero")]
    #[test_case(255, 255; "max byte")]
    #[test_case(256, 0; "wraps at 256")]
    #[test_case(300, 44; "truncates high bits")]
    #[test_case(-1, 255; "negative wraps")]
    #[test_case(-256, 0; "negative multiple of 256")]
    fn test_set_masks_to_byte(value: i64, expected: u8) {
        let mut array = array_of("x");
        array.set(0, value).unwrap();
        assert_eq!(array.get(0).unwrap(), expected);
    }

    #[test_case("", 0; "empty buffer")]
    #[test_case("foo", 3; "one past the end")]
    #[test_case("foo", 4; "two past the end")]
    #[test_case("foo", usize::MAX; "far out")]
    fn test_index_out_of_range(content: &str, index: usize) {
        let mut array = array_of(content);
        let len = content.len();
        match array.get(index) {
            Err(Error::Buffer(BufferError::IndexOutOfRange { index: i, len: l })) => {
                assert_eq!((i, l), (index, len));
            }
            other => panic!("expected out of range, got {other:?}"),
        }
        assert!(matches!(
            array.set(index, 1),
            Err(Error::Buffer(BufferError::IndexOutOfRange { .. }))
        ));
        assert_eq!(array.len().unwrap(), len);
    }

    #[test]
    fn test_last_index_in_range() {
        let mut array = array_of("abc");
        assert_eq!(array.get(2).unwrap(), b'c');
        array.set(2, i64::from(b'z')).unwrap();
        assert_eq!(array.to_text().unwrap(), "abz");
    }

    #[test]
    fn test_to_text_sanitizes_invalid_utf8() {
        let mut array = ByteArray::new();
        array.append("ok").unwrap().append(&[0xff, 0xfe]).unwrap();
        array.append("!").unwrap();
        assert_eq!(array.to_text().unwrap(), "ok\u{FFFD}\u{FFFD}!");
    }

    #[test]
    fn test_freeze_transfers_contents() {
        let mut array = array_of("foobar");
        let frozen = array.freeze().unwrap();
        assert_eq!(&frozen[..], b"foobar");
        assert!(!array.is_live());
    }

    #[test]
    fn test_freeze_does_not_copy() {
        let mut array = array_of("payload");
        let ptr = array.data().unwrap().as_ptr();
        let frozen = array.freeze().unwrap();
        assert_eq!(frozen.as_ptr(), ptr);
    }

    #[test]
    fn test_operations_after_freeze_fail() {
        let mut array = array_of("foo");
        array.freeze().unwrap();

        assert_invalidated(array.append("bar").map(|_| ()), Retired::Frozen);
        assert_invalidated(array.get(0), Retired::Frozen);
        assert_invalidated(array.set(0, 1).map(|_| ()), Retired::Frozen);
        assert_invalidated(array.len(), Retired::Frozen);
        assert_invalidated(array.is_empty(), Retired::Frozen);
        assert_invalidated(array.to_text(), Retired::Frozen);
        assert_invalidated(array.freeze(), Retired::Frozen);
        assert_invalidated(array.dispose(), Retired::Frozen);
    }

    #[test]
    fn test_operations_after_dispose_fail() {
        let mut array = array_of("foo");
        array.dispose().unwrap();

        assert!(!array.is_live());
        assert_invalidated(array.append("bar").map(|_| ()), Retired::Disposed);
        assert_invalidated(array.get(0), Retired::Disposed);
        assert_invalidated(array.freeze(), Retired::Disposed);
        assert_invalidated(array.dispose(), Retired::Disposed);
    }

    #[test]
    fn test_freeze_empty() {
        let mut array = ByteArray::default();
        assert!(array.freeze().unwrap().is_empty());
    }

    #[test]
    fn test_with_capacity() {
        let array = ByteArray::with_capacity(128);
        assert!(array.capacity().unwrap() >= 128);
        assert_eq!(array.len().unwrap(), 0);
    }
}

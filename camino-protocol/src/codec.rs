//! Value codec for response payloads
//!
//! Callables report results through [`Returns`], which writes into a staging
//! buffer owned by the engine. All multi-byte integers go out little-endian.

use crate::frame::MAX_DATA_LENGTH;
use crate::response::ResponseFrame;

/// A value with a fixed little-endian wire encoding
pub trait ReturnValue: Sized {
    /// Encoded size in bytes
    const SIZE: usize;

    /// Write the little-endian encoding into `out[..SIZE]`
    fn write_le(&self, out: &mut [u8]);

    /// Read a value back from exactly `SIZE` little-endian bytes
    fn read_le(bytes: &[u8]) -> Option<Self>;
}

macro_rules! impl_return_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ReturnValue for $ty {
                const SIZE: usize = core::mem::size_of::<$ty>();

                fn write_le(&self, out: &mut [u8]) {
                    out[..Self::SIZE].copy_from_slice(&self.to_le_bytes());
                }

                fn read_le(bytes: &[u8]) -> Option<Self> {
                    let raw = bytes.try_into().ok()?;
                    Some(<$ty>::from_le_bytes(raw))
                }
            }
        )*
    };
}

impl_return_value!(u8, i8, u16, i16, u32, i32, u64, i64);

impl ReturnValue for bool {
    const SIZE: usize = 1;

    fn write_le(&self, out: &mut [u8]) {
        out[0] = u8::from(*self);
    }

    fn read_le(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [b] => Some(*b != 0),
            _ => None,
        }
    }
}

/// Response payload writer handed to a callable
///
/// Each call replaces whatever an earlier call wrote. If a callable never
/// calls any of the `returns` methods the response carries no data.
#[derive(Debug)]
pub struct Returns<'a> {
    buf: &'a mut [u8],
    len: Option<usize>,
}

impl<'a> Returns<'a> {
    /// Wrap a staging buffer
    ///
    /// Only the first 255 bytes are ever used, since that is all the
    /// length field can describe.
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, len: None }
    }

    /// Largest payload this writer accepts
    pub fn capacity(&self) -> usize {
        self.buf.len().min(MAX_DATA_LENGTH)
    }

    /// Return a raw byte array
    ///
    /// Bytes past [`capacity`](Self::capacity) are dropped.
    pub fn bytes(&mut self, data: &[u8]) {
        let len = data.len().min(self.capacity());
        self.buf[..len].copy_from_slice(&data[..len]);
        self.len = Some(len);
    }

    /// Return a string as its UTF-8 bytes, without terminator
    pub fn str(&mut self, s: &str) {
        self.bytes(s.as_bytes());
    }

    /// Return a value in its little-endian encoding
    ///
    /// A value wider than the staging buffer is not sent; the reply falls
    /// back to no data.
    pub fn value<T: ReturnValue>(&mut self, value: T) {
        if T::SIZE > self.capacity() {
            self.len = None;
            return;
        }
        value.write_le(&mut self.buf[..T::SIZE]);
        self.len = Some(T::SIZE);
    }

    /// Forget anything written so far
    pub fn clear(&mut self) {
        self.len = None;
    }

    /// True once any `returns` method has been called
    pub fn has_data(&self) -> bool {
        self.len.is_some()
    }

    /// The payload written so far, if any
    pub fn data(&self) -> Option<&[u8]> {
        self.len.map(|len| &self.buf[..len])
    }

    /// The response this writer describes
    pub fn response(&self) -> ResponseFrame<'_> {
        match self.data() {
            Some(data) => ResponseFrame::WithData(data),
            None => ResponseFrame::NoData,
        }
    }

    /// Consume the writer, keeping the borrow of the staging buffer
    pub fn into_response(self) -> ResponseFrame<'a> {
        let buf: &'a [u8] = self.buf;
        match self.len {
            Some(len) => ResponseFrame::WithData(&buf[..len]),
            None => ResponseFrame::NoData,
        }
    }
}

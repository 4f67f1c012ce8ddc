use std::io;

/// Types that can be read back from the body of a received frame.
pub trait Deserialize<'a>: Sized {
    /// Builds `Self` borrowing from `buf` where possible.
    fn deserialize(buf: &'a mut [u8]) -> io::Result<Self>;
}

/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! A fixed capacity in-memory sink for the codec's stream callbacks
//!
//! The codec doesn't write into a slice, it pushes bytes through three
//! user supplied functions (write, seek and skip) together with an opaque
//! user data pointer. [`MemoryStreamBuffer`] implements those operations
//! with bounds checked slices and the `stream_*` functions below adapt them
//! to the callback protocol.
use core::ffi::c_void;
use core::ptr::NonNull;

/// Value returned by the write callback when nothing could be written,
/// this is `(OPJ_SIZE_T)-1` on the codec side
pub const WRITE_FAILED: usize = usize::MAX;
/// Value returned by the skip callback when nothing could be skipped
pub const SKIP_FAILED: i64 = -1;
pub const SEEK_OK: i32 = 1;
pub const SEEK_FAILED: i32 = 0;

/// Bytes added to the raw image size when sizing the output buffer.
///
/// Covers codestream headers and the JP2 boxes.
pub const STREAM_OVERHEAD: usize = 1024;

/// Share of the raw image size reserved for growth, `raw / EXPANSION_DIVISOR`.
///
/// Lossless coding of noisy images ends up larger than the raw pixels,
/// the colour transform adds a bit to both chroma planes and the high pass
/// bands of the wavelet need one more.
pub const EXPANSION_DIVISOR: usize = 2;

/// Output buffer size for an image of `raw` bytes, `None` on overflow
///
/// ```
/// use zune_jpeg2000::{output_capacity, STREAM_OVERHEAD};
///
/// assert_eq!(output_capacity(1000), Some(1500 + STREAM_OVERHEAD));
/// assert_eq!(output_capacity(usize::MAX), None);
/// ```
pub fn output_capacity(raw: usize) -> Option<usize> {
    raw.checked_add(raw / EXPANSION_DIVISOR)?
        .checked_add(STREAM_OVERHEAD)
}

/// A fixed capacity byte sink with a cursor
///
/// The capacity is chosen at construction and never changes, every
/// operation clamps to the space left instead of growing the buffer.
///
/// # Example
/// ```
/// use zune_jpeg2000::MemoryStreamBuffer;
///
/// let mut buffer = MemoryStreamBuffer::new(4);
/// assert_eq!(buffer.write(&[1, 2, 3]), Some(3));
/// // only one byte left
/// assert_eq!(buffer.write(&[4, 5]), Some(1));
/// assert_eq!(buffer.write(&[6]), None);
/// assert_eq!(buffer.written(), &[1, 2, 3, 4]);
/// ```
pub struct MemoryStreamBuffer {
    data:      Vec<u8>,
    position:  usize,
    exhausted: bool
}

impl MemoryStreamBuffer {
    /// Create a zeroed buffer that can hold `capacity` bytes
    pub fn new(capacity: usize) -> MemoryStreamBuffer {
        MemoryStreamBuffer {
            data:      vec![0; capacity],
            position:  0,
            exhausted: false
        }
    }

    /// Write bytes at the current position
    ///
    /// Writes as many bytes as fit, returning how many were written.
    /// An empty write always succeeds.
    ///
    /// # Returns
    /// - `Some(n)`: `n` bytes were copied and the position advanced by `n`
    /// - `None`: the buffer is full, nothing was written
    pub fn write(&mut self, bytes: &[u8]) -> Option<usize> {
        if bytes.is_empty() {
            return Some(0);
        }
        let n = bytes.len().min(self.remaining());

        if n == 0 {
            self.exhausted = true;
            return None;
        }
        self.data[self.position..self.position + n].copy_from_slice(&bytes[..n]);
        self.position += n;

        Some(n)
    }

    /// Move the cursor to `offset` bytes from the start
    ///
    /// Offsets past the end are clamped to the capacity, the function
    /// never fails and returns the new position
    pub fn seek(&mut self, offset: u64) -> usize {
        // if offset doesn't fit a usize it's definitely past capacity
        let offset = usize::try_from(offset).unwrap_or(usize::MAX);

        self.position = offset.min(self.capacity());
        self.position
    }

    /// Advance the cursor by `delta` bytes without writing
    ///
    /// Skipped bytes keep whatever they held before, zero for a
    /// fresh buffer.
    ///
    /// # Returns
    /// - `Some(n)`: the position advanced by `n`, which may be less than `delta`
    ///   when the buffer is almost full. `Some(0)` for a zero delta.
    /// - `None`: no space is left to skip into
    pub fn skip(&mut self, delta: u64) -> Option<usize> {
        if delta == 0 {
            return Some(0);
        }
        let delta = usize::try_from(delta).unwrap_or(usize::MAX);
        let n = delta.min(self.remaining());

        if n == 0 {
            self.exhausted = true;
            return None;
        }
        self.position += n;

        Some(n)
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub const fn position(&self) -> usize {
        self.position
    }

    /// Number of bytes between the cursor and the end of the buffer
    pub fn remaining(&self) -> usize {
        self.capacity().saturating_sub(self.position)
    }

    /// Whether a write or skip was refused because the buffer was full
    pub const fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Bytes from the start of the buffer up to the cursor
    pub fn written(&self) -> &[u8] {
        &self.data[..self.position]
    }
}

/// Owner of a heap allocated [`MemoryStreamBuffer`] whose address is handed
/// to the codec as user data.
///
/// The buffer is only ever reached through the raw pointer so the codec
/// and this handle never hold competing references.
pub(crate) struct StreamBufferHandle {
    ptr: NonNull<MemoryStreamBuffer>
}

impl StreamBufferHandle {
    pub fn new(buffer: MemoryStreamBuffer) -> StreamBufferHandle {
        let ptr = NonNull::from(Box::leak(Box::new(buffer)));
        StreamBufferHandle { ptr }
    }

    /// The opaque user data registered with the codec stream
    pub fn user_data(&self) -> *mut c_void {
        self.ptr.as_ptr().cast()
    }

    pub fn buffer(&self) -> &MemoryStreamBuffer {
        // SAFETY: the pointer came from a Box we own, and callbacks only run
        // inside encode, which doesn't overlap with this borrow
        unsafe { self.ptr.as_ref() }
    }
}

impl Drop for StreamBufferHandle {
    fn drop(&mut self) {
        // SAFETY: created by Box::leak in new and released exactly once here
        drop(unsafe { Box::from_raw(self.ptr.as_ptr()) });
    }
}

/// Recover the buffer from the codec's user data
///
/// # Safety
/// `user_data` must be null or come from [`StreamBufferHandle::user_data`]
/// of a live handle, with no other reference to the buffer alive.
unsafe fn buffer_from_user_data<'a>(user_data: *mut c_void) -> Option<&'a mut MemoryStreamBuffer> {
    user_data.cast::<MemoryStreamBuffer>().as_mut()
}

/// Write callback, copies `nb_bytes` from `p_buffer` into the buffer
///
/// Returns the number of bytes written or [`WRITE_FAILED`]
///
/// # Safety
/// `p_buffer` must be valid for `nb_bytes` reads and `user_data` must
/// satisfy the requirements of a registered stream buffer
pub(crate) unsafe extern "C" fn stream_write(
    p_buffer: *mut c_void, nb_bytes: usize, user_data: *mut c_void
) -> usize {
    let Some(buffer) = buffer_from_user_data(user_data) else {
        return WRITE_FAILED;
    };
    if nb_bytes == 0 {
        return 0;
    }
    if p_buffer.is_null() {
        return WRITE_FAILED;
    }
    let source = core::slice::from_raw_parts(p_buffer.cast::<u8>().cast_const(), nb_bytes);

    buffer.write(source).unwrap_or(WRITE_FAILED)
}

/// Seek callback, moves the cursor to an absolute offset
///
/// Returns [`SEEK_OK`], or [`SEEK_FAILED`] for negative offsets
///
/// # Safety
/// `user_data` must satisfy the requirements of a registered stream buffer
pub(crate) unsafe extern "C" fn stream_seek(offset: i64, user_data: *mut c_void) -> i32 {
    let Some(buffer) = buffer_from_user_data(user_data) else {
        return SEEK_FAILED;
    };
    match u64::try_from(offset) {
        Ok(offset) => {
            buffer.seek(offset);
            SEEK_OK
        }
        Err(_) => SEEK_FAILED
    }
}

/// Skip callback, advances the cursor by `delta` bytes
///
/// Returns the number of bytes skipped or [`SKIP_FAILED`]
///
/// # Safety
/// `user_data` must satisfy the requirements of a registered stream buffer
pub(crate) unsafe extern "C" fn stream_skip(delta: i64, user_data: *mut c_void) -> i64 {
    let Some(buffer) = buffer_from_user_data(user_data) else {
        return SKIP_FAILED;
    };
    let Ok(delta) = u64::try_from(delta) else {
        return SKIP_FAILED;
    };
    match buffer.skip(delta) {
        // n <= delta which came from an i64
        Some(n) => n as i64,
        None => SKIP_FAILED
    }
}

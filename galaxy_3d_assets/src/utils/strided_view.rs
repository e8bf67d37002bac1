/// Strided views: typed, zero-copy windows over interleaved vertex data.
///
/// Loaders describe their native attribute storage with these views and the
/// mesh assembler reads every format through the same [`StridedRead`]
/// interface. Reads are bounds-checked and unaligned-safe.
///
/// ```ignore
/// let values = StridedView::<u32>::from_slice(&[10, 20, 30, 40]);
/// let indices = StridedView::<u16>::from_slice(&[3, 0, 2]);
/// let view = IndexedView::new(values, indices);
/// assert_eq!(view.get(0), Some(40));
/// ```

use std::marker::PhantomData;
use std::mem::size_of;
use bytemuck::Pod;
use crate::error::{Error, Result};

/// Integer types usable as indices through an [`IndexedView`]
pub trait ViewIndex: Copy {
    /// `None` when the value cannot address an element (negative index)
    fn to_index(self) -> Option<usize>;
}

macro_rules! impl_view_index_unsigned {
    ($($t:ty),*) => {
        $(impl ViewIndex for $t {
            fn to_index(self) -> Option<usize> {
                Some(self as usize)
            }
        })*
    };
}

impl_view_index_unsigned!(u8, u16, u32, usize);

impl ViewIndex for i32 {
    fn to_index(self) -> Option<usize> {
        usize::try_from(self).ok()
    }
}

/// Random read access by element position
pub trait StridedRead: Copy {
    type Item;

    /// Element `i`, or `None` when it lies outside the underlying memory
    fn get(&self, i: usize) -> Option<Self::Item>;
}

fn effective_stride<T>(stride: usize) -> usize {
    if stride == 0 { size_of::<T>() } else { stride }
}

fn element_range(i: usize, stride: usize, size: usize) -> Option<std::ops::Range<usize>> {
    let start = i.checked_mul(stride)?;
    let end = start.checked_add(size)?;
    Some(start..end)
}

// ============================================================================
// StridedView
// ============================================================================

/// Read-only view of `T` values spaced `stride` bytes apart
pub struct StridedView<'a, T> {
    bytes: &'a [u8],
    stride: usize,
    _marker: PhantomData<T>,
}

impl<T> Clone for StridedView<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for StridedView<'_, T> {}

impl<'a, T: Pod> StridedView<'a, T> {
    /// View starting at the first byte of `bytes`. A stride of 0 means `size_of::<T>()`.
    pub fn new(bytes: &'a [u8], stride: usize) -> Self {
        Self { bytes, stride: effective_stride::<T>(stride), _marker: PhantomData }
    }

    /// Tightly packed view over a typed slice
    pub fn from_slice(values: &'a [T]) -> Self {
        Self::new(bytemuck::cast_slice(values), 0)
    }

    /// View of `count` elements starting at `offset`, checked against `bytes`
    pub fn from_bytes(bytes: &'a [u8], offset: usize, stride: usize, count: usize) -> Result<Self> {
        let stride = effective_stride::<T>(stride);
        let needed = match count {
            0 => offset,
            n => (n - 1)
                .checked_mul(stride)
                .and_then(|v| v.checked_add(size_of::<T>()))
                .and_then(|v| v.checked_add(offset))
                .ok_or_else(|| Error::InvalidResource("strided view range overflows".to_string()))?,
        };
        if needed > bytes.len() {
            return Err(Error::InvalidResource(format!(
                "strided view needs {} bytes, source has {}",
                needed,
                bytes.len()
            )));
        }
        Ok(Self::new(&bytes[offset..needed], stride))
    }

    /// View over raw memory
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for reads of `(count - 1) * stride + size_of::<T>()`
    /// bytes for the lifetime `'a`.
    pub unsafe fn from_raw_parts(ptr: *const u8, stride: usize, count: usize) -> Self {
        let stride = effective_stride::<T>(stride);
        let len = if count == 0 { 0 } else { (count - 1) * stride + size_of::<T>() };
        Self::new(std::slice::from_raw_parts(ptr, len), stride)
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Number of whole elements readable through the view
    pub fn len(&self) -> usize {
        if self.bytes.len() < size_of::<T>() {
            0
        } else {
            (self.bytes.len() - size_of::<T>()) / self.stride + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Pod> StridedRead for StridedView<'_, T> {
    type Item = T;

    fn get(&self, i: usize) -> Option<T> {
        let range = element_range(i, self.stride, size_of::<T>())?;
        self.bytes.get(range).map(bytemuck::pod_read_unaligned)
    }
}

// ============================================================================
// StridedViewMut
// ============================================================================

/// Writable view used to scatter values into an interleaved destination
pub struct StridedViewMut<'a, T> {
    bytes: &'a mut [u8],
    stride: usize,
    _marker: PhantomData<T>,
}

impl<'a, T: Pod> StridedViewMut<'a, T> {
    pub fn new(bytes: &'a mut [u8], stride: usize) -> Self {
        Self { bytes, stride: effective_stride::<T>(stride), _marker: PhantomData }
    }

    pub fn get(&self, i: usize) -> Option<T> {
        let range = element_range(i, self.stride, size_of::<T>())?;
        self.bytes.get(range).map(bytemuck::pod_read_unaligned)
    }

    /// Write element `i`; `false` when it does not fit
    pub fn set(&mut self, i: usize, value: T) -> bool {
        let Some(range) = element_range(i, self.stride, size_of::<T>()) else {
            return false;
        };
        match self.bytes.get_mut(range) {
            Some(dst) => {
                dst.copy_from_slice(bytemuck::bytes_of(&value));
                true
            }
            None => false,
        }
    }
}

/// Stream `count` elements of `src` into `dst`
///
/// Returns the number of elements copied; stops at the first unreadable
/// source element or unwritable destination slot.
pub fn copy_into<V, T>(src: V, count: usize, dst: &mut StridedViewMut<'_, T>) -> usize
where
    V: StridedRead<Item = T>,
    T: Pod,
{
    for i in 0..count {
        match src.get(i) {
            Some(value) if dst.set(i, value) => {}
            _ => return i,
        }
    }
    count
}

// ============================================================================
// ConvertingView
// ============================================================================

/// View that decodes each element with a conversion function
/// (e.g. normalized `u16` pairs into `Vec2`)
pub struct ConvertingView<'a, T> {
    bytes: &'a [u8],
    stride: usize,
    element_size: usize,
    convert: fn(&[u8]) -> T,
}

impl<T> Clone for ConvertingView<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ConvertingView<'_, T> {}

impl<'a, T> ConvertingView<'a, T> {
    /// A stride of 0 means `element_size`
    pub fn new(bytes: &'a [u8], stride: usize, element_size: usize, convert: fn(&[u8]) -> T) -> Self {
        let stride = if stride == 0 { element_size } else { stride };
        Self { bytes, stride, element_size, convert }
    }
}

impl<T> StridedRead for ConvertingView<'_, T> {
    type Item = T;

    fn get(&self, i: usize) -> Option<T> {
        let range = element_range(i, self.stride, self.element_size)?;
        self.bytes.get(range).map(self.convert)
    }
}

// ============================================================================
// IndexedView / DummyView
// ============================================================================

/// `get(i) = values.get(indices.get(i))`
#[derive(Clone, Copy)]
pub struct IndexedView<V, I> {
    values: V,
    indices: I,
}

impl<V, I> IndexedView<V, I>
where
    V: StridedRead,
    I: StridedRead,
    I::Item: ViewIndex,
{
    pub fn new(values: V, indices: I) -> Self {
        Self { values, indices }
    }
}

impl<V, I> StridedRead for IndexedView<V, I>
where
    V: StridedRead,
    I: StridedRead,
    I::Item: ViewIndex,
{
    type Item = V::Item;

    fn get(&self, i: usize) -> Option<V::Item> {
        let index = self.indices.get(i)?.to_index()?;
        self.values.get(index)
    }
}

/// Identity index view for non-indexed geometry
#[derive(Debug, Clone, Copy, Default)]
pub struct DummyView;

impl StridedRead for DummyView {
    type Item = usize;

    fn get(&self, i: usize) -> Option<usize> {
        Some(i)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "strided_view_tests.rs"]
mod tests;

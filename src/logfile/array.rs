//! Dense n-dimensional numeric arrays produced by log parsers.
//!
//! Parsed attributes such as coordinate frames or vibrational frequencies are
//! stored as flat row-major buffers with an explicit shape. Consumers that need
//! plain nested sequences go through [`ToNested`].

use serde::{Serialize, Serializer};

use crate::json::{ToNested, Value};

/// Errors raised when building an array from ragged input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShapeError {
    #[error("row {index} has {found} elements, expected {expected}")]
    Ragged {
        index: usize,
        expected: usize,
        found: usize,
    },

    #[error("data length {len} does not match shape {shape:?}")]
    LengthMismatch { len: usize, shape: Vec<usize> },
}

/// A row-major numeric array with an arbitrary number of dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct NdArray<T> {
    shape: Vec<usize>,
    data: Vec<T>,
}

impl<T: Copy> NdArray<T> {
    /// Build an array from a flat buffer and a shape.
    pub fn from_shape_vec(shape: Vec<usize>, data: Vec<T>) -> Result<Self, ShapeError> {
        let expected: usize = shape.iter().product();
        if expected != data.len() {
            return Err(ShapeError::LengthMismatch {
                len: data.len(),
                shape,
            });
        }
        Ok(Self { shape, data })
    }

    /// One-dimensional array over `values`.
    pub fn from_vec(values: Vec<T>) -> Self {
        Self {
            shape: vec![values.len()],
            data: values,
        }
    }

    /// Two-dimensional array from equally sized rows.
    pub fn from_rows<R: AsRef<[T]>>(rows: &[R]) -> Result<Self, ShapeError> {
        let width = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        let mut data = Vec::with_capacity(rows.len() * width);
        for (index, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != width {
                return Err(ShapeError::Ragged {
                    index,
                    expected: width,
                    found: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            shape: vec![rows.len(), width],
            data,
        })
    }

    /// Stack same-shaped arrays along a new leading axis.
    pub fn stack(frames: &[NdArray<T>]) -> Result<Self, ShapeError> {
        let inner = frames.first().map(|f| f.shape.clone()).unwrap_or_default();
        let mut data = Vec::new();
        for (index, frame) in frames.iter().enumerate() {
            if frame.shape != inner {
                return Err(ShapeError::Ragged {
                    index,
                    expected: inner.iter().product(),
                    found: frame.len(),
                });
            }
            data.extend_from_slice(&frame.data);
        }
        let mut shape = Vec::with_capacity(inner.len() + 1);
        shape.push(frames.len());
        shape.extend(inner);
        Ok(Self { shape, data })
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Flat row-major view of the elements.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Sub-array at `index` along the leading axis, or `None` when out of range
    /// or when the array is zero-dimensional.
    pub fn outer(&self, index: usize) -> Option<NdArray<T>> {
        let (&count, inner) = self.shape.split_first()?;
        if index >= count {
            return None;
        }
        let stride: usize = inner.iter().product();
        let start = index * stride;
        Some(Self {
            shape: inner.to_vec(),
            data: self.data[start..start + stride].to_vec(),
        })
    }

    /// Last sub-array along the leading axis.
    pub fn last_outer(&self) -> Option<NdArray<T>> {
        let count = *self.shape.first()?;
        count.checked_sub(1).and_then(|i| self.outer(i))
    }
}

impl<T: Copy + Into<Value>> ToNested for NdArray<T> {
    fn to_nested(&self) -> Value {
        nest(&self.shape, &self.data)
    }
}

fn nest<T: Copy + Into<Value>>(shape: &[usize], data: &[T]) -> Value {
    match shape.split_first() {
        None => data.first().map(|&v| v.into()).unwrap_or(Value::Null),
        Some((&count, inner)) => {
            let stride: usize = inner.iter().product();
            let items = (0..count)
                .map(|i| nest(inner, &data[i * stride..(i + 1) * stride]))
                .collect();
            Value::List(items)
        }
    }
}

impl<T: Copy + Into<Value>> Serialize for NdArray<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_nested().serialize(serializer)
    }
}

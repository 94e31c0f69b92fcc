use super::IndexingError;

/// A slice over one dimension, with the semantics of a Python `slice`.
///
/// `None` bounds take their defaults from the sign of the step when resolved against a dimension length with [`Slice::indices`].
/// A negative step traverses the dimension in reverse.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Slice {
    start: Option<i64>,
    stop: Option<i64>,
    step: Option<i64>,
}

impl Slice {
    /// Create a new slice.
    ///
    /// # Errors
    /// Returns [`IndexingError::InvalidSlice`] if
    ///  - `step` is zero, or
    ///  - the step is positive and `start > stop`, where `start` and `stop` are both given with the same sign.
    ///
    /// The ordering check applies to the raw bounds only. Bounds of different signs, e.g. `slice(1, -1)`,
    /// are accepted and resolve to an empty selection in [`Slice::indices`] if they cross.
    pub fn new(
        start: Option<i64>,
        stop: Option<i64>,
        step: Option<i64>,
    ) -> Result<Self, IndexingError> {
        let invalid = |reason| IndexingError::InvalidSlice {
            start,
            stop,
            step,
            reason,
        };
        if step == Some(0) {
            return Err(invalid("slice step cannot be zero"));
        }
        if let (Some(start), Some(stop)) = (start, stop) {
            // Bounds with different signs are relative to opposite ends of the dimension
            let same_sign = (start < 0) == (stop < 0);
            if same_sign && step.unwrap_or(1) > 0 && start > stop {
                return Err(invalid("slice start is greater than stop"));
            }
        }
        Ok(Self { start, stop, step })
    }

    /// A slice covering a full dimension, equivalent to `slice(None)`.
    #[must_use]
    pub const fn full() -> Self {
        Self {
            start: None,
            stop: None,
            step: None,
        }
    }

    /// A slice from the start of a dimension to `stop`, equivalent to `slice(stop)`.
    #[must_use]
    pub const fn to(stop: i64) -> Self {
        Self {
            start: None,
            stop: Some(stop),
            step: None,
        }
    }

    /// A slice from `start` to `stop` with a unit step.
    ///
    /// # Errors
    /// Returns [`IndexingError::InvalidSlice`] under the same conditions as [`Slice::new`].
    pub fn range(start: i64, stop: i64) -> Result<Self, IndexingError> {
        Self::new(Some(start), Some(stop), None)
    }

    /// The start, if specified.
    #[must_use]
    pub const fn start(&self) -> Option<i64> {
        self.start
    }

    /// The stop, if specified.
    #[must_use]
    pub const fn stop(&self) -> Option<i64> {
        self.stop
    }

    /// The step, if specified.
    #[must_use]
    pub const fn step(&self) -> Option<i64> {
        self.step
    }

    /// Resolve the slice against a dimension of `length`, matching Python's `slice.indices(length)`.
    #[must_use]
    pub fn indices(&self, length: u64) -> SliceIndices {
        let length = i64::try_from(length).unwrap_or(i64::MAX);
        let step = self.step.unwrap_or(1);
        let reverse = step < 0;

        let clamp = |bound: i64| {
            if bound < 0 {
                let bound = bound + length;
                if bound < 0 {
                    if reverse {
                        -1
                    } else {
                        0
                    }
                } else {
                    bound
                }
            } else if bound >= length {
                if reverse {
                    length - 1
                } else {
                    length
                }
            } else {
                bound
            }
        };

        let start = self
            .start
            .map_or(if reverse { length - 1 } else { 0 }, clamp);
        let stop = self.stop.map_or(if reverse { -1 } else { length }, clamp);

        let step_abs = step.unsigned_abs();
        let count = if reverse {
            if stop < start {
                (start - stop - 1).unsigned_abs() / step_abs + 1
            } else {
                0
            }
        } else if start < stop {
            (stop - start - 1).unsigned_abs() / step_abs + 1
        } else {
            0
        };

        SliceIndices {
            start,
            stop,
            step,
            length: count,
        }
    }
}

/// A slice resolved against a dimension length.
///
/// Element `i` of the slice (for `i < length`) is at index `start + i * step`.
/// `stop` is exclusive and may be `-1` for a reverse slice that runs to the first element.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SliceIndices {
    /// The first index.
    pub start: i64,
    /// The exclusive stop.
    pub stop: i64,
    /// The step, never zero.
    pub step: i64,
    /// The number of elements in the slice.
    pub length: u64,
}

impl SliceIndices {
    /// A unit step slice of `length` elements from `start`.
    #[must_use]
    pub fn contiguous(start: u64, length: u64) -> Self {
        let start = i64::try_from(start).unwrap_or(i64::MAX);
        let length_i64 = i64::try_from(length).unwrap_or(i64::MAX);
        Self {
            start,
            stop: start + length_i64,
            step: 1,
            length,
        }
    }

    /// Create slice indices from a start, step, and element count.
    #[must_use]
    pub fn from_start_step(start: i64, step: i64, length: u64) -> Self {
        let length_i64 = i64::try_from(length).unwrap_or(i64::MAX);
        let stop = if length == 0 {
            start
        } else {
            start + (length_i64 - 1) * step + step.signum()
        };
        Self {
            start,
            stop,
            step,
            length,
        }
    }

    /// Returns true if the slice has a unit step.
    #[must_use]
    pub const fn is_contiguous(&self) -> bool {
        self.step == 1
    }

    /// The dimension index of element `i` of the slice.
    ///
    /// Only meaningful for `i < length`, where the result is non-negative.
    #[must_use]
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_wrap)]
    pub const fn index(&self, i: u64) -> u64 {
        (self.start + i as i64 * self.step) as u64
    }
}

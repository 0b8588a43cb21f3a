//! Costs of moving around an Environment.

use num_traits::bounds::UpperBounded;

/// A cost, either of a single step or accumulated along a path.
///
/// The upper bound is reserved to mean "unreachable", so saturating additions
/// never wrap into a cheap-looking value.
pub trait Cost:
    Copy
    + std::fmt::Debug
    + std::fmt::Display
    + PartialEq
    + core::cmp::Eq
    + PartialOrd
    + Ord
    + num_traits::SaturatingAdd
    + num_traits::bounds::UpperBounded
    + num_traits::Zero
    + num_traits::One
    + num_traits::ToPrimitive
    + std::ops::Add<Self, Output = Self>
    + std::ops::Sub<Self, Output = Self>
    + std::ops::AddAssign
{
    #[inline(always)]
    fn valid(&self) -> bool {
        *self != UpperBounded::max_value()
    }

    /// Single steps must be strictly positive.
    #[inline(always)]
    fn valid_step(&self) -> bool {
        self.valid() && !self.is_zero()
    }
}

impl Cost for u16 {}
impl Cost for u32 {}
impl Cost for u64 {}
impl Cost for usize {}

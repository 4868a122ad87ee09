//! Shared numeric constants. This module consists of static constants that
//! return commonly used [`Numeric`] values.

use once_cell::sync::Lazy;
use super::{int, Numeric};

pub static ZERO: Lazy<Numeric> = Lazy::new(|| int(0));

pub static ONE: Lazy<Numeric> = Lazy::new(|| int(1));

pub static MINUS_ONE: Lazy<Numeric> = Lazy::new(|| int(-1));

pub static TWO: Lazy<Numeric> = Lazy::new(|| int(2));

//! Stand-ins used when the `profiling` feature is off.

#[inline(always)]
pub fn init() {}

#[inline(always)]
pub fn shutdown() {}

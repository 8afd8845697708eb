//! Scoped claims against shared facilities.

use core::fmt;

/// A claim against a shared resource that must be released exactly once.
///
/// Implementations must tolerate repeated calls to [`Lease::release`]: only
/// the first call has an effect, later calls return `false`.
pub trait Lease: Send + fmt::Debug {
    /// Release the claim. Returns `true` if this call performed the release.
    fn release(&mut self) -> bool;

    /// Whether the claim has already been released.
    fn is_released(&self) -> bool;

    /// Short human-readable description for logs.
    fn label(&self) -> String;
}

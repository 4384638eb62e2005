#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Platform capability policy for rottag
//!
//! All platform-conditional behavior lives behind one capability-queried
//! policy object: the timestamp resolution the platform's SMB stack
//! preserves, and whether rewriting an existing extended attribute needs
//! an explicit remove first. A new platform is supported by adding a new
//! `Policy` implementation, not by scattering `cfg` conditionals.

use rottag_types::Resolution;

/// Capabilities that vary per operating system family.
pub trait Policy: Send + Sync {
    /// Sub-second timestamp precision that survives this platform's
    /// remote-filesystem round-trips.
    fn resolution(&self) -> Resolution;

    /// Whether setting an extended attribute that already exists can
    /// silently delete it instead of updating it, requiring an explicit
    /// remove immediately before every set to force a clean write.
    fn rewrite_requires_remove(&self) -> bool;
}

/// Linux: Samba and the kernel SMB client keep 100ns units, and
/// `fsetxattr` replaces in place.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinuxPolicy;

impl Policy for LinuxPolicy {
    fn resolution(&self) -> Resolution {
        Resolution::HundredNanos
    }

    fn rewrite_requires_remove(&self) -> bool {
        false
    }
}

/// macOS: the SMB client keeps whole seconds only, and on SMB mounts
/// `fsetxattr` on an existing attribute removes it instead of updating,
/// so a second run would find the tag gone. Remove-before-set works
/// around that.
#[derive(Debug, Clone, Copy, Default)]
pub struct MacPolicy;

impl Policy for MacPolicy {
    fn resolution(&self) -> Resolution {
        Resolution::Seconds
    }

    fn rewrite_requires_remove(&self) -> bool {
        true
    }
}

/// The policy for the operating system this binary was built for.
#[must_use]
pub fn current() -> &'static dyn Policy {
    #[cfg(target_os = "macos")]
    {
        &MacPolicy
    }
    #[cfg(not(target_os = "macos"))]
    {
        &LinuxPolicy
    }
}

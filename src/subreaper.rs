//! Child-subreaper registration.
//!
//! A subreaper fulfills the role of `init` for its descendants: when an
//! intermediate parent exits, its orphaned children are reparented to the
//! nearest subreaper ancestor instead of to system init, so this process
//! can harvest their termination statuses.

use crate::error::BootError;

/// Marks the current process as child subreaper for its descendants.
///
/// Idempotent; repeating the call is a no-op at the kernel level. Must
/// succeed before anything is launched, since without it orphaned
/// grandchildren would escape the reaper.
#[cfg(target_os = "linux")]
pub(crate) fn register() -> Result<(), BootError> {
    nix::sys::prctl::set_child_subreaper(true).map_err(BootError::Subreaper)
}

#[cfg(not(target_os = "linux"))]
pub(crate) fn register() -> Result<(), BootError> {
    // No subreaper attribute outside Linux; direct children are still waitable.
    Ok(())
}

#[cfg(test)]
#[cfg(target_os = "linux")]
mod tests {
    use super::register;

    #[test]
    fn register_is_idempotent() {
        register().unwrap();
        register().unwrap();
        assert!(nix::sys::prctl::get_child_subreaper().unwrap());
    }
}

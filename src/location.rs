use crate::error::Result;

/// The platform's positioning subsystem. Fixes are not pulled from here;
/// the platform pushes them through `Tracker::on_location_update` once
/// `start_updates` succeeded.
pub trait LocationProvider {
    fn request_permission(&mut self) -> Result<()>;

    /// Fails with `Error::PermissionDenied` or `Error::LocationUnavailable`.
    fn start_updates(&mut self) -> Result<()>;

    fn stop_updates(&mut self);
}

impl<P: LocationProvider + ?Sized> LocationProvider for Box<P> {
    fn request_permission(&mut self) -> Result<()> {
        (**self).request_permission()
    }

    fn start_updates(&mut self) -> Result<()> {
        (**self).start_updates()
    }

    fn stop_updates(&mut self) {
        (**self).stop_updates()
    }
}

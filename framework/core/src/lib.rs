mod bail;
mod shutdown;

pub mod prelude {
    pub use crate::bail::ScenarioBailError;
    pub use crate::shutdown::{DelegatedShutdownListener, ShutdownHandle, ShutdownSignalError};
}

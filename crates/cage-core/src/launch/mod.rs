//! Launch profiles: the merged view a container launcher consumes.
//!
//! Resolution keeps top-level fields and the `tools` / `repos` overlays
//! separate. A launch combines them for one invocation: top level first,
//! then the selected tool's overlay, then the repository's overlay.

pub mod errors;
pub mod types;

pub use errors::LaunchError;
pub use types::LaunchProfile;

//! Domain types.

mod package;
mod recipient;

pub use package::{KeyCode, Package, PackageUrl, UploadedFile};
pub use recipient::parse_recipients;

//! Archive composer: stages `package-info` and `manifest` sidecars into a
//! package directory, then compresses the directory into a single
//! makepkg-style `.pkg.tar.<suffix>` archive.

pub mod archive;
pub mod error;
pub mod manifest;
pub mod package_info;

pub use archive::{archive_file_name, chosen_architecture, ArchiveComposer};
pub use error::{PackageError, Result};

pub mod call;
pub mod endpoints;
pub mod init;
pub mod requests;
pub mod unique_id;
pub mod version;

pub use call::Call;
pub use endpoints::Endpoints;
pub use init::Init;
pub use unique_id::UniqueId;
pub use version::Version;

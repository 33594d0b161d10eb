pub mod assertions;
pub mod test_connection;
pub mod test_session;
pub mod test_types;

pub use ops::*;
pub use test_connection::{RecordingConnection, RouteTable};
pub use test_session::{TestSession, AVATAR_ID, MIND_ID};
pub use test_types::standard_types;

//! 백엔드 gRPC 클라이언트.

pub mod channel;
pub mod feed;
pub mod identity;

pub use channel::{ChannelSettings, UnaryClient};
pub use feed::GrpcFeedClient;
pub use identity::GrpcIdentityClient;

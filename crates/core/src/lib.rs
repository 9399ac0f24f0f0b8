//! GitHub webhook → chat notification pipeline.
//!
//! - [`signature`]: HMAC-SHA256 authentication of deliveries
//! - [`router`] and [`render`]: event type → notification message
//! - [`channel`]: lazy, cached resolution of the target channel
//! - [`dispatcher`]: the per-request pipeline tying it together

pub mod channel;
pub mod delivery;
pub mod dispatcher;
pub mod github;
pub mod message;
pub mod render;
pub mod request;
pub mod router;
pub mod signature;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use channel::{
    ChannelError, ChannelInfo, ChannelKind, ChannelResolver, ChatSession, TargetChannel,
};
pub use delivery::{DeliveryError, DeliverySink};
pub use dispatcher::{DispatchError, Dispatcher, Outcome};
pub use message::{Author, Color, Field, NotificationMessage};
pub use request::WebhookRequest;
pub use router::{route, EventKind, RoutingKey};
pub use signature::{
    check_signature, compute_signature, format_signature_header, verify_signature, SignatureError,
};

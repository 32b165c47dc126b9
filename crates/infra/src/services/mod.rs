mod push;
mod routes;

pub use push::{
    FcmPushGateway, IPushGateway, MulticastReport, NoopPushGateway, NotificationDispatcher,
};
pub use routes::{FixedRouteDurationProvider, HttpRouteDurationProvider, IRouteDurationProvider};

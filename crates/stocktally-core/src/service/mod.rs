//! Services that talk to the outside world.

mod delivery;

pub use delivery::{Deliver, DeliveryError, OutgoingReport, SmtpDelivery};

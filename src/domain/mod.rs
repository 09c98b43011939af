pub mod credentials;
pub mod subscriber;
pub mod subscriber_status;

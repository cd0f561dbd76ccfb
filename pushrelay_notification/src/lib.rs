mod notification;
mod push;

#[cfg(feature = "fcm")]
mod fcm;
#[cfg(feature = "sns")]
mod sns;

pub use notification::*;
pub use push::*;

#[cfg(feature = "fcm")]
pub use fcm::*;
#[cfg(feature = "sns")]
pub use sns::*;

pub mod holiday;
pub mod private_chat;
pub mod start;

pub use holiday::HolidayResponder;
pub use private_chat::PrivateChatResponder;
pub use start::StartResponder;

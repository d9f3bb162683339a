// ============================================================================
// Notification Domain - Buyer-facing records of order events
// ============================================================================
//
// - Entity (Notification, NotificationId)
// - Repository port (NotificationRepository)
// - Dispatcher (Notifier: recipient resolution + persistence)
// - Inbox (read / unread queries and read marking)
//
// Delivery channels (email, push, ...) are not handled here; a notification
// is done once its record is persisted.
//
// ============================================================================

pub mod entity;
pub mod errors;
pub mod repository;
pub mod dispatcher;
pub mod inbox;

pub use entity::*;
pub use errors::*;
pub use repository::*;
pub use dispatcher::*;
pub use inbox::*;

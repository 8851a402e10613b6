mod booking;
mod gallery;
mod listing;
mod notification;
mod order;
mod product;
mod review;

pub use booking::{BookingRepository, BookingScope, BookingTransition, NewBooking};
pub use gallery::GalleryRepository;
pub use listing::ListingRepository;
pub use notification::NotificationRepository;
pub use order::{OrderRepository, OrderScope};
pub use product::ProductRepository;
pub use review::{ReviewRepository, ReviewScope};

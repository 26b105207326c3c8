//! Domain models: the closed currency set and the price value.

pub mod currency;
pub mod price;

pub use currency::Currency;
pub use price::Price;

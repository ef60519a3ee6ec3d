//! Managed entities and their DTOs.

pub mod dealer;
pub mod line;

pub use dealer::{CreateDealerDto, Dealer, UpdateDealerDto};
pub use line::{CreateLineDto, Line, UpdateLineDto};

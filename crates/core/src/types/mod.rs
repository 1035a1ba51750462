//! Core types for Xmas Events.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod event;
pub mod pricing;
pub mod shop;

pub use event::{DayType, EventDay, EventSlot, Month, MonthError};
pub use pricing::{PriceTable, PricingConfig, PricingMode};
pub use shop::{ShopDomain, ShopDomainError};

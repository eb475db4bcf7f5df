//! # Domain Models
//!
//! Typed values shared by the resolver, the parser, and the exporters.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Validated ticker without exchange suffix |
//! | [`Exchange`] | Listing venue alias (`NSE` → `NS`, `BSE` → `BO`) |
//! | [`Frequency`] | Row frequency alias (`Daily` → `1d`, ...) |
//! | [`PricePoint`] | One normalized table row |
//! | [`TimeSeries`] | Unique-date sequence of [`PricePoint`] in source order |

mod alias;
mod models;
mod symbol;

pub use alias::{Exchange, Frequency};
pub use models::{PricePoint, TimeSeries};
pub use symbol::Symbol;

//! Strategy-facing components: indicator specs and bundle, the signal
//! contract, and strategy parameters.

pub mod indicator;
pub mod params;
pub mod signal;

pub use indicator::{Band, IndicatorBundle, IndicatorSpec};
pub use params::{ParamSet, ParamValue};
pub use signal::{Signal, SignalContext, Strategy, StrategyError};

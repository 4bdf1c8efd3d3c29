//! Charts module - chart selection, figure building and drawing

mod dispatcher;
mod figure;
mod geometry;
mod kind;
mod plotter;

pub use dispatcher::{ChartDispatcher, ChartPage, DispatchError, TablePreview};
pub use kind::ChartKind;
pub use plotter::ChartPlotter;

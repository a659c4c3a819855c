//! Labeled container model: axis labels, indexes, series, tables and stacked
//! tables (panels).
//!
//! Column data is held in Arrow arrays; axis labels are held as [`Label`]
//! values so they can be hashed, ordered and compared structurally.

pub mod attrs;
pub mod date_range;
pub mod frame;
pub mod index;
pub mod label;
pub mod panel;
pub mod period;
pub mod series;
pub mod value;

pub use attrs::{Attr, Attributes};
pub use date_range::{bdate_range, period_range};
pub use frame::DataFrame;
pub use index::{Index, IndexDtype, InferredType, MultiIndex, SingleIndex};
pub use label::Label;
pub use panel::{Panel, Panel4D, PanelAxis, Stacked};
pub use period::{Frequency, Period};
pub use series::Series;
pub use value::Value;

pub mod grouping;
pub mod ordering;
pub mod pagination;
pub mod source;
pub mod status;

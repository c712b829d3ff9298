pub mod cell_ref;
pub mod sheet_model;

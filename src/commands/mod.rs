pub mod excel_to_mdn;
pub mod mdn_to_excel;
pub mod roundtrip;
pub mod validate;

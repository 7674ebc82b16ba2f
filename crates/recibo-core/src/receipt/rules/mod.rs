//! Value parsing and normalization for matched field strings.

pub mod amounts;
pub mod dates;
pub mod documents;
pub mod patterns;

pub use amounts::{format_brl, parse_brl};
pub use dates::{parse_date, parse_date_time, parse_time};
pub use documents::{is_valid_cnpj, is_valid_cpf, is_valid_tax_id, looks_like_cnpj};

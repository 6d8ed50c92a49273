//! Flutter bridge surface for toastline.
//!
//! Only `api` is scanned by the FRB code generator.

pub mod api;

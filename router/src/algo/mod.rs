pub mod neighbors;
pub mod union_find;

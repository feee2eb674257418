pub(crate) mod common;

mod compare;

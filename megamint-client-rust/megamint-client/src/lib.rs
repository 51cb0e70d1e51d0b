pub mod app;
pub mod domain;
pub mod infrastructure;
pub mod scripts;

#[cfg(test)]
pub(crate) mod test_support;

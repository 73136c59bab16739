//! Configuration access port trait.
//!
//! Numeric getters return `default` when the key is missing or unparsable;
//! validation of the values happens in `domain::config_validation`.

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;
    fn get_double(&self, section: &str, key: &str, default: f64) -> f64;
    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool;

    /// Every `(section, key)` pair present. Default implementation: none known.
    fn keys(&self) -> Vec<(String, String)> {
        Vec::new()
    }
}

//! Types and helpers shared by the server crate and the binary.

pub mod types;
pub mod utils;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_type_ok() {
        let h = types::Health::ok();
        assert_eq!(h.status, "ok");
        assert_eq!(h.database, "up");
    }

    #[test]
    fn health_serializes_snake_case() {
        let h = types::Health::degraded();
        let v = serde_json::to_value(&h).unwrap();
        assert_eq!(v["status"], "degraded");
        assert_eq!(v["database"], "down");
        assert_eq!(v["version"], env!("CARGO_PKG_VERSION"));
    }
}

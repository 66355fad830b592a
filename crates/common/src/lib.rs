pub mod metrics;
pub mod types;
pub mod utils;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_type_ok() {
        let h = types::Health::ok();
        assert_eq!(h.status, "ok");
    }

    #[test]
    fn envelope_serializes_null_data() {
        let body = types::ApiResponse::<()>::message("Logged out successfully");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "Logged out successfully");
        assert!(json["data"].is_null());
    }
}

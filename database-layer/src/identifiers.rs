use chrono::{NaiveDate, Utc};
use rand::Rng;

/// Generate a human-facing identifier such as `INV-20261019-048213`
pub fn generate_business_id(prefix: &str) -> String {
    business_id_for_date(prefix, Utc::now().date_naive())
}

pub fn business_id_for_date(prefix: &str, date: NaiveDate) -> String {
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{}-{}-{:06}", prefix, date.format("%Y%m%d"), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_business_id_shape() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let id = business_id_for_date("RX", date);
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "RX");
        assert_eq!(parts[1], "20261019");
        assert_eq!(parts[2].len(), 6);
        assert!(parts[2].chars().all(|c| c.is_ascii_digit()));
    }
}

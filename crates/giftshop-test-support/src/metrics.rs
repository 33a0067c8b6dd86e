//! Reading samples back out of Prometheus text exposition.

/// Value of the sample rendered exactly as `series`, such as `catalog_products`
/// or `http_requests_total{code="200",route="/health"}`.
///
/// Returns `None` when the series is absent or its value is not an integer.
#[must_use]
pub fn sample_value(exposition: &str, series: &str) -> Option<u64> {
    exposition
        .lines()
        .filter(|line| !line.starts_with('#'))
        .find_map(|line| {
            let (name, value) = line.rsplit_once(' ')?;
            if name == series { value.parse().ok() } else { None }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPOSITION: &str = "\
# HELP catalog_products Products visible in the latest listing
# TYPE catalog_products gauge
catalog_products 3
http_requests_total{code=\"200\",route=\"/api/products\"} 12
";

    #[test]
    fn sample_value_matches_whole_series() {
        assert_eq!(sample_value(EXPOSITION, "catalog_products"), Some(3));
        assert_eq!(
            sample_value(
                EXPOSITION,
                r#"http_requests_total{code="200",route="/api/products"}"#
            ),
            Some(12)
        );
        assert_eq!(sample_value(EXPOSITION, "http_requests_total"), None);
        assert_eq!(sample_value(EXPOSITION, "catalog"), None);
    }
}

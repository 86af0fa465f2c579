#[cfg(test)]
mod tests {
    use crate::models::CoordinateValue;
    use crate::parsing::look_table::{parse_look_file, parse_look_str};
    use std::io::Write;
    use tempfile::NamedTempFile;

    const DOCUMENT: &str = r#"{
        "active": [
            {
                "Target Name": "29P/Schwassmann-Wachmann 1",
                "R.A.": "05 12 33.10",
                "Dec.": "+27 05 11.0",
                "V Mag.": 16.4,
                "Rate (\"/min)": 0.12
            },
            {
                "Target Name": "C/2021 A1",
                "R.A.": 201.25,
                "Dec.": -12.5,
                "V Mag.": "18.5",
                "Rate (\"/min)": "2.0"
            }
        ],
        "new": [
            {
                "Target Name": "2022 AB",
                "R.A.": "10 00 00",
                "Dec.": "-05 00 00",
                "V Mag.": 20.1
            }
        ]
    }"#;

    #[test]
    fn test_parse_both_tables() {
        let catalog = parse_look_str(DOCUMENT).unwrap();
        assert_eq!(catalog.active.len(), 2);
        assert_eq!(catalog.new.len(), 1);

        let first = &catalog.active[0];
        assert_eq!(first.name, "29P/Schwassmann-Wachmann 1");
        assert_eq!(
            first.ra,
            CoordinateValue::Sexagesimal("05 12 33.10".to_string())
        );
        assert_eq!(first.magnitude, 16.4);
        assert_eq!(first.rate, 0.12);
    }

    #[test]
    fn test_numeric_strings_and_degrees() {
        let catalog = parse_look_str(DOCUMENT).unwrap();
        let second = &catalog.active[1];
        assert_eq!(second.ra, CoordinateValue::Degrees(201.25));
        assert_eq!(second.dec, CoordinateValue::Degrees(-12.5));
        assert_eq!(second.magnitude, 18.5);
        assert_eq!(second.rate, 2.0);
    }

    #[test]
    fn test_missing_rate_defaults_to_zero() {
        let catalog = parse_look_str(DOCUMENT).unwrap();
        assert_eq!(catalog.new[0].rate, 0.0);
    }

    #[test]
    fn test_blank_magnitude_is_nan() {
        let json = r#"{"active": [
            {"Target Name": "X", "R.A.": 1.0, "Dec.": 1.0, "V Mag.": "-"}
        ]}"#;
        let catalog = parse_look_str(json).unwrap();
        assert!(catalog.active[0].magnitude.is_nan());
    }

    #[test]
    fn test_only_one_table_present() {
        let json = r#"{"new": []}"#;
        let catalog = parse_look_str(json).unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_missing_tables_rejected() {
        let result = parse_look_str(r#"{"targets": []}"#);
        assert!(result.is_err());
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("'active' or 'new'"), "{}", message);
    }

    #[test]
    fn test_invalid_json_rejected() {
        let result = parse_look_str("<html><table></table></html>");
        assert!(result.is_err());
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("Invalid JSON syntax"), "{}", message);
    }

    #[test]
    fn test_bad_row_reports_path() {
        let json = r#"{"active": [
            {"Target Name": "A", "R.A.": 1.0, "Dec.": 1.0, "V Mag.": 15.0},
            {"Target Name": "B", "R.A.": 1.0, "Dec.": 1.0, "V Mag.": "bright"}
        ]}"#;
        let result = parse_look_str(json);
        assert!(result.is_err());
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("active[1]"), "{}", message);
    }

    #[test]
    fn test_parse_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(DOCUMENT.as_bytes()).unwrap();

        let catalog = parse_look_file(file.path()).unwrap();
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn test_parse_missing_file() {
        let result = parse_look_file(std::path::Path::new("/nonexistent/look.json"));
        assert!(result.is_err());
    }
}

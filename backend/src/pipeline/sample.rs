//! Example table served to users as a starting point for their own uploads.

pub const TEMPLATE_FILE_NAME: &str = "bulk-template.csv";

pub const TEMPLATE_CSV: &str = "\
phone,country,message,name,utm_source,utm_medium,utm_campaign,utm_content,utm_term
+14155552671,US,\"Hello {{name}}!\",John Doe,instagram,bio,profile,,
+442071234567,GB,Hi there!,Jane Smith,email,signature,contact,,
+919876543210,IN,Welcome to our service,,print,qr,offline,,
";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::parser::parse_rows;

    #[test]
    fn template_parses_with_the_input_schema() {
        let rows = parse_rows(TEMPLATE_CSV).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].message.as_deref(), Some("Hello {{name}}!"));
        assert_eq!(rows[2].name, None);
        assert_eq!(rows[2].utm_campaign.as_deref(), Some("offline"));
        assert_eq!(rows[2].utm_content, None);
    }
}

use crate::ports::outbound::ReportFormatter;
use crate::scan_audit::domain::{EvaluatedFinding, FindingProcessingError, ImageReport};
use crate::shared::Result;

/// JunitFormatter adapter rendering an `ImageReport` as a JUnit XML suite
///
/// One `<testsuite>` per image and one `<testcase>` per finding, with the
/// package key as the class name. Suite `tests`, `failures` and `errors`
/// are copied from the report.
pub struct JunitFormatter;

impl JunitFormatter {
    pub fn new() -> Self {
        Self
    }

    fn write_evaluated(out: &mut String, evaluated: &EvaluatedFinding) {
        out.push_str(&format!(
            "  <testcase name=\"{}\" classname=\"{}\" time=\"0\">\n",
            xml_escape(&evaluated.finding.name),
            xml_escape(&evaluated.package_key)
        ));

        let severity = evaluated.finding.severity.to_string();
        if evaluated.is_failed() {
            out.push_str(&format!(
                "    <failure type=\"{}\" message=\"{}\">{}</failure>\n",
                xml_escape(&severity),
                xml_escape(&evaluated.reason),
                xml_escape(&evaluated.reason)
            ));
        } else if evaluated.finding.severity.is_undefined() {
            out.push_str(&format!(
                "    <error type=\"{}\" message=\"{}\">{}</error>\n",
                xml_escape(&severity),
                xml_escape(&evaluated.reason),
                xml_escape(&evaluated.reason)
            ));
        } else {
            out.push_str(&format!(
                "    <system-out>{}</system-out>\n",
                xml_escape(&evaluated.reason)
            ));
        }

        out.push_str("  </testcase>\n");
    }

    fn write_processing_error(out: &mut String, processing_error: &FindingProcessingError) {
        let message = processing_error.error.to_string();
        out.push_str(&format!(
            "  <testcase name=\"{}\" classname=\"unclassified\" time=\"0\">\n",
            xml_escape(&processing_error.finding.name)
        ));
        out.push_str(&format!(
            "    <error type=\"MissingAttribute\" message=\"{}\">{}</error>\n",
            xml_escape(&message),
            xml_escape(&message)
        ));
        out.push_str("  </testcase>\n");
    }
}

impl Default for JunitFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for JunitFormatter {
    fn format(&self, report: &ImageReport) -> Result<String> {
        let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        out.push_str(&format!(
            "<testsuite name=\"{}\" tests=\"{}\" failures=\"{}\" errors=\"{}\" time=\"0\">\n",
            xml_escape(&report.image_name),
            report.total_findings,
            report.failure_count,
            report.error_count()
        ));

        out.push_str("  <properties>\n");
        if let Some(image) = &report.image {
            out.push_str(&format!(
                "    <property name=\"image\" value=\"{}\"/>\n",
                xml_escape(&image.to_string())
            ));
        }
        out.push_str(&format!(
            "    <property name=\"cutoff\" value=\"{}\"/>\n",
            report.cutoff
        ));
        out.push_str("  </properties>\n");

        if let Some(scan_error) = &report.scan_error {
            out.push_str(&format!(
                "  <testcase name=\"scan\" classname=\"{}\" time=\"0\">\n",
                xml_escape(&report.image_name)
            ));
            out.push_str(&format!(
                "    <error type=\"ScanFailed\" message=\"{}\">{}</error>\n",
                xml_escape(scan_error),
                xml_escape(scan_error)
            ));
            out.push_str("  </testcase>\n");
        }

        for evaluated in &report.evaluated_findings {
            Self::write_evaluated(&mut out, evaluated);
        }
        for processing_error in &report.processing_errors {
            Self::write_processing_error(&mut out, processing_error);
        }

        out.push_str("</testsuite>\n");
        Ok(out)
    }

    fn file_extension(&self) -> &'static str {
        "xml"
    }
}

fn xml_escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

//! Diagnostic rendering

use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use cy_driver::SourceUnit;
use cy_parser::ParseError;

/// Renders syntax errors against their source text
pub fn render_parse_errors(unit: &SourceUnit, errors: &[ParseError]) -> String {
    let mut files = SimpleFiles::new();
    let file_id = files.add(unit.name.as_str(), unit.text.as_str());
    let config = term::Config::default();

    let mut buffer = Vec::new();
    for error in errors {
        let diagnostic = error.to_codespan_diagnostic(file_id);
        #[allow(deprecated, reason = "codespan keeps `emit` for plain byte buffers")]
        let emitted = term::emit(&mut buffer, &config, &files, &diagnostic);
        if emitted.is_err() {
            buffer.extend_from_slice(format!("error: {error}\n").as_bytes());
        }
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_render_with_file_name() {
        let unit = SourceUnit::new("broken.c", "int main( {\n    return 1;\n}");
        let parsed = cy_parser::parse_source(&unit.name, &unit.text);
        assert!(!parsed.errors.is_empty());

        let output = render_parse_errors(&unit, &parsed.errors);
        assert!(output.contains("broken.c"), "{output}");
    }
}

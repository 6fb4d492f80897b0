//! Check-format command implementation.

use faktur_numbering::{render, validate, Variables};

/// Runs the check-format command.
///
/// Prints the validation report and, for a valid template, a preview
/// rendered with sample values.
pub fn run(template: &str) -> Result<(), Box<dyn std::error::Error>> {
    let report = validate(template);

    for error in &report.errors {
        println!("error: {error}");
    }
    for warning in &report.warnings {
        println!("warning: {warning}");
    }

    if !report.valid {
        return Err("template is invalid".into());
    }

    let preview = render(template, &Variables::build("INV", 42, 7, None));
    println!("ok: {template}");
    println!("preview: {preview}");
    Ok(())
}

//! Display formatting for CLI output
//!
//! Provides structured display for:
//! - Validation errors grouped by type name
//! - Attribute trees of schema descriptors

use console::style;
use crdsource_core::{Attribute, AttributeKind, SchemaDescriptor, ValidationErrorInfo, Variant};
use std::collections::BTreeMap;

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

/// A validation issue with the attribute path it applies to
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub source: String,
    pub path: String,
    pub message: String,
    pub suggestion: Option<String>,
}

/// Grouped validation results for display
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, source: &str, error: &ValidationErrorInfo) {
        let suggestion = error
            .expected
            .as_ref()
            .map(|expected| format!("expected {}", expected));
        self.issues.push(ValidationIssue {
            severity: Severity::Error,
            source: source.to_string(),
            path: error.path.clone(),
            message: error.message.clone(),
            suggestion,
        });
    }

    pub fn add_warning(&mut self, source: &str, path: &str, message: &str) {
        self.issues.push(ValidationIssue {
            severity: Severity::Warning,
            source: source.to_string(),
            path: path.to_string(),
            message: message.to_string(),
            suggestion: None,
        });
    }

    /// Display issues grouped by source
    pub fn display(&self) {
        let mut by_source: BTreeMap<&str, Vec<&ValidationIssue>> = BTreeMap::new();
        for issue in &self.issues {
            by_source.entry(&issue.source).or_default().push(issue);
        }

        for (source, issues) in by_source {
            println!();
            println!("{}", style(source).cyan().bold());

            for issue in issues {
                let icon = match issue.severity {
                    Severity::Error => style("✗").red(),
                    Severity::Warning => style("⚠").yellow(),
                };

                let path_display = if issue.path.is_empty() {
                    String::new()
                } else {
                    format!(" at {}", style(&issue.path).dim())
                };

                println!("  {} {}{}", icon, issue.message, path_display);

                if let Some(suggestion) = &issue.suggestion {
                    println!("    {} {}", style("hint:").blue(), suggestion);
                }
            }
        }
    }

    /// (errors, warnings)
    pub fn summary(&self) -> (usize, usize) {
        let errors = self
            .issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count();
        (errors, self.issues.len() - errors)
    }

    pub fn print_summary(&self) {
        let (errors, warnings) = self.summary();
        if errors == 0 && warnings == 0 {
            println!("{} Configuration is valid", style("✓").green().bold());
            return;
        }

        let mut parts = Vec::new();
        if errors > 0 {
            parts.push(style(format!("{} error(s)", errors)).red().to_string());
        }
        if warnings > 0 {
            parts.push(style(format!("{} warning(s)", warnings)).yellow().to_string());
        }
        println!("Found {}", parts.join(", "));
    }

    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Error)
    }
}

/// Print the header and attribute tree of a descriptor
pub fn print_descriptor(type_name: &str, variant: Variant, descriptor: &SchemaDescriptor) {
    println!("{}", style(type_name).cyan().bold());
    println!(
        "  {} {} ({}, {})",
        style("→").blue(),
        descriptor.api_version(),
        descriptor.kind,
        descriptor.scope
    );
    if descriptor.deprecated {
        println!("  {} version {} is deprecated", style("⚠").yellow(), descriptor.version);
    }
    if let Some(description) = &descriptor.description {
        println!("  {}", style(description).dim());
    }
    println!();

    println!("  {} {}", style("id").bold(), style("(computed)").dim());
    if variant == Variant::Manifest {
        println!("  {} {}", style("yaml").bold(), style("(computed)").dim());
    }

    let metadata = Attribute::new(
        "metadata",
        "metadata",
        AttributeKind::object(descriptor.metadata_attributes()),
    )
    .required();
    print_attribute(&metadata, 1);

    if variant == Variant::Manifest {
        for field in &descriptor.fields {
            print_attribute(field, 1);
        }
    } else if !descriptor.fields.is_empty() {
        let names: Vec<_> = descriptor.fields.iter().map(|f| f.name.as_str()).collect();
        println!(
            "  {} {}",
            style(names.join(", ")).bold(),
            style("(computed)").dim()
        );
    }
}

fn print_attribute(attribute: &Attribute, depth: usize) {
    let indent = "  ".repeat(depth);
    let marker = if attribute.required {
        style("required").red().to_string()
    } else {
        style("optional").dim().to_string()
    };
    println!(
        "{}{} {} {}",
        indent,
        style(&attribute.name).bold(),
        style(&attribute.kind).green(),
        marker
    );

    if let Some(children) = attribute.kind.nested_attributes() {
        for child in children {
            print_attribute(child, depth + 1);
        }
    }
}

//! Command-line interface for wsdl2-rs

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
use std::path::PathBuf;
#[cfg(feature = "cli")]
use std::sync::Arc;

#[cfg(feature = "cli")]
use wsdl2::config::{FEATURE_CONTINUE_ON_ERROR, FEATURE_VALIDATION, FEATURE_VERBOSE};
#[cfg(feature = "cli")]
use wsdl2::resolver::CatalogResolver;
#[cfg(feature = "cli")]
use wsdl2::{Description, ErrorInfo, Reader, Severity, WsdlComponent};

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(name = "wsdl2")]
#[command(author, version, about = "WSDL 2.0 reader and validator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand, Debug)]
enum Commands {
    /// Read a description and print its components
    Read {
        /// Path or URL of the WSDL document
        #[arg(value_name = "FILE")]
        file: String,

        /// Skip validation of the component model
        #[arg(long)]
        no_validation: bool,

        /// Keep reading after errors
        #[arg(long)]
        continue_on_error: bool,

        /// Trace every element, import and assertion
        #[arg(short, long)]
        verbose: bool,

        /// Catalog file mapping logical URIs to physical locations
        #[arg(long, value_name = "FILE")]
        catalog: Option<PathBuf>,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Validate a description and report every violation
    Validate {
        /// Path or URL of the WSDL document
        #[arg(value_name = "FILE")]
        file: String,

        /// Catalog file mapping logical URIs to physical locations
        #[arg(long, value_name = "FILE")]
        catalog: Option<PathBuf>,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

#[cfg(feature = "cli")]
fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Read {
            file,
            no_validation,
            continue_on_error,
            verbose,
            catalog,
            json,
        } => cmd_read(&file, !no_validation, continue_on_error, verbose, catalog, json),
        Commands::Validate { file, catalog, json } => cmd_validate(&file, catalog, json),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(feature = "cli")]
fn new_reader(
    validation: bool,
    continue_on_error: bool,
    verbose: bool,
    catalog: Option<PathBuf>,
) -> Result<Reader, Box<dyn std::error::Error>> {
    let mut reader = Reader::new();
    reader.set_feature(FEATURE_VALIDATION, validation)?;
    reader.set_feature(FEATURE_CONTINUE_ON_ERROR, continue_on_error)?;
    reader.set_feature(FEATURE_VERBOSE, verbose)?;
    if let Some(path) = catalog {
        reader.set_uri_resolver(Arc::new(CatalogResolver::from_file(path)?));
    }
    Ok(reader)
}

/// Read and print; returns false when the read failed
#[cfg(feature = "cli")]
fn cmd_read(
    file: &str,
    validation: bool,
    continue_on_error: bool,
    verbose: bool,
    catalog: Option<PathBuf>,
    json_output: bool,
) -> Result<bool, Box<dyn std::error::Error>> {
    let mut reader = new_reader(validation, continue_on_error, verbose, catalog)?;
    let outcome = reader.read_wsdl(file);
    let reports = reader.error_reporter().reports();

    match outcome {
        Ok(desc) => {
            if json_output {
                print_json(Some(&desc), reports)?;
            } else {
                print_description(&desc);
                print_reports(reports);
            }
            Ok(true)
        }
        Err(e) => {
            if json_output {
                print_json(None, reports)?;
            } else {
                print_reports(reports);
            }
            eprintln!("Error: {}", e);
            Ok(false)
        }
    }
}

/// Validate with continue-on-error; returns false when any error was reported
#[cfg(feature = "cli")]
fn cmd_validate(file: &str, catalog: Option<PathBuf>, json_output: bool) -> Result<bool, Box<dyn std::error::Error>> {
    let mut reader = new_reader(true, true, false, catalog)?;
    let outcome = reader.read_wsdl(file);
    let reports = reader.error_reporter().reports();

    if json_output {
        print_json(outcome.as_ref().ok(), reports)?;
    } else {
        print_reports(reports);
    }

    if let Err(e) = &outcome {
        eprintln!("Error: {}", e);
        return Ok(false);
    }
    if reader.error_reporter().has_errors() {
        if !json_output {
            println!("✗ Description is invalid");
        }
        return Ok(false);
    }
    if !json_output {
        println!("✓ Description is valid");
    }
    Ok(true)
}

#[cfg(feature = "cli")]
fn print_description(desc: &Description) {
    println!("Description");
    println!("===========");
    println!(
        "Target namespace: {}",
        desc.target_namespace.as_deref().unwrap_or("(none)")
    );
    println!("Schemas: {}", desc.schemas.len());
    println!();

    println!("Interfaces ({}):", desc.interfaces.len());
    for interface in &desc.interfaces {
        println!("  {}", interface.display_name());
        for extended in &interface.extends {
            println!("    extends {}", extended);
        }
        for op in &interface.operations {
            println!("    operation {} [{}]", op.display_name(), op.effective_pattern());
        }
        for fault in &interface.faults {
            println!("    fault {}", fault.display_name());
        }
    }

    println!("Bindings ({}):", desc.bindings.len());
    for binding in &desc.bindings {
        let interface = binding
            .interface
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "(none)".to_string());
        println!(
            "  {} type={} interface={}",
            binding.display_name(),
            binding.binding_type.as_deref().unwrap_or("(none)"),
            interface
        );
    }

    println!("Services ({}):", desc.services.len());
    for service in &desc.services {
        println!("  {}", service.display_name());
        for endpoint in &service.endpoints {
            println!(
                "    endpoint {} address={}",
                endpoint.display_name(),
                endpoint.address.as_deref().unwrap_or("(none)")
            );
        }
    }
}

#[cfg(feature = "cli")]
fn print_reports(reports: &[ErrorInfo]) {
    if reports.is_empty() {
        return;
    }
    println!();
    println!("Reports ({}):", reports.len());
    for report in reports {
        let marker = match report.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::FatalError => "fatal",
        };
        match &report.location {
            Some(location) => println!("  {} {} at {}: {}", marker, report.id, location, report.message),
            None => println!("  {} {}: {}", marker, report.id, report.message),
        }
    }
}

#[cfg(feature = "cli")]
fn print_json(desc: Option<&Description>, reports: &[ErrorInfo]) -> Result<(), Box<dyn std::error::Error>> {
    use serde_json::{json, Map, Value};

    let mut output = Map::new();

    if let Some(desc) = desc {
        output.insert("targetNamespace".to_string(), json!(desc.target_namespace));

        let interfaces: Vec<Value> = desc
            .interfaces
            .iter()
            .map(|i| {
                json!({
                    "name": i.name.as_ref().map(ToString::to_string),
                    "extends": i.extends.iter().map(ToString::to_string).collect::<Vec<_>>(),
                    "operations": i.operations.iter().map(|o| json!({
                        "name": o.name.as_ref().map(ToString::to_string),
                        "pattern": o.effective_pattern(),
                    })).collect::<Vec<_>>(),
                    "faults": i.faults.iter().map(|f| f.name.as_ref().map(ToString::to_string)).collect::<Vec<_>>(),
                })
            })
            .collect();
        output.insert("interfaces".to_string(), Value::Array(interfaces));

        let bindings: Vec<Value> = desc
            .bindings
            .iter()
            .map(|b| {
                json!({
                    "name": b.name.as_ref().map(ToString::to_string),
                    "type": b.binding_type,
                    "interface": b.interface.as_ref().map(ToString::to_string),
                })
            })
            .collect();
        output.insert("bindings".to_string(), Value::Array(bindings));

        let services: Vec<Value> = desc
            .services
            .iter()
            .map(|s| {
                json!({
                    "name": s.name.as_ref().map(ToString::to_string),
                    "interface": s.interface.as_ref().map(ToString::to_string),
                    "endpoints": s.endpoints.iter().map(|e| json!({
                        "name": e.name,
                        "binding": e.binding.as_ref().map(ToString::to_string),
                        "address": e.address,
                    })).collect::<Vec<_>>(),
                })
            })
            .collect();
        output.insert("services".to_string(), Value::Array(services));
    }

    output.insert("reports".to_string(), serde_json::to_value(reports)?);

    let json_str = serde_json::to_string_pretty(&Value::Object(output))?;
    println!("{}", json_str);
    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Rebuild with --features cli");
    std::process::exit(1);
}

//! FILENAME: core/output/src/driver.rs
//! PURPOSE: The driver interface and the factories that create drivers from
//! option maps.
//! CONTEXT: A driver renders the items the engine routes to it. It owns its
//! output file for its whole lifetime and closes it when dropped. Rendering
//! failures are logged by the driver and never reach the engine.
//!
//! Architecture:
//! - `Driver` - the capability set every renderer implements
//! - `DriverFactory` - maps a format name to a constructor and default file
//! - `driver_create` - turns `format=...`, `output-file=...` and the rest of
//!   an option map into a ready driver plus any warnings

use crate::csv::CsvDriver;
use crate::error::OutputError;
use crate::html::HtmlDriver;
use crate::item::OutputItem;
use crate::message::Diagnostic;
use crate::options::DriverOptions;
use crate::txt::TextDriver;
use pivot_table::OutputDevices;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

pub trait Driver {
    fn name(&self) -> &str;

    /// `TERMINAL`, `LISTING`, or `UNFILTERED` for drivers that receive all
    /// output regardless of routing.
    fn device_type(&self) -> OutputDevices;

    /// Drivers that handle groups receive them whole; others receive the
    /// group's contents one item at a time.
    fn handles_groups(&self) -> bool {
        false
    }

    /// Drivers that handle visibility also receive hidden items.
    fn handles_show(&self) -> bool {
        false
    }

    fn submit(&mut self, item: &OutputItem);

    /// Pushes buffered output to the device. Only called on terminal
    /// drivers.
    fn flush(&mut self) {}
}

// ============================================================================
// OUTPUT FILES
// ============================================================================

pub type OutputSink = Box<dyn Write>;

/// Opens `file_name` for writing; `-` is standard output.
pub fn open_output(file_name: &str) -> Result<OutputSink, OutputError> {
    if file_name == "-" {
        return Ok(Box::new(io::stdout()));
    }
    let file = File::create(file_name).map_err(|source| OutputError::Open {
        path: file_name.to_string(),
        source,
    })?;
    Ok(Box::new(BufWriter::new(file)))
}

// ============================================================================
// FACTORIES
// ============================================================================

type CreateFn =
    fn(&str, OutputDevices, &mut DriverOptions) -> Result<Box<dyn Driver>, OutputError>;

pub struct DriverFactory {
    /// The format name, which is also the file extension that selects it.
    pub format: &'static str,
    pub default_file_name: &'static str,
    create: Option<CreateFn>,
}

impl DriverFactory {
    pub fn is_supported(&self) -> bool {
        self.create.is_some()
    }

    pub fn create(
        &self,
        file_name: &str,
        device_type: OutputDevices,
        options: &mut DriverOptions,
    ) -> Result<Box<dyn Driver>, OutputError> {
        match self.create {
            Some(create) => create(file_name, device_type, options),
            None => Err(OutputError::UnsupportedFormat(self.format.to_string())),
        }
    }
}

fn create_txt(
    file_name: &str,
    device_type: OutputDevices,
    options: &mut DriverOptions,
) -> Result<Box<dyn Driver>, OutputError> {
    Ok(Box::new(TextDriver::create(file_name, device_type, options)?))
}

fn create_csv(
    file_name: &str,
    device_type: OutputDevices,
    options: &mut DriverOptions,
) -> Result<Box<dyn Driver>, OutputError> {
    Ok(Box::new(CsvDriver::create(file_name, device_type, options)?))
}

fn create_html(
    file_name: &str,
    device_type: OutputDevices,
    options: &mut DriverOptions,
) -> Result<Box<dyn Driver>, OutputError> {
    Ok(Box::new(HtmlDriver::create(file_name, device_type, options)?))
}

const fn factory(format: &'static str, default_file_name: &'static str, create: Option<CreateFn>) -> DriverFactory {
    DriverFactory {
        format,
        default_file_name,
        create,
    }
}

/// Known formats. The first entry is the fallback for unknown ones.
static FACTORIES: [DriverFactory; 11] = [
    factory("txt", "-", Some(create_txt)),
    factory("list", "-", Some(create_txt)),
    factory("html", "pspp.html", Some(create_html)),
    factory("csv", "-", Some(create_csv)),
    factory("odt", "pspp.odt", None),
    factory("spv", "pspp.spv", None),
    factory("pdf", "pspp.pdf", None),
    factory("ps", "pspp.ps", None),
    factory("svg", "pspp.svg", None),
    factory("png", "pspp.png", None),
    factory("tex", "pspp.tex", None),
];

pub fn factories() -> &'static [DriverFactory] {
    &FACTORIES
}

/// The factory for `format`, or the text factory if there is none.
pub fn find_factory(format: &str) -> &'static DriverFactory {
    FACTORIES
        .iter()
        .find(|f| f.format == format)
        .unwrap_or(&FACTORIES[0])
}

/// Output to standard output goes to the terminal; anything else is a
/// listing.
pub fn default_device_type(file_name: &str) -> OutputDevices {
    if file_name == "-" {
        OutputDevices::TERMINAL
    } else {
        OutputDevices::LISTING
    }
}

/// Creates a driver from `options`. `format` selects the driver, defaulting
/// to the extension of `output-file` or to `txt`; `output-file` defaults to
/// the driver's own default. The remaining options configure the driver.
/// Options it did not recognize, or could not parse, come back as warnings.
pub fn driver_create(
    mut options: BTreeMap<String, String>,
) -> Result<(Box<dyn Driver>, Vec<Diagnostic>), OutputError> {
    let file_name = options.remove("output-file");
    let format = match (options.remove("format"), &file_name) {
        (Some(format), _) => format,
        (None, Some(file_name)) => Path::new(file_name)
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_default(),
        (None, None) => "txt".to_string(),
    };
    let factory = find_factory(&format);
    let mut options = DriverOptions::new(factory.format, options);
    if !format.is_empty() && factory.format != format {
        options.warn(format!(
            "unknown output format `{}`, writing `{}` instead",
            format, factory.format
        ));
    }

    let file_name = file_name.unwrap_or_else(|| factory.default_file_name.to_string());
    let default_type = default_device_type(&file_name);
    let device_type = options.parse_enum(
        "device",
        default_type,
        &[
            ("terminal", OutputDevices::TERMINAL),
            ("listing", OutputDevices::LISTING),
        ],
    );

    let driver = factory.create(&file_name, device_type, &mut options)?;
    let unknown: Vec<String> = options.remaining_keys().map(str::to_string).collect();
    for key in unknown {
        options.warn(format!("{}: unknown option `{}`", file_name, key));
    }
    log::debug!("created {} driver for {}", driver.name(), file_name);
    Ok((driver, options.take_warnings()))
}

/// Splits `key=value` into its parts.
pub fn parse_option(option: &str) -> Result<(String, String), Diagnostic> {
    match option.split_once('=') {
        Some((key, value)) => Ok((key.to_string(), value.to_string())),
        None => Err(Diagnostic::error(format!(
            "{}: output option missing `=`",
            option
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_factory_falls_back_to_txt() {
        assert_eq!(find_factory("html").default_file_name, "pspp.html");
        assert_eq!(find_factory("docx").format, "txt");
        assert!(find_factory("csv").is_supported());
        assert!(!find_factory("pdf").is_supported());
    }

    #[test]
    fn test_parse_option() {
        assert_eq!(
            parse_option("format=csv"),
            Ok(("format".to_string(), "csv".to_string()))
        );
        assert_eq!(
            parse_option("quote="),
            Ok(("quote".to_string(), String::new()))
        );
        assert!(parse_option("csv").is_err());
    }

    #[test]
    fn test_default_device_type() {
        assert_eq!(default_device_type("-"), OutputDevices::TERMINAL);
        assert_eq!(default_device_type("out.csv"), OutputDevices::LISTING);
    }

    #[test]
    fn test_unsupported_format() {
        let options = BTreeMap::from([("output-file".to_string(), "report.pdf".to_string())]);
        match driver_create(options) {
            Err(OutputError::UnsupportedFormat(format)) => assert_eq!(format, "pdf"),
            other => panic!("unexpected result: {:?}", other.map(|(d, _)| d.name().to_string())),
        }
    }

    #[test]
    fn test_unopenable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");
        let options = BTreeMap::from([(
            "output-file".to_string(),
            path.to_string_lossy().into_owned(),
        )]);
        assert!(matches!(driver_create(options), Err(OutputError::Open { .. })));
    }
}

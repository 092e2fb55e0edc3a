//! Output targets, missing collaborators and configuration files.

use std::io::{Read, Seek, SeekFrom, Write};

use dsmwriter::analysis::memory::MappedImage;
use dsmwriter::analysis::view::ProgramView;
use dsmwriter::core::program::NaturalTypeSizes;
use dsmwriter::{DsmError, DsmWriter, ListingConfig};

use crate::common::{fixed_timestamp, scenario};

#[test]
fn file_sink_matches_string_output() {
    let fx = scenario();
    let writer = fx.writer().with_timestamp(fixed_timestamp());

    let mut file = tempfile::tempfile().unwrap();
    writer.render(&mut file).unwrap().unwrap();
    file.seek(SeekFrom::Start(0)).unwrap();
    let mut written = String::new();
    file.read_to_string(&mut written).unwrap();

    assert_eq!(written, writer.render_to_string().unwrap().unwrap());
}

#[test]
fn missing_memory_writes_nothing() {
    let fx = scenario();
    let mut file = tempfile::tempfile().unwrap();
    let result = DsmWriter::new(&fx.view)
        .with_type_sizes(&NaturalTypeSizes)
        .render(&mut file)
        .unwrap();
    assert!(result.is_none());
    assert_eq!(file.metadata().unwrap().len(), 0);
}

#[test]
fn missing_type_sizes_writes_nothing() {
    let fx = scenario();
    let mut sink = Vec::new();
    let result = DsmWriter::new(&fx.view)
        .with_memory(&fx.image)
        .render(&mut sink)
        .unwrap();
    assert!(result.is_none());
    assert!(sink.is_empty());
}

#[test]
fn unknown_architecture_writes_nothing() {
    let view = ProgramView::without_architecture();
    let image = MappedImage::new();
    let text = DsmWriter::new(&view)
        .with_memory(&image)
        .with_type_sizes(&NaturalTypeSizes)
        .render_to_string()
        .unwrap();
    assert!(text.is_none());
}

#[test]
fn config_from_json_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"bytes_per_line": 8, "column_gap": " ", "include_timestamp": false}}"#
    )
    .unwrap();
    let config = ListingConfig::from_json_file(file.path()).unwrap();
    assert_eq!(config.bytes_per_line, 8);
    assert_eq!(config.mnemonic_separator, "\t");

    let fx = scenario();
    let text = fx.writer().with_config(config).render_to_string().unwrap().unwrap();
    assert!(text.contains("0x1000: b8 01 00 00 \tmov eax, 1\n"));
    assert!(text.contains("0x1008: de ad be ef  41 42 43 00 |....ABC.|\n"));
}

#[test]
fn invalid_config_file_is_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"bytes_per_line": 0}}"#).unwrap();
    assert!(matches!(
        ListingConfig::from_json_file(file.path()),
        Err(DsmError::Config(_))
    ));

    let mut garbage = tempfile::NamedTempFile::new().unwrap();
    write!(garbage, "not json").unwrap();
    assert!(matches!(
        ListingConfig::from_json_file(garbage.path()),
        Err(DsmError::Config(_))
    ));
}

struct FailingSink;

impl Write for FailingSink {
    fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
        Err(std::io::Error::other("sink closed"))
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn sink_errors_propagate() {
    let fx = scenario();
    let result = fx.writer().render(&mut FailingSink);
    assert!(matches!(result, Err(DsmError::Io(_))));
}

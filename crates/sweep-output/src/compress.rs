//! Compression wrappers for CSV exports.

use std::io::{Cursor, Write};

use flate2::write::GzEncoder;
use sweep_model::Compression;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::error::{ExportError, Result};

/// Compresses `bytes`. Zip archives hold a single entry named `entry_name`.
pub fn compress(bytes: &[u8], compression: Compression, entry_name: &str) -> Result<Vec<u8>> {
    match compression {
        Compression::Gzip => {
            let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
            encoder.write_all(bytes)?;
            Ok(encoder.finish()?)
        }
        Compression::Zip => {
            let options =
                SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
            let mut archive = ZipWriter::new(Cursor::new(Vec::new()));
            archive.start_file(entry_name, options)?;
            archive.write_all(bytes)?;
            Ok(archive.finish()?.into_inner())
        }
        Compression::Bz2 | Compression::Xz => Err(ExportError::UnsupportedCompression(compression)),
    }
}

/// File suffix for a compressed CSV, replacing the plain `.csv` extension.
pub fn compressed_extension(compression: Compression) -> &'static str {
    match compression {
        Compression::Gzip => "csv.gz",
        Compression::Zip => "zip",
        Compression::Bz2 => "csv.bz2",
        Compression::Xz => "csv.xz",
    }
}

pub fn compressed_mime_type(compression: Compression) -> &'static str {
    match compression {
        Compression::Gzip => "application/gzip",
        Compression::Zip => "application/zip",
        Compression::Bz2 => "application/x-bzip2",
        Compression::Xz => "application/x-xz",
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use flate2::read::GzDecoder;

    use super::*;

    #[test]
    fn gzip_round_trips() {
        let packed = compress(b"a,b\n1,2\n", Compression::Gzip, "data.csv").unwrap();
        let mut text = String::new();
        GzDecoder::new(packed.as_slice())
            .read_to_string(&mut text)
            .unwrap();
        assert_eq!(text, "a,b\n1,2\n");
    }

    #[test]
    fn zip_holds_single_entry() {
        let packed = compress(b"a\n1\n", Compression::Zip, "data.csv").unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(packed.as_slice())).unwrap();
        assert_eq!(archive.len(), 1);
        let mut text = String::new();
        archive
            .by_name("data.csv")
            .unwrap()
            .read_to_string(&mut text)
            .unwrap();
        assert_eq!(text, "a\n1\n");
    }

    #[test]
    fn xz_is_rejected() {
        assert!(matches!(
            compress(b"", Compression::Xz, "data.csv"),
            Err(ExportError::UnsupportedCompression(Compression::Xz))
        ));
    }
}

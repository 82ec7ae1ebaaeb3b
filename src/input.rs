//! Opening tab-delimited text inputs, optionally compressed.
//!
//! `.gz`/`.bgz` files are read with the BGZF reader when they carry a BGZF
//! header and with a plain gzip decoder otherwise.

use flate2::read::MultiGzDecoder;
use log::debug;
use noodles::bgzf;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

const BGZF_HEADER_SIZE: usize = 18;

/// Check whether a file starts with a valid BGZF header.
/// Returns `Ok(false)` for regular gzip, too-small files, or plain text.
fn is_bgzf<R: Read + Seek>(reader: &mut R) -> io::Result<bool> {
    let mut header = [0u8; BGZF_HEADER_SIZE];
    let result = match reader.read_exact(&mut header) {
        Ok(()) => Ok(header[0..2] == [0x1f, 0x8b]
            && header[2] == 0x08
            && header[3] == 0x04
            && header[10..12] == [0x06, 0x00]
            && header[12..14] == [b'B', b'C']
            && header[14..16] == [0x02, 0x00]),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e),
    };
    reader.seek(SeekFrom::Start(0))?;
    result
}

fn is_compressed(path: &Path) -> bool {
    let name = path.to_string_lossy();
    [".gz", ".bgz"].iter().any(|ext| name.ends_with(ext))
}

/// Open a report for line-oriented reading.
///
/// The returned error names the file, so callers can surface it unchanged.
pub fn open_text(path: &Path) -> io::Result<Box<dyn BufRead>> {
    let mut file = File::open(path).map_err(|e| {
        io::Error::new(e.kind(), format!("Can't open {}: {}", path.display(), e))
    })?;

    if !is_compressed(path) {
        return Ok(Box::new(BufReader::new(file)));
    }

    if is_bgzf(&mut file)? {
        debug!("Reading {} as BGZF", path.display());
        Ok(Box::new(BufReader::new(bgzf::io::Reader::new(file))))
    } else {
        debug!("Reading {} as gzip", path.display());
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    #[test]
    fn test_open_plain_and_gzip() {
        let dir = tempfile::tempdir().unwrap();

        let plain = dir.path().join("report.txt");
        std::fs::write(&plain, "a\tb\nc\td\n").unwrap();
        let lines: Vec<String> = open_text(&plain).unwrap().lines().map(|l| l.unwrap()).collect();
        assert_eq!(lines, vec!["a\tb", "c\td"]);

        let gz = dir.path().join("report.txt.gz");
        let mut encoder = GzEncoder::new(File::create(&gz).unwrap(), Compression::default());
        encoder.write_all(b"x\ty\n").unwrap();
        encoder.finish().unwrap();
        let lines: Vec<String> = open_text(&gz).unwrap().lines().map(|l| l.unwrap()).collect();
        assert_eq!(lines, vec!["x\ty"]);
    }

    #[test]
    fn test_open_bgzf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.txt.bgz");
        let mut writer = bgzf::io::Writer::new(File::create(&path).unwrap());
        writer.write_all(b"Sequence Name: 1\nSP\t1\t100\n").unwrap();
        writer.finish().unwrap();

        let mut file = File::open(&path).unwrap();
        assert!(is_bgzf(&mut file).unwrap());

        let lines: Vec<String> = open_text(&path).unwrap().lines().map(|l| l.unwrap()).collect();
        assert_eq!(lines, vec!["Sequence Name: 1", "SP\t1\t100"]);
    }

    #[test]
    fn test_missing_file_names_path() {
        let err = match open_text(Path::new("/nonexistent/align_report.txt")) {
            Err(e) => e,
            Ok(_) => panic!("expected an error"),
        };
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(err.to_string().contains("/nonexistent/align_report.txt"));
    }
}

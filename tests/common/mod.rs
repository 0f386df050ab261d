#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use unlock_office::Context;
use zip::write::FileOptions;
use zip::{ZipArchive, ZipWriter};

pub const DECL: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\r\n";

pub const CONTENT_TYPES: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\r\n<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\"><Default Extension=\"xml\" ContentType=\"application/xml\"/></Types>";

pub const ROOT_RELS: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\r\n<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\"><Relationship Id=\"rId1\" Target=\"xl/workbook.xml\"/></Relationships>";

pub const SHEET_RELS: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\r\n<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\"><Relationship Id=\"rId1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/printerSettings\" Target=\"../printerSettings/printerSettings1.bin\"/></Relationships>";

pub const VBA: &[u8] = b"\xd0\xcf\x11\xe0ID=\"{00000000-0000-0000-0000-000000000000}\"\r\nCMG=\"0705\"\r\nDPB=\"0A08\"\r\nGC=\"1B19\"\r\n\x00\x00";

pub fn workbook(protected: bool) -> String {
    let protection = if protected {
        "<workbookProtection workbookAlgorithmName=\"SHA-512\" lockStructure=\"1\"/>"
    } else {
        ""
    };
    format!(
        "{DECL}<workbook xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\"><fileVersion appName=\"xl\"/>{protection}<bookViews><workbookView/></bookViews><sheets><sheet name=\"Sheet1\" sheetId=\"1\"/></sheets></workbook>"
    )
}

pub fn worksheet(n: usize, protected: bool) -> String {
    let protection = if protected {
        "<sheetProtection algorithmName=\"SHA-512\" sheet=\"1\" objects=\"1\" scenarios=\"1\"/>"
    } else {
        ""
    };
    format!(
        "{DECL}<worksheet xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\"><sheetData><row r=\"1\"><c r=\"A1\"><v>{n}</v></c></row></sheetData>{protection}<pageMargins left=\"0.7\"/></worksheet>"
    )
}

/// A spreadsheet with a protected workbook and three protected worksheets
pub fn spreadsheet_entries(protected: bool, vba: bool) -> Vec<(String, Vec<u8>)> {
    let mut entries = vec![
        ("[Content_Types].xml".to_owned(), CONTENT_TYPES.as_bytes().to_vec()),
        ("_rels/.rels".to_owned(), ROOT_RELS.as_bytes().to_vec()),
        ("xl/workbook.xml".to_owned(), workbook(protected).into_bytes()),
        ("docProps/app.xml".to_owned(), format!("{DECL}<Properties/>").into_bytes()),
        ("xl/media/image1.png".to_owned(), b"\x89PNG\r\n\x1a\nDPB not xml".to_vec()),
    ];
    for n in 1..=3 {
        entries.push((
            format!("xl/worksheets/sheet{n}.xml"),
            worksheet(n, protected).into_bytes(),
        ));
    }
    entries.push((
        "xl/worksheets/_rels/sheet1.xml.rels".to_owned(),
        SHEET_RELS.as_bytes().to_vec(),
    ));
    if vba {
        entries.push(("xl/vbaProject.bin".to_owned(), VBA.to_vec()));
    }
    entries
}

pub fn document_entries() -> Vec<(String, Vec<u8>)> {
    vec![
        ("[Content_Types].xml".to_owned(), CONTENT_TYPES.as_bytes().to_vec()),
        (
            "word/document.xml".to_owned(),
            format!("{DECL}<w:document xmlns:w=\"urn:w\"><w:body><w:p/></w:body></w:document>").into_bytes(),
        ),
        (
            "word/settings.xml".to_owned(),
            format!("{DECL}<w:settings xmlns:w=\"urn:w\"><w:writeProtection w:recommended=\"1\"/><w:zoom w:percent=\"100\"/><w:documentProtection w:edit=\"readOnly\" w:enforcement=\"1\"/></w:settings>").into_bytes(),
        ),
    ]
}

pub fn presentation_entries() -> Vec<(String, Vec<u8>)> {
    vec![
        ("[Content_Types].xml".to_owned(), CONTENT_TYPES.as_bytes().to_vec()),
        (
            "ppt/presentation.xml".to_owned(),
            format!("{DECL}<p:presentation xmlns:p=\"urn:p\"><p:sldIdLst/><p:modifyVerifier p:spinCount=\"100000\"/></p:presentation>").into_bytes(),
        ),
        (
            "ppt/slides/slide1.xml".to_owned(),
            format!("{DECL}<p:sld xmlns:p=\"urn:p\"/>").into_bytes(),
        ),
    ]
}

pub fn write_archive(path: &Path, entries: &[(String, Vec<u8>)]) {
    let mut zip = ZipWriter::new(File::create(path).unwrap());
    for (name, data) in entries {
        zip.start_file(name.as_str(), FileOptions::default()).unwrap();
        zip.write_all(data).unwrap();
    }
    zip.finish().unwrap();
}

pub fn read_archive(path: &Path) -> BTreeMap<String, Vec<u8>> {
    let mut zip = ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut entries = BTreeMap::new();
    for i in 0..zip.len() {
        let mut entry = zip.by_index(i).unwrap();
        let mut data = Vec::new();
        entry.read_to_end(&mut data).unwrap();
        entries.insert(entry.name().to_owned(), data);
    }
    entries
}

pub fn entry_names(path: &Path) -> Vec<String> {
    let mut zip = ZipArchive::new(File::open(path).unwrap()).unwrap();
    (0..zip.len())
        .map(|i| zip.by_index(i).unwrap().name().to_owned())
        .collect()
}

pub fn part(path: &Path, name: &str) -> String {
    String::from_utf8(read_archive(path).remove(name).unwrap()).unwrap()
}

/// Save and temp dirs inside `root`, neither created yet
pub fn context(root: &Path) -> Context {
    Context::new(root.join("unlocked"), root.join("temp"))
}

/// Writes an archive into `root/input/<name>`
pub fn input_file(root: &Path, name: &str, entries: &[(String, Vec<u8>)]) -> PathBuf {
    let dir = root.join("input");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    write_archive(&path, entries);
    path
}

pub fn dir_is_empty(dir: &Path) -> bool {
    std::fs::read_dir(dir).unwrap().next().is_none()
}

/// Sets the "encrypted" general purpose flag on every local and central directory header, which
/// is how a password-protected zip announces itself
pub fn mark_encrypted(path: &Path) {
    let mut bytes = std::fs::read(path).unwrap();
    for (signature, flag_offset) in [(b"PK\x03\x04", 6), (b"PK\x01\x02", 8)] {
        let headers: Vec<usize> = bytes
            .windows(4)
            .enumerate()
            .filter_map(|(i, w)| (w == signature).then_some(i))
            .collect();
        assert!(!headers.is_empty());
        for i in headers {
            bytes[i + flag_offset] |= 1;
        }
    }
    std::fs::write(path, bytes).unwrap();
}
